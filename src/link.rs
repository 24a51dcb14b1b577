use core::fmt::Debug;
use core::task::Poll;

use fugit::MillisDurationU32;
use heapless::Deque;

use crate::report::Frame;
use crate::schedule::Instant;

/// Transport to the host: a fixed-size binary channel and a line channel.
///
/// Neither method retries. A frame that cannot be handed to the transport
/// within `timeout` is reported as an error and forgotten.
pub trait HostLink {
    type Error: Debug;

    fn send_frame(&mut self, frame: &Frame, timeout: MillisDurationU32) -> Result<(), Self::Error>;

    fn send_line(&mut self, line: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError<E> {
    Timeout,
    Transport(E),
    QueueFull,
}

/// Appends `bytes` only if all of them fit. A partial line is never queued.
pub fn queue_whole<E, const N: usize>(
    queue: &mut Deque<u8, N>,
    bytes: &[u8],
) -> Result<(), LinkError<E>> {
    if queue.capacity() - queue.len() < bytes.len() {
        return Err(LinkError::QueueFull);
    }
    for &byte in bytes {
        queue.push_back(byte).ok();
    }
    Ok(())
}

/// Calls `attempt` until it is ready or `timeout` has passed since the first
/// call. `Poll::Pending` means the endpoint is still busy.
pub fn send_within<E, A, N>(
    timeout: MillisDurationU32,
    mut now: N,
    mut attempt: A,
) -> Result<(), LinkError<E>>
where
    A: FnMut() -> Poll<Result<(), E>>,
    N: FnMut() -> Instant,
{
    let start = now();
    loop {
        if let Poll::Ready(result) = attempt() {
            return result.map_err(LinkError::Transport);
        }

        let waited = now().checked_duration_since(start);
        if waited.map_or(true, |w| w.to_micros() >= timeout.to_micros()) {
            return Err(LinkError::Timeout);
        }
    }
}
