//! Two cadences in one loop: poll every iteration, emit on a fixed interval.

use fugit::{MicrosDurationU32, TimerInstantU32};

use crate::config::Config;
use crate::emitter::{Emission, Emitter};
use crate::link::HostLink;
use crate::panel::{DualPanels, TouchController};

/// Microsecond timestamp from a free-running 32-bit counter.
pub type Instant = TimerInstantU32<1_000_000>;

/// Fixed-interval trigger. A late check moves the anchor forward by exactly
/// one interval, never to `now`, so overruns do not accumulate drift.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    anchor: Instant,
    interval: MicrosDurationU32,
}

impl Cadence {
    pub const fn new(start: Instant, interval: MicrosDurationU32) -> Self {
        Cadence {
            anchor: start,
            interval,
        }
    }

    pub fn due(&mut self, now: Instant) -> bool {
        match now.checked_duration_since(self.anchor) {
            Some(elapsed) if elapsed >= self.interval => {
                self.anchor = self.anchor + self.interval;
                true
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Instant {
        self.anchor + self.interval
    }
}

pub struct Scheduler {
    cadence: Cadence,
    emitter: Emitter,
}

impl Scheduler {
    pub fn new(start: Instant, config: Config) -> Self {
        Scheduler {
            cadence: Cadence::new(start, config.emit_interval),
            emitter: Emitter::new(config),
        }
    }

    /// One loop iteration. Returns the emit result when the interval elapsed.
    pub fn run_once<C, L>(
        &mut self,
        panels: &mut DualPanels<C>,
        link: &mut L,
        now: Instant,
    ) -> Option<Emission>
    where
        C: TouchController,
        L: HostLink,
    {
        panels.poll();
        if self.cadence.due(now) {
            Some(self.emitter.emit(panels, link))
        } else {
            None
        }
    }

    pub fn next_deadline(&self) -> Instant {
        self.cadence.next_deadline()
    }
}
