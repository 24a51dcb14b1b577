//! Panel reader: latest touch sample per side plus the shared dirty flag.
//!
//! Each poll drains a touched controller's sample queue and keeps only the
//! newest entry. Older entries queued during the same interval are thrown
//! away.

use core::fmt;

use embedded_hal::blocking::delay::DelayMs;

/// Value written to a controller's interrupt status register to acknowledge
/// every pending source.
pub const CLEAR_ALL_INTERRUPTS: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Rear,
}

impl Side {
    /// Processing order within one poll.
    pub const ALL: [Side; 2] = [Side::Front, Side::Rear];

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Front => f.write_str("Front"),
            Side::Rear => f.write_str("Rear"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    pub x: u16,
    pub y: u16,
    pub pressure: u8,
}

impl Sample {
    pub const ZERO: Sample = Sample::new(0, 0, 0);

    pub const fn new(x: u16, y: u16, pressure: u8) -> Self {
        Sample { x, y, pressure }
    }
}

/// The narrow slice of a touch controller driver the reader needs.
pub trait TouchController {
    type Error: fmt::Debug;

    /// Maximum number of samples the controller can hold. Bounds one drain.
    const FIFO_DEPTH: usize;

    fn begin<D: DelayMs<u32>>(&mut self, delay: &mut D) -> Result<(), Self::Error>;

    fn touched(&mut self) -> Result<bool, Self::Error>;

    fn buffer_empty(&mut self) -> Result<bool, Self::Error>;

    fn read_data(&mut self) -> Result<Sample, Self::Error>;

    fn write_status(&mut self, value: u8) -> Result<(), Self::Error>;
}

/// A controller that did not come up. The device must not run half-populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupError<E> {
    pub side: Side,
    pub error: E,
}

impl<E: fmt::Display> fmt::Display for SetupError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-side {}", self.side, self.error)
    }
}

pub struct DualPanels<C> {
    controllers: [C; 2],
    samples: [Sample; 2],
    touched: [bool; 2],
    dirty: bool,
}

impl<C: TouchController> DualPanels<C> {
    /// Brings up both controllers, front first. Stops at the first failure.
    pub fn new<D: DelayMs<u32>>(
        front: C,
        rear: C,
        delay: &mut D,
    ) -> Result<Self, SetupError<C::Error>> {
        let mut controllers = [front, rear];
        for side in Side::ALL {
            controllers[side.index()]
                .begin(delay)
                .map_err(|error| SetupError { side, error })?;
        }

        Ok(DualPanels {
            controllers,
            samples: [Sample::ZERO; 2],
            touched: [false; 2],
            dirty: false,
        })
    }

    pub fn poll(&mut self) {
        for side in Side::ALL {
            let i = side.index();
            let controller = &mut self.controllers[i];

            let touched = controller.touched().unwrap_or_else(|err| {
                log::debug!("{side} touch state unreadable: {err:?}");
                false
            });
            self.touched[i] = touched;

            if touched {
                if let Some(sample) = drain_latest(controller) {
                    self.samples[i] = sample;
                }
                if let Err(err) = controller.write_status(CLEAR_ALL_INTERRUPTS) {
                    log::debug!("{side} interrupt acknowledge failed: {err:?}");
                }
            }

            self.dirty |= touched;
        }
    }

    pub fn is_touched(&self, side: Side) -> bool {
        self.touched[side.index()]
    }

    /// Last sample read from `side`, whether or not it is still touched.
    pub fn sample(&self, side: Side) -> Sample {
        self.samples[side.index()]
    }

    /// The sample as the host should see it: zero while `side` is untouched.
    pub fn reported(&self, side: Side) -> Sample {
        if self.is_touched(side) {
            self.sample(side)
        } else {
            Sample::ZERO
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

fn drain_latest<C: TouchController>(controller: &mut C) -> Option<Sample> {
    let mut latest = None;
    for _ in 0..C::FIFO_DEPTH {
        match controller.buffer_empty() {
            Ok(false) => {}
            Ok(true) => break,
            Err(err) => {
                log::debug!("fifo status unreadable: {err:?}");
                break;
            }
        }
        match controller.read_data() {
            Ok(sample) => latest = Some(sample),
            Err(err) => {
                log::debug!("fifo read failed: {err:?}");
                break;
            }
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    struct NoDelay;

    impl DelayMs<u32> for NoDelay {
        fn delay_ms(&mut self, _ms: u32) {}
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Gone;

    impl fmt::Display for Gone {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("controller not found")
        }
    }

    #[derive(Default)]
    struct FakeController {
        present: bool,
        touched: bool,
        broken: bool,
        fifo: VecDeque<Sample>,
        status_writes: Vec<u8>,
    }

    impl FakeController {
        fn present() -> Self {
            FakeController {
                present: true,
                ..Default::default()
            }
        }

        fn touch(&mut self, samples: &[Sample]) {
            self.touched = true;
            self.fifo.extend(samples.iter().copied());
        }

        fn lift(&mut self) {
            self.touched = false;
        }
    }

    impl TouchController for FakeController {
        type Error = Gone;

        const FIFO_DEPTH: usize = 4;

        fn begin<D: DelayMs<u32>>(&mut self, _delay: &mut D) -> Result<(), Gone> {
            if self.present {
                Ok(())
            } else {
                Err(Gone)
            }
        }

        fn touched(&mut self) -> Result<bool, Gone> {
            if self.broken {
                return Err(Gone);
            }
            Ok(self.touched)
        }

        fn buffer_empty(&mut self) -> Result<bool, Gone> {
            Ok(self.fifo.is_empty())
        }

        fn read_data(&mut self) -> Result<Sample, Gone> {
            self.fifo.pop_front().ok_or(Gone)
        }

        fn write_status(&mut self, value: u8) -> Result<(), Gone> {
            self.status_writes.push(value);
            Ok(())
        }
    }

    fn panels() -> DualPanels<FakeController> {
        match DualPanels::new(
            FakeController::present(),
            FakeController::present(),
            &mut NoDelay,
        ) {
            Ok(panels) => panels,
            Err(err) => panic!("setup failed: {err}"),
        }
    }

    fn front(panels: &mut DualPanels<FakeController>) -> &mut FakeController {
        &mut panels.controllers[Side::Front.index()]
    }

    fn rear(panels: &mut DualPanels<FakeController>) -> &mut FakeController {
        &mut panels.controllers[Side::Rear.index()]
    }

    #[test]
    fn setup_reports_the_missing_side() {
        let err = DualPanels::new(
            FakeController::present(),
            FakeController::default(),
            &mut NoDelay,
        )
        .err();
        assert_eq!(
            err,
            Some(SetupError {
                side: Side::Rear,
                error: Gone
            })
        );
    }

    #[test]
    fn setup_error_names_the_side() {
        let err = SetupError {
            side: Side::Front,
            error: Gone,
        };
        assert_eq!(err.to_string(), "Front-side controller not found");
    }

    #[test]
    fn setup_checks_front_first() {
        let err = DualPanels::new(
            FakeController::default(),
            FakeController::default(),
            &mut NoDelay,
        )
        .err();
        assert_eq!(err.map(|e| e.side), Some(Side::Front));
    }

    #[test]
    fn starts_zeroed_and_clean() {
        let panels = panels();
        for side in Side::ALL {
            assert!(!panels.is_touched(side));
            assert_eq!(panels.sample(side), Sample::ZERO);
        }
        assert!(!panels.is_dirty());
    }

    #[test]
    fn drain_keeps_newest_sample() {
        let mut panels = panels();
        front(&mut panels).touch(&[
            Sample::new(1, 1, 1),
            Sample::new(2, 2, 2),
            Sample::new(3, 3, 3),
        ]);
        panels.poll();

        assert!(panels.is_touched(Side::Front));
        assert_eq!(panels.sample(Side::Front), Sample::new(3, 3, 3));
        assert!(front(&mut panels).fifo.is_empty());
        assert_eq!(front(&mut panels).status_writes, [CLEAR_ALL_INTERRUPTS]);
        assert!(rear(&mut panels).status_writes.is_empty());
        assert!(panels.is_dirty());
    }

    #[test]
    fn drain_is_bounded_by_fifo_depth() {
        let mut panels = panels();
        let samples: Vec<Sample> = (0..6).map(|i| Sample::new(i, i, 0)).collect();
        rear(&mut panels).touch(&samples);
        panels.poll();

        assert_eq!(panels.sample(Side::Rear), Sample::new(3, 3, 0));
        assert_eq!(rear(&mut panels).fifo.len(), 2);
    }

    #[test]
    fn touched_with_empty_queue_keeps_previous_sample() {
        let mut panels = panels();
        front(&mut panels).touch(&[Sample::new(10, 20, 30)]);
        panels.poll();
        panels.poll();

        assert!(panels.is_touched(Side::Front));
        assert_eq!(panels.sample(Side::Front), Sample::new(10, 20, 30));
    }

    #[test]
    fn release_keeps_sample_but_reports_zero() {
        let mut panels = panels();
        front(&mut panels).touch(&[Sample::new(10, 20, 30)]);
        panels.poll();
        front(&mut panels).lift();
        panels.poll();

        assert!(!panels.is_touched(Side::Front));
        assert_eq!(panels.sample(Side::Front), Sample::new(10, 20, 30));
        assert_eq!(panels.reported(Side::Front), Sample::ZERO);
    }

    #[test]
    fn dirty_survives_release_until_cleared() {
        let mut panels = panels();
        rear(&mut panels).touch(&[Sample::new(5, 5, 5)]);
        panels.poll();
        rear(&mut panels).lift();
        panels.poll();
        assert!(panels.is_dirty());

        panels.clear_dirty();
        panels.poll();
        assert!(!panels.is_dirty());
    }

    #[test]
    fn unreadable_controller_counts_as_untouched() {
        let mut panels = panels();
        front(&mut panels).touch(&[Sample::new(7, 7, 7)]);
        front(&mut panels).broken = true;
        panels.poll();

        assert!(!panels.is_touched(Side::Front));
        assert_eq!(panels.sample(Side::Front), Sample::ZERO);
        assert!(!panels.is_dirty());
    }
}
