use dual_rtouch::schedule::Instant;
use rp2040_hal::{
    pac::{RESETS, TIMER},
    Timer,
};

pub struct Clock {
    timer: Timer,
}

impl Clock {
    pub fn new(timer: TIMER, resets: &mut RESETS) -> Self {
        Clock {
            timer: Timer::new(timer, resets),
        }
    }

    /// Low 32 bits of the 1 MHz system timer. Wraps every ~71 minutes.
    pub fn now(&self) -> Instant {
        Instant::from_ticks(self.timer.get_counter_low())
    }
}
