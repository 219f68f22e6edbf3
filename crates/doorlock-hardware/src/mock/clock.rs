//! Virtual clock implementing [`Delay`] without sleeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::Delay;

/// Delay that advances a shared virtual clock instead of blocking.
///
/// Clones share the same clock, so a test can hand one clone to the
/// controller and read elapsed time from another.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::SimClock;
/// use doorlock_hardware::traits::Delay;
///
/// let clock = SimClock::new();
/// let mut delay = clock.clone();
/// delay.delay_ms(300);
/// delay.delay_us(250);
/// assert_eq!(clock.now_us(), 300_250);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    elapsed_us: Arc<AtomicU64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time since creation, in microseconds.
    pub fn now_us(&self) -> u64 {
        self.elapsed_us.load(Ordering::SeqCst)
    }

    /// Virtual time since creation, in whole milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    fn advance(&self, us: u64) {
        self.elapsed_us.fetch_add(us, Ordering::SeqCst);
    }
}

impl Delay for SimClock {
    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms) * 1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(u64::from(us));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_time() {
        let clock = SimClock::new();
        let mut a = clock.clone();
        let mut b = clock.clone();
        a.delay_ms(2);
        b.delay_ms(3);
        assert_eq!(clock.now_ms(), 5);
    }
}
