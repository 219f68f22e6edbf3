//! Host implementation of the blocking delay.

use std::thread;
use std::time::Duration;

use crate::traits::Delay;

/// Delay backed by `std::thread::sleep`.
///
/// Used by the host emulator; sleeps at least the requested time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }

    fn delay_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(u64::from(us)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_std_delay_blocks_at_least_requested_time() {
        let mut delay = StdDelay;
        let start = Instant::now();
        delay.delay_ms(5);
        delay.delay_us(500);
        assert!(start.elapsed() >= Duration::from_micros(5500));
    }
}
