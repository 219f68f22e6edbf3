//! Debounced 4x3 keypad matrix scanner.
//!
//! Rows are driven one at a time (active low) while the pulled-up columns are
//! sensed. The first column found low on the active row identifies the key,
//! translated through [`KEYPAD_LAYOUT`].

use doorlock_core::constants::KEYPAD_LAYOUT;
use doorlock_core::{KeySymbol, Result};
use doorlock_hardware::{Delay, DigitalPort, Direction, KeypadPins};
use tracing::{debug, trace};

use crate::config::TimingConfig;

/// Keypad scanner over a digital port.
#[derive(Debug, Clone)]
pub struct KeypadScanner<P, D> {
    port: P,
    delay: D,
    pins: KeypadPins,
    row_settle_ms: u32,
    debounce_hold_ms: u32,
    idle_poll_ms: u32,
}

impl<P: DigitalPort, D: Delay> KeypadScanner<P, D> {
    pub fn new(port: P, delay: D, pins: KeypadPins, timing: &TimingConfig) -> Self {
        Self {
            port,
            delay,
            pins,
            row_settle_ms: timing.row_settle_ms,
            debounce_hold_ms: timing.debounce_hold_ms,
            idle_poll_ms: timing.idle_poll_ms,
        }
    }

    /// Configure rows as inactive outputs and columns as inputs.
    ///
    /// # Errors
    /// Returns an error if the port cannot be configured.
    pub fn init(&mut self) -> Result<()> {
        let rows = self.pins.row_mask();
        self.port.set_direction(rows, Direction::Output)?;
        self.port.set(rows)?;
        self.port.set_direction(self.pins.column_mask(), Direction::Input)?;
        debug!("Keypad scanner initialised");
        Ok(())
    }

    /// Scan the matrix once.
    ///
    /// Returns `None` when no key is down. After a detection the scanner
    /// holds for the debounce time before returning. Every row is left
    /// inactive when the scan ends.
    ///
    /// # Errors
    /// Returns an error if the port cannot be driven or read.
    pub fn scan(&mut self) -> Result<Option<KeySymbol>> {
        let rows = self.pins.row_mask();
        let columns = self.pins.column_mask();
        let mut detected = None;

        for (row, row_pin) in self.pins.rows.iter().enumerate() {
            self.port.write(rows, rows & !row_pin.mask())?;
            self.delay.delay_ms(self.row_settle_ms);

            let levels = self.port.read(columns)?;
            let column = self
                .pins
                .columns
                .iter()
                .position(|col| !levels.contains(col.mask()));

            if let Some(column) = column {
                detected = Some(KEYPAD_LAYOUT[row][column]);
                break;
            }
        }

        self.port.set(rows)?;

        if detected.is_some() {
            trace!("Keypress detected");
            self.delay.delay_ms(self.debounce_hold_ms);
        }
        Ok(detected)
    }

    /// Block until a key is pressed.
    ///
    /// Empty scans are separated by the idle back-off. A port error ends the
    /// wait and is returned.
    ///
    /// # Errors
    /// Returns an error if a scan fails.
    pub fn get_key(&mut self) -> Result<KeySymbol> {
        loop {
            if let Some(symbol) = self.scan()? {
                return Ok(symbol);
            }
            self.delay.delay_ms(self.idle_poll_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorlock_hardware::PinMap;
    use doorlock_hardware::mock::{KeypadHandle, SimClock, SimulatedPort};
    use rstest::rstest;

    fn scanner() -> (
        KeypadScanner<SimulatedPort, SimClock>,
        SimulatedPort,
        KeypadHandle,
        SimClock,
    ) {
        let pins = PinMap::default();
        let clock = SimClock::new();
        let (port, keypad) = SimulatedPort::new(&pins);
        let port = port.with_clock(clock.clone());
        let mut scanner = KeypadScanner::new(
            port.clone(),
            clock.clone(),
            pins.keypad,
            &TimingConfig::default(),
        );
        scanner.init().unwrap();
        (scanner, port, keypad, clock)
    }

    #[rstest]
    #[case('1')]
    #[case('5')]
    #[case('9')]
    #[case('*')]
    #[case('0')]
    #[case('#')]
    fn test_scan_reports_pressed_key(#[case] key: char) {
        let (mut scanner, _port, keypad, _clock) = scanner();
        let symbol = KeySymbol::from_char(key).unwrap();
        keypad.press(symbol).unwrap();
        assert_eq!(scanner.scan().unwrap(), Some(symbol));
    }

    #[test]
    fn test_scan_without_key_returns_none() {
        let (mut scanner, _port, _keypad, clock) = scanner();
        assert_eq!(scanner.scan().unwrap(), None);
        // One settle delay per row, no debounce hold.
        assert_eq!(clock.now_ms(), 4);
    }

    #[test]
    fn test_detection_applies_debounce_hold() {
        let (mut scanner, _port, keypad, clock) = scanner();
        keypad.press(KeySymbol::Digit(1)).unwrap();
        scanner.scan().unwrap();
        assert_eq!(clock.now_ms(), 1 + 10);
    }

    #[test]
    fn test_rows_inactive_after_scan() {
        let pins = PinMap::default();
        let (mut scanner, port, keypad, _clock) = scanner();
        keypad.press(KeySymbol::Digit(5)).unwrap();
        scanner.scan().unwrap();
        assert!(port.is_high(pins.keypad.row_mask()));
    }

    #[test]
    fn test_get_key_waits_with_idle_back_off() {
        let (mut scanner, _port, keypad, clock) = scanner();
        assert_eq!(scanner.scan().unwrap(), None);
        let before = clock.now_ms();

        keypad.press(KeySymbol::Hash).unwrap();
        assert_eq!(scanner.get_key().unwrap(), KeySymbol::Hash);
        assert!(clock.now_ms() > before);
    }

    #[test]
    fn test_get_key_returns_one_symbol_per_call() {
        let (mut scanner, _port, keypad, _clock) = scanner();
        keypad.press_str("42").unwrap();
        assert_eq!(scanner.get_key().unwrap(), KeySymbol::Digit(4));
        assert_eq!(scanner.get_key().unwrap(), KeySymbol::Digit(2));
    }

    #[test]
    fn test_get_key_fails_when_input_disconnects() {
        let (mut scanner, _port, keypad, _clock) = scanner();
        drop(keypad);
        assert!(matches!(
            scanner.get_key(),
            Err(doorlock_core::Error::Hardware(_))
        ));
    }
}
