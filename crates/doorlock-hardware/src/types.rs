//! Pin-level types shared by the port, the display driver and the controller.
//!
//! Pins live in a logical 64-pin space: pins 0-31 belong to GPIO port 0 and
//! pins 32-63 to GPIO port 1. A [`PinMap`] binds every signal of the lock
//! (motor, indicators, display bus, keypad matrix) to a pin; it is plain data
//! and can be loaded from configuration.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use doorlock_core::constants::{KEYPAD_COLUMNS, KEYPAD_ROWS};
use serde::{Deserialize, Serialize};

use crate::error::{HardwareError, Result};

/// Number of pins in the logical pin space.
pub const PIN_COUNT: u8 = 64;

/// Width of the display data bus in pins.
pub const LCD_DATA_WIDTH: u8 = 8;

/// A single pin in the logical pin space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(u8);

impl Pin {
    /// Create a pin from its logical number.
    ///
    /// # Errors
    /// Returns `HardwareError::InvalidPin` if the number is not below [`PIN_COUNT`].
    pub fn new(number: u8) -> Result<Self> {
        if number >= PIN_COUNT {
            return Err(HardwareError::invalid_pin(format!(
                "Pin must be 0-{}, got {number}",
                PIN_COUNT - 1
            )));
        }
        Ok(Pin(number))
    }

    /// Pin `n` of GPIO port 0.
    pub const fn port0(n: u8) -> Self {
        Pin(n)
    }

    /// Pin `n` of GPIO port 1.
    pub const fn port1(n: u8) -> Self {
        Pin(32 + n)
    }

    #[must_use]
    pub fn number(self) -> u8 {
        self.0
    }

    /// Mask selecting only this pin; empty for out-of-range numbers.
    #[must_use]
    pub fn mask(self) -> PinMask {
        PinMask(1u64.checked_shl(u32::from(self.0)).unwrap_or(0))
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "P{}.{}", self.0 / 32, self.0 % 32)
    }
}

/// A set of pins, one bit per logical pin.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PinMask(u64);

impl PinMask {
    pub const EMPTY: PinMask = PinMask(0);

    pub const fn from_bits(bits: u64) -> Self {
        PinMask(bits)
    }

    /// Union of the masks of all given pins.
    pub fn from_pins<I: IntoIterator<Item = Pin>>(pins: I) -> Self {
        pins.into_iter()
            .fold(PinMask::EMPTY, |acc, pin| acc | pin.mask())
    }

    #[must_use]
    pub fn bits(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every pin of `other` is in `self`.
    #[must_use]
    pub fn contains(self, other: PinMask) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub fn intersects(self, other: PinMask) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate over the pin numbers set in the mask, lowest first.
    pub fn pins(self) -> impl Iterator<Item = u8> {
        (0..PIN_COUNT).filter(move |&n| self.0 & (1u64 << n) != 0)
    }
}

impl fmt::Debug for PinMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PinMask({:#018x})", self.0)
    }
}

impl BitOr for PinMask {
    type Output = PinMask;

    fn bitor(self, rhs: PinMask) -> PinMask {
        PinMask(self.0 | rhs.0)
    }
}

impl BitAnd for PinMask {
    type Output = PinMask;

    fn bitand(self, rhs: PinMask) -> PinMask {
        PinMask(self.0 & rhs.0)
    }
}

impl Not for PinMask {
    type Output = PinMask;

    fn not(self) -> PinMask {
        PinMask(!self.0)
    }
}

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Input,
    Output,
}

/// Character display wiring: 8-bit data bus plus register-select and enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LcdPins {
    /// Lowest pin of the eight contiguous data pins (D0).
    pub data_base: Pin,
    /// Register select: low for commands, high for character data.
    pub rs: Pin,
    /// Enable strobe; the display latches the bus on the falling edge.
    pub en: Pin,
}

impl Default for LcdPins {
    fn default() -> Self {
        Self {
            data_base: Pin::port0(0),
            rs: Pin::port0(10),
            en: Pin::port0(11),
        }
    }
}

impl LcdPins {
    /// Mask of the eight data pins.
    #[must_use]
    pub fn data_mask(&self) -> PinMask {
        PinMask(0xFFu64.checked_shl(u32::from(self.data_base.0)).unwrap_or(0))
    }

    /// Bit position of D0 within the pin space.
    #[must_use]
    pub fn data_shift(&self) -> u32 {
        u32::from(self.data_base.0)
    }

    /// Every pin used by the display.
    #[must_use]
    pub fn all(&self) -> PinMask {
        self.data_mask() | self.rs.mask() | self.en.mask()
    }
}

/// Lock motor wiring: two direction inputs of the H-bridge plus its enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorPins {
    pub dir1: Pin,
    pub dir2: Pin,
    pub enable: Pin,
}

impl Default for MotorPins {
    fn default() -> Self {
        Self {
            dir1: Pin::port0(8),
            dir2: Pin::port0(9),
            enable: Pin::port0(21),
        }
    }
}

impl MotorPins {
    #[must_use]
    pub fn all(&self) -> PinMask {
        PinMask::from_pins([self.dir1, self.dir2, self.enable])
    }
}

/// Status indicator wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorPins {
    pub red_led: Pin,
    pub green_led: Pin,
    pub buzzer: Pin,
}

impl Default for IndicatorPins {
    fn default() -> Self {
        Self {
            red_led: Pin::port0(12),
            green_led: Pin::port0(13),
            buzzer: Pin::port0(31),
        }
    }
}

impl IndicatorPins {
    #[must_use]
    pub fn all(&self) -> PinMask {
        PinMask::from_pins([self.red_led, self.green_led, self.buzzer])
    }
}

/// Keypad matrix wiring: driven rows and sensed (pulled-up) columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeypadPins {
    pub rows: [Pin; KEYPAD_ROWS],
    pub columns: [Pin; KEYPAD_COLUMNS],
}

impl Default for KeypadPins {
    fn default() -> Self {
        Self {
            rows: [
                Pin::port1(16),
                Pin::port1(17),
                Pin::port1(18),
                Pin::port1(19),
            ],
            columns: [Pin::port1(20), Pin::port1(21), Pin::port1(22)],
        }
    }
}

impl KeypadPins {
    #[must_use]
    pub fn row_mask(&self) -> PinMask {
        PinMask::from_pins(self.rows)
    }

    #[must_use]
    pub fn column_mask(&self) -> PinMask {
        PinMask::from_pins(self.columns)
    }
}

/// Complete pin assignment of the lock controller.
///
/// The default reproduces the reference board: display data on P0.0-P0.7,
/// RS on P0.10, EN on P0.11, motor on P0.8/P0.9 with enable on P0.21, red and
/// green LEDs on P0.12/P0.13, buzzer on P0.31, keypad rows on P1.16-P1.19 and
/// keypad columns on P1.20-P1.22.
///
/// Missing groups and missing pins within a group deserialize to these
/// defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinMap {
    pub lcd: LcdPins,
    pub motor: MotorPins,
    pub indicators: IndicatorPins,
    pub keypad: KeypadPins,
}

impl PinMap {
    /// Check that every pin exists and that no two signals share a pin.
    ///
    /// # Errors
    /// Returns `HardwareError::InvalidPin` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if u16::from(self.lcd.data_base.0) + u16::from(LCD_DATA_WIDTH) > u16::from(PIN_COUNT) {
            return Err(HardwareError::invalid_pin(format!(
                "Display data bus starting at pin {} does not fit in {PIN_COUNT} pins",
                self.lcd.data_base.0
            )));
        }

        let mut used = self.lcd.data_mask();
        for (name, pin) in self.named_single_pins() {
            if pin.0 >= PIN_COUNT {
                return Err(HardwareError::invalid_pin(format!(
                    "{name} uses nonexistent pin {}",
                    pin.0
                )));
            }
            if used.intersects(pin.mask()) {
                return Err(HardwareError::invalid_pin(format!(
                    "{name} on {pin} overlaps another signal"
                )));
            }
            used = used | pin.mask();
        }
        Ok(())
    }

    fn named_single_pins(&self) -> Vec<(String, Pin)> {
        let mut pins = vec![
            ("lcd.rs".to_string(), self.lcd.rs),
            ("lcd.en".to_string(), self.lcd.en),
            ("motor.dir1".to_string(), self.motor.dir1),
            ("motor.dir2".to_string(), self.motor.dir2),
            ("motor.enable".to_string(), self.motor.enable),
            ("indicators.red_led".to_string(), self.indicators.red_led),
            ("indicators.green_led".to_string(), self.indicators.green_led),
            ("indicators.buzzer".to_string(), self.indicators.buzzer),
        ];
        pins.extend(
            self.keypad
                .rows
                .iter()
                .enumerate()
                .map(|(i, &pin)| (format!("keypad.rows[{i}]"), pin)),
        );
        pins.extend(
            self.keypad
                .columns
                .iter()
                .enumerate()
                .map(|(i, &pin)| (format!("keypad.columns[{i}]"), pin)),
        );
        pins
    }
}
