//! Core constants for the keypad door lock controller.
//!
//! This module centralises the fixed values of the access-control policy,
//! the keypad geometry, the feedback tones and the display protocol. Values
//! marked as configurable only provide defaults; the controller configuration
//! may override them at startup.
//!
//! # Usage
//!
//! ```
//! use doorlock_core::constants::*;
//!
//! assert_eq!(CREDENTIAL_LENGTH, 4);
//! assert_eq!(KEYPAD_ROWS * KEYPAD_COLUMNS, 12);
//!
//! use std::time::Duration;
//! let pulse = Duration::from_millis(u64::from(DEFAULT_MOTOR_PULSE_MS));
//! assert_eq!(pulse.as_millis(), 300);
//! ```

use crate::types::{KeySymbol, Tone};

// ============================================================================
// Access Policy
// ============================================================================

/// Number of symbols in a credential.
///
/// The entry buffer has exactly this capacity; validation starts as soon as
/// it is full.
pub const CREDENTIAL_LENGTH: usize = 4;

/// Consecutive mismatches tolerated before the keypad locks out (configurable).
pub const MAX_WRONG_ATTEMPTS: u8 = 3;

/// Credential used when no configuration overrides it.
pub const DEFAULT_CREDENTIAL: &str = "1234";

// ============================================================================
// Keypad Geometry
// ============================================================================

/// Number of driven row lines on the keypad matrix.
pub const KEYPAD_ROWS: usize = 4;

/// Number of sensed column lines on the keypad matrix.
pub const KEYPAD_COLUMNS: usize = 3;

/// Symbol reported for each (row, column) crossing of the keypad matrix.
///
/// ```text
///        col1 col2 col3
/// row0    1    2    3
/// row1    4    5    6
/// row2    7    8    9
/// row3    *    0    #
/// ```
pub const KEYPAD_LAYOUT: [[KeySymbol; KEYPAD_COLUMNS]; KEYPAD_ROWS] = [
    [KeySymbol::Digit(1), KeySymbol::Digit(2), KeySymbol::Digit(3)],
    [KeySymbol::Digit(4), KeySymbol::Digit(5), KeySymbol::Digit(6)],
    [KeySymbol::Digit(7), KeySymbol::Digit(8), KeySymbol::Digit(9)],
    [KeySymbol::Star, KeySymbol::Digit(0), KeySymbol::Hash],
];

/// Glyph written to the display for every accepted keypress.
///
/// Entered symbols are never echoed in clear.
pub const MASK_GLYPH: u8 = b'*';

// ============================================================================
// Timing (milliseconds)
// ============================================================================

/// Settle time after driving a row, sized to the switch bounce time (configurable).
pub const DEFAULT_ROW_SETTLE_MS: u32 = 1;

/// Hold time after a detected keypress before the symbol is reported (configurable).
pub const DEFAULT_DEBOUNCE_HOLD_MS: u32 = 10;

/// Back-off between two empty scans while waiting for a key (configurable).
pub const DEFAULT_IDLE_POLL_MS: u32 = 5;

/// Duration the lock motor is driven to open or close the door (configurable).
pub const DEFAULT_MOTOR_PULSE_MS: u32 = 300;

/// Duration the lockout alarm is held after too many mismatches (configurable).
pub const DEFAULT_LOCKOUT_COOLDOWN_MS: u32 = 1500;

/// Pause after each accepted keypress.
pub const KEYPRESS_PAUSE_MS: u32 = 100;

/// Pause after a credential has been validated.
pub const POST_VALIDATION_PAUSE_MS: u32 = 100;

/// Time the green indicator stays lit after the success tone.
pub const SUCCESS_HOLD_MS: u32 = 200;

/// Time the startup splash is shown before the first prompt.
pub const SPLASH_HOLD_MS: u32 = 100;

// ============================================================================
// Feedback Tones
// ============================================================================

/// Short high-pitch tone acknowledging an accepted keypress.
pub const KEYPRESS_TONE: Tone = Tone::new(500, 5000);

/// Tone played together with the green indicator on access granted.
pub const SUCCESS_TONE: Tone = Tone::new(500, 1000);

/// Tone played together with the red indicator on access denied.
pub const PASSIVE_ALERT_TONE: Tone = Tone::new(200, 500);

// ============================================================================
// Character Display
// ============================================================================

/// Number of text rows on the character display.
pub const DISPLAY_ROWS: u8 = 2;

/// Number of characters per display row.
pub const DISPLAY_COLUMNS: u8 = 16;

/// Clear display and return the cursor home.
pub const LCD_CMD_CLEAR: u8 = 0x01;

/// Function set: 8-bit bus, two lines, 5x8 font.
pub const LCD_CMD_FUNCTION_SET: u8 = 0x38;

/// Display on, cursor off, blink off.
pub const LCD_CMD_DISPLAY_ON: u8 = 0x0C;

/// Entry mode: increment address, no shift.
pub const LCD_CMD_ENTRY_MODE: u8 = 0x06;

/// DDRAM address of the first column of row 0.
pub const LCD_ROW0_ADDRESS: u8 = 0x80;

/// DDRAM address of the first column of row 1.
pub const LCD_ROW1_ADDRESS: u8 = 0xC0;

/// Initialisation sequence issued after power-on, in order.
pub const LCD_INIT_SEQUENCE: [u8; 4] = [
    LCD_CMD_FUNCTION_SET,
    LCD_CMD_DISPLAY_ON,
    LCD_CMD_ENTRY_MODE,
    LCD_CMD_CLEAR,
];

/// Power-on delay before the first display command.
pub const LCD_POWER_ON_DELAY_MS: u32 = 20;

/// Settle time after a clear command.
pub const LCD_CLEAR_SETTLE_MS: u32 = 2;

/// Enable strobe width (high and low phases each).
pub const LCD_STROBE_MS: u32 = 1;
