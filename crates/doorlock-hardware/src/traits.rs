//! Hardware collaborator trait definitions.
//!
//! These traits establish the contract between the access-control core and
//! the board: a digital I/O port, a blocking delay and a character display.
//! The core is generic over them, so the same controller runs on a real
//! board, in the host emulator and in tests against the simulated port.
//!
//! All operations are blocking. The controller is a single polling loop and
//! nothing else can make progress while it waits.

use crate::error::Result;
use crate::types::{Direction, PinMask};

/// Digital I/O port with per-pin direction, set, clear and read.
///
/// Masks select the pins an operation applies to; pins outside the mask are
/// left untouched.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::traits::DigitalPort;
/// use doorlock_hardware::types::{Direction, Pin};
/// use doorlock_hardware::error::Result;
///
/// fn blink<P: DigitalPort>(port: &mut P, led: Pin) -> Result<()> {
///     port.set_direction(led.mask(), Direction::Output)?;
///     port.set(led.mask())?;
///     port.clear(led.mask())
/// }
/// ```
pub trait DigitalPort {
    /// Configure the selected pins as inputs or outputs.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be configured.
    fn set_direction(&mut self, mask: PinMask, direction: Direction) -> Result<()>;

    /// Drive the selected pins high.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be written.
    fn set(&mut self, mask: PinMask) -> Result<()>;

    /// Drive the selected pins low.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be written.
    fn clear(&mut self, mask: PinMask) -> Result<()>;

    /// Read the level of the selected pins.
    ///
    /// The returned mask has a bit set for every selected pin that reads
    /// high; bits outside `mask` are always zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be read or its input source is gone.
    fn read(&mut self, mask: PinMask) -> Result<PinMask>;

    /// Drive the selected pins to the levels given in `value`.
    ///
    /// Pins are cleared before they are set, so a pin never goes high ahead
    /// of another pin of the same mask being released.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be written.
    fn write(&mut self, mask: PinMask, value: PinMask) -> Result<()> {
        let low = mask & !value;
        let high = mask & value;
        if !low.is_empty() {
            self.clear(low)?;
        }
        if !high.is_empty() {
            self.set(high)?;
        }
        Ok(())
    }
}

/// Blocking delay.
///
/// Implementations block the caller for at least the requested time; no
/// drift guarantee is made.
pub trait Delay {
    /// Block for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Block for `us` microseconds.
    fn delay_us(&mut self, us: u32);
}

/// Alphanumeric character display with a row/column text model.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::traits::CharacterDisplay;
/// use doorlock_hardware::error::Result;
///
/// fn show<D: CharacterDisplay>(display: &mut D, top: &str, bottom: &str) -> Result<()> {
///     display.clear()?;
///     display.set_cursor(0, 0)?;
///     display.write_string(top)?;
///     display.set_cursor(1, 0)?;
///     display.write_string(bottom)
/// }
/// ```
pub trait CharacterDisplay {
    /// Run the power-on initialisation sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the display does not accept the sequence.
    fn init(&mut self) -> Result<()>;

    /// Blank the display and return the cursor home.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be sent.
    fn clear(&mut self) -> Result<()>;

    /// Move the cursor to `row`, `column` (both 0-based).
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InvalidCursor` for positions outside the display.
    fn set_cursor(&mut self, row: u8, column: u8) -> Result<()>;

    /// Write one character at the cursor and advance it.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be sent.
    fn write_char(&mut self, byte: u8) -> Result<()>;

    /// Write an ASCII string starting at the cursor.
    ///
    /// Non-ASCII characters are replaced with `?`.
    ///
    /// # Errors
    ///
    /// Returns an error if any character cannot be sent.
    fn write_string(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            let byte = if c.is_ascii() { c as u8 } else { b'?' };
            self.write_char(byte)?;
        }
        Ok(())
    }
}
