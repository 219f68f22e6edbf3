//! Parallel character LCD driver (HD44780 command set, 8-bit bus).
//!
//! Every byte is placed on the data bus with RS selecting command (low) or
//! character data (high), then latched with an enable strobe.

use doorlock_core::constants::{
    DISPLAY_COLUMNS, DISPLAY_ROWS, LCD_CLEAR_SETTLE_MS, LCD_CMD_CLEAR, LCD_INIT_SEQUENCE,
    LCD_POWER_ON_DELAY_MS, LCD_ROW0_ADDRESS, LCD_ROW1_ADDRESS, LCD_STROBE_MS,
};
use tracing::debug;

use crate::error::{HardwareError, Result};
use crate::traits::{CharacterDisplay, Delay, DigitalPort};
use crate::types::{Direction, LcdPins, PinMask};

/// 2x16 character display driven over a digital port.
#[derive(Debug, Clone)]
pub struct ParallelLcd<P, D> {
    port: P,
    delay: D,
    pins: LcdPins,
}

impl<P: DigitalPort, D: Delay> ParallelLcd<P, D> {
    pub fn new(port: P, delay: D, pins: LcdPins) -> Self {
        Self { port, delay, pins }
    }

    /// Send an instruction byte.
    ///
    /// # Errors
    /// Returns an error if the port rejects the write.
    pub fn command(&mut self, command: u8) -> Result<()> {
        self.send(command, false)
    }

    fn send(&mut self, byte: u8, is_data: bool) -> Result<()> {
        let rs = self.pins.rs.mask();
        if is_data {
            self.port.set(rs)?;
        } else {
            self.port.clear(rs)?;
        }

        let bus = PinMask::from_bits(u64::from(byte) << self.pins.data_shift());
        self.port.write(self.pins.data_mask(), bus)?;

        let en = self.pins.en.mask();
        self.port.set(en)?;
        self.delay.delay_ms(LCD_STROBE_MS);
        self.port.clear(en)?;
        self.delay.delay_ms(LCD_STROBE_MS);
        Ok(())
    }
}

impl<P: DigitalPort, D: Delay> CharacterDisplay for ParallelLcd<P, D> {
    fn init(&mut self) -> Result<()> {
        self.port.set_direction(self.pins.all(), Direction::Output)?;
        self.port.clear(self.pins.en.mask())?;
        self.delay.delay_ms(LCD_POWER_ON_DELAY_MS);

        for command in LCD_INIT_SEQUENCE {
            self.command(command)?;
        }
        self.delay.delay_ms(LCD_CLEAR_SETTLE_MS);
        debug!("Character display initialised");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.command(LCD_CMD_CLEAR)?;
        self.delay.delay_ms(LCD_CLEAR_SETTLE_MS);
        Ok(())
    }

    fn set_cursor(&mut self, row: u8, column: u8) -> Result<()> {
        if row >= DISPLAY_ROWS || column >= DISPLAY_COLUMNS {
            return Err(HardwareError::InvalidCursor {
                row,
                column,
                rows: DISPLAY_ROWS,
                columns: DISPLAY_COLUMNS,
            });
        }
        let base = if row == 0 {
            LCD_ROW0_ADDRESS
        } else {
            LCD_ROW1_ADDRESS
        };
        self.command(base + column)
    }

    fn write_char(&mut self, byte: u8) -> Result<()> {
        self.send(byte, true)
    }
}
