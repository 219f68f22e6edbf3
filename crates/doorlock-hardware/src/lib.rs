//! Board abstraction layer for the keypad door lock controller.
//!
//! This crate describes the board the controller runs on: a bank of digital
//! I/O pins, a blocking delay and a 2x16 character display. The controller
//! only talks to these traits, which keeps it independent of the actual
//! microcontroller and lets the same code run against the simulated bank
//! shipped in [`mock`].
//!
//! # Collaborator Traits
//!
//! - [`DigitalPort`]: per-pin direction, set, clear and read on a 64-pin
//!   logical space (port 0 is pins 0-31, port 1 is pins 32-63).
//! - [`Delay`]: blocking millisecond and microsecond waits.
//! - [`CharacterDisplay`]: clear, cursor positioning and text output.
//!
//! [`ParallelLcd`] implements [`CharacterDisplay`] on top of any
//! [`DigitalPort`] using the HD44780 8-bit command set.
//!
//! ```
//! use doorlock_hardware::mock::{SimClock, SimulatedPort};
//! use doorlock_hardware::{CharacterDisplay, ParallelLcd, PinMap};
//!
//! let pins = PinMap::default();
//! let (port, _keypad) = SimulatedPort::new(&pins);
//! let mut lcd = ParallelLcd::new(port.clone(), SimClock::new(), pins.lcd);
//!
//! lcd.init().unwrap();
//! lcd.write_string("READY").unwrap();
//! assert_eq!(port.lcd_lines()[0].trim_end(), "READY");
//! ```
//!
//! # Error Handling
//!
//! Every fallible operation returns [`Result<T>`][error::Result] with a
//! [`HardwareError`]. The controller converts it into its own error type
//! through the provided `From` implementation.
//!
//! # Simulation
//!
//! The [`mock`] module provides a simulated pin bank with an attached keypad
//! matrix and display model, plus a virtual clock, so the full access flow
//! can be exercised on a host without a board.

pub mod delay;
pub mod error;
pub mod lcd;
pub mod mock;
pub mod traits;
pub mod types;

pub use delay::StdDelay;
pub use error::{HardwareError, Result};
pub use lcd::ParallelLcd;
pub use traits::{CharacterDisplay, Delay, DigitalPort};
pub use types::{
    Direction, IndicatorPins, KeypadPins, LcdPins, MotorPins, Pin, PinMap, PinMask,
};
