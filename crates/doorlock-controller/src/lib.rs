//! Keypad door lock controller.
//!
//! This crate holds the access-control logic of the lock: the debounced
//! keypad scanner, the actuator bank (motor, LEDs, buzzer), the feedback
//! alerts, the display screens, the access state machine and the
//! [`AccessController`] that ties them together in a polling loop.
//!
//! Everything is generic over the collaborator traits of `doorlock-hardware`,
//! so the same controller drives a real board or the simulated port used by
//! the host emulator and the tests.

pub mod actuators;
pub mod alert;
pub mod config;
pub mod controller;
pub mod keypad;
pub mod screens;
pub mod state_machine;

pub use actuators::{ActuatorBank, Led, MotorDirection};
pub use alert::Alert;
pub use config::{ControllerConfig, TimingConfig};
pub use controller::{AccessController, CycleOutcome};
pub use keypad::KeypadScanner;
pub use screens::Screen;
pub use state_machine::{AccessState, StateMachine, StateTransition};
