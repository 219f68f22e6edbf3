//! Simulated hardware for testing and development.
//!
//! This module provides a simulated GPIO bank with a keypad matrix and a
//! character display model attached to it, plus a virtual clock, so the
//! controller can be exercised without a board and without real waiting.

pub mod clock;
pub mod port;

// Re-export commonly used types
pub use clock::SimClock;
pub use port::{KeypadHandle, PinAction, PortOp, SimulatedPort};
