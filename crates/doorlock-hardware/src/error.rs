//! Error types for hardware operations.
//!
//! This module defines error types specific to the I/O collaborators: the
//! digital port, the character display and the simulated keypad feed.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Pin assignment is invalid (overlapping, empty or malformed mask).
    #[error("Invalid pin assignment: {message}")]
    InvalidPin { message: String },

    /// Display cursor position outside the visible area.
    #[error("Cursor position ({row}, {column}) outside {rows}x{columns} display")]
    InvalidCursor {
        row: u8,
        column: u8,
        rows: u8,
        columns: u8,
    },

    /// Invalid data supplied to or received from a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new invalid pin error.
    pub fn invalid_pin(message: impl Into<String>) -> Self {
        Self::InvalidPin {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }
}

impl From<HardwareError> for doorlock_core::Error {
    fn from(error: HardwareError) -> Self {
        match error {
            HardwareError::Io(io) => doorlock_core::Error::Io(io),
            other => doorlock_core::Error::Hardware(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("keypad");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: keypad");
    }

    #[test]
    fn test_invalid_cursor_error() {
        let error = HardwareError::InvalidCursor {
            row: 2,
            column: 0,
            rows: 2,
            columns: 16,
        };
        assert_eq!(
            error.to_string(),
            "Cursor position (2, 0) outside 2x16 display"
        );
    }

    #[test]
    fn test_invalid_pin_error() {
        let error = HardwareError::invalid_pin("buzzer overlaps red LED");
        assert_eq!(
            error.to_string(),
            "Invalid pin assignment: buzzer overlaps red LED"
        );
    }

    #[test]
    fn test_conversion_into_core_error() {
        let error: doorlock_core::Error = HardwareError::communication("bus stuck").into();
        assert!(matches!(error, doorlock_core::Error::Hardware(ref m) if m.contains("bus stuck")));
    }
}
