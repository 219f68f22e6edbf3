use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Input errors
    #[error("Invalid key symbol: {0:?}")]
    InvalidKeySymbol(char),

    #[error("Digit must be 0-9, got {0}")]
    InvalidDigit(u8),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Entry buffer full ({capacity} symbols)")]
    BufferFull { capacity: usize },

    // Controller errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid tone: {frequency_hz} Hz cannot be synthesized")]
    InvalidTone { frequency_hz: u32 },

    // Hardware errors
    #[error("Hardware operation failed: {0}")]
    Hardware(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
