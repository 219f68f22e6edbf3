//! Controller configuration.
//!
//! Every field has a default taken from the reference board, so a JSON file
//! only needs to name the values it overrides:
//!
//! ```
//! use doorlock_controller::ControllerConfig;
//!
//! let config = ControllerConfig::from_json_str(r#"{
//!     "credential": "2580",
//!     "timing": { "lockout_cooldown_ms": 3000 }
//! }"#).unwrap();
//!
//! assert_eq!(config.max_wrong_attempts, 3);
//! assert_eq!(config.timing.lockout_cooldown_ms, 3000);
//! assert_eq!(config.timing.motor_pulse_ms, 300);
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use doorlock_core::constants::{
    DEFAULT_CREDENTIAL, DEFAULT_DEBOUNCE_HOLD_MS, DEFAULT_IDLE_POLL_MS,
    DEFAULT_LOCKOUT_COOLDOWN_MS, DEFAULT_MOTOR_PULSE_MS, DEFAULT_ROW_SETTLE_MS,
    MAX_WRONG_ATTEMPTS,
};
use doorlock_core::{Credential, Error, Result};
use doorlock_hardware::PinMap;
use serde::{Deserialize, Serialize};

/// Delays used by the scanner, the motor and the lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub row_settle_ms: u32,
    pub debounce_hold_ms: u32,
    pub idle_poll_ms: u32,
    pub motor_pulse_ms: u32,
    pub lockout_cooldown_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            row_settle_ms: DEFAULT_ROW_SETTLE_MS,
            debounce_hold_ms: DEFAULT_DEBOUNCE_HOLD_MS,
            idle_poll_ms: DEFAULT_IDLE_POLL_MS,
            motor_pulse_ms: DEFAULT_MOTOR_PULSE_MS,
            lockout_cooldown_ms: DEFAULT_LOCKOUT_COOLDOWN_MS,
        }
    }
}

/// Complete controller configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// The access code, as typed on the keypad.
    pub credential: String,
    /// Consecutive mismatches tolerated before a lockout.
    pub max_wrong_attempts: u8,
    pub timing: TimingConfig,
    pub pins: PinMap,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            credential: DEFAULT_CREDENTIAL.to_string(),
            max_wrong_attempts: MAX_WRONG_ATTEMPTS,
            timing: TimingConfig::default(),
            pins: PinMap::default(),
        }
    }
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("credential", &"<redacted>")
            .field("max_wrong_attempts", &self.max_wrong_attempts)
            .field("timing", &self.timing)
            .field("pins", &self.pins)
            .finish()
    }
}

impl ControllerConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` if the JSON is malformed or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Malformed configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, `Error::Config` otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the configuration for values the controller cannot run with.
    ///
    /// # Errors
    /// Returns `Error::Config` naming the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.credential()?;

        if self.max_wrong_attempts == 0 {
            return Err(Error::Config(
                "max_wrong_attempts must be at least 1".to_string(),
            ));
        }

        self.pins
            .validate()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// The configured access code.
    ///
    /// # Errors
    /// Returns `Error::Config` if the code is not a valid credential.
    pub fn credential(&self) -> Result<Credential> {
        Credential::new(&self.credential).map_err(|e| Error::Config(e.to_string()))
    }
}
