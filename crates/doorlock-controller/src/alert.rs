//! User feedback sequences.

use std::fmt;

use doorlock_core::Tone;
use doorlock_core::constants::{KEYPRESS_TONE, PASSIVE_ALERT_TONE, SUCCESS_TONE};

use crate::actuators::Led;

/// Feedback the controller gives through the LEDs and the buzzer.
///
/// # Examples
///
/// ```
/// use doorlock_controller::{Alert, Led};
///
/// assert_eq!(Alert::Success.indicator(), Some(Led::Green));
/// assert_eq!(Alert::Keypress.indicator(), None);
/// assert!(Alert::Lockout.tone().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alert {
    /// Wrong code: red LED with a short low tone. Never re-entered while
    /// already running.
    Passive,
    /// Correct code: green LED with a mid tone, held briefly.
    Success,
    /// Accepted keypress: short high tone.
    Keypress,
    /// Too many wrong codes: red LED and buzzer line held on until released.
    Lockout,
}

impl Alert {
    /// Tone played by the alert. The lockout alarm holds the buzzer line
    /// instead of playing a tone.
    #[must_use]
    pub fn tone(self) -> Option<Tone> {
        match self {
            Alert::Passive => Some(PASSIVE_ALERT_TONE),
            Alert::Success => Some(SUCCESS_TONE),
            Alert::Keypress => Some(KEYPRESS_TONE),
            Alert::Lockout => None,
        }
    }

    /// LED lit while the alert runs.
    #[must_use]
    pub fn indicator(self) -> Option<Led> {
        match self {
            Alert::Passive | Alert::Lockout => Some(Led::Red),
            Alert::Success => Some(Led::Green),
            Alert::Keypress => None,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Alert::Passive => "passive",
            Alert::Success => "success",
            Alert::Keypress => "keypress",
            Alert::Lockout => "lockout",
        };
        write!(f, "{name}")
    }
}
