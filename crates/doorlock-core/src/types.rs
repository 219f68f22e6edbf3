use crate::{
    Result,
    constants::{CREDENTIAL_LENGTH, KEYPAD_LAYOUT},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single decoded keypad symbol.
///
/// The keypad alphabet is `0`-`9`, `*` and `#`. "No key pressed" is not a
/// symbol; scanners report it as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeySymbol {
    /// Numeric digit (0-9).
    Digit(u8),

    /// Star key (*).
    Star,

    /// Hash key (#), used as the cancel key during entry.
    Hash,
}

impl KeySymbol {
    /// Create a digit symbol.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_core::KeySymbol;
    ///
    /// assert_eq!(KeySymbol::digit(5).unwrap().as_char(), '5');
    /// assert!(KeySymbol::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(Error::InvalidDigit(d));
        }
        Ok(Self::Digit(d))
    }

    /// Decode a symbol from its printed character.
    ///
    /// # Errors
    /// Returns `Error::InvalidKeySymbol` for characters outside the keypad alphabet.
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            '0'..='9' => Ok(Self::Digit(c as u8 - b'0')),
            '*' => Ok(Self::Star),
            '#' => Ok(Self::Hash),
            other => Err(Error::InvalidKeySymbol(other)),
        }
    }

    /// Printed character of the symbol.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Digit(d) => {
                debug_assert!(d <= 9, "Digit must be 0-9");
                char::from(b'0' + d)
            }
            Self::Star => '*',
            Self::Hash => '#',
        }
    }

    /// Matrix position `(row, column)` of the symbol on the keypad.
    #[must_use]
    pub fn position(self) -> Option<(usize, usize)> {
        KEYPAD_LAYOUT.iter().enumerate().find_map(|(row, keys)| {
            keys.iter()
                .position(|&key| key == self)
                .map(|column| (row, column))
        })
    }

    /// Returns `true` for the key that clears the current entry.
    #[inline]
    #[must_use]
    pub fn is_cancel(self) -> bool {
        matches!(self, Self::Hash)
    }
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Parse a string of keypad characters into symbols.
///
/// # Errors
/// Returns `Error::InvalidKeySymbol` on the first character outside the alphabet.
pub fn parse_symbols(text: &str) -> Result<Vec<KeySymbol>> {
    text.chars().map(KeySymbol::from_char).collect()
}

/// The fixed code that opens the door.
///
/// A credential holds exactly [`CREDENTIAL_LENGTH`] symbols and never
/// contains the cancel key, which could not be entered. `Debug` output is
/// redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential([KeySymbol; CREDENTIAL_LENGTH]);

impl Credential {
    /// Create a credential from its printed form, e.g. `"1234"`.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredential` if the length is wrong, a character
    /// is outside the keypad alphabet, or the cancel key is used.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorlock_core::Credential;
    ///
    /// assert!(Credential::new("1234").is_ok());
    /// assert!(Credential::new("12").is_err());
    /// assert!(Credential::new("12#4").is_err());
    /// ```
    pub fn new(code: &str) -> Result<Self> {
        let symbols = parse_symbols(code.trim())
            .map_err(|e| Error::InvalidCredential(e.to_string()))?;

        if symbols.iter().any(|s| s.is_cancel()) {
            return Err(Error::InvalidCredential(
                "Credential must not contain the cancel key '#'".to_string(),
            ));
        }

        let len = symbols.len();
        let symbols: [KeySymbol; CREDENTIAL_LENGTH] = symbols.try_into().map_err(|_| {
            Error::InvalidCredential(format!(
                "Credential must be {CREDENTIAL_LENGTH} symbols, got {len}"
            ))
        })?;

        Ok(Credential(symbols))
    }

    /// Compare an entry against the credential.
    ///
    /// Symbols are compared in order and the comparison stops at the first
    /// mismatch. Entries of the wrong length never match.
    #[must_use]
    pub fn matches(&self, entered: &[KeySymbol]) -> bool {
        entered.len() == self.0.len() && self.0.iter().zip(entered).all(|(a, b)| a == b)
    }

    /// Number of symbols in the credential.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Credential {
    fn default() -> Self {
        // Mirrors DEFAULT_CREDENTIAL.
        Credential([
            KeySymbol::Digit(1),
            KeySymbol::Digit(2),
            KeySymbol::Digit(3),
            KeySymbol::Digit(4),
        ])
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}

impl std::str::FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Credential::new(s)
    }
}

/// Symbols entered since the last reset.
///
/// Capacity equals [`CREDENTIAL_LENGTH`]; pushing into a full buffer is an
/// error rather than an overwrite.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnteredBuffer {
    symbols: Vec<KeySymbol>,
}

impl EnteredBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            symbols: Vec::with_capacity(CREDENTIAL_LENGTH),
        }
    }

    /// Append a symbol and return the new fill level.
    ///
    /// # Errors
    /// Returns `Error::BufferFull` if the buffer already holds a full entry.
    pub fn push(&mut self, symbol: KeySymbol) -> Result<usize> {
        if self.is_full() {
            return Err(Error::BufferFull {
                capacity: CREDENTIAL_LENGTH,
            });
        }
        self.symbols.push(symbol);
        Ok(self.symbols.len())
    }

    /// Discard every entered symbol.
    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    /// Current fill level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.symbols.len() >= CREDENTIAL_LENGTH
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        CREDENTIAL_LENGTH
    }

    #[must_use]
    pub fn as_slice(&self) -> &[KeySymbol] {
        &self.symbols
    }
}

impl fmt::Debug for EnteredBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnteredBuffer")
            .field("len", &self.symbols.len())
            .field("capacity", &CREDENTIAL_LENGTH)
            .finish()
    }
}

/// Physical state of the door as last commanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    #[default]
    Closed,
    Open,
}

impl DoorState {
    /// The state the door ends up in after the next actuation.
    #[inline]
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            DoorState::Closed => DoorState::Open,
            DoorState::Open => DoorState::Closed,
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DoorState::Closed => write!(f, "Closed"),
            DoorState::Open => write!(f, "Open"),
        }
    }
}

/// A buzzer tone: how long and at which pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    pub duration_ms: u32,
    pub frequency_hz: u32,
}

impl Tone {
    pub const fn new(duration_ms: u32, frequency_hz: u32) -> Self {
        Self {
            duration_ms,
            frequency_hz,
        }
    }

    /// Half of the square-wave period in microseconds (`500 / f` ms).
    ///
    /// Returns `None` when the frequency is zero or too high for the half
    /// period to be at least one microsecond.
    #[must_use]
    pub fn half_period_us(&self) -> Option<u32> {
        500_000u32
            .checked_div(self.frequency_hz)
            .filter(|&half| half > 0)
    }

    /// Number of full periods that fit in the duration.
    ///
    /// # Errors
    /// Returns `Error::InvalidTone` when no half period can be computed.
    pub fn cycles(&self) -> Result<u64> {
        let half = self.half_period_us().ok_or(Error::InvalidTone {
            frequency_hz: self.frequency_hz,
        })?;
        Ok(u64::from(self.duration_ms) * 1000 / (2 * u64::from(half)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_CREDENTIAL;
    use rstest::rstest;

    #[rstest]
    #[case('0', KeySymbol::Digit(0))]
    #[case('7', KeySymbol::Digit(7))]
    #[case('*', KeySymbol::Star)]
    #[case('#', KeySymbol::Hash)]
    fn test_key_symbol_from_char(#[case] input: char, #[case] expected: KeySymbol) {
        let symbol = KeySymbol::from_char(input).unwrap();
        assert_eq!(symbol, expected);
        assert_eq!(symbol.as_char(), input);
    }

    #[rstest]
    #[case('a')]
    #[case(' ')]
    #[case('A')]
    fn test_key_symbol_invalid(#[case] input: char) {
        assert!(matches!(
            KeySymbol::from_char(input),
            Err(Error::InvalidKeySymbol(c)) if c == input
        ));
    }

    #[rstest]
    #[case(KeySymbol::Digit(1), (0, 0))]
    #[case(KeySymbol::Digit(6), (1, 2))]
    #[case(KeySymbol::Star, (3, 0))]
    #[case(KeySymbol::Digit(0), (3, 1))]
    #[case(KeySymbol::Hash, (3, 2))]
    fn test_key_symbol_position(#[case] symbol: KeySymbol, #[case] expected: (usize, usize)) {
        assert_eq!(symbol.position(), Some(expected));
    }

    #[test]
    fn test_out_of_range_digit_has_no_position() {
        assert_eq!(KeySymbol::Digit(12).position(), None);
    }

    #[test]
    fn test_only_hash_cancels() {
        assert!(KeySymbol::Hash.is_cancel());
        assert!(!KeySymbol::Star.is_cancel());
        assert!(!KeySymbol::Digit(0).is_cancel());
    }

    #[rstest]
    #[case("1234")]
    #[case("0000")]
    #[case("*9*0")]
    #[case(" 4321 ")]
    fn test_credential_valid(#[case] input: &str) {
        assert!(Credential::new(input).is_ok());
    }

    #[rstest]
    #[case("123")] // too short
    #[case("12345")] // too long
    #[case("12a4")] // outside alphabet
    #[case("123#")] // cancel key
    #[case("")]
    fn test_credential_invalid(#[case] input: &str) {
        assert!(matches!(
            Credential::new(input),
            Err(Error::InvalidCredential(_))
        ));
    }

    #[test]
    fn test_credential_default_matches_constant() {
        assert_eq!(
            Credential::default(),
            Credential::new(DEFAULT_CREDENTIAL).unwrap()
        );
    }

    #[test]
    fn test_credential_matches() {
        let credential = Credential::new("1234").unwrap();
        assert!(credential.matches(&parse_symbols("1234").unwrap()));
        assert!(!credential.matches(&parse_symbols("1235").unwrap()));
        assert!(!credential.matches(&parse_symbols("123").unwrap()));
        assert!(!credential.matches(&[]));
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("9876").unwrap();
        let debug = format!("{credential:?}");
        assert!(!debug.contains("9876"));
        assert!(!debug.contains('9'));
    }

    #[test]
    fn test_entered_buffer_fill_and_clear() {
        let mut buffer = EnteredBuffer::new();
        assert!(buffer.is_empty());

        for (i, c) in "1234".chars().enumerate() {
            let fill = buffer.push(KeySymbol::from_char(c).unwrap()).unwrap();
            assert_eq!(fill, i + 1);
        }
        assert!(buffer.is_full());
        assert!(matches!(
            buffer.push(KeySymbol::Digit(5)),
            Err(Error::BufferFull { capacity: 4 })
        ));
        assert_eq!(buffer.len(), 4);

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), CREDENTIAL_LENGTH);
    }

    #[test]
    fn test_entered_buffer_debug_hides_symbols() {
        let mut buffer = EnteredBuffer::new();
        buffer.push(KeySymbol::Digit(8)).unwrap();
        let debug = format!("{buffer:?}");
        assert!(debug.contains("len: 1"));
        assert!(!debug.contains("Digit"));
    }

    #[test]
    fn test_door_state_toggle() {
        assert_eq!(DoorState::default(), DoorState::Closed);
        assert_eq!(DoorState::Closed.toggled(), DoorState::Open);
        assert_eq!(DoorState::Open.toggled(), DoorState::Closed);
    }

    #[test]
    fn test_door_state_serialization() {
        let json = serde_json::to_string(&DoorState::Open).unwrap();
        assert_eq!(json, "\"open\"");
    }

    #[rstest]
    #[case(500, Some(1000))]
    #[case(1000, Some(500))]
    #[case(5000, Some(100))]
    #[case(0, None)]
    #[case(600_000, None)]
    fn test_tone_half_period(#[case] frequency_hz: u32, #[case] expected: Option<u32>) {
        assert_eq!(Tone::new(100, frequency_hz).half_period_us(), expected);
    }

    #[rstest]
    #[case(Tone::new(200, 500), 100)]
    #[case(Tone::new(500, 1000), 500)]
    #[case(Tone::new(500, 5000), 2500)]
    #[case(Tone::new(1, 500), 0)]
    fn test_tone_cycles(#[case] tone: Tone, #[case] expected: u64) {
        assert_eq!(tone.cycles().unwrap(), expected);
    }

    #[test]
    fn test_tone_zero_frequency_rejected() {
        assert!(matches!(
            Tone::new(100, 0).cycles(),
            Err(Error::InvalidTone { frequency_hz: 0 })
        ));
    }
}
