//! Text shown on the 2x16 display at each step of the access flow.

use doorlock_core::DoorState;
use doorlock_core::constants::DISPLAY_COLUMNS;

/// A full-display message.
///
/// # Examples
///
/// ```
/// use doorlock_controller::Screen;
/// use doorlock_core::DoorState;
///
/// let [top, bottom] = Screen::Granted { door: DoorState::Closed }.lines();
/// assert_eq!(top, " ACCESS GRANTED ");
/// assert_eq!(bottom, "  DOOR OPENING  ");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Shown once at startup.
    Splash,
    /// Entry prompt; masked keypresses follow on the second row.
    Prompt,
    /// Code accepted. `door` is the state before the door moves.
    Granted { door: DoorState },
    Denied,
    Lockout,
}

impl Screen {
    /// Text of both rows, left-aligned and padded to the display width.
    #[must_use]
    pub fn lines(self) -> [String; 2] {
        let (top, bottom) = match self {
            Screen::Splash => (" SMART DOOR LOCK", "  SYSTEM READY  "),
            Screen::Prompt => ("ENTER PASSWORD:", ""),
            Screen::Granted {
                door: DoorState::Closed,
            } => (" ACCESS GRANTED ", "  DOOR OPENING  "),
            Screen::Granted {
                door: DoorState::Open,
            } => (" ACCESS GRANTED ", "  DOOR CLOSING  "),
            Screen::Denied => (" ACCESS DENIED ", "WRONG PASSWORD"),
            Screen::Lockout => ("TOO MANY TRIES ", "PLEASE WAIT ..."),
        };
        [fit_line(top), fit_line(bottom)]
    }

    /// Where the cursor is left after the screen is drawn, if it matters.
    #[must_use]
    pub fn cursor(self) -> Option<(u8, u8)> {
        match self {
            Screen::Prompt => Some((1, 0)),
            _ => None,
        }
    }
}

/// Truncate or pad `text` with spaces to exactly one display row.
///
/// ```
/// use doorlock_controller::screens::fit_line;
///
/// assert_eq!(fit_line("HI"), "HI              ");
/// assert_eq!(fit_line("ABCDEFGHIJKLMNOPQRST"), "ABCDEFGHIJKLMNOP");
/// ```
#[must_use]
pub fn fit_line(text: &str) -> String {
    let width = usize::from(DISPLAY_COLUMNS);
    let mut line: String = text.chars().take(width).collect();
    let padding = width - line.chars().count();
    line.push_str(&" ".repeat(padding));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Screen::Splash)]
    #[case(Screen::Prompt)]
    #[case(Screen::Granted { door: DoorState::Closed })]
    #[case(Screen::Granted { door: DoorState::Open })]
    #[case(Screen::Denied)]
    #[case(Screen::Lockout)]
    fn test_lines_fill_display_width(#[case] screen: Screen) {
        for line in screen.lines() {
            assert_eq!(line.chars().count(), usize::from(DISPLAY_COLUMNS));
            assert!(line.is_ascii());
        }
    }

    #[rstest]
    #[case(DoorState::Closed, "DOOR OPENING")]
    #[case(DoorState::Open, "DOOR CLOSING")]
    fn test_granted_names_door_movement(#[case] door: DoorState, #[case] expected: &str) {
        let [_, bottom] = Screen::Granted { door }.lines();
        assert_eq!(bottom.trim(), expected);
    }

    #[test]
    fn test_only_prompt_positions_cursor() {
        assert_eq!(Screen::Prompt.cursor(), Some((1, 0)));
        assert_eq!(Screen::Denied.cursor(), None);
    }
}
