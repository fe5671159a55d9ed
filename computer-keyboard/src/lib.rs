use hol_core::{Answer, Mode};
use std::{fmt::Display, str::FromStr};

/// The keys that have shortcuts. Keys are typed as a single line of input, either as the character
/// on the key or as the key's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    B,
    D,
    H,
    L,
    N,
    P,
    Q,
    R,
    S,
    U,
    Up,
    Down,
    Right,
    Space,
    Enter,
}

impl Key {
    pub const ALL: [Self; 15] = {
        use Key::*;
        [B, D, H, L, N, P, Q, R, S, U, Up, Down, Right, Space, Enter]
    };

    pub fn name(self) -> &'static str {
        use Key::*;
        match self {
            B => "b",
            D => "d",
            H => "h",
            L => "l",
            N => "n",
            P => "p",
            Q => "q",
            R => "r",
            S => "s",
            U => "u",
            Up => "up",
            Down => "down",
            Right => "right",
            Space => "space",
            Enter => "enter",
        }
    }

    /// The key typed on a line by itself. An empty line is the enter key.
    pub fn from_token(token: &str) -> Option<Self> {
        if token.is_empty() {
            return Some(Self::Enter);
        }
        Self::ALL.into_iter().find(|key| key.name() == token)
    }

    pub fn command(self) -> Command {
        use Key::*;
        match self {
            B => Command::Begin,
            R => Command::Replay,
            U | Up | H => Command::Answer(Answer::Higher),
            D | Down | L => Command::Answer(Answer::Lower),
            S | Right => Command::Answer(Answer::Same),
            N | Space | Enter => Command::Next,
            P => Command::Scorecard,
            Q => Command::Quit,
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Begins a game, or restarts it if one is running
    Begin,
    Replay,
    Answer(Answer),
    Next,
    /// Export the scorecard image
    Scorecard,
    /// Export the record image after a new longest streak
    Record,
    SetMode(Mode),
    Help,
    Quit,
}

impl Command {
    /// Commands that are ignored until a game has begun
    pub fn requires_started(self) -> bool {
        matches!(self, Self::Replay | Self::Answer(_) | Self::Next)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command: {0:?} (type \"help\" for a list of commands)")]
    UnknownCommand(String),
    #[error("{0}")]
    InvalidMode(String),
    #[error("expected a mode after \"mode\" (one of: {})", mode_keys())]
    MissingMode,
}

fn mode_keys() -> String {
    Mode::ALL
        .iter()
        .map(|mode| mode.key())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for Command {
    type Err = ParseError;

    /// Parses a line of input, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim().to_lowercase();
        let mut words = line.split_whitespace();
        let first = words.next().unwrap_or("");
        let command = match first {
            "begin" | "restart" => Self::Begin,
            "replay" => Self::Replay,
            "higher" => Self::Answer(Answer::Higher),
            "lower" => Self::Answer(Answer::Lower),
            "same" => Self::Answer(Answer::Same),
            "next" => Self::Next,
            "scorecard" => Self::Scorecard,
            "record" => Self::Record,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "mode" => {
                let key = words.next().ok_or(ParseError::MissingMode)?;
                let mode = key.parse().map_err(ParseError::InvalidMode)?;
                Self::SetMode(mode)
            }
            other => match Key::from_token(other) {
                Some(key) => key.command(),
                None => {
                    return Err(ParseError::UnknownCommand(
                        s.trim().to_string(),
                    ));
                }
            },
        };
        if let Some(extra) = words.next() {
            return Err(ParseError::UnknownCommand(format!(
                "{} {}",
                first, extra
            )));
        }
        Ok(command)
    }
}

/// Shortcut reference shown by the help command
pub fn help_text() -> String {
    let rows = [
        ("begin / restart", "b, begin, restart"),
        ("replay notes", "r, replay"),
        ("higher", "u, up, h, higher"),
        ("lower", "d, down, l, lower"),
        ("same", "s, right, same"),
        ("next question", "enter, space, n, next"),
        ("download scorecard", "p, scorecard"),
        ("download record", "record"),
        ("change mode", "mode <key>"),
        ("quit", "q, quit"),
    ];
    let mut text = String::new();
    for (action, shortcuts) in rows {
        text.push_str(&format!("  {:<20}{}\n", action, shortcuts));
    }
    text.push_str(&format!("  modes: {}\n", mode_keys()));
    text
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(s: &str) -> Command {
        s.parse().unwrap()
    }

    #[test]
    fn single_key_shortcuts() {
        assert_eq!(parse("b"), Command::Begin);
        assert_eq!(parse("r"), Command::Replay);
        assert_eq!(parse("u"), Command::Answer(Answer::Higher));
        assert_eq!(parse("h"), Command::Answer(Answer::Higher));
        assert_eq!(parse("d"), Command::Answer(Answer::Lower));
        assert_eq!(parse("l"), Command::Answer(Answer::Lower));
        assert_eq!(parse("s"), Command::Answer(Answer::Same));
        assert_eq!(parse("n"), Command::Next);
        assert_eq!(parse("p"), Command::Scorecard);
        assert_eq!(parse("q"), Command::Quit);
    }

    #[test]
    fn named_keys() {
        assert_eq!(parse("up"), Command::Answer(Answer::Higher));
        assert_eq!(parse("down"), Command::Answer(Answer::Lower));
        assert_eq!(parse("right"), Command::Answer(Answer::Same));
        assert_eq!(parse("space"), Command::Next);
        assert_eq!(parse(""), Command::Next);
        assert_eq!(parse("   "), Command::Next);
    }

    #[test]
    fn words_ignore_case_and_whitespace() {
        assert_eq!(parse("  Higher "), Command::Answer(Answer::Higher));
        assert_eq!(parse("RESTART"), Command::Begin);
        assert_eq!(parse("record"), Command::Record);
        assert_eq!(parse("scorecard"), Command::Scorecard);
    }

    #[test]
    fn mode_command() {
        assert_eq!(parse("mode easy-1oct"), Command::SetMode(Mode::Easy1Oct));
        assert_eq!(
            parse("mode EXPERT-4oct"),
            Command::SetMode(Mode::Expert4Oct)
        );
        assert_eq!("mode".parse::<Command>(), Err(ParseError::MissingMode));
        assert!(matches!(
            "mode impossible".parse::<Command>(),
            Err(ParseError::InvalidMode(_))
        ));
    }

    #[test]
    fn unknown_input_is_rejected() {
        assert_eq!(
            "x".parse::<Command>(),
            Err(ParseError::UnknownCommand("x".to_string()))
        );
        assert!("higher please".parse::<Command>().is_err());
    }

    #[test]
    fn only_quiz_controls_wait_for_a_game() {
        assert!(Command::Replay.requires_started());
        assert!(Command::Next.requires_started());
        assert!(Command::Answer(Answer::Same).requires_started());
        assert!(!Command::Begin.requires_started());
        assert!(!Command::SetMode(Mode::Hard3Oct).requires_started());
        assert!(!Command::Quit.requires_started());
    }

    #[test]
    fn every_key_round_trips_through_its_name() {
        for key in Key::ALL {
            assert_eq!(Key::from_token(key.name()), Some(key));
        }
    }
}
