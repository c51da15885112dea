use std::str::FromStr;

use thiserror::Error;

use crate::models::jog::JogDirection;

/// A button press typed on the console.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    /// Play/pause button.
    Toggle,
    /// "Play this record" button.
    PlayMedium,
    Stop,
    Hold(JogDirection),
    Release,
    Jog(JogDirection),
    /// Move the tone-arm to an absolute angle.
    Angle(f64),
    Home,
    Position,
    Spin { reverse: bool },
    Halt,
    Turntable,
    Status,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Expected a direction (left or right), got: {0:?}")]
    Direction(Option<String>),

    #[error("Expected an angle in degrees, got: {0:?}")]
    Angle(Option<String>),
}

fn direction(arg: Option<&str>) -> Result<JogDirection, ParseCommandError> {
    match arg {
        Some("left" | "l") => Ok(JogDirection::Left),
        Some("right" | "r") => Ok(JogDirection::Right),
        other => Err(ParseCommandError::Direction(other.map(str::to_string))),
    }
}

impl FromStr for ConsoleCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim().to_lowercase();
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(ParseCommandError::Empty);
        };
        let arg = words.next();

        let parsed = match command {
            "toggle" | "t" => ConsoleCommand::Toggle,
            "play" | "p" => ConsoleCommand::PlayMedium,
            "stop" => ConsoleCommand::Stop,
            "hold" => ConsoleCommand::Hold(direction(arg)?),
            "release" => ConsoleCommand::Release,
            "jog" => ConsoleCommand::Jog(direction(arg)?),
            "angle" => {
                let angle = arg
                    .and_then(|a| a.parse::<f64>().ok())
                    .filter(|a| a.is_finite())
                    .ok_or_else(|| ParseCommandError::Angle(arg.map(str::to_string)))?;
                ConsoleCommand::Angle(angle)
            }
            "home" => ConsoleCommand::Home,
            "position" | "pos" => ConsoleCommand::Position,
            "spin" => ConsoleCommand::Spin {
                reverse: matches!(arg, Some("reverse" | "rev")),
            },
            "halt" => ConsoleCommand::Halt,
            "turntable" => ConsoleCommand::Turntable,
            "status" | "s" => ConsoleCommand::Status,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(parsed)
    }
}
