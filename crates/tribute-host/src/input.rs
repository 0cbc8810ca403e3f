//! Line commands read from stdin.
//!
//! Each line is one command. Coordinates are viewport pixels; the host
//! reports events with the target at the origin.

use tribute_types::{InteractionEvent, Point};

/// Errors produced while parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The first word is not a known command.
    #[error("unknown command `{word}` (try tap, touch, music, status, json, quit)")]
    Unknown {
        /// The unrecognized word.
        word: String,
    },

    /// A command that needs coordinates got none, or an odd count.
    #[error("`{command}` needs x y coordinate pairs")]
    Coordinates {
        /// The command that was given.
        command: String,
    },

    /// A coordinate is not a finite number.
    #[error("`{value}` is not a finite number")]
    Number {
        /// The offending token.
        value: String,
    },

    /// Extra words after a command that takes none.
    #[error("`{command}` takes no arguments")]
    Arguments {
        /// The command that was given.
        command: String,
    },
}

/// One parsed stdin command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A pointer press at a position.
    Tap(Point),
    /// A touch with one or more contact points.
    Touch(Vec<Point>),
    /// Toggle the background music.
    Music,
    /// Print the rendered page.
    Status,
    /// Print the current snapshot as JSON.
    Json,
    /// Tear the view down and exit.
    Quit,
}

impl Command {
    /// The interaction event this command feeds to the view, if any.
    pub fn interaction(&self) -> Option<InteractionEvent> {
        match self {
            Self::Tap(point) => Some(InteractionEvent::Pointer {
                client: *point,
                target_origin: Point::ORIGIN,
            }),
            Self::Touch(points) => Some(InteractionEvent::Touch {
                touches: points.clone(),
                target_origin: Point::ORIGIN,
            }),
            Self::Music | Self::Status | Self::Json | Self::Quit => None,
        }
    }
}

/// Parse one non-empty, trimmed command line.
pub fn parse_command(line: &str) -> Result<Command, InputError> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    match command.as_str() {
        "tap" => {
            let points = parse_points(&command, &args)?;
            match points.as_slice() {
                [point] => Ok(Command::Tap(*point)),
                _ => Err(InputError::Coordinates { command }),
            }
        }
        "touch" => parse_points(&command, &args).map(Command::Touch),
        "music" | "status" | "json" | "quit" if !args.is_empty() => {
            Err(InputError::Arguments { command })
        }
        "music" => Ok(Command::Music),
        "status" => Ok(Command::Status),
        "json" => Ok(Command::Json),
        "quit" => Ok(Command::Quit),
        _ => Err(InputError::Unknown { word: command }),
    }
}

fn parse_points(command: &str, args: &[&str]) -> Result<Vec<Point>, InputError> {
    if args.is_empty() || !args.chunks_exact(2).remainder().is_empty() {
        return Err(InputError::Coordinates {
            command: command.to_owned(),
        });
    }
    args.chunks_exact(2)
        .map(|pair| match pair {
            [x, y] => Ok(Point::new(parse_number(x)?, parse_number(y)?)),
            _ => Err(InputError::Coordinates {
                command: command.to_owned(),
            }),
        })
        .collect()
}

fn parse_number(token: &str) -> Result<f64, InputError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InputError::Number {
            value: token.to_owned(),
        })
}
