//! Typed player commands.
//!
//! Pointer gestures on the 3D surface are typed as `pick`, `release` and
//! `drop`, and are replayed as pointer-event sequences so they reach the
//! game exactly as a click or drag would.

use std::str::FromStr;

use powerskills_minigame::domain::input::{OptionId, Point3};
use powerskills_minigame::domain::pointer::{PointerEvent, PointerPhase, PointerTarget};
use thiserror::Error;

/// Help text listing every command.
pub const HELP: &str = "\
Comandos:
  ok                 acción principal del diálogo abierto
  skip               saltar el video
  ended              el video terminó
  play               reproducir manualmente (video o narración)
  pick <id>          elegir / visitar una opción
  confirm            confirmar la elección
  release <x>        soltar el deslizador en x
  drop <id> <x> <z>  arrastrar un objeto hasta (x, z)
  name <texto>       tu nombre
  restart            reiniciar el viaje (créditos)
  more               abrir el enlace (créditos)
  status             mostrar la pantalla
  json               la pantalla en JSON
  help               esta ayuda
  quit               salir";

/// A line the player can type.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Primary action of the open dialog.
    Ok,
    /// Skip the intro video.
    Skip,
    /// The intro video reached its end.
    Ended,
    /// Manual play gesture.
    Play,
    /// Click an option.
    Pick(OptionId),
    /// Confirm a free choice.
    Confirm,
    /// Drag the slider knob and let go at `x`.
    Release(f64),
    /// Drag an item and drop it at `(x, z)`.
    Drop {
        /// The item.
        item: OptionId,
        /// Drop x.
        x: f64,
        /// Drop z.
        z: f64,
    },
    /// Set the player name.
    Name(String),
    /// Restart from the credits.
    Restart,
    /// Follow the credits link.
    More,
    /// Render the screen.
    Status,
    /// Render the screen as JSON.
    Json,
    /// Show the command list.
    Help,
    /// Leave.
    Quit,
}

/// Why a line is not a command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line.
    #[error("empty command")]
    Empty,
    /// The verb is unknown.
    #[error("unknown command `{0}`")]
    Unknown(String),
    /// The verb's arguments are missing or malformed.
    #[error("usage: {0}")]
    Usage(&'static str),
}

fn coordinate(word: Option<&str>, usage: &'static str) -> Result<f64, ParseError> {
    word.and_then(|w| w.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or(ParseError::Usage(usage))
}

impl FromStr for CliCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        let command = match verb.to_lowercase().as_str() {
            "" => return Err(ParseError::Empty),
            "ok" => Self::Ok,
            "skip" => Self::Skip,
            "ended" => Self::Ended,
            "play" => Self::Play,
            "confirm" => Self::Confirm,
            "restart" => Self::Restart,
            "more" => Self::More,
            "status" => Self::Status,
            "json" => Self::Json,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "pick" => {
                let id = args.next().ok_or(ParseError::Usage("pick <id>"))?;
                Self::Pick(OptionId::new(id))
            }
            "release" => Self::Release(coordinate(args.next(), "release <x>")?),
            "drop" => {
                const USAGE: &str = "drop <id> <x> <z>";
                let item = args.next().ok_or(ParseError::Usage(USAGE))?;
                let x = coordinate(args.next(), USAGE)?;
                let z = coordinate(args.next(), USAGE)?;
                Self::Drop {
                    item: OptionId::new(item),
                    x,
                    z,
                }
            }
            "name" => {
                if rest.is_empty() {
                    return Err(ParseError::Usage("name <texto>"));
                }
                Self::Name(rest.to_owned())
            }
            other => return Err(ParseError::Unknown(other.to_owned())),
        };
        Ok(command)
    }
}

impl CliCommand {
    /// The pointer events a gesture command stands for. Empty for commands
    /// that are not gestures.
    #[must_use]
    pub fn pointer_events(&self) -> Vec<PointerEvent> {
        match self {
            Self::Pick(id) => vec![PointerEvent::new(
                PointerPhase::Down,
                PointerTarget::Item(id.clone()),
                Point3::default(),
            )],
            Self::Release(x) => {
                let at = Point3::new(*x, 0.0, 0.0);
                vec![
                    PointerEvent::new(PointerPhase::Down, PointerTarget::Knob, at),
                    PointerEvent::new(PointerPhase::Move, PointerTarget::Rail, at),
                    PointerEvent::new(PointerPhase::Up, PointerTarget::Rail, at),
                ]
            }
            Self::Drop { item, x, z } => {
                let at = Point3::new(*x, 0.0, *z);
                vec![
                    PointerEvent::new(PointerPhase::Down, PointerTarget::Item(item.clone()), at),
                    PointerEvent::new(PointerPhase::Move, PointerTarget::Background, at),
                    PointerEvent::new(PointerPhase::Up, PointerTarget::Background, at),
                ]
            }
            _ => Vec::new(),
        }
    }
}
