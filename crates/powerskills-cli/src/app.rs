//! The terminal player: turns typed lines into sequencer calls and renders
//! what changed.

use std::sync::Arc;

use powerskills_content::LoadedJourney;
use powerskills_core::clock::{Clock, SystemClock};
use powerskills_core::error::DomainError;
use powerskills_core::journal::InMemoryJournal;
use powerskills_minigame::application::mounted::GameServices;
use powerskills_minigame::domain::input::PlayerInput;
use powerskills_minigame::domain::win_condition::Judgement;
use powerskills_narration::{NarrationArbitrator, NarratorState};
use powerskills_scenes::application::sequencer::SceneSequencer;
use powerskills_scenes::domain::session::SessionState;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::input::{CliCommand, HELP, ParseError};
use crate::render::render;
use crate::terminal::{Gesture, TerminalMediaPlayer, TerminalSpeechBackend, Transcript};

/// What to do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this and read the next line.
    Output(String),
    /// Leave.
    Quit,
}

/// A journey being played in the terminal.
#[derive(Debug)]
pub struct App {
    sequencer: SceneSequencer,
    transcript: Transcript,
    gesture: Gesture,
    last_render: Option<String>,
}

impl App {
    /// Creates a player on the system clock.
    #[must_use]
    pub fn new(loaded: LoadedJourney, config: &Config) -> Self {
        Self::with_clock(loaded, config, Arc::new(SystemClock))
    }

    /// Creates a player on `clock`.
    #[must_use]
    pub fn with_clock(loaded: LoadedJourney, config: &Config, clock: Arc<dyn Clock>) -> Self {
        let transcript = Transcript::default();
        let gesture = Gesture::new(config.autoplay);
        let services = GameServices {
            arbitrator: NarrationArbitrator::new(),
            speech: Arc::new(TerminalSpeechBackend::new(
                transcript.clone(),
                gesture.clone(),
            )),
            clock,
            journal: Arc::new(InMemoryJournal::new()),
        };
        let media = Arc::new(TerminalMediaPlayer::new(transcript.clone(), gesture.clone()));
        let sequencer = SceneSequencer::new(loaded, SessionState::default(), services, media);
        Self {
            sequencer,
            transcript,
            gesture,
            last_render: None,
        }
    }

    /// The sequencer being driven.
    #[must_use]
    pub fn sequencer(&self) -> &SceneSequencer {
        &self.sequencer
    }

    /// Enters the first scene and returns the opening screen.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Domain` if the journey cannot start.
    pub async fn start(&mut self) -> Result<String, AppError> {
        let correlation_id = Uuid::new_v4();
        info!(
            %correlation_id,
            journey_id = %self.sequencer.journey_id(),
            digest = %self.sequencer.digest(),
            "starting journey"
        );
        self.sequencer.start(correlation_id).await?;
        Ok(self.screen(Vec::new()))
    }

    /// Handles one typed line.
    ///
    /// Refused player actions are reported in the output, not returned.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Domain` for infrastructure failures and
    /// `AppError::Json` if the JSON view cannot be produced.
    pub async fn handle_line(&mut self, line: &str) -> Result<Reply, AppError> {
        let command = match line.parse::<CliCommand>() {
            Ok(command) => command,
            Err(ParseError::Empty) => return Ok(Reply::Output(String::new())),
            Err(e) => return Ok(Reply::Output(format!("⚠ {e}. Escribe `help`."))),
        };

        match command {
            CliCommand::Quit => return Ok(Reply::Quit),
            CliCommand::Help => return Ok(Reply::Output(HELP.to_owned())),
            CliCommand::Status => {
                let text = render(&self.sequencer.view());
                self.last_render = Some(text.clone());
                return Ok(Reply::Output(text));
            }
            CliCommand::Json => {
                return Ok(Reply::Output(serde_json::to_string_pretty(
                    &self.sequencer.view(),
                )?));
            }
            _ => {}
        }

        let correlation_id = Uuid::new_v4();
        let note = match self.dispatch(&command, correlation_id).await {
            Ok(note) => note,
            Err(e @ DomainError::Infrastructure(_)) => return Err(e.into()),
            Err(e) => {
                warn!(%correlation_id, error = %e, "player action refused");
                Some(format!("⚠ {e}"))
            }
        };
        Ok(Reply::Output(self.screen(note.into_iter().collect())))
    }

    /// Fires due timers. Returns output only when the screen changed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Domain` if a timer action fails.
    pub async fn tick(&mut self) -> Result<Option<String>, AppError> {
        self.sequencer.tick(Uuid::new_v4()).await?;
        let played = self.drain_playback();
        let text = render(&self.sequencer.view());
        if played.is_empty() && self.last_render.as_deref() == Some(text.as_str()) {
            return Ok(None);
        }
        let mut lines = played;
        lines.push(text.clone());
        self.last_render = Some(text);
        Ok(Some(lines.join("\n")))
    }

    #[instrument(skip_all, fields(correlation_id = %correlation_id))]
    async fn dispatch(
        &mut self,
        command: &CliCommand,
        correlation_id: Uuid,
    ) -> Result<Option<String>, DomainError> {
        debug!(?command, "dispatching");
        let note = match command {
            CliCommand::Ok => {
                let pressed = self.sequencer.press_primary(correlation_id).await?;
                (!pressed).then(|| "· no hay ningún diálogo abierto".to_owned())
            }
            CliCommand::Skip => {
                let skipped = self.sequencer.skip_intro(correlation_id)?;
                (!skipped).then(|| "· no hay ningún video".to_owned())
            }
            CliCommand::Ended => {
                let ended = self.sequencer.media_ended(correlation_id)?;
                (!ended).then(|| "· no hay ningún video en curso".to_owned())
            }
            CliCommand::Play => {
                self.gesture.unlock();
                let resumed = self.sequencer.retry_media(correlation_id).await?
                    || self.sequencer.replay_narration() == Some(NarratorState::Playing);
                (!resumed).then(|| "· nada que reproducir".to_owned())
            }
            CliCommand::Pick(_) | CliCommand::Release(_) | CliCommand::Drop { .. } => {
                let mut judgement = None;
                for mut event in command.pointer_events() {
                    if let Some(j) = self.sequencer.pointer(&mut event, correlation_id)? {
                        judgement = Some(j);
                    }
                }
                judgement_note(judgement.as_ref())
            }
            CliCommand::Confirm => {
                let judgement = self
                    .sequencer
                    .submit_input(PlayerInput::Confirm, correlation_id)?;
                judgement_note(judgement.as_ref())
            }
            CliCommand::Name(name) => {
                self.sequencer.set_player_name(name.clone());
                Some(format!("· ¡Hola, {name}!"))
            }
            CliCommand::Restart => {
                self.sequencer.restart(correlation_id).await?;
                None
            }
            CliCommand::More => {
                let url = self.sequencer.open_external_link(correlation_id)?;
                Some(format!("🔗 {url}"))
            }
            CliCommand::Status | CliCommand::Json | CliCommand::Help | CliCommand::Quit => None,
        };
        Ok(note)
    }

    /// Takes what was printed and tells the sequencer which narrations ran
    /// to their end.
    fn drain_playback(&mut self) -> Vec<String> {
        for owner in self.transcript.take_finished() {
            if !self.sequencer.narration_ended(owner) {
                debug!(%owner, "ended narration no longer mounted");
            }
        }
        self.transcript.drain()
    }

    fn screen(&mut self, notes: Vec<String>) -> String {
        let mut lines = self.drain_playback();
        let text = render(&self.sequencer.view());
        lines.extend(notes);
        lines.push(text.clone());
        self.last_render = Some(text);
        lines.join("\n")
    }
}

fn judgement_note(judgement: Option<&Judgement>) -> Option<String> {
    match judgement {
        None => Some("· nada que hacer ahora".to_owned()),
        Some(Judgement::Ignored) => Some("· sin cambios".to_owned()),
        Some(Judgement::Accepted | Judgement::Rejected(_) | Judgement::Completed) => None,
    }
}
