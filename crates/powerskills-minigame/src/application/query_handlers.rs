//! Query handlers for the Mini-Game context.
//!
//! Views are read-only DTOs built either from a mounted game or by replaying
//! the journal.

use std::collections::BTreeMap;

use powerskills_core::aggregate::AggregateRoot;
use powerskills_core::error::DomainError;
use powerskills_core::journal::EventJournal;
use powerskills_narration::{GateContent, NarratorState};
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::application::mounted::{MountedGame, OpenGate};
use crate::domain::aggregates::{MiniGame, MiniGamePhase};
use crate::domain::definition::MiniGameDefinition;
use crate::domain::input::{OptionId, Point3};
use crate::domain::win_condition::{Rejection, WinCondition};

/// A selectable option as the player sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    /// Option identifier.
    pub id: OptionId,
    /// Display label.
    pub label: String,
    /// Whether the option is part of the accumulated progress.
    pub chosen: bool,
}

/// A draggable item as the player sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    /// Item identifier.
    pub id: OptionId,
    /// Display label.
    pub label: String,
    /// Current position.
    pub position: Point3,
    /// Whether the item sits within its hit radius.
    pub placed: bool,
}

/// The dialog currently showing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateView {
    /// Which phase dialog it is.
    pub which: &'static str,
    /// Dialog content (placeholders already filled).
    pub content: GateContent,
    /// State of the dialog's narration.
    pub narration: NarratorState,
}

/// Read-only view of a mini-game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiniGameView {
    /// The aggregate identifier.
    pub game_id: Uuid,
    /// Definition key.
    pub key: String,
    /// Title.
    pub title: String,
    /// Win-condition strategy name.
    pub strategy: &'static str,
    /// Current phase.
    pub phase: MiniGamePhase,
    /// Selectable options.
    pub options: Vec<OptionView>,
    /// Draggable items.
    pub items: Vec<ItemView>,
    /// Chosen ids in choice order.
    pub chosen: Vec<OptionId>,
    /// Last released slider value.
    pub value: Option<f64>,
    /// Prompt of the current round.
    pub prompt: Option<String>,
    /// Score so far, for round games.
    pub score: Option<usize>,
    /// The rejection being reported.
    pub rejection: Option<Rejection>,
    /// The open dialog.
    pub gate: Option<GateView>,
    /// Current version (event count).
    pub version: i64,
}

fn build_view(definition: &MiniGameDefinition, game: &MiniGame, gate: Option<GateView>) -> MiniGameView {
    let progress = game.progress();
    let options = game
        .condition()
        .options()
        .iter()
        .map(|o| OptionView {
            id: o.id.clone(),
            label: o.label.clone(),
            chosen: progress.chosen().contains(&o.id),
        })
        .collect();

    let positions: &BTreeMap<OptionId, Point3> = progress.positions();
    let items = match game.condition() {
        WinCondition::DragToTarget { items } => items
            .iter()
            .map(|item| {
                let position = positions.get(&item.id).copied().unwrap_or(item.origin);
                ItemView {
                    id: item.id.clone(),
                    label: item.label.clone(),
                    position,
                    placed: position.distance(&item.target) < item.hit_radius,
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    let (prompt, score) = match game.condition() {
        WinCondition::ScoredRounds { rounds, .. } => (
            rounds.get(progress.round()).map(|r| r.prompt.clone()),
            Some(progress.score()),
        ),
        _ => (None, None),
    };

    MiniGameView {
        game_id: game.id,
        key: game.key().to_owned(),
        title: definition.title.clone(),
        strategy: game.condition().strategy(),
        phase: game.phase(),
        options,
        items,
        chosen: progress.chosen().to_vec(),
        value: progress.value(),
        prompt,
        score,
        rejection: game.last_rejection().cloned(),
        gate,
        version: game.version(),
    }
}

/// Builds the view of a mounted game.
#[must_use]
pub fn get_mounted_view(mounted: &MountedGame) -> MiniGameView {
    let gate = mounted.open_gate().map(|(which, dialog)| GateView {
        which: match which {
            OpenGate::Help => "help",
            OpenGate::Error => "error",
            OpenGate::Success => "success",
        },
        content: dialog.content().clone(),
        narration: dialog.narration_state(),
    });
    build_view(mounted.definition(), mounted.game(), gate)
}

/// Rebuilds a game's view from the journal.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the journal holds no events for the
/// game, or `DomainError::Infrastructure` if a payload cannot be read.
pub fn get_game_by_id(
    game_id: Uuid,
    definition: &MiniGameDefinition,
    journal: &dyn EventJournal,
) -> Result<MiniGameView, DomainError> {
    let events = journal.events();
    if !events.iter().any(|e| e.aggregate_id == game_id) {
        return Err(DomainError::Validation(format!(
            "no journaled events for mini-game {game_id}"
        )));
    }
    let game = command_handlers::reconstitute(
        game_id,
        &definition.key,
        definition.condition.clone(),
        &events,
    )?;
    Ok(build_view(definition, &game, None))
}
