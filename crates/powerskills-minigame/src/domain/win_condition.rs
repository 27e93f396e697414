//! Win-condition strategies.
//!
//! A `WinCondition` is fixed configuration. `judge` is a pure function of
//! that configuration, the accumulated `Progress` and one input; `absorb`
//! folds a judged input into the progress. The aggregate records the
//! judgement as an event and replays it through `absorb`.

use std::collections::{BTreeMap, HashSet};

use powerskills_core::error::DomainError;
use serde::{Deserialize, Serialize};

use super::input::{OptionId, PlayerInput, Point3};

/// An option in a selection set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOption {
    /// Option identifier.
    pub id: OptionId,
    /// Display label.
    pub label: String,
    /// Whether choosing this option counts towards the win.
    #[serde(default)]
    pub correct: bool,
    /// Short narration played when the option is chosen.
    #[serde(default)]
    pub cue: Option<String>,
    /// Hint shown when the option is rejected.
    #[serde(default)]
    pub hint: Option<String>,
}

/// A draggable item and the pedestal it belongs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragItem {
    /// Item identifier.
    pub id: OptionId,
    /// Display label.
    pub label: String,
    /// Where the item starts and snaps back to.
    pub origin: Point3,
    /// Where the item must be dropped.
    pub target: Point3,
    /// Maximum (exclusive) distance from the target that counts as placed.
    pub hit_radius: f64,
    /// Hint shown when the item misses.
    #[serde(default)]
    pub hint: Option<String>,
}

/// One prompt of a scored-rounds game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Prompt shown to the player.
    pub prompt: String,
    /// The answer option that scores.
    pub answer: OptionId,
}

/// The predicate over accumulated input that ends a mini-game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum WinCondition {
    /// Choose every correct option without ever choosing an incorrect one.
    SetCompletion {
        /// The selection set.
        options: Vec<SelectionOption>,
    },
    /// Choose options in exactly the canonical order.
    ExactSequence {
        /// Clickable options (e.g. words).
        options: Vec<SelectionOption>,
        /// The canonical order.
        answer: Vec<OptionId>,
    },
    /// Release a continuous control within `tolerance` of `target`.
    ToleranceBand {
        /// Center of the accepted band.
        #[serde(default)]
        target: f64,
        /// Half-width of the accepted band (exclusive).
        tolerance: f64,
        /// Half-length of the rail; values are clamped to `[-rail, rail]`.
        rail: f64,
    },
    /// Drop every item within its hit radius of its target.
    DragToTarget {
        /// The draggable items.
        items: Vec<DragItem>,
    },
    /// Visit every option at least once, in any order.
    ExhaustiveVisit {
        /// The options to visit.
        options: Vec<SelectionOption>,
    },
    /// Answer a fixed series of prompts; pass with at least `pass_mark` right.
    ScoredRounds {
        /// The answer options (e.g. classification bins).
        answers: Vec<SelectionOption>,
        /// The prompts, in order.
        rounds: Vec<Round>,
        /// Minimum score that wins.
        pass_mark: usize,
    },
    /// Pick any one option, then confirm.
    FreeChoice {
        /// The options.
        options: Vec<SelectionOption>,
    },
}

/// Why an input sent the game to the error phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// An incorrect option was chosen.
    IncorrectOption {
        /// The option.
        option: OptionId,
        /// Its label.
        label: String,
        /// Its hint.
        hint: Option<String>,
    },
    /// A full-length sequence in the wrong order.
    WrongOrder {
        /// The attempted order.
        attempted: Vec<OptionId>,
    },
    /// A release outside the tolerance band.
    OutOfBand {
        /// The clamped released value.
        value: f64,
    },
    /// A dropped item missed its target and snapped back.
    MissedTarget {
        /// The item.
        item: OptionId,
        /// Its label.
        label: String,
        /// Distance from the target at release.
        distance: f64,
        /// Its hint.
        hint: Option<String>,
    },
    /// All rounds answered but the score is below the pass mark.
    BelowPassMark {
        /// Final score.
        score: usize,
        /// Required score.
        needed: usize,
    },
    /// Confirmation without a selection.
    NothingChosen,
}

impl Rejection {
    /// Values for `{label}`, `{hint}`, `{score}` and `{needed}` placeholders.
    #[must_use]
    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::IncorrectOption { label, hint, .. } | Self::MissedTarget { label, hint, .. } => {
                vec![
                    ("label", label.clone()),
                    ("hint", hint.clone().unwrap_or_default()),
                ]
            }
            Self::BelowPassMark { score, needed } => {
                vec![("score", score.to_string()), ("needed", needed.to_string())]
            }
            Self::WrongOrder { .. } | Self::OutOfBand { .. } | Self::NothingChosen => Vec::new(),
        }
    }
}

/// Outcome of judging one input.
#[derive(Debug, Clone, PartialEq)]
pub enum Judgement {
    /// No state change (duplicate choice).
    Ignored,
    /// Progress recorded; the game continues.
    Accepted,
    /// The input was wrong; the game enters the error phase.
    Rejected(Rejection),
    /// Progress recorded and the win condition now holds.
    Completed,
}

/// Accumulated player input.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Progress {
    chosen: Vec<OptionId>,
    value: Option<f64>,
    positions: BTreeMap<OptionId, Point3>,
    round: usize,
    score: usize,
}

impl Progress {
    /// Initial progress for `condition` (drag items at their origins).
    #[must_use]
    pub fn new(condition: &WinCondition) -> Self {
        let positions = match condition {
            WinCondition::DragToTarget { items } => items
                .iter()
                .map(|item| (item.id.clone(), item.origin))
                .collect(),
            _ => BTreeMap::new(),
        };
        Self {
            positions,
            ..Self::default()
        }
    }

    /// Chosen options in choice order.
    #[must_use]
    pub fn chosen(&self) -> &[OptionId] {
        &self.chosen
    }

    /// Last released slider value.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Current position of each draggable item.
    #[must_use]
    pub fn positions(&self) -> &BTreeMap<OptionId, Point3> {
        &self.positions
    }

    /// Index of the current round.
    #[must_use]
    pub fn round(&self) -> usize {
        self.round
    }

    /// Rounds answered correctly so far.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// Folds a judged input into the progress.
    pub fn absorb(&mut self, condition: &WinCondition, input: &PlayerInput, judgement: &Judgement) {
        if *judgement == Judgement::Ignored {
            return;
        }
        let rejected = matches!(judgement, Judgement::Rejected(_));

        match (condition, input) {
            (WinCondition::SetCompletion { .. }, PlayerInput::Choose { option }) => {
                if !rejected {
                    self.chosen.push(option.clone());
                }
            }
            (
                WinCondition::ExactSequence { .. } | WinCondition::ExhaustiveVisit { .. },
                PlayerInput::Choose { option },
            ) => self.chosen.push(option.clone()),
            (WinCondition::ToleranceBand { rail, .. }, PlayerInput::ReleaseAt { value }) => {
                self.value = Some(clamp_to_rail(*value, *rail));
            }
            (WinCondition::DragToTarget { items }, PlayerInput::DropAt { item, position }) => {
                let landed = if rejected {
                    items.iter().find(|i| &i.id == item).map(|i| i.origin)
                } else {
                    Some(*position)
                };
                if let Some(landed) = landed {
                    self.positions.insert(item.clone(), landed);
                }
            }
            (WinCondition::ScoredRounds { rounds, .. }, PlayerInput::Choose { option }) => {
                if rounds.get(self.round).is_some_and(|r| &r.answer == option) {
                    self.score += 1;
                }
                self.round += 1;
            }
            (WinCondition::FreeChoice { .. }, PlayerInput::Choose { option }) => {
                self.chosen = vec![option.clone()];
            }
            _ => {}
        }
    }
}

fn clamp_to_rail(value: f64, rail: f64) -> f64 {
    if value.is_nan() {
        return value;
    }
    value.clamp(-rail, rail)
}

impl WinCondition {
    /// Short strategy name for logs and views.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::SetCompletion { .. } => "set_completion",
            Self::ExactSequence { .. } => "exact_sequence",
            Self::ToleranceBand { .. } => "tolerance_band",
            Self::DragToTarget { .. } => "drag_to_target",
            Self::ExhaustiveVisit { .. } => "exhaustive_visit",
            Self::ScoredRounds { .. } => "scored_rounds",
            Self::FreeChoice { .. } => "free_choice",
        }
    }

    /// Whether acknowledging an error wipes all progress.
    ///
    /// Sequence and round games restart from scratch; the others keep what
    /// was achieved because the offending input was never accumulated or
    /// was already reverted.
    #[must_use]
    pub fn clears_on_acknowledge(&self) -> bool {
        matches!(self, Self::ExactSequence { .. } | Self::ScoredRounds { .. })
    }

    /// Selectable options, if the strategy has any.
    #[must_use]
    pub fn options(&self) -> &[SelectionOption] {
        match self {
            Self::SetCompletion { options }
            | Self::ExactSequence { options, .. }
            | Self::ExhaustiveVisit { options }
            | Self::FreeChoice { options } => options,
            Self::ScoredRounds { answers, .. } => answers,
            Self::ToleranceBand { .. } | Self::DragToTarget { .. } => &[],
        }
    }

    /// Looks up a selectable option.
    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&SelectionOption> {
        self.options().iter().find(|o| &o.id == id)
    }

    /// Judges one input against the accumulated progress.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownOption` for ids the game does not define
    /// and `DomainError::Validation` for inputs the strategy does not take.
    pub fn judge(
        &self,
        game: &str,
        progress: &Progress,
        input: &PlayerInput,
    ) -> Result<Judgement, DomainError> {
        let unknown = |option: &OptionId| DomainError::UnknownOption {
            game: game.to_owned(),
            option: option.to_string(),
        };

        match (self, input) {
            (Self::SetCompletion { options }, PlayerInput::Choose { option }) => {
                let chosen = options.iter().find(|o| &o.id == option).ok_or_else(|| unknown(option))?;
                if !chosen.correct {
                    return Ok(Judgement::Rejected(Rejection::IncorrectOption {
                        option: option.clone(),
                        label: chosen.label.clone(),
                        hint: chosen.hint.clone(),
                    }));
                }
                if progress.chosen.contains(option) {
                    return Ok(Judgement::Ignored);
                }
                let required = options.iter().filter(|o| o.correct).count();
                if progress.chosen.len() + 1 == required {
                    Ok(Judgement::Completed)
                } else {
                    Ok(Judgement::Accepted)
                }
            }
            (Self::ExactSequence { options, answer }, PlayerInput::Choose { option }) => {
                if !options.iter().any(|o| &o.id == option) {
                    return Err(unknown(option));
                }
                if progress.chosen.contains(option) {
                    return Ok(Judgement::Ignored);
                }
                let mut attempted = progress.chosen.clone();
                attempted.push(option.clone());
                if attempted.len() < answer.len() {
                    Ok(Judgement::Accepted)
                } else if attempted == *answer {
                    Ok(Judgement::Completed)
                } else {
                    Ok(Judgement::Rejected(Rejection::WrongOrder { attempted }))
                }
            }
            (
                Self::ToleranceBand {
                    target,
                    tolerance,
                    rail,
                },
                PlayerInput::ReleaseAt { value },
            ) => {
                let value = clamp_to_rail(*value, *rail);
                if (value - target).abs() < *tolerance {
                    Ok(Judgement::Completed)
                } else {
                    Ok(Judgement::Rejected(Rejection::OutOfBand { value }))
                }
            }
            (Self::DragToTarget { items }, PlayerInput::DropAt { item, position }) => {
                let dragged = items.iter().find(|i| &i.id == item).ok_or_else(|| unknown(item))?;
                let distance = position.distance(&dragged.target);
                if distance >= dragged.hit_radius || distance.is_nan() {
                    return Ok(Judgement::Rejected(Rejection::MissedTarget {
                        item: item.clone(),
                        label: dragged.label.clone(),
                        distance,
                        hint: dragged.hint.clone(),
                    }));
                }
                let others_placed = items.iter().filter(|i| &i.id != item).all(|other| {
                    progress
                        .positions
                        .get(&other.id)
                        .is_some_and(|p| p.distance(&other.target) < other.hit_radius)
                });
                if others_placed {
                    Ok(Judgement::Completed)
                } else {
                    Ok(Judgement::Accepted)
                }
            }
            (Self::ExhaustiveVisit { options }, PlayerInput::Choose { option }) => {
                if !options.iter().any(|o| &o.id == option) {
                    return Err(unknown(option));
                }
                if progress.chosen.contains(option) {
                    Ok(Judgement::Ignored)
                } else if progress.chosen.len() + 1 == options.len() {
                    Ok(Judgement::Completed)
                } else {
                    Ok(Judgement::Accepted)
                }
            }
            (
                Self::ScoredRounds {
                    answers,
                    rounds,
                    pass_mark,
                },
                PlayerInput::Choose { option },
            ) => {
                if !answers.iter().any(|o| &o.id == option) {
                    return Err(unknown(option));
                }
                let Some(current) = rounds.get(progress.round) else {
                    return Ok(Judgement::Ignored);
                };
                let score = progress.score + usize::from(&current.answer == option);
                if progress.round + 1 < rounds.len() {
                    Ok(Judgement::Accepted)
                } else if score >= *pass_mark {
                    Ok(Judgement::Completed)
                } else {
                    Ok(Judgement::Rejected(Rejection::BelowPassMark {
                        score,
                        needed: *pass_mark,
                    }))
                }
            }
            (Self::FreeChoice { options }, PlayerInput::Choose { option }) => {
                if !options.iter().any(|o| &o.id == option) {
                    return Err(unknown(option));
                }
                if progress.chosen.first() == Some(option) {
                    Ok(Judgement::Ignored)
                } else {
                    Ok(Judgement::Accepted)
                }
            }
            (Self::FreeChoice { .. }, PlayerInput::Confirm) => {
                if progress.chosen.is_empty() {
                    Ok(Judgement::Rejected(Rejection::NothingChosen))
                } else {
                    Ok(Judgement::Completed)
                }
            }
            (condition, input) => Err(DomainError::Validation(format!(
                "{} does not accept {input:?}",
                condition.strategy()
            ))),
        }
    }

    /// Checks the configuration is winnable and internally consistent.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::SetCompletion { options } => {
                unique_ids(options.iter().map(|o| &o.id))?;
                if !options.iter().any(|o| o.correct) {
                    return Err("set_completion needs at least one correct option".to_owned());
                }
                Ok(())
            }
            Self::ExactSequence { options, answer } => {
                unique_ids(options.iter().map(|o| &o.id))?;
                if answer.is_empty() {
                    return Err("exact_sequence answer is empty".to_owned());
                }
                unique_ids(answer.iter())?;
                match answer.iter().find(|id| !options.iter().any(|o| &o.id == *id)) {
                    Some(id) => Err(format!("answer references unknown option `{id}`")),
                    None => Ok(()),
                }
            }
            Self::ToleranceBand {
                target,
                tolerance,
                rail,
            } => {
                if !(tolerance.is_finite() && *tolerance > 0.0) {
                    return Err("tolerance must be a positive number".to_owned());
                }
                if !(rail.is_finite() && *rail > 0.0) {
                    return Err("rail must be a positive number".to_owned());
                }
                if !target.is_finite() || target.abs() > *rail {
                    return Err("target must lie on the rail".to_owned());
                }
                Ok(())
            }
            Self::DragToTarget { items } => {
                unique_ids(items.iter().map(|i| &i.id))?;
                match items
                    .iter()
                    .find(|i| !(i.hit_radius.is_finite() && i.hit_radius > 0.0))
                {
                    Some(item) => Err(format!("item `{}` needs a positive hit radius", item.id)),
                    None => Ok(()),
                }
            }
            Self::ExhaustiveVisit { options } | Self::FreeChoice { options } => {
                unique_ids(options.iter().map(|o| &o.id))
            }
            Self::ScoredRounds {
                answers,
                rounds,
                pass_mark,
            } => {
                unique_ids(answers.iter().map(|o| &o.id))?;
                if rounds.is_empty() {
                    return Err("scored_rounds needs at least one round".to_owned());
                }
                if let Some(round) = rounds
                    .iter()
                    .find(|r| !answers.iter().any(|o| o.id == r.answer))
                {
                    return Err(format!("round answer `{}` is not an answer option", round.answer));
                }
                if *pass_mark == 0 || *pass_mark > rounds.len() {
                    return Err(format!(
                        "pass_mark must be between 1 and {} rounds",
                        rounds.len()
                    ));
                }
                Ok(())
            }
        }
    }
}

fn unique_ids<'a>(ids: impl Iterator<Item = &'a OptionId>) -> Result<(), String> {
    let mut seen = HashSet::new();
    let mut count = 0;
    for id in ids {
        count += 1;
        if !seen.insert(id) {
            return Err(format!("duplicate id `{id}`"));
        }
    }
    if count == 0 {
        return Err("no options defined".to_owned());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: &str, correct: bool) -> SelectionOption {
        SelectionOption {
            id: OptionId::new(id),
            label: id.to_uppercase(),
            correct,
            cue: None,
            hint: None,
        }
    }

    fn play(condition: &WinCondition, inputs: &[PlayerInput]) -> (Progress, Vec<Judgement>) {
        let mut progress = Progress::new(condition);
        let mut judgements = Vec::new();
        for input in inputs {
            let judgement = condition.judge("test", &progress, input).unwrap();
            progress.absorb(condition, input, &judgement);
            judgements.push(judgement);
        }
        (progress, judgements)
    }

    fn action_select() -> WinCondition {
        WinCondition::SetCompletion {
            options: vec![
                option("comunicacion", true),
                option("critico", true),
                option("colaboracion", true),
                option("ruido", false),
                option("aislamiento", false),
            ],
        }
    }

    #[test]
    fn test_set_completion_all_correct_in_any_order_completes() {
        let condition = action_select();

        let (_, judgements) = play(
            &condition,
            &[
                PlayerInput::choose("colaboracion"),
                PlayerInput::choose("comunicacion"),
                PlayerInput::choose("critico"),
            ],
        );

        assert_eq!(
            judgements,
            vec![Judgement::Accepted, Judgement::Accepted, Judgement::Completed]
        );
    }

    #[test]
    fn test_set_completion_incorrect_rejects_immediately_without_accumulating() {
        let condition = action_select();

        let (progress, judgements) = play(&condition, &[PlayerInput::choose("ruido")]);

        assert!(matches!(
            &judgements[0],
            Judgement::Rejected(Rejection::IncorrectOption { label, .. }) if label == "RUIDO"
        ));
        assert!(progress.chosen().is_empty());
    }

    #[test]
    fn test_set_completion_repeat_choice_is_ignored() {
        let condition = action_select();

        let (progress, judgements) = play(
            &condition,
            &[PlayerInput::choose("critico"), PlayerInput::choose("critico")],
        );

        assert_eq!(judgements[1], Judgement::Ignored);
        assert_eq!(progress.chosen().len(), 1);
    }

    #[test]
    fn test_set_completion_unknown_option_is_an_error() {
        let condition = action_select();
        let progress = Progress::new(&condition);

        let result = condition.judge("action-select", &progress, &PlayerInput::choose("nope"));

        match result.unwrap_err() {
            DomainError::UnknownOption { game, option } => {
                assert_eq!(game, "action-select");
                assert_eq!(option, "nope");
            }
            other => panic!("expected UnknownOption, got {other:?}"),
        }
    }

    fn abc_sequence() -> WinCondition {
        WinCondition::ExactSequence {
            options: vec![option("a", false), option("b", false), option("c", false)],
            answer: vec!["a".into(), "b".into(), "c".into()],
        }
    }

    #[test]
    fn test_exact_sequence_wrong_order_rejects_at_full_length() {
        let condition = abc_sequence();

        let (progress, judgements) = play(
            &condition,
            &[
                PlayerInput::choose("a"),
                PlayerInput::choose("c"),
                PlayerInput::choose("b"),
            ],
        );

        assert_eq!(judgements[1], Judgement::Accepted);
        assert_eq!(
            judgements[2],
            Judgement::Rejected(Rejection::WrongOrder {
                attempted: vec!["a".into(), "c".into(), "b".into()],
            })
        );
        assert_eq!(progress.chosen().len(), 3);
        assert!(condition.clears_on_acknowledge());
    }

    #[test]
    fn test_exact_sequence_canonical_order_completes() {
        let condition = abc_sequence();

        let (_, judgements) = play(
            &condition,
            &[
                PlayerInput::choose("a"),
                PlayerInput::choose("b"),
                PlayerInput::choose("c"),
            ],
        );

        assert_eq!(judgements[2], Judgement::Completed);
    }

    #[test]
    fn test_tolerance_band_edges() {
        let condition = WinCondition::ToleranceBand {
            target: 0.0,
            tolerance: 1.0,
            rail: 2.0,
        };
        let progress = Progress::new(&condition);

        let inside = condition
            .judge("balance", &progress, &PlayerInput::ReleaseAt { value: 0.99 })
            .unwrap();
        let outside = condition
            .judge("balance", &progress, &PlayerInput::ReleaseAt { value: 1.01 })
            .unwrap();
        let negative = condition
            .judge("balance", &progress, &PlayerInput::ReleaseAt { value: -0.99 })
            .unwrap();

        assert_eq!(inside, Judgement::Completed);
        assert_eq!(negative, Judgement::Completed);
        assert!(matches!(outside, Judgement::Rejected(Rejection::OutOfBand { .. })));
    }

    #[test]
    fn test_tolerance_band_clamps_to_rail() {
        let condition = WinCondition::ToleranceBand {
            target: 0.0,
            tolerance: 1.0,
            rail: 2.0,
        };

        let (progress, judgements) = play(&condition, &[PlayerInput::ReleaseAt { value: 9.0 }]);

        assert_eq!(
            judgements[0],
            Judgement::Rejected(Rejection::OutOfBand { value: 2.0 })
        );
        assert_eq!(progress.value(), Some(2.0));
    }

    fn pedestals() -> WinCondition {
        let item = |id: &str, x: f64| DragItem {
            id: OptionId::new(id),
            label: id.to_owned(),
            origin: Point3::new(x, 0.2, 1.2),
            target: Point3::new(x, 0.2, -0.9),
            hit_radius: 0.35,
            hint: Some(format!("pista {id}")),
        };
        WinCondition::DragToTarget {
            items: vec![item("eficiencia", -2.8), item("compromiso", 0.0)],
        }
    }

    #[test]
    fn test_drag_to_target_hit_radius_boundary() {
        let condition = pedestals();
        let progress = Progress::new(&condition);
        let near = PlayerInput::DropAt {
            item: "eficiencia".into(),
            position: Point3::new(-2.8 + 0.99 * 0.35, 0.2, -0.9),
        };
        let far = PlayerInput::DropAt {
            item: "eficiencia".into(),
            position: Point3::new(-2.8 + 1.01 * 0.35, 0.2, -0.9),
        };

        let placed = condition.judge("results", &progress, &near).unwrap();
        let missed = condition.judge("results", &progress, &far).unwrap();

        assert_eq!(placed, Judgement::Accepted);
        assert!(matches!(missed, Judgement::Rejected(Rejection::MissedTarget { .. })));
    }

    #[test]
    fn test_drag_to_target_miss_snaps_only_that_item_back() {
        let condition = pedestals();
        let placed_at = Point3::new(0.0, 0.2, -0.85);

        let (progress, judgements) = play(
            &condition,
            &[
                PlayerInput::DropAt {
                    item: "compromiso".into(),
                    position: placed_at,
                },
                PlayerInput::DropAt {
                    item: "eficiencia".into(),
                    position: Point3::new(1.0, 0.2, 1.0),
                },
            ],
        );

        assert_eq!(judgements[0], Judgement::Accepted);
        assert!(matches!(judgements[1], Judgement::Rejected(_)));
        assert_eq!(progress.positions()[&OptionId::new("compromiso")], placed_at);
        assert_eq!(
            progress.positions()[&OptionId::new("eficiencia")],
            Point3::new(-2.8, 0.2, 1.2)
        );
    }

    #[test]
    fn test_drag_to_target_completes_when_all_placed() {
        let condition = pedestals();

        let (_, judgements) = play(
            &condition,
            &[
                PlayerInput::DropAt {
                    item: "compromiso".into(),
                    position: Point3::new(0.0, 0.2, -0.9),
                },
                PlayerInput::DropAt {
                    item: "eficiencia".into(),
                    position: Point3::new(-2.8, 0.2, -0.8),
                },
            ],
        );

        assert_eq!(judgements[1], Judgement::Completed);
    }

    #[test]
    fn test_exhaustive_visit_completes_after_every_option_once() {
        let condition = WinCondition::ExhaustiveVisit {
            options: vec![option("empatia", false), option("estrategia", false)],
        };

        let (_, judgements) = play(
            &condition,
            &[
                PlayerInput::choose("estrategia"),
                PlayerInput::choose("estrategia"),
                PlayerInput::choose("empatia"),
            ],
        );

        assert_eq!(
            judgements,
            vec![Judgement::Accepted, Judgement::Ignored, Judgement::Completed]
        );
    }

    fn classify_bins(pass_mark: usize) -> WinCondition {
        WinCondition::ScoredRounds {
            answers: vec![option("liderazgo", false), option("operativo", false)],
            rounds: vec![
                Round {
                    prompt: "Alinear visión con el equipo docente".to_owned(),
                    answer: "liderazgo".into(),
                },
                Round {
                    prompt: "Publicar cronograma de aulas".to_owned(),
                    answer: "operativo".into(),
                },
                Round {
                    prompt: "Facilitar feedback constructivo".to_owned(),
                    answer: "liderazgo".into(),
                },
            ],
            pass_mark,
        }
    }

    #[test]
    fn test_scored_rounds_wrong_answer_mid_way_is_not_an_error() {
        let condition = classify_bins(2);

        let (progress, judgements) = play(
            &condition,
            &[
                PlayerInput::choose("operativo"),
                PlayerInput::choose("operativo"),
                PlayerInput::choose("liderazgo"),
            ],
        );

        assert_eq!(judgements[0], Judgement::Accepted);
        assert_eq!(judgements[2], Judgement::Completed);
        assert_eq!(progress.score(), 2);
    }

    #[test]
    fn test_scored_rounds_below_pass_mark_rejects_at_end() {
        let condition = classify_bins(3);

        let (_, judgements) = play(
            &condition,
            &[
                PlayerInput::choose("operativo"),
                PlayerInput::choose("operativo"),
                PlayerInput::choose("liderazgo"),
            ],
        );

        assert_eq!(
            judgements[2],
            Judgement::Rejected(Rejection::BelowPassMark { score: 2, needed: 3 })
        );
    }

    #[test]
    fn test_free_choice_requires_selection_before_confirm() {
        let condition = WinCondition::FreeChoice {
            options: vec![option("empatia", false), option("colaboracion", false)],
        };

        let (progress, judgements) = play(
            &condition,
            &[
                PlayerInput::Confirm,
                PlayerInput::choose("empatia"),
                PlayerInput::choose("colaboracion"),
                PlayerInput::Confirm,
            ],
        );

        assert_eq!(judgements[0], Judgement::Rejected(Rejection::NothingChosen));
        assert_eq!(judgements[3], Judgement::Completed);
        assert_eq!(progress.chosen(), &[OptionId::new("colaboracion")]);
    }

    #[test]
    fn test_mismatched_input_kind_is_a_validation_error() {
        let condition = action_select();
        let progress = Progress::new(&condition);

        let result = condition.judge("x", &progress, &PlayerInput::ReleaseAt { value: 0.0 });

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_unwinnable_configurations() {
        let no_correct = WinCondition::SetCompletion {
            options: vec![option("a", false)],
        };
        let bad_answer = WinCondition::ExactSequence {
            options: vec![option("a", false)],
            answer: vec!["z".into()],
        };
        let zero_tolerance = WinCondition::ToleranceBand {
            target: 0.0,
            tolerance: 0.0,
            rail: 2.0,
        };
        let duplicate = WinCondition::ExhaustiveVisit {
            options: vec![option("a", false), option("a", false)],
        };

        assert!(no_correct.validate().is_err());
        assert!(bad_answer.validate().is_err());
        assert!(zero_tolerance.validate().is_err());
        assert!(duplicate.validate().is_err());
        assert!(classify_bins(4).validate().is_err());
        assert!(action_select().validate().is_ok());
    }
}
