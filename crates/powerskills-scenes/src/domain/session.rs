//! Session state shared by the scenes of one journey.

use std::collections::BTreeMap;

use powerskills_content::SceneKey;
use serde::Serialize;

/// What the journey remembers about the player between scenes.
///
/// Created with defaults when the journey starts and wiped back to them on
/// restart. Only the sequencer mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// The scene on screen.
    pub current_scene: SceneKey,
    /// Named boolean flags, e.g. `team.completed`.
    pub flags: BTreeMap<String, bool>,
    /// Name the player gave, if any.
    pub player_name: Option<String>,
    /// Label of the skill picked in the reflection.
    pub chosen_reflection_skill: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_scene: SceneKey::first(),
            flags: BTreeMap::new(),
            player_name: None,
            chosen_reflection_skill: None,
        }
    }
}

impl SessionState {
    /// Back to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Value of `name`; unset flags are `false`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Sets `name`.
    pub fn set_flag(&mut self, name: impl Into<String>, value: bool) {
        self.flags.insert(name.into(), value);
    }

    /// Flag name recording that `scene` was won.
    #[must_use]
    pub fn completion_flag(scene: SceneKey) -> String {
        format!("{scene}.completed")
    }

    /// Whether `scene` was won in this run.
    #[must_use]
    pub fn is_completed(&self, scene: SceneKey) -> bool {
        self.flag(&Self::completion_flag(scene))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_restores_defaults() {
        // Arrange
        let mut session = SessionState {
            current_scene: SceneKey::Credits,
            player_name: Some("Ana".to_owned()),
            chosen_reflection_skill: Some("💗 Empatía".to_owned()),
            ..SessionState::default()
        };
        session.set_flag(SessionState::completion_flag(SceneKey::Team), true);

        // Act
        session.reset();

        // Assert
        assert_eq!(session, SessionState::default());
        assert_eq!(session.current_scene, SceneKey::Welcome);
    }

    #[test]
    fn test_completion_flag_uses_scene_name() {
        let mut session = SessionState::default();

        session.set_flag(SessionState::completion_flag(SceneKey::InAction), true);

        assert!(session.flag("in-action.completed"));
        assert!(session.is_completed(SceneKey::InAction));
        assert!(!session.is_completed(SceneKey::Results));
    }
}
