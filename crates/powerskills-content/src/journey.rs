//! Journey configuration types and their validation.

use std::collections::HashSet;

use powerskills_core::error::DomainError;
use powerskills_minigame::domain::definition::MiniGameDefinition;
use powerskills_narration::{GateContent, NarrationContent};
use serde::{Deserialize, Serialize};

use crate::scene_key::SceneKey;

fn default_skip_label() -> String {
    "👉 Continuar".to_owned()
}

fn default_restart_label() -> String {
    "🔁 Reiniciar el viaje".to_owned()
}

fn default_more_label() -> String {
    "🔗 Conoce más".to_owned()
}

/// The whole experience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    /// Experience title.
    pub title: String,
    /// Scenes, one per [`SceneKey`], in play order.
    pub scenes: Vec<SceneDefinition>,
}

/// One scene: an intro followed by a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDefinition {
    /// Which scene this is.
    pub key: SceneKey,
    /// Briefings and intro video.
    #[serde(default)]
    pub intro: IntroDefinition,
    /// What the scene mounts once the intro is over.
    pub stage: StageDefinition,
}

/// The part of a scene played before its stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntroDefinition {
    /// Dialogs shown one after the other before the video.
    #[serde(default)]
    pub briefings: Vec<GateContent>,
    /// Intro video.
    #[serde(default)]
    pub media: Option<MediaDefinition>,
}

/// An intro video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDefinition {
    /// Video source.
    pub src: String,
    /// Poster frame.
    #[serde(default)]
    pub poster: Option<String>,
    /// Label of the skip control.
    #[serde(default = "default_skip_label")]
    pub skip_label: String,
}

/// The interactive part of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageDefinition {
    /// A mini-game whose success advances the journey.
    Game(MiniGameDefinition),
    /// The closing credits.
    Credits(CreditsDefinition),
}

/// The closing credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsDefinition {
    /// Heading.
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// Narration played when the credits open.
    #[serde(default)]
    pub narration: Option<NarrationContent>,
    /// Label of the restart control.
    #[serde(default = "default_restart_label")]
    pub restart_label: String,
    /// Label of the external link.
    #[serde(default = "default_more_label")]
    pub more_label: String,
    /// External resource opened from the credits.
    pub link: String,
}

impl Journey {
    /// The definition of `key`.
    #[must_use]
    pub fn scene(&self, key: SceneKey) -> Option<&SceneDefinition> {
        self.scenes.iter().find(|s| s.key == key)
    }

    /// The mini-game mounted by `key`, if it is a game scene.
    #[must_use]
    pub fn game(&self, key: SceneKey) -> Option<&MiniGameDefinition> {
        match &self.scene(key)?.stage {
            StageDefinition::Game(game) => Some(game),
            StageDefinition::Credits(_) => None,
        }
    }

    /// The credits, taken from the terminal scene.
    #[must_use]
    pub fn credits(&self) -> Option<&CreditsDefinition> {
        self.scenes.iter().find_map(|s| match &s.stage {
            StageDefinition::Credits(credits) => Some(credits),
            StageDefinition::Game(_) => None,
        })
    }

    /// Checks the journey is playable end to end.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Content` naming the first problem found.
    pub fn validate(&self) -> Result<(), DomainError> {
        let keys: Vec<SceneKey> = self.scenes.iter().map(|s| s.key).collect();
        if keys != SceneKey::ALL {
            return Err(DomainError::Content(format!(
                "scenes must be listed once each in order {:?}, found {keys:?}",
                SceneKey::ALL.map(SceneKey::as_str)
            )));
        }

        let mut game_keys = HashSet::new();
        for scene in &self.scenes {
            if scene
                .intro
                .media
                .as_ref()
                .is_some_and(|media| media.src.trim().is_empty())
            {
                return Err(DomainError::Content(format!(
                    "scene `{}`: intro video has no source",
                    scene.key
                )));
            }
            match (&scene.stage, scene.key.is_terminal()) {
                (StageDefinition::Game(game), false) => {
                    game.validate()
                        .map_err(|e| DomainError::Content(format!("scene `{}`: {e}", scene.key)))?;
                    if !game_keys.insert(game.key.as_str()) {
                        return Err(DomainError::Content(format!(
                            "scene `{}`: mini-game key `{}` is used twice",
                            scene.key, game.key
                        )));
                    }
                }
                (StageDefinition::Credits(credits), true) => {
                    if !(credits.link.starts_with("https://") || credits.link.starts_with("http://"))
                    {
                        return Err(DomainError::Content(format!(
                            "credits link `{}` is not an http(s) URL",
                            credits.link
                        )));
                    }
                }
                (StageDefinition::Game(_), true) => {
                    return Err(DomainError::Content(format!(
                        "scene `{}` is terminal and must show the credits",
                        scene.key
                    )));
                }
                (StageDefinition::Credits(_), false) => {
                    return Err(DomainError::Content(format!(
                        "scene `{}` shows the credits but is not the last scene",
                        scene.key
                    )));
                }
            }
        }
        Ok(())
    }
}
