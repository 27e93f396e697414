//! Power Skills — Content context.
//!
//! The journey is static configuration: the fixed scene order, each scene's
//! briefings and intro video, the mini-game it mounts and the closing
//! credits. It is authored in YAML and validated once at load time.

pub mod journey;
pub mod loader;
pub mod markdown;
pub mod scene_key;

pub use journey::{
    CreditsDefinition, IntroDefinition, Journey, MediaDefinition, SceneDefinition, StageDefinition,
};
pub use loader::{LoadedJourney, default_journey, load_from_path, load_from_str};
pub use scene_key::SceneKey;
