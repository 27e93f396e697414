//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Player mistakes (wrong selection, missed drop, blocked autoplay) are not
/// errors; they are ordinary state transitions. A `DomainError` always means
/// a caller or configuration bug.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A scene key with no configured scene.
    #[error("scene not found: {0}")]
    SceneNotFound(String),

    /// An input referenced an option the mini-game does not define.
    #[error("unknown option `{option}` in mini-game `{game}`")]
    UnknownOption {
        /// The mini-game definition key.
        game: String,
        /// The offending option identifier.
        option: String,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// Journey configuration could not be parsed or is inconsistent.
    #[error("content error: {0}")]
    Content(String),

    /// An infrastructure error (journal, playback wiring).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
