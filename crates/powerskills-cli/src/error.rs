//! Power Skills — terminal player error types.

use powerskills_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors for the terminal player.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading commands or writing output failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The journey could not be loaded or driven.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The JSON view could not be produced.
    #[error("view serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_is_transparent() {
        let err = AppError::from(DomainError::SceneNotFound("backstage".into()));

        assert_eq!(err.to_string(), "scene not found: backstage");
    }

    #[test]
    fn test_config_error_names_itself() {
        let err = AppError::Config("POWERSKILLS_TICK_MS must be positive".into());

        assert_eq!(
            err.to_string(),
            "configuration error: POWERSKILLS_TICK_MS must be positive"
        );
    }
}
