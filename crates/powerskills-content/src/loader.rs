//! Loading journey configuration from YAML.

use std::fmt::Write as _;
use std::path::Path;

use powerskills_core::error::DomainError;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::journey::Journey;

const DEFAULT_JOURNEY: &str = include_str!("../content/journey.yaml");

/// A validated journey with the digest of the source it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedJourney {
    /// The journey.
    pub journey: Journey,
    /// Lowercase hex SHA-256 of the YAML source.
    pub digest: String,
}

fn compute_digest(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}

/// Parses and validates a journey.
///
/// # Errors
///
/// Returns `DomainError::Content` if the YAML is malformed or the journey
/// fails validation.
pub fn load_from_str(source: &str) -> Result<LoadedJourney, DomainError> {
    let journey: Journey = serde_yaml::from_str(source)
        .map_err(|e| DomainError::Content(format!("journey YAML: {e}")))?;
    journey.validate()?;
    let digest = compute_digest(source);
    debug!(scenes = journey.scenes.len(), %digest, "journey loaded");
    Ok(LoadedJourney { journey, digest })
}

/// Reads, parses and validates a journey file.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the file cannot be read, or
/// `DomainError::Content` if it is not a valid journey.
pub fn load_from_path(path: &Path) -> Result<LoadedJourney, DomainError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        DomainError::Infrastructure(format!("reading {}: {e}", path.display()))
    })?;
    let loaded = load_from_str(&source)?;
    info!(path = %path.display(), digest = %loaded.digest, "journey file loaded");
    Ok(loaded)
}

/// The journey bundled with the crate.
///
/// # Errors
///
/// Returns `DomainError::Content` if the bundled configuration is invalid.
pub fn default_journey() -> Result<LoadedJourney, DomainError> {
    load_from_str(DEFAULT_JOURNEY)
}
