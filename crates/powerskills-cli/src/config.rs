//! Environment configuration.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

/// Journey file override.
pub const JOURNEY_VAR: &str = "POWERSKILLS_JOURNEY";
/// Log output format.
pub const LOG_FORMAT_VAR: &str = "POWERSKILLS_LOG_FORMAT";
/// Timer resolution in milliseconds.
pub const TICK_MS_VAR: &str = "POWERSKILLS_TICK_MS";
/// Whether media and narration may start without a gesture.
pub const AUTOPLAY_VAR: &str = "POWERSKILLS_AUTOPLAY";

const MAX_TICK_MS: u64 = 10_000;

/// How logs are written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Compact human-readable lines.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(AppError::Config(format!(
                "{LOG_FORMAT_VAR} must be `json` or `pretty`, got `{other}`"
            ))),
        }
    }
}

/// Terminal player configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Journey YAML to play instead of the bundled one.
    pub journey_path: Option<PathBuf>,
    /// Log format.
    pub log_format: LogFormat,
    /// Interval between timer ticks.
    pub tick_ms: u64,
    /// `false` simulates a runtime that blocks unattended media and audio
    /// until the player types `play`.
    pub autoplay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            journey_path: None,
            log_format: LogFormat::default(),
            tick_ms: 100,
            autoplay: true,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the first invalid variable.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the first invalid variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let journey_path = lookup(JOURNEY_VAR)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        let tick_ms = match lookup(TICK_MS_VAR) {
            Some(value) => {
                let tick_ms: u64 = value.parse().map_err(|e| {
                    AppError::Config(format!("{TICK_MS_VAR} must be a whole number: {e}"))
                })?;
                if tick_ms == 0 || tick_ms > MAX_TICK_MS {
                    return Err(AppError::Config(format!(
                        "{TICK_MS_VAR} must be between 1 and {MAX_TICK_MS}, got {tick_ms}"
                    )));
                }
                tick_ms
            }
            None => defaults.tick_ms,
        };

        let autoplay = match lookup(AUTOPLAY_VAR).as_deref() {
            Some("true" | "1") => true,
            Some("false" | "0") => false,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "{AUTOPLAY_VAR} must be `true` or `false`, got `{other}`"
                )));
            }
            None => defaults.autoplay,
        };

        Ok(Self {
            journey_path,
            log_format,
            tick_ms,
            autoplay,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.tick_ms, 100);
        assert!(config.autoplay);
    }

    #[test]
    fn test_reads_every_variable() {
        // Arrange
        let vars = lookup(&[
            (JOURNEY_VAR, "/tmp/journey.yaml"),
            (LOG_FORMAT_VAR, "pretty"),
            (TICK_MS_VAR, "250"),
            (AUTOPLAY_VAR, "false"),
        ]);

        // Act
        let config = Config::from_lookup(vars).unwrap();

        // Assert
        assert_eq!(config.journey_path, Some(PathBuf::from("/tmp/journey.yaml")));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.tick_ms, 250);
        assert!(!config.autoplay);
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let result = Config::from_lookup(lookup(&[(LOG_FORMAT_VAR, "xml")]));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains(LOG_FORMAT_VAR)));
    }

    #[test]
    fn test_rejects_zero_and_garbage_tick() {
        let zero = Config::from_lookup(lookup(&[(TICK_MS_VAR, "0")]));
        let garbage = Config::from_lookup(lookup(&[(TICK_MS_VAR, "fast")]));

        assert!(matches!(zero, Err(AppError::Config(_))));
        assert!(matches!(garbage, Err(AppError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_autoplay_value() {
        let result = Config::from_lookup(lookup(&[(AUTOPLAY_VAR, "maybe")]));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains(AUTOPLAY_VAR)));
    }

    #[test]
    fn test_blank_journey_path_means_bundled_journey() {
        let config = Config::from_lookup(lookup(&[(JOURNEY_VAR, "  ")])).unwrap();

        assert_eq!(config.journey_path, None);
    }
}
