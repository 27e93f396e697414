//! The fixed scene sequence.

use std::fmt;
use std::str::FromStr;

use powerskills_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One step of the journey. The declaration order is the play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneKey {
    /// Welcome and compass pickup.
    Welcome,
    /// Management context and sentence building.
    Context,
    /// Meeting the team.
    Team,
    /// The balance challenge.
    Challenge,
    /// Power skills in action.
    InAction,
    /// Results matching.
    Results,
    /// Final reflection.
    Reflection,
    /// Closing credits. Terminal.
    Credits,
}

impl SceneKey {
    /// Every scene in play order.
    pub const ALL: [Self; 8] = [
        Self::Welcome,
        Self::Context,
        Self::Team,
        Self::Challenge,
        Self::InAction,
        Self::Results,
        Self::Reflection,
        Self::Credits,
    ];

    /// The first scene.
    #[must_use]
    pub const fn first() -> Self {
        Self::Welcome
    }

    /// The scene after this one; `None` for the terminal scene.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        let index = Self::ALL.iter().position(|k| *k == self)?;
        Self::ALL.get(index + 1).copied()
    }

    /// Zero-based position in the sequence.
    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or_default()
    }

    /// Whether this is the last scene.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Route-style name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Context => "context",
            Self::Team => "team",
            Self::Challenge => "challenge",
            Self::InAction => "in-action",
            Self::Results => "results",
            Self::Reflection => "reflection",
            Self::Credits => "credits",
        }
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SceneKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DomainError::SceneNotFound(s.to_owned()))
    }
}
