//! Player input accepted by the mini-game state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies an option, word, avatar, draggable item or answer bin.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(String);

impl OptionId {
    /// Creates an option id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A point in world space. Serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate (height).
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3 {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

/// One evaluated player action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum PlayerInput {
    /// Click/tap on an option.
    Choose {
        /// The chosen option.
        option: OptionId,
    },
    /// A slider or knob was released at `value`.
    ReleaseAt {
        /// Released position along the rail.
        value: f64,
    },
    /// A dragged item was released at `position`.
    DropAt {
        /// The dragged item.
        item: OptionId,
        /// World position at release.
        position: Point3,
    },
    /// Explicit confirmation of the current selection.
    Confirm,
}

impl PlayerInput {
    /// Shorthand for [`PlayerInput::Choose`].
    #[must_use]
    pub fn choose(option: impl Into<String>) -> Self {
        Self::Choose {
            option: OptionId::new(option),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_euclidean() {
        let a = Point3::new(0.0, 0.2, 0.0);
        let b = Point3::new(3.0, 0.2, 4.0);

        assert!((a.distance(&b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_point_deserializes_from_array() {
        let p: Point3 = serde_json::from_str("[-2.8, 0.2, 1.2]").unwrap();

        assert_eq!(p, Point3::new(-2.8, 0.2, 1.2));
    }
}
