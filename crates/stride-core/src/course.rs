//! Catalog course records and the difficulty scale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Course difficulty. Ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Beginner
    }
}

impl Difficulty {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(ValidationError::UnknownEnumValue {
                field: "difficulty",
                value: other.to_string(),
            }),
        }
    }
}

/// A read-only catalog record. Supplied externally; every field the
/// scorer consumes tolerates absence (`skills`/`prerequisites` default
/// to empty, `popularity` to 0).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub skills: Vec<String>,
    pub difficulty: Difficulty,
    /// Popularity on a 0-100 scale.
    pub popularity: f64,
    pub prerequisites: Vec<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
}

impl Course {
    /// Popularity with non-finite values degraded to 0.
    pub fn popularity_or_zero(&self) -> f64 {
        if self.popularity.is_finite() {
            self.popularity
        } else {
            0.0
        }
    }
}
