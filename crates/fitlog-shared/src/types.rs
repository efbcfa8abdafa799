//! Workout classification enums.
//!
//! Both enums are stored as lowercase TEXT in SQLite and serialized as
//! lowercase strings in JSON, so the serde names and `as_str` values must
//! stay in lock-step.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failed to parse an enum from its stored text form.
#[derive(Debug, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Category of a logged workout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Cardio,
    Strength,
    Flexibility,
    Sports,
    Other,
}

impl WorkoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Cardio => "cardio",
            WorkoutType::Strength => "strength",
            WorkoutType::Flexibility => "flexibility",
            WorkoutType::Sports => "sports",
            WorkoutType::Other => "other",
        }
    }
}

impl FromStr for WorkoutType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cardio" => Ok(WorkoutType::Cardio),
            "strength" => Ok(WorkoutType::Strength),
            "flexibility" => Ok(WorkoutType::Flexibility),
            "sports" => Ok(WorkoutType::Sports),
            "other" => Ok(WorkoutType::Other),
            _ => Err(ParseEnumError {
                kind: "workout type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Subjective effort level of a workout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Moderate => "moderate",
            Intensity::High => "high",
        }
    }
}

impl FromStr for Intensity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Intensity::Low),
            "moderate" => Ok(Intensity::Moderate),
            "high" => Ok(Intensity::High),
            _ => Err(ParseEnumError {
                kind: "intensity",
                value: s.to_string(),
            }),
        }
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Intensity::Moderate
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
