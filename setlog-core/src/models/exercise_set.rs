use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GatewayError;

/// A logged exercise performance, as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    #[serde(rename = "_id")]
    pub id: String,
    /// Identifier of the [`Exercise`](super::Exercise) this set belongs to
    pub exercise: String,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for ExerciseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reps = self
            .reps
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let weight = self
            .weight
            .map(|w| format!("{} kg", w))
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{} x {} on {}",
            reps,
            weight,
            self.created_at.format("%Y-%m-%d")
        )
    }
}

/// Request body for creating a set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSet {
    pub exercise: String,
    pub reps: Option<u32>,
    pub weight: Option<f64>,
}

impl NewSet {
    pub fn new(exercise: impl Into<String>) -> Self {
        Self {
            exercise: exercise.into(),
            reps: None,
            weight: None,
        }
    }

    pub fn with_reps(mut self, reps: u32) -> Self {
        self.reps = Some(reps);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Checks the fields that must hold before the set is sent anywhere.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.exercise.trim().is_empty() {
            return Err(GatewayError::ValidationFailure(
                "an exercise is required".to_string(),
            ));
        }
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(GatewayError::ValidationFailure(format!(
                    "weight must be a non-negative number, got {}",
                    weight
                )));
            }
        }
        Ok(())
    }
}

/// One page of sets for a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPage {
    pub items: Vec<ExerciseSet>,
    /// Always at least 1, even for an empty collection
    pub total_pages: u32,
}

impl SetPage {
    pub fn new(items: Vec<ExerciseSet>, total_pages: u32) -> Self {
        Self {
            items,
            total_pages: total_pages.max(1),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 1)
    }

    pub fn contains(&self, set_id: &str) -> bool {
        self.items.iter().any(|s| s.id == set_id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|s| s.id.as_str()).collect()
    }
}

impl Default for SetPage {
    fn default() -> Self {
        Self::empty()
    }
}
