use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column a set page is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "reps")]
    Reps,
    #[serde(rename = "weight")]
    Weight,
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
}

impl SortKey {
    /// Value sent in the `typeSort` query parameter.
    pub fn as_wire(&self) -> &'static str {
        match self {
            SortKey::Reps => "reps",
            SortKey::Weight => "weight",
            SortKey::CreatedAt => "createdAt",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Reps => write!(f, "reps"),
            SortKey::Weight => write!(f, "weight"),
            SortKey::CreatedAt => write!(f, "date"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reps" => Ok(SortKey::Reps),
            "weight" => Ok(SortKey::Weight),
            "date" | "createdat" | "created-at" | "created_at" => Ok(SortKey::CreatedAt),
            _ => Err(format!(
                "Invalid sort key '{}'. Valid options: reps, weight, date",
                s
            )),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order '{}'. Valid options: asc, desc", s)),
        }
    }
}
