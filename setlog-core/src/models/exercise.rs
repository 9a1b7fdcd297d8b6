use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// A named activity that sets are logged against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Request body for creating an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewExercise {
    pub name: String,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
}

impl NewExercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.name.trim().is_empty() {
            return Err(GatewayError::ValidationFailure(
                "exercise name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
