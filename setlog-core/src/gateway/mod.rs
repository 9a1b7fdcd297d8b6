//! Remote collection gateway.
//!
//! A thin translation layer between typed requests and the backend's `sets`
//! and `exercises` endpoints. It holds no cached data and never retries.

mod http;

#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::models::{Exercise, NewExercise, NewSet, SetPage};
use crate::query::QueryParams;

pub use http::{HttpGateway, Session, DEFAULT_TIMEOUT};

#[async_trait]
pub trait SetGateway: Send + Sync {
    /// Reads one page of sets matching `params`.
    async fn list_sets(&self, params: &QueryParams) -> Result<SetPage, GatewayError>;

    async fn create_set(&self, new_set: &NewSet) -> Result<(), GatewayError>;

    async fn delete_set(&self, set_id: &str) -> Result<(), GatewayError>;

    /// Reads every exercise. The endpoint is not paginated.
    async fn list_exercises(&self) -> Result<Vec<Exercise>, GatewayError>;

    async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise, GatewayError>;

    async fn create_exercise(&self, new_exercise: &NewExercise)
        -> Result<Exercise, GatewayError>;
}
