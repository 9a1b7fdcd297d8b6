//! HTTP implementation of the gateway, backed by reqwest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::SetGateway;
use crate::error::GatewayError;
use crate::models::{Exercise, ExerciseSet, NewExercise, NewSet, SetPage};
use crate::query::QueryParams;
use crate::session::TokenStore;

/// Upper bound for any single request, including connect time.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of `GET /sets`.
#[derive(Debug, Deserialize)]
struct SetListResponse {
    sets: Vec<ExerciseSet>,
    #[serde(rename = "totalPages")]
    total_pages: u32,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Result of a successful `POST /users/authenticate`.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub message: String,
}

/// Error bodies look like `{"message": "..."}`; anything else is passed through.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Gateway talking to the REST backend.
///
/// Every call except [`HttpGateway::authenticate`] sends the stored session
/// token in the `authorization` header. A `401` clears that token.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, GatewayError> {
        Self::with_timeout(base_url, tokens, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::NetworkFailure(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            tokens,
        })
    }

    /// Returns the base API URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchanges credentials for a session token and stores it.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(GatewayError::ValidationFailure(
                "email and password are required".to_string(),
            ));
        }

        let url = self.build_url("/users/authenticate");
        tracing::debug!(%url, "authenticating");

        let response = self
            .client
            .post(&url)
            .json(&Credentials { email, password })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Wrong credentials; there is no session to end here.
            return Err(GatewayError::Unauthorized);
        }
        let session: Session = check_status(response).await?.json().await?;

        self.tokens
            .save(&session.token)
            .map_err(|e| GatewayError::ValidationFailure(format!("cannot store token: {}", e)))?;

        Ok(session)
    }

    /// Attaches the session token, or fails without sending anything if
    /// there is none.
    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, GatewayError> {
        let token = self.tokens.load().ok_or(GatewayError::Unauthorized)?;
        Ok(request.header(reqwest::header::AUTHORIZATION, token))
    }

    /// Sends an authorized request and classifies the response status.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = self.authorized(request)?.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.end_session();
            return Err(GatewayError::Unauthorized);
        }

        check_status(response).await
    }

    fn end_session(&self) {
        tracing::info!("session token rejected, clearing it");
        if let Err(e) = self.tokens.clear() {
            tracing::warn!("Failed to clear session token: {}", e);
        }
    }

    /// Builds a URL for a given path.
    fn build_url(&self, path: &str) -> String {
        let base_url = if !self.base_url.starts_with("http://")
            && !self.base_url.starts_with("https://")
        {
            format!("http://{}", self.base_url)
        } else {
            self.base_url.clone()
        };

        format!("{}{}", base_url.trim_end_matches('/'), path)
    }
}

/// Maps a non-2xx response to [`GatewayError::ServerFault`].
async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    };

    tracing::debug!(status = status.as_u16(), %message, "request failed");
    Err(GatewayError::ServerFault {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SetGateway for HttpGateway {
    async fn list_sets(&self, params: &QueryParams) -> Result<SetPage, GatewayError> {
        let url = self.build_url("/sets");
        tracing::debug!(%url, page = params.page(), "listing sets");

        let request = self.client.get(&url).query(&params.to_query_pairs());
        let body: SetListResponse = self.execute(request).await?.json().await?;

        Ok(SetPage::new(body.sets, body.total_pages))
    }

    async fn create_set(&self, new_set: &NewSet) -> Result<(), GatewayError> {
        new_set.validate()?;

        let url = self.build_url("/sets");
        tracing::debug!(%url, exercise = %new_set.exercise, "creating set");

        self.execute(self.client.post(&url).json(new_set)).await?;
        Ok(())
    }

    async fn delete_set(&self, set_id: &str) -> Result<(), GatewayError> {
        if set_id.is_empty() {
            return Err(GatewayError::ValidationFailure(
                "set id cannot be empty".to_string(),
            ));
        }

        let url = self.build_url(&format!("/sets/{}", urlencoding::encode(set_id)));
        tracing::debug!(%url, "deleting set");

        self.execute(self.client.delete(&url)).await?;
        Ok(())
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>, GatewayError> {
        let url = self.build_url("/exercises");
        tracing::debug!(%url, "listing exercises");

        let exercises = self.execute(self.client.get(&url)).await?.json().await?;
        Ok(exercises)
    }

    async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise, GatewayError> {
        let url = self.build_url(&format!("/exercises/{}", urlencoding::encode(exercise_id)));
        tracing::debug!(%url, "fetching exercise");

        let exercise = self.execute(self.client.get(&url)).await?.json().await?;
        Ok(exercise)
    }

    async fn create_exercise(
        &self,
        new_exercise: &NewExercise,
    ) -> Result<Exercise, GatewayError> {
        new_exercise.validate()?;

        let url = self.build_url("/exercises");
        tracing::debug!(%url, name = %new_exercise.name, "creating exercise");

        let exercise = self
            .execute(self.client.post(&url).json(new_exercise))
            .await?
            .json()
            .await?;
        Ok(exercise)
    }
}
