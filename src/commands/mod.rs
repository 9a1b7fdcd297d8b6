mod auth;
mod config_cmd;
mod exercises;
mod sets;

use std::sync::Arc;

use clap::ValueEnum;
use setlog_core::{AppContext, FileTokenStore, HttpGateway, TokenStore};

use crate::config::Config;

pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
pub use exercises::ExercisesCommand;
pub use sets::SetsCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Token store at the configured path.
pub fn token_store(config: &Config) -> Arc<FileTokenStore> {
    Arc::new(FileTokenStore::new(config.token_path.value.clone()))
}

/// HTTP gateway for the configured API, sharing the file token store.
pub fn http_gateway(config: &Config) -> Result<Arc<HttpGateway>, Box<dyn std::error::Error>> {
    let tokens: Arc<dyn TokenStore> = token_store(config);
    let gateway =
        HttpGateway::with_timeout(config.require_api_url()?, tokens, config.request_timeout())?;
    Ok(Arc::new(gateway))
}

/// Shared store, exercise cache and gateway for one CLI invocation.
pub fn app_context(config: &Config) -> Result<AppContext, Box<dyn std::error::Error>> {
    Ok(AppContext::new(http_gateway(config)?))
}
