//! Settings API endpoints - JSON API

use axum::extract::State;
use axum::Json;
use templeacct_config::Config;

use crate::AppState;

const REDACTED: &str = "********";

/// Configuration with the backend token masked
pub fn redacted_config(config: &Config) -> Config {
    let mut config = config.clone();
    config.backend.auth_token = config.backend.auth_token.map(|_| REDACTED.to_string());
    config
}

pub async fn api_settings(State(state): State<AppState>) -> Json<Config> {
    Json(redacted_config(&state.config))
}
