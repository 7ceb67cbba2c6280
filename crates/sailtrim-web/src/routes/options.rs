//! Plugin options routes.
//!
//! ### `GET /schema`
//! JSON schema of the configuration form.
//!
//! ### `GET /options`
//! The stored options document, `{"enabled": ..., "configuration": {...}}`.
//! Defaults are returned when nothing was saved yet.
//!
//! ### `POST /saveOptions`
//! Body is the bare configuration object. It replaces the stored
//! configuration, the router picks up new paths and ranges, and the trim
//! table is rebuilt.
//!
//! **Response:** `200 OK`, `500` when the options could not be written.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tracing::debug;

use sailtrim_core::PluginOptions;

use crate::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schema", get(get_schema))
        .route("/options", get(get_options))
        .route("/saveOptions", post(save_options))
}

/// GET /schema
async fn get_schema() -> Json<Value> {
    Json(sailtrim_core::schema::schema())
}

/// GET /options
async fn get_options(State(plugin): State<AppState>) -> Json<PluginOptions> {
    Json(plugin.options())
}

/// POST /saveOptions
async fn save_options(
    State(plugin): State<AppState>,
    Json(configuration): Json<Value>,
) -> Result<StatusCode, ApiError> {
    debug!("Saving plugin options");
    plugin.save_options(configuration).await?;
    Ok(StatusCode::OK)
}
