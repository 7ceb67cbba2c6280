//! Trim table routes.
//!
//! ### `GET /readConfig`
//! The trim table built from the current options with stored markers and
//! advice carried over. Nothing is written.
//!
//! **Response:**
//! ```json
//! {
//!   "options": { ... },
//!   "markers": { "Main": { "Sheet": { "markers": "-,Red,Blue" } } },
//!   "conditions": {
//!     "Calm": { "Light": { "Upwind": {
//!       "Main": { "Sheet": { "marker": "Red", "advice": "-" } }
//!     } } }
//!   }
//! }
//! ```
//!
//! ### `POST /saveConfig`
//! Stores the posted table as is.
//!
//! **Response:** `200 OK`, `500` when the table could not be written.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::Value;

use sailtrim_core::ConfigTable;

use crate::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/readConfig", get(read_config))
        .route("/saveConfig", post(save_config))
}

/// GET /readConfig
async fn read_config(State(plugin): State<AppState>) -> Json<ConfigTable> {
    Json(plugin.read_config().await)
}

/// POST /saveConfig
async fn save_config(
    State(plugin): State<AppState>,
    Json(table): Json<Value>,
) -> Result<StatusCode, ApiError> {
    plugin.save_config(table).await?;
    Ok(StatusCode::OK)
}
