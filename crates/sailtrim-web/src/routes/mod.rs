//! HTTP route handlers of the plugin.

pub mod options;
pub mod table;

use axum::Router;

use crate::AppState;

/// Create the plugin router with all routes.
///
/// Paths are relative; the host decides where to mount them.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(options::routes())
        .merge(table::routes())
        .with_state(state)
}
