//! # sailtrim-web
//!
//! REST API of the Sail Trim plugin.
//!
//! The host mounts the router under `/plugins/signalk-trim-plugin`:
//!
//! - `GET /schema` - configuration schema for the admin UI
//! - `GET /options` - stored plugin options
//! - `POST /saveOptions` - replace the configuration and reload
//! - `GET /readConfig` - the trim table with stored values merged in
//! - `POST /saveConfig` - store an edited trim table
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sailtrim_web::create_router;
//!
//! let app = Router::new().nest("/plugins/signalk-trim-plugin", create_router(plugin));
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::create_router;

use std::sync::Arc;

use sailtrim_plugin::SailTrimPlugin;

/// Type alias for shared state in Axum handlers.
pub type AppState = Arc<SailTrimPlugin>;
