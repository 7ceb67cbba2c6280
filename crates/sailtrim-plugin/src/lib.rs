//! # sailtrim-plugin
//!
//! Runtime side of the Sail Trim plugin.
//!
//! This crate wires the pure engine from `sailtrim-core` to a host:
//! - plugin lifecycle (start, stop, reconfigure)
//! - the local telemetry subscription and its delivery task
//! - the BUILD → RECONCILE → PERSIST cycle of the trim table
//! - file based storage laid out like a SignalK config directory
//!
//! **Linux only** - requires tokio.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sailtrim_plugin::{FileConfigStorage, PluginSettings, SailTrimPlugin};
//!
//! let storage = Arc::new(FileConfigStorage::new("~/.signalk", PLUGIN_ID));
//! let plugin = SailTrimPlugin::new(storage, PluginSettings::default());
//! plugin.start(&telemetry_tx, delta_sink).await;
//! ```

pub mod plugin;
pub mod reload;
pub mod storage;
pub mod subscription;

pub use plugin::{PluginSettings, SailTrimPlugin};
pub use storage::FileConfigStorage;
pub use subscription::SubscriptionHandle;
