//! # sailtrim-core
//!
//! Core engine of the Sail Trim plugin.
//!
//! This crate provides:
//! - SignalK delta types (input telemetry and emitted conditions)
//! - Plugin configuration model and its JSON schema
//! - Running average smoothing and range classification
//! - Telemetry routing with transition detection
//! - The trim table: building it from configuration and merging stored values
//! - Storage abstraction for plugin options and the trim table
//!
//! This crate is intentionally runtime-agnostic and contains no async code
//! and no I/O. Everything here is a pure transform or an in-memory state
//! machine; the plugin crate wires it to tokio and the filesystem.

pub mod average;
pub mod builder;
pub mod classify;
pub mod merge;
pub mod model;
pub mod options;
pub mod router;
pub mod schema;
pub mod storage;
pub mod table;

pub use average::RunningAverage;
pub use builder::{build, build_from, build_with_issues};
pub use classify::{ConditionSet, CurrentCondition, RangeRule, SignalClass};
pub use merge::{reconcile, Reconciled, StoredEntry, StoredTable};
pub use model::*;
pub use options::{ConfigIssue, PartConfig, PluginOptions, SailConfig, TrimConfiguration};
pub use router::{ConditionChange, TelemetryRouter};
pub use storage::{ConfigError, ConfigStorage, MemoryStorage};
pub use table::{ConditionEntry, ConditionKey, ConfigTable, SailPart, UNSET};

/// Plugin identifier, also used as `$source` on emitted deltas.
pub const PLUGIN_ID: &str = "signalk-trim-plugin";

/// Human-readable plugin name.
pub const PLUGIN_NAME: &str = "Sail Trim plugin";

/// Plugin description shown in the admin UI.
pub const PLUGIN_DESCRIPTION: &str =
    "Signal K server plugin that helps with trim. Auto detects conditions and allows custom markers.";
