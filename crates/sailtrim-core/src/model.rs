//! SignalK delta and subscription types.
//!
//! Only the parts of the SignalK model the plugin consumes or produces:
//! - Delta messages carrying telemetry in and condition labels out
//! - Local subscription requests registered with the host

use serde::{Deserialize, Serialize};

/// A SignalK delta message containing one or more updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// The context path (e.g., "vessels.urn:mrn:signalk:uuid:...")
    /// If None, defaults to "vessels.self"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// The list of updates in this delta
    pub updates: Vec<Update>,
}

impl Delta {
    /// Build a delta carrying a single path-value pair.
    pub fn single(
        path: impl Into<String>,
        value: serde_json::Value,
        source_ref: Option<String>,
        timestamp: Option<String>,
    ) -> Self {
        Self {
            context: None,
            updates: vec![Update {
                source_ref,
                timestamp,
                values: vec![PathValue {
                    path: path.into(),
                    value,
                }],
            }],
        }
    }

    /// Iterate over every path-value pair across all updates.
    pub fn values(&self) -> impl Iterator<Item = &PathValue> {
        self.updates.iter().flat_map(|u| u.values.iter())
    }
}

/// A single update within a delta, containing values from one source at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Reference to source in /sources (e.g., "nmea0183.GP")
    #[serde(rename = "$source", skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,

    /// ISO 8601 timestamp (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// The path-value pairs in this update
    pub values: Vec<PathValue>,
}

/// A single path-value pair within an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathValue {
    /// The SignalK path (e.g., "environment.wind.speedTrue")
    pub path: String,

    /// The value at this path
    pub value: serde_json::Value,
}

/// Subscription registered by the plugin with the host.
///
/// The plugin listens on all contexts (`*`) for a fixed set of paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub context: String,
    pub subscribe: Vec<Subscription>,
}

/// A single subscribed path with its delivery period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub path: String,
    /// Delivery period in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u64>,
}

impl SubscribeRequest {
    /// Subscribe to the given paths on every context with a common period.
    pub fn all_contexts<I, P>(paths: I, period_ms: u64) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            context: "*".to_string(),
            subscribe: paths
                .into_iter()
                .map(|p| Subscription {
                    path: p.into(),
                    period: Some(period_ms),
                })
                .collect(),
        }
    }

    /// Check whether a value at `path` in `context` is covered by this request.
    pub fn matches(&self, context: &str, path: &str) -> bool {
        let context_ok = self.context == "*" || self.context == context;
        context_ok && self.subscribe.iter().any(|s| s.path == path)
    }
}
