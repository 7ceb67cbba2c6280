//! Carry user-entered markers and advice over to a freshly built table.
//!
//! The configuration decides the shape of the table; the stored table only
//! contributes values. A stored value is copied when the same key exists in
//! the fresh table and the value is not [`UNSET`]. Keys that disappeared
//! from the configuration are dropped.

use serde_json::Value;
use std::collections::HashMap;

use crate::table::{ConditionKey, ConfigTable, UNSET};

/// Values found for one key in a stored table.
///
/// Either field is `None` when it was missing or not a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredEntry {
    pub marker: Option<String>,
    pub advice: Option<String>,
}

/// A previously persisted table, indexed for lookup.
#[derive(Debug, Clone, Default)]
pub struct StoredTable {
    entries: HashMap<ConditionKey, StoredEntry>,
}

impl StoredTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index the `conditions` of a stored JSON table.
    ///
    /// Branches that are not objects are skipped, so a damaged file yields
    /// whatever entries are still intact.
    pub fn from_value(value: &Value) -> Self {
        let mut entries = HashMap::new();
        let Some(waves) = value.get("conditions").and_then(Value::as_object) else {
            return Self { entries };
        };

        for (wave, speeds) in waves {
            for (speed, angles) in objects(speeds) {
                for (angle, sails) in objects(angles) {
                    for (sail, parts) in objects(sails) {
                        for (part, leaf) in objects(parts) {
                            let key = ConditionKey::new(
                                wave.as_str(),
                                speed.as_str(),
                                angle.as_str(),
                                sail.as_str(),
                                part.as_str(),
                            );
                            entries.insert(
                                key,
                                StoredEntry {
                                    marker: string_field(leaf, "marker"),
                                    advice: string_field(leaf, "advice"),
                                },
                            );
                        }
                    }
                }
            }
        }

        Self { entries }
    }

    pub fn get(&self, key: &ConditionKey) -> Option<&StoredEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn objects(value: &Value) -> impl Iterator<Item = (&String, &Value)> {
    value.as_object().into_iter().flat_map(|map| map.iter())
}

fn string_field(leaf: &Value, field: &str) -> Option<String> {
    leaf.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Result of a reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub table: ConfigTable,
    /// Number of markers and advices taken from the stored table.
    pub carried: usize,
}

/// Overlay the stored values onto `fresh`.
pub fn reconcile(mut fresh: ConfigTable, stored: &StoredTable) -> Reconciled {
    let mut carried = 0;

    for (key, entry) in fresh.entries_mut() {
        let Some(prior) = stored.get(key) else {
            continue;
        };
        if let Some(marker) = informative(&prior.marker) {
            entry.marker = marker.to_string();
            carried += 1;
        }
        if let Some(advice) = informative(&prior.advice) {
            entry.advice = advice.to_string();
            carried += 1;
        }
    }

    Reconciled {
        table: fresh,
        carried,
    }
}

fn informative(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| *v != UNSET)
}
