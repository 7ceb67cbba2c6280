//! The trim table.
//!
//! For every combination of wave label, wind speed label, wind angle label,
//! sail and sail part the table holds one [`ConditionEntry`]: the marker the
//! crew set the part to and a free-text advice.
//!
//! Entries live in a single map keyed by [`ConditionKey`]. The declaration
//! order of labels, sails and parts is kept alongside so the JSON form the
//! web UI consumes lists them in the order the user configured:
//!
//! ```json
//! {
//!   "options": { ... },
//!   "markers": { "Main": { "Sheet": { "markers": "-,White,Blue" } } },
//!   "conditions": {
//!     "Calm": { "Light": { "Upwind": { "Main": { "Sheet": { "marker": "-", "advice": "-" } } } } }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::classify::SignalClass;

/// Marker and advice value meaning "not set".
pub const UNSET: &str = "-";

/// Position of an entry in the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConditionKey {
    pub wave: String,
    pub wind_speed: String,
    pub wind_angle: String,
    pub sail: String,
    pub part: String,
}

impl ConditionKey {
    pub fn new(
        wave: impl Into<String>,
        wind_speed: impl Into<String>,
        wind_angle: impl Into<String>,
        sail: impl Into<String>,
        part: impl Into<String>,
    ) -> Self {
        Self {
            wave: wave.into(),
            wind_speed: wind_speed.into(),
            wind_angle: wind_angle.into(),
            sail: sail.into(),
            part: part.into(),
        }
    }
}

/// User-editable values for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub marker: String,
    pub advice: String,
}

impl Default for ConditionEntry {
    fn default() -> Self {
        Self {
            marker: UNSET.to_string(),
            advice: UNSET.to_string(),
        }
    }
}

/// A part of a sail and the markers it can be set to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SailPart {
    pub sail: String,
    pub part: String,
    /// Ordered and free of duplicates, always starting with [`UNSET`].
    pub allowed_markers: Vec<String>,
}

impl SailPart {
    /// Parse a comma separated marker list.
    pub fn new(sail: impl Into<String>, part: impl Into<String>, markers: &str) -> Self {
        let mut allowed_markers = vec![UNSET.to_string()];
        for marker in markers.split(',').map(str::trim).filter(|m| !m.is_empty()) {
            if !allowed_markers.iter().any(|m| m == marker) {
                allowed_markers.push(marker.to_string());
            }
        }
        Self {
            sail: sail.into(),
            part: part.into(),
            allowed_markers,
        }
    }

    /// Comma separated form used on the wire.
    pub fn markers_string(&self) -> String {
        self.allowed_markers.join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Sail {
    name: String,
    parts: Vec<SailPart>,
}

/// Complete trim table derived from one configuration snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTable {
    options: Value,
    labels: [Vec<String>; 3],
    sails: Vec<Sail>,
    entries: HashMap<ConditionKey, ConditionEntry>,
}

impl ConfigTable {
    /// Table without labels or sails.
    pub fn new(options: Value) -> Self {
        Self {
            options,
            labels: Default::default(),
            sails: Vec::new(),
            entries: HashMap::new(),
        }
    }

    /// Append a label to a class axis. Duplicates are ignored.
    pub(crate) fn push_label(&mut self, class: SignalClass, label: &str) {
        let axis = &mut self.labels[axis_index(class)];
        if !axis.iter().any(|l| l == label) {
            axis.push(label.to_string());
        }
    }

    /// Declare a sail with its parts.
    ///
    /// Declaring a sail name again replaces its parts but keeps its position.
    /// Within one sail a repeated part name replaces the earlier part.
    pub(crate) fn put_sail(&mut self, name: &str, parts: Vec<SailPart>) {
        let mut unique: Vec<SailPart> = Vec::with_capacity(parts.len());
        for part in parts {
            match unique.iter_mut().find(|p| p.part == part.part) {
                Some(existing) => *existing = part,
                None => unique.push(part),
            }
        }

        match self.sails.iter_mut().find(|s| s.name == name) {
            Some(sail) => sail.parts = unique,
            None => self.sails.push(Sail {
                name: name.to_string(),
                parts: unique,
            }),
        }
    }

    /// Create a default entry for every key implied by the axes.
    pub(crate) fn populate(&mut self) {
        let entries = self
            .keys()
            .map(|key| (key, ConditionEntry::default()))
            .collect();
        self.entries = entries;
    }

    /// Raw configuration snapshot the table was built from.
    pub fn options(&self) -> &Value {
        &self.options
    }

    /// Labels of a class in declaration order.
    pub fn labels(&self, class: SignalClass) -> &[String] {
        &self.labels[axis_index(class)]
    }

    /// Sail names in declaration order.
    pub fn sail_names(&self) -> impl Iterator<Item = &str> {
        self.sails.iter().map(|s| s.name.as_str())
    }

    /// All parts of one sail.
    pub fn parts_for(&self, sail: &str) -> &[SailPart] {
        self.sails
            .iter()
            .find(|s| s.name == sail)
            .map(|s| s.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Every part of every sail.
    pub fn parts(&self) -> impl Iterator<Item = &SailPart> {
        self.sails.iter().flat_map(|s| s.parts.iter())
    }

    /// Every key in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = ConditionKey> + '_ {
        let [waves, speeds, angles] = &self.labels;
        waves.iter().flat_map(move |wave| {
            speeds.iter().flat_map(move |speed| {
                angles.iter().flat_map(move |angle| {
                    self.parts().map(move |p| {
                        ConditionKey::new(wave, speed, angle, p.sail.as_str(), p.part.as_str())
                    })
                })
            })
        })
    }

    pub fn get(&self, key: &ConditionKey) -> Option<&ConditionEntry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &ConditionKey) -> Option<&mut ConditionEntry> {
        self.entries.get_mut(key)
    }

    /// Mutable access to every entry, in no particular order.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = (&ConditionKey, &mut ConditionEntry)> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nested JSON form persisted to disk and served to the web UI.
    pub fn to_value(&self) -> Value {
        let mut markers = Map::new();
        for sail in &self.sails {
            let parts: Map<String, Value> = sail
                .parts
                .iter()
                .map(|p| (p.part.clone(), json!({ "markers": p.markers_string() })))
                .collect();
            markers.insert(sail.name.clone(), Value::Object(parts));
        }

        let mut conditions = Map::new();
        if !self.entries.is_empty() {
            let [waves, speeds, angles] = &self.labels;
            for wave in waves {
                let mut by_speed = Map::new();
                for speed in speeds {
                    let mut by_angle = Map::new();
                    for angle in angles {
                        let mut by_sail = Map::new();
                        for sail in &self.sails {
                            let mut by_part = Map::new();
                            for part in &sail.parts {
                                let key = ConditionKey::new(
                                    wave.as_str(),
                                    speed.as_str(),
                                    angle.as_str(),
                                    sail.name.as_str(),
                                    part.part.as_str(),
                                );
                                let entry = self.entries.get(&key).cloned().unwrap_or_default();
                                by_part.insert(part.part.clone(), json!(entry));
                            }
                            by_sail.insert(sail.name.clone(), Value::Object(by_part));
                        }
                        by_angle.insert(angle.clone(), Value::Object(by_sail));
                    }
                    by_speed.insert(speed.clone(), Value::Object(by_angle));
                }
                conditions.insert(wave.clone(), Value::Object(by_speed));
            }
        }

        json!({
            "options": self.options,
            "markers": markers,
            "conditions": conditions,
        })
    }
}

impl Serialize for ConfigTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn axis_index(class: SignalClass) -> usize {
    match class {
        SignalClass::Wave => 0,
        SignalClass::WindSpeed => 1,
        SignalClass::WindAngle => 2,
    }
}
