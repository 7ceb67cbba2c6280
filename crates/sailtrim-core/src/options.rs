//! Plugin configuration model.
//!
//! The host options store keeps one document per plugin:
//!
//! ```json
//! { "enabled": true, "configuration": { "sails": [...], "wavePath": "...", "wave": [...], ... } }
//! ```
//!
//! The configuration is edited by users through a generated form and can be
//! incomplete or hand-edited, so it is read through [`TrimConfiguration::from_value`],
//! which keeps every well-formed piece and reports the rest as [`ConfigIssue`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::{RangeRule, SignalClass};

pub const DEFAULT_WAVE_PATH: &str = "navigation.attitude";
pub const DEFAULT_WIND_SPEED_PATH: &str = "environment.wind.speedTrue";
pub const DEFAULT_WIND_ANGLE_PATH: &str = "environment.wind.angleTrueWater";

/// Document stored by the host options store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginOptions {
    #[serde(default)]
    pub enabled: bool,

    /// Raw plugin configuration, see [`TrimConfiguration`].
    #[serde(default)]
    pub configuration: Value,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            configuration: TrimConfiguration::default().to_value(),
        }
    }
}

/// A sail with its performance related parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SailConfig {
    pub sail: String,
    #[serde(default)]
    pub parts: Vec<PartConfig>,
}

/// A trimmable part of a sail (sheet, traveller, cunningham, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartConfig {
    pub part: String,
    /// Comma separated marker names, e.g. "White,Blue,Green"
    #[serde(default)]
    pub markers: String,
}

/// Typed view of the plugin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimConfiguration {
    #[serde(default)]
    pub sails: Vec<SailConfig>,

    pub wave_path: String,
    #[serde(default)]
    pub wave: Vec<RangeRule>,

    pub wind_speed_path: String,
    #[serde(default)]
    pub wind_speed: Vec<RangeRule>,

    pub wind_angle_path: String,
    #[serde(default)]
    pub wind_angle: Vec<RangeRule>,
}

impl Default for TrimConfiguration {
    fn default() -> Self {
        Self {
            sails: Vec::new(),
            wave_path: DEFAULT_WAVE_PATH.to_string(),
            wave: Vec::new(),
            wind_speed_path: DEFAULT_WIND_SPEED_PATH.to_string(),
            wind_speed: Vec::new(),
            wind_angle_path: DEFAULT_WIND_ANGLE_PATH.to_string(),
            wind_angle: Vec::new(),
        }
    }
}

/// A structural problem found while reading the configuration.
///
/// Issues are never fatal: the offending section or entry is skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigIssue {
    #[error("configuration is not an object")]
    NotAnObject,

    #[error("missing section `{0}`")]
    MissingSection(String),

    #[error("section `{0}` is not a list")]
    NotAList(String),

    #[error("`{0}` is not a string, using default")]
    NotAString(String),

    #[error("entry {index} of `{section}` is malformed: {reason}")]
    MalformedEntry {
        section: String,
        index: usize,
        reason: String,
    },
}

impl TrimConfiguration {
    /// Read a configuration leniently.
    ///
    /// Missing paths fall back to their defaults; malformed sails, parts and
    /// rules are dropped and reported.
    pub fn from_value(value: &Value) -> (Self, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut config = Self::default();

        let Some(map) = value.as_object() else {
            issues.push(ConfigIssue::NotAnObject);
            return (config, issues);
        };

        read_path(map, "wavePath", &mut config.wave_path, &mut issues);
        read_path(map, "windSpeedPath", &mut config.wind_speed_path, &mut issues);
        read_path(map, "windAnglePath", &mut config.wind_angle_path, &mut issues);

        if let Some(items) = section(map, "sails", &mut issues) {
            config.sails = items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| read_sail(item, i, &mut issues))
                .collect();
        }

        for class in SignalClass::ALL {
            let Some(items) = section(map, class.as_str(), &mut issues) else {
                continue;
            };
            let rules = items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| read_rule(item, class.as_str(), index, &mut issues))
                .collect();
            *config.rules_mut(class) = rules;
        }

        (config, issues)
    }

    /// Serialize back into the raw form stored by the options store.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Range rules configured for a signal class.
    pub fn rules(&self, class: SignalClass) -> &[RangeRule] {
        match class {
            SignalClass::Wave => &self.wave,
            SignalClass::WindSpeed => &self.wind_speed,
            SignalClass::WindAngle => &self.wind_angle,
        }
    }

    fn rules_mut(&mut self, class: SignalClass) -> &mut Vec<RangeRule> {
        match class {
            SignalClass::Wave => &mut self.wave,
            SignalClass::WindSpeed => &mut self.wind_speed,
            SignalClass::WindAngle => &mut self.wind_angle,
        }
    }

    /// Telemetry path feeding a signal class.
    pub fn path(&self, class: SignalClass) -> &str {
        match class {
            SignalClass::Wave => &self.wave_path,
            SignalClass::WindSpeed => &self.wind_speed_path,
            SignalClass::WindAngle => &self.wind_angle_path,
        }
    }
}

fn read_path(
    map: &serde_json::Map<String, Value>,
    key: &str,
    target: &mut String,
    issues: &mut Vec<ConfigIssue>,
) {
    match map.get(key) {
        None => {}
        Some(Value::String(s)) => *target = s.clone(),
        Some(_) => issues.push(ConfigIssue::NotAString(key.to_string())),
    }
}

fn section<'a>(
    map: &'a serde_json::Map<String, Value>,
    key: &str,
    issues: &mut Vec<ConfigIssue>,
) -> Option<&'a Vec<Value>> {
    match map.get(key) {
        None => {
            issues.push(ConfigIssue::MissingSection(key.to_string()));
            None
        }
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            issues.push(ConfigIssue::NotAList(key.to_string()));
            None
        }
    }
}

fn read_sail(item: &Value, index: usize, issues: &mut Vec<ConfigIssue>) -> Option<SailConfig> {
    let malformed = |reason: &str| ConfigIssue::MalformedEntry {
        section: "sails".to_string(),
        index,
        reason: reason.to_string(),
    };

    let Some(name) = item.get("sail").and_then(Value::as_str) else {
        issues.push(malformed("missing sail name"));
        return None;
    };

    let parts_section = format!("sails[{index}].parts");
    let parts = match item.get("parts") {
        None => {
            issues.push(ConfigIssue::MissingSection(parts_section));
            Vec::new()
        }
        Some(Value::Array(parts)) => parts
            .iter()
            .enumerate()
            .filter_map(|(i, part)| read_part(part, &parts_section, i, issues))
            .collect(),
        Some(_) => {
            issues.push(ConfigIssue::NotAList(parts_section));
            Vec::new()
        }
    };

    Some(SailConfig {
        sail: name.to_string(),
        parts,
    })
}

/// A rule is kept as long as it has a name, so its label stays on the table
/// axis. A bound that is not a number becomes `None` and the rule never
/// matches.
fn read_rule(
    item: &Value,
    section: &str,
    index: usize,
    issues: &mut Vec<ConfigIssue>,
) -> Option<RangeRule> {
    let malformed = |reason: String| ConfigIssue::MalformedEntry {
        section: section.to_string(),
        index,
        reason,
    };

    let Some(label) = item.get("type").and_then(Value::as_str) else {
        issues.push(malformed("missing type name".to_string()));
        return None;
    };

    let mut bound = |field: &str| match item.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let number = value.as_f64();
            if number.is_none() {
                issues.push(malformed(format!("`{field}` of `{label}` is not a number")));
            }
            number
        }
    };
    let min = bound("min");
    let max = bound("max");

    Some(RangeRule {
        label: label.to_string(),
        min,
        max,
    })
}

/// A part is kept as long as it has a name; unreadable markers become empty.
fn read_part(
    item: &Value,
    section: &str,
    index: usize,
    issues: &mut Vec<ConfigIssue>,
) -> Option<PartConfig> {
    let malformed = |reason: String| ConfigIssue::MalformedEntry {
        section: section.to_string(),
        index,
        reason,
    };

    let Some(part) = item.get("part").and_then(Value::as_str) else {
        issues.push(malformed("missing part name".to_string()));
        return None;
    };

    let markers = match item.get("markers") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(markers)) => markers.clone(),
        Some(_) => {
            issues.push(malformed(format!("markers of `{part}` are not a string")));
            String::new()
        }
    };

    Some(PartConfig {
        part: part.to_string(),
        markers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "sails": [
                {"sail": "Main", "parts": [
                    {"part": "Sheet", "markers": "1,2,3"},
                    {"part": "Traveller", "markers": "A,B"}
                ]},
                {"sail": "Genoa", "parts": [{"part": "Car", "markers": "Red,Green"}]}
            ],
            "wavePath": "navigation.attitude",
            "wave": [{"type": "Flat", "min": 0, "max": 2}],
            "windSpeedPath": "environment.wind.speedApparent",
            "windSpeed": [{"type": "Light", "min": 0, "max": 6}, {"type": "Medium", "min": 6, "max": 15}],
            "windAnglePath": "environment.wind.angleApparent",
            "windAngle": [{"type": "Upwind", "min": 35, "max": 60}]
        })
    }

    #[test]
    fn test_read_complete_configuration() {
        let (config, issues) = TrimConfiguration::from_value(&sample());

        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
        assert_eq!(config.sails.len(), 2);
        assert_eq!(config.sails[0].parts[1].part, "Traveller");
        assert_eq!(config.wind_speed_path, "environment.wind.speedApparent");
        assert_eq!(config.rules(SignalClass::WindSpeed)[1].label, "Medium");
        assert_eq!(config.path(SignalClass::WindAngle), "environment.wind.angleApparent");
    }

    #[test]
    fn test_typed_deserialize_matches_lenient_read() {
        let typed: TrimConfiguration = serde_json::from_value(sample()).unwrap();
        let (lenient, _) = TrimConfiguration::from_value(&sample());
        assert_eq!(typed, lenient);
    }

    #[test]
    fn test_missing_paths_use_defaults() {
        let (config, issues) = TrimConfiguration::from_value(&json!({
            "sails": [], "wave": [], "windSpeed": [], "windAngle": []
        }));

        assert!(issues.is_empty());
        assert_eq!(config.wave_path, DEFAULT_WAVE_PATH);
        assert_eq!(config.wind_speed_path, DEFAULT_WIND_SPEED_PATH);
        assert_eq!(config.wind_angle_path, DEFAULT_WIND_ANGLE_PATH);
    }

    #[test]
    fn test_not_an_object() {
        let (config, issues) = TrimConfiguration::from_value(&json!("garbage"));
        assert_eq!(issues, vec![ConfigIssue::NotAnObject]);
        assert_eq!(config, TrimConfiguration::default());
    }

    #[test]
    fn test_missing_sections_are_reported() {
        let (config, issues) = TrimConfiguration::from_value(&json!({"wave": []}));

        assert!(issues.contains(&ConfigIssue::MissingSection("sails".to_string())));
        assert!(issues.contains(&ConfigIssue::MissingSection("windSpeed".to_string())));
        assert!(issues.contains(&ConfigIssue::MissingSection("windAngle".to_string())));
        assert!(config.sails.is_empty());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let (config, issues) = TrimConfiguration::from_value(&json!({
            "sails": [
                {"parts": []},
                {"sail": "Jib", "parts": [{"markers": "A"}, {"part": "Sheet"}]}
            ],
            "wave": [{"min": 0, "max": 1}, {"type": "Flat", "min": 0, "max": 1}],
            "windSpeed": "fast",
            "windAngle": [],
            "wavePath": 42
        }));

        assert_eq!(config.sails.len(), 1);
        assert_eq!(config.sails[0].sail, "Jib");
        assert_eq!(config.sails[0].parts.len(), 1);
        assert_eq!(config.sails[0].parts[0].markers, "");
        assert_eq!(config.wave.len(), 1);
        assert_eq!(config.wave_path, DEFAULT_WAVE_PATH);
        assert!(issues.contains(&ConfigIssue::NotAList("windSpeed".to_string())));
        assert!(issues.contains(&ConfigIssue::NotAString("wavePath".to_string())));
        assert_eq!(
            issues
                .iter()
                .filter(|i| matches!(i, ConfigIssue::MalformedEntry { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn test_bad_bounds_and_markers_keep_the_entry() {
        let (config, issues) = TrimConfiguration::from_value(&json!({
            "sails": [{"sail": "Main", "parts": [{"part": "Sheet", "markers": 7}]}],
            "wave": [],
            "windSpeed": [{"type": "Light", "min": "0", "max": 4}],
            "windAngle": [{"type": "Upwind", "min": 35}]
        }));

        assert_eq!(config.sails[0].parts.len(), 1);
        assert_eq!(config.sails[0].parts[0].markers, "");
        assert_eq!(config.wind_speed.len(), 1);
        assert_eq!(config.wind_speed[0].label, "Light");
        assert_eq!(config.wind_speed[0].min, None);
        assert_eq!(config.wind_speed[0].max, Some(4.0));
        assert_eq!(config.wind_angle[0].max, None);
        assert_eq!(
            issues
                .iter()
                .filter(|i| matches!(i, ConfigIssue::MalformedEntry { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_default_plugin_options() {
        let options = PluginOptions::default();
        assert!(options.enabled);
        assert_eq!(options.configuration["wavePath"], DEFAULT_WAVE_PATH);
        assert_eq!(options.configuration["sails"], json!([]));
    }

    #[test]
    fn test_plugin_options_deserialize_partial() {
        let options: PluginOptions = serde_json::from_str(r#"{"enabled": true}"#).unwrap();
        assert!(options.enabled);
        assert_eq!(options.configuration, Value::Null);
    }
}
