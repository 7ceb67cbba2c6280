//! Range classification of smoothed telemetry.
//!
//! Each signal class has an ordered list of [`RangeRule`]s. A value is
//! labelled by scanning every rule: the last rule whose closed range
//! contains the value wins, so overlapping ranges resolve by list order.
//! No matching rule yields the empty label.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A category of telemetry with its own rules and smoothing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignalClass {
    Wave,
    WindSpeed,
    WindAngle,
}

impl SignalClass {
    pub const ALL: [SignalClass; 3] = [
        SignalClass::Wave,
        SignalClass::WindSpeed,
        SignalClass::WindAngle,
    ];

    /// Wire name, also the configuration key holding the class's rules.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalClass::Wave => "wave",
            SignalClass::WindSpeed => "windSpeed",
            SignalClass::WindAngle => "windAngle",
        }
    }

    /// SignalK path the current label is published under.
    pub fn output_path(&self) -> String {
        format!("environment.sailtrim.{}", self.as_str())
    }
}

impl fmt::Display for SignalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named closed range `[min, max]`.
///
/// A rule with either bound missing never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeRule {
    #[serde(rename = "type")]
    pub label: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeRule {
    pub fn new(label: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            label: label.into(),
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => value >= min && value <= max,
            _ => false,
        }
    }
}

/// Ordered rules for one signal class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSet {
    rules: Vec<RangeRule>,
}

impl ConditionSet {
    pub fn new(rules: Vec<RangeRule>) -> Self {
        Self { rules }
    }

    /// Label for `value`; empty when no rule matches.
    ///
    /// Does not stop at the first match.
    pub fn classify(&self, value: f64) -> &str {
        let mut label = "";
        for rule in &self.rules {
            if rule.contains(value) {
                label = &rule.label;
            }
        }
        label
    }

    pub fn rules(&self) -> &[RangeRule] {
        &self.rules
    }
}

impl From<Vec<RangeRule>> for ConditionSet {
    fn from(rules: Vec<RangeRule>) -> Self {
        Self::new(rules)
    }
}

/// Active label per signal class.
///
/// Every class starts out with the empty label.
#[derive(Debug, Clone, Default)]
pub struct CurrentCondition {
    labels: HashMap<SignalClass, String>,
}

impl CurrentCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, class: SignalClass) -> &str {
        self.labels.get(&class).map(String::as_str).unwrap_or("")
    }

    /// Record `label` for `class`, returning true if it differs from the
    /// active label.
    pub fn transition(&mut self, class: SignalClass, label: &str) -> bool {
        if self.get(class) == label {
            return false;
        }
        self.labels.insert(class, label.to_string());
        true
    }

    pub fn reset(&mut self) {
        self.labels.clear();
    }
}
