//! Routing of telemetry updates to per-class classifiers.

use serde_json::Value;

use crate::average::RunningAverage;
use crate::classify::{ConditionSet, CurrentCondition, SignalClass};
use crate::model::Delta;
use crate::options::TrimConfiguration;

/// Radians to degrees.
pub const RAD_TO_DEG: f64 = 57.29577;

/// Metres per second to knots.
pub const MPS_TO_KNOTS: f64 = 1.94384;

/// A label transition detected for one signal class.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionChange {
    pub class: SignalClass,
    /// New label, empty when the value left every configured range.
    pub label: String,
    /// Smoothed value in display units (degrees or knots) that caused the change.
    pub value: f64,
}

impl ConditionChange {
    /// Delta publishing the new label under `environment.sailtrim.<class>`.
    pub fn to_delta(&self, source_ref: &str, timestamp: Option<String>) -> Delta {
        Delta::single(
            self.class.output_path(),
            Value::String(self.label.clone()),
            Some(source_ref.to_string()),
            timestamp,
        )
    }
}

#[derive(Debug, Clone)]
struct Channel {
    path: String,
    rules: ConditionSet,
    average: RunningAverage,
}

impl Channel {
    fn new(path: &str, rules: ConditionSet) -> Self {
        Self {
            path: path.to_string(),
            rules,
            average: RunningAverage::new(),
        }
    }
}

/// Dispatches telemetry to the classifier of its signal class and keeps the
/// current condition.
///
/// One router per running plugin. It is not shared between threads; the
/// caller serializes updates.
#[derive(Debug, Clone)]
pub struct TelemetryRouter {
    channels: [Channel; 3],
    current: CurrentCondition,
}

impl TelemetryRouter {
    pub fn new(config: &TrimConfiguration) -> Self {
        Self {
            channels: SignalClass::ALL.map(|class| {
                Channel::new(config.path(class), config.rules(class).to_vec().into())
            }),
            current: CurrentCondition::new(),
        }
    }

    /// Replace paths and rules.
    ///
    /// A class whose path changed starts with an empty smoothing window;
    /// current labels are kept so the next update only reports real changes.
    pub fn reconfigure(&mut self, config: &TrimConfiguration) {
        for class in SignalClass::ALL {
            let channel = &mut self.channels[index(class)];
            if channel.path != config.path(class) {
                channel.path = config.path(class).to_string();
                channel.average.clear();
            }
            channel.rules = config.rules(class).to_vec().into();
        }
    }

    /// Subscribed path of each class, in class order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.path.as_str())
    }

    pub fn current(&self, class: SignalClass) -> &str {
        self.current.get(class)
    }

    /// Signal class fed by `path`, if any.
    ///
    /// When several classes share a path the first one in class order wins.
    pub fn class_for(&self, path: &str) -> Option<SignalClass> {
        SignalClass::ALL
            .into_iter()
            .find(|class| self.channels[index(*class)].path == path)
    }

    /// Handle one path/value update.
    ///
    /// Returns a change only when the label of the class differs from the
    /// current one. Unknown paths and non-numeric payloads are ignored.
    pub fn on_update(&mut self, path: &str, value: &Value) -> Option<ConditionChange> {
        let class = self.class_for(path)?;
        let raw = extract_scalar(class, value)?;

        let channel = &mut self.channels[index(class)];
        let smoothed = channel.average.update(raw);
        let converted = match class {
            SignalClass::WindSpeed => smoothed * MPS_TO_KNOTS,
            SignalClass::Wave | SignalClass::WindAngle => (smoothed * RAD_TO_DEG).abs(),
        };

        let label = channel.rules.classify(converted);
        if !self.current.transition(class, label) {
            return None;
        }

        Some(ConditionChange {
            class,
            label: label.to_string(),
            value: converted,
        })
    }

    /// Handle every value of every update in a delta.
    pub fn handle_delta(&mut self, delta: &Delta) -> Vec<ConditionChange> {
        delta
            .values()
            .filter_map(|pv| self.on_update(&pv.path, &pv.value))
            .collect()
    }
}

fn index(class: SignalClass) -> usize {
    match class {
        SignalClass::Wave => 0,
        SignalClass::WindSpeed => 1,
        SignalClass::WindAngle => 2,
    }
}

/// Numeric sample carried by a payload. Attitude objects yield their pitch.
fn extract_scalar(class: SignalClass, value: &Value) -> Option<f64> {
    match (class, value) {
        (SignalClass::Wave, Value::Object(map)) => map.get("pitch").and_then(Value::as_f64),
        _ => value.as_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RangeRule;
    use serde_json::json;

    fn config() -> TrimConfiguration {
        TrimConfiguration {
            wave: vec![
                RangeRule::new("Flat", 0.0, 2.0),
                RangeRule::new("Choppy", 2.0, 90.0),
            ],
            wind_speed: vec![
                RangeRule::new("Light", 0.0, 3.88768),
                RangeRule::new("Medium", 3.88769, 15.0),
            ],
            wind_angle: vec![
                RangeRule::new("Upwind", 30.0, 60.0),
                RangeRule::new("Reach", 60.0, 120.0),
            ],
            ..TrimConfiguration::default()
        }
    }

    #[test]
    fn test_wind_speed_converted_to_knots() {
        let mut router = TelemetryRouter::new(&config());

        let change = router
            .on_update("environment.wind.speedTrue", &json!(2.0))
            .unwrap();
        assert_eq!(change.class, SignalClass::WindSpeed);
        assert_eq!(change.value, 3.88768);
        // Exactly on the upper bound of "Light"
        assert_eq!(change.label, "Light");
    }

    #[test]
    fn test_wind_speed_just_above_boundary() {
        let mut router = TelemetryRouter::new(&config());

        let change = router
            .on_update("environment.wind.speedTrue", &json!(2.0001))
            .unwrap();
        assert_eq!(change.label, "Medium");
    }

    #[test]
    fn test_wind_angle_converted_to_degrees() {
        let mut router = TelemetryRouter::new(&config());

        // -0.785 rad is about 45 degrees off the bow to port
        let change = router
            .on_update("environment.wind.angleTrueWater", &json!(-0.785))
            .unwrap();
        assert_eq!(change.label, "Upwind");
        assert!((change.value - 44.977).abs() < 0.01);
    }

    #[test]
    fn test_wave_uses_pitch_of_attitude() {
        let mut router = TelemetryRouter::new(&config());

        let change = router
            .on_update(
                "navigation.attitude",
                &json!({"roll": 0.3, "pitch": -0.1, "yaw": 2.0}),
            )
            .unwrap();
        assert_eq!(change.class, SignalClass::Wave);
        assert_eq!(change.label, "Choppy");
        assert!((change.value - 5.729577).abs() < 1e-9);
    }

    #[test]
    fn test_wave_scalar_payload() {
        let mut router = TelemetryRouter::new(&config());
        let change = router.on_update("navigation.attitude", &json!(0.01)).unwrap();
        assert_eq!(change.label, "Flat");
    }

    #[test]
    fn test_no_event_without_transition() {
        let mut router = TelemetryRouter::new(&config());

        assert!(router
            .on_update("environment.wind.speedTrue", &json!(1.0))
            .is_some());
        assert!(router
            .on_update("environment.wind.speedTrue", &json!(1.0))
            .is_none());
        assert_eq!(router.current(SignalClass::WindSpeed), "Light");
    }

    #[test]
    fn test_out_of_range_from_empty_is_silent() {
        let mut router = TelemetryRouter::new(&config());

        // 100 m/s is far beyond every rule; label stays empty
        assert!(router
            .on_update("environment.wind.speedTrue", &json!(100.0))
            .is_none());
        assert_eq!(router.current(SignalClass::WindSpeed), "");
    }

    #[test]
    fn test_leaving_all_ranges_emits_empty_label() {
        let mut router = TelemetryRouter::new(&config());
        router.on_update("environment.wind.angleTrueWater", &json!(0.785));

        // Drive the average to 3 rad (~172 degrees), outside every rule
        let mut changes = Vec::new();
        for _ in 0..10 {
            changes.extend(router.on_update("environment.wind.angleTrueWater", &json!(3.0)));
        }

        let labels: Vec<&str> = changes.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Reach", ""]);
    }

    #[test]
    fn test_smoothing_delays_transition() {
        let mut router = TelemetryRouter::new(&config());
        for _ in 0..10 {
            router.on_update("environment.wind.speedTrue", &json!(1.0));
        }

        // One gust of 5 m/s moves the average to 1.4 m/s = 2.72 kn, still Light
        assert!(router
            .on_update("environment.wind.speedTrue", &json!(5.0))
            .is_none());
        assert_eq!(router.current(SignalClass::WindSpeed), "Light");
    }

    #[test]
    fn test_unknown_path_and_bad_payload_ignored() {
        let mut router = TelemetryRouter::new(&config());
        assert!(router.on_update("navigation.speedOverGround", &json!(3.0)).is_none());
        assert!(router
            .on_update("environment.wind.speedTrue", &json!("fast"))
            .is_none());
        assert!(router
            .on_update("navigation.attitude", &json!({"roll": 0.1}))
            .is_none());
    }

    #[test]
    fn test_handle_delta_routes_every_value() {
        let mut router = TelemetryRouter::new(&config());
        let delta: Delta = serde_json::from_value(json!({
            "context": "vessels.self",
            "updates": [
                {"values": [
                    {"path": "environment.wind.speedTrue", "value": 1.0},
                    {"path": "environment.wind.angleTrueWater", "value": 1.5}
                ]},
                {"values": [{"path": "navigation.attitude", "value": {"pitch": 0.0}}]}
            ]
        }))
        .unwrap();

        let changes = router.handle_delta(&delta);
        let labels: Vec<(SignalClass, &str)> =
            changes.iter().map(|c| (c.class, c.label.as_str())).collect();
        assert_eq!(
            labels,
            vec![
                (SignalClass::WindSpeed, "Light"),
                (SignalClass::WindAngle, "Reach"),
                (SignalClass::Wave, "Flat"),
            ]
        );
    }

    #[test]
    fn test_reconfigure_replaces_rules_and_paths() {
        let mut router = TelemetryRouter::new(&config());
        router.on_update("environment.wind.speedTrue", &json!(1.0));

        let mut next = config();
        next.wind_speed_path = "environment.wind.speedApparent".to_string();
        next.wind_speed = vec![RangeRule::new("Breeze", 0.0, 10.0)];
        router.reconfigure(&next);

        assert!(router.on_update("environment.wind.speedTrue", &json!(1.0)).is_none());
        let change = router
            .on_update("environment.wind.speedApparent", &json!(1.0))
            .unwrap();
        assert_eq!(change.label, "Breeze");
        assert!(router.paths().any(|p| p == "environment.wind.speedApparent"));
    }

    #[test]
    fn test_change_to_delta() {
        let change = ConditionChange {
            class: SignalClass::WindAngle,
            label: "Upwind".to_string(),
            value: 42.0,
        };
        let delta = change.to_delta("signalk-trim-plugin", None);

        let pv = delta.values().next().unwrap();
        assert_eq!(pv.path, "environment.sailtrim.windAngle");
        assert_eq!(pv.value, json!("Upwind"));
        assert_eq!(
            delta.updates[0].source_ref.as_deref(),
            Some("signalk-trim-plugin")
        );
    }
}
