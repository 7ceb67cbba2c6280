//! JSON schema of the plugin configuration.
//!
//! The host renders the configuration form from this schema; field names
//! and defaults must stay in sync with [`crate::options::TrimConfiguration`].

use serde_json::{json, Value};

use crate::options::{DEFAULT_WAVE_PATH, DEFAULT_WIND_ANGLE_PATH, DEFAULT_WIND_SPEED_PATH};
use crate::{PLUGIN_DESCRIPTION, PLUGIN_NAME};

const MARKERS_HELP: &str = "Markers comma separated list.\n E.g. 1,2,3,4,5,6,7,8,9,10 or A,B,C,D,E,F or White,Blue,Green,Red,Black,Pink,Orange,Yellow,Grey,Purple";

const DEFAULT_MARKERS: &str = "White,Blue,Green,Red,Black,Pink,Orange,Yellow,Grey,Purple";

fn range_list(
    title: &str,
    type_title: &str,
    type_default: &str,
    unit: &str,
    bounds: Option<(f64, f64)>,
) -> Value {
    let mut min = json!({
        "type": "number",
        "title": format!("{type_title} min ({unit})"),
        "description": format!("Range minimum for {type_title} value"),
    });
    let mut max = json!({
        "type": "number",
        "title": format!("{type_title} max ({unit})"),
        "description": format!("Range maximum for {type_title} value"),
    });
    if let Some((lo, hi)) = bounds {
        min["default"] = json!(lo);
        max["default"] = json!(hi);
    }

    json!({
        "type": "array",
        "title": title,
        "items": {
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "title": format!("{type_title} name"),
                    "default": type_default
                },
                "min": min,
                "max": max
            }
        }
    })
}

/// Schema document served at `/schema`.
pub fn schema() -> Value {
    let wave = range_list(
        "Add wave ranges and names",
        "Trim",
        "No or little waves",
        "degrees",
        None,
    );
    let wind_speed = range_list(
        "Add wind speed ranges and names",
        "Wind speed",
        "Light air",
        "knots",
        Some((0.0, 4.0)),
    );
    let wind_angle = range_list(
        "Add wind angle ranges and names",
        "Angle",
        "Upwind",
        "degrees",
        Some((35.0, 60.0)),
    );

    json!({
        "type": "object",
        "title": PLUGIN_NAME,
        "description": PLUGIN_DESCRIPTION,
        "properties": {
            "sails": {
                "type": "array",
                "title": "Add sails and performance related parts",
                "items": {
                    "type": "object",
                    "properties": {
                        "sail": {
                            "type": "string",
                            "title": "Sail name",
                            "default": "Main"
                        },
                        "parts": {
                            "type": "array",
                            "title": "Performance related parts",
                            "description": MARKERS_HELP,
                            "items": {
                                "type": "object",
                                "properties": {
                                    "part": {
                                        "type": "string",
                                        "title": "Part name",
                                        "default": "Sheet"
                                    },
                                    "markers": {
                                        "type": "string",
                                        "title": "Markers",
                                        "default": DEFAULT_MARKERS
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "wavePath": {
                "type": "string",
                "title": "Numeric source for wave information. Attitude takes pitch/trim.",
                "default": DEFAULT_WAVE_PATH
            },
            "wave": wave,
            "windSpeedPath": {
                "type": "string",
                "title": "Numeric source for wind speed information",
                "default": DEFAULT_WIND_SPEED_PATH
            },
            "windSpeed": wind_speed,
            "windAnglePath": {
                "type": "string",
                "title": "Numeric source for wind angle information",
                "default": DEFAULT_WIND_ANGLE_PATH
            },
            "windAngle": wind_angle
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_properties() {
        let schema = schema();
        let props = schema["properties"].as_object().unwrap();
        let keys: Vec<&str> = props.keys().map(String::as_str).collect();

        assert_eq!(
            keys,
            vec![
                "sails",
                "wavePath",
                "wave",
                "windSpeedPath",
                "windSpeed",
                "windAnglePath",
                "windAngle",
            ]
        );
        assert_eq!(schema["title"], PLUGIN_NAME);
    }

    #[test]
    fn test_schema_defaults() {
        let schema = schema();
        assert_eq!(schema["properties"]["wavePath"]["default"], DEFAULT_WAVE_PATH);
        assert_eq!(
            schema["properties"]["windAngle"]["items"]["properties"]["max"]["default"],
            60.0
        );
        assert_eq!(
            schema["properties"]["windSpeed"]["items"]["properties"]["min"]["title"],
            "Wind speed min (knots)"
        );
        assert!(schema["properties"]["wave"]["items"]["properties"]["min"]
            .get("default")
            .is_none());
    }
}
