//! Controller configuration — parsing and validation of host attributes.
//!
//! The host hands us a free-form attribute map. Three keys are required
//! (`board`, `sensor`, `rgb_led` — the names of the dependencies the host
//! must resolve); `auto_start` and per-status `color_attributes` overrides
//! are optional. Malformed overrides never abort reconfiguration: they
//! log a warning and fall back to the default color for that status.

use core::fmt;

use log::warn;
use serde_json::Value;

use crate::color::{Color, ColorTable, DetectionStatus};

/// Free-form attribute / command / readings map, as supplied by the host.
pub type Attributes = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal configuration error — raised by validation, aborts construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A required attribute is absent.
    MissingField(&'static str),
    /// A required attribute is present but not a string.
    NotAString(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => {
                write!(f, "`{field}` must be included in the configuration")
            }
            Self::NotAString(field) => write!(f, "`{field}` must be a string"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// ControllerConfig
// ---------------------------------------------------------------------------

/// Validated controller configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Board dependency name. Validated and reported to the host, but the
    /// controller consumes no board handle.
    pub board: String,
    /// Sensor dependency name.
    pub sensor: String,
    /// RGB LED dependency name.
    pub rgb_led: String,
    /// Whether reconfiguration starts the control loop immediately.
    pub auto_start: bool,
    /// Status → color table, defaults merged with any valid overrides.
    pub color_table: ColorTable,
}

fn required_string(attrs: &Attributes, key: &'static str) -> Result<String, ConfigError> {
    match attrs.get(key) {
        None => Err(ConfigError::MissingField(key)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ConfigError::NotAString(key)),
    }
}

impl ControllerConfig {
    /// Parse and validate the attribute map.
    pub fn from_attributes(attrs: &Attributes) -> Result<Self, ConfigError> {
        let board = required_string(attrs, "board")?;
        let sensor = required_string(attrs, "sensor")?;
        let rgb_led = required_string(attrs, "rgb_led")?;

        let auto_start = match attrs.get("auto_start") {
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                warn!("`auto_start` is not a boolean ({other}), defaulting to true");
                true
            }
            None => true,
        };

        let color_table = build_color_table(attrs.get("color_attributes"));

        Ok(Self {
            board,
            sensor,
            rgb_led,
            auto_start,
            color_table,
        })
    }

    /// Validate the attribute map and return the dependency names the host
    /// must resolve before construction.
    pub fn validate(attrs: &Attributes) -> Result<Vec<String>, ConfigError> {
        let config = Self::from_attributes(attrs)?;
        Ok(vec![config.board, config.sensor, config.rgb_led])
    }
}

// ---------------------------------------------------------------------------
// Color overrides
// ---------------------------------------------------------------------------

/// Merge `color_attributes` overrides into the default table.
///
/// Each status key maps to a `{red, green, blue}` object; channels are
/// independently optional and clamped. A malformed entry (non-object, or
/// any non-numeric channel) reverts the whole status to its default.
fn build_color_table(overrides: Option<&Value>) -> ColorTable {
    let mut table = ColorTable::default();
    let Some(overrides) = overrides else {
        return table;
    };
    let Some(map) = overrides.as_object() else {
        warn!("`color_attributes` is not an object, using default colors");
        return table;
    };

    for status in DetectionStatus::ALL {
        if let Some(entry) = map.get(status.as_str()) {
            match parse_override(status, entry) {
                Some(color) => table.set(status, color),
                None => {
                    warn!(
                        "invalid color override for \"{}\", falling back to default",
                        status.as_str()
                    );
                }
            }
        }
    }

    for key in map.keys() {
        if DetectionStatus::ALL.iter().all(|s| s.as_str() != key) {
            warn!("unknown status key \"{key}\" in `color_attributes`, ignored");
        }
    }

    table
}

/// Parse one `{red, green, blue}` override. Missing channels keep the
/// default for that status; any present-but-non-numeric channel rejects
/// the entire entry.
fn parse_override(status: DetectionStatus, entry: &Value) -> Option<Color> {
    let obj = entry.as_object()?;
    let default = ColorTable::default_color(status);

    let channel = |key: &str, fallback: f64| -> Option<f64> {
        match obj.get(key) {
            None => Some(fallback),
            Some(v) => v.as_f64(),
        }
    };

    let red = channel("red", default.red)?;
    let green = channel("green", default.green)?;
    let blue = channel("blue", default.blue)?;
    Some(Color::new(red, green, blue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(v: Value) -> Attributes {
        v.as_object().expect("test attrs must be an object").clone()
    }

    fn minimal() -> Attributes {
        attrs(json!({
            "board": "pi",
            "sensor": "mmwave",
            "rgb_led": "led",
        }))
    }

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config = ControllerConfig::from_attributes(&minimal()).unwrap();
        assert_eq!(config.board, "pi");
        assert_eq!(config.sensor, "mmwave");
        assert_eq!(config.rgb_led, "led");
        assert!(config.auto_start);
        assert_eq!(config.color_table, ColorTable::default());
    }

    #[test]
    fn missing_required_key_is_an_error() {
        for key in ["board", "sensor", "rgb_led"] {
            let mut a = minimal();
            a.remove(key);
            assert_eq!(
                ControllerConfig::from_attributes(&a),
                Err(ConfigError::MissingField(key)),
                "removing {key}"
            );
        }
    }

    #[test]
    fn non_string_required_key_is_an_error() {
        let mut a = minimal();
        a.insert("sensor".into(), json!(7));
        assert_eq!(
            ControllerConfig::from_attributes(&a),
            Err(ConfigError::NotAString("sensor"))
        );
    }

    #[test]
    fn validate_returns_dependency_names() {
        let deps = ControllerConfig::validate(&minimal()).unwrap();
        assert_eq!(deps, vec!["pi", "mmwave", "led"]);
    }

    #[test]
    fn auto_start_false_is_honored() {
        let mut a = minimal();
        a.insert("auto_start".into(), json!(false));
        let config = ControllerConfig::from_attributes(&a).unwrap();
        assert!(!config.auto_start);
    }

    #[test]
    fn non_boolean_auto_start_defaults_true() {
        let mut a = minimal();
        a.insert("auto_start".into(), json!("yes"));
        let config = ControllerConfig::from_attributes(&a).unwrap();
        assert!(config.auto_start);
    }

    #[test]
    fn valid_override_replaces_default() {
        let mut a = minimal();
        a.insert(
            "color_attributes".into(),
            json!({ "Moving Target": { "red": 0.5, "green": 0.5, "blue": 0.5 } }),
        );
        let config = ControllerConfig::from_attributes(&a).unwrap();
        assert_eq!(
            config.color_table.color_for(DetectionStatus::MovingTarget),
            Color::new(0.5, 0.5, 0.5)
        );
        // Untouched statuses keep their defaults.
        assert_eq!(
            config.color_table.color_for(DetectionStatus::NoTarget),
            Color::BLUE
        );
    }

    #[test]
    fn override_channels_are_clamped() {
        let mut a = minimal();
        a.insert(
            "color_attributes".into(),
            json!({ "No Target": { "red": 1.5, "green": -0.2 } }),
        );
        let config = ControllerConfig::from_attributes(&a).unwrap();
        let c = config.color_table.color_for(DetectionStatus::NoTarget);
        assert_eq!(c.red, 1.0);
        assert_eq!(c.green, 0.0);
        // Missing blue keeps the default channel (No Target defaults to blue).
        assert_eq!(c.blue, 1.0);
    }

    #[test]
    fn non_numeric_override_falls_back_to_default() {
        let mut a = minimal();
        a.insert(
            "color_attributes".into(),
            json!({ "Static Target": { "red": "bright", "green": 0.9 } }),
        );
        let config = ControllerConfig::from_attributes(&a).unwrap();
        assert_eq!(
            config.color_table.color_for(DetectionStatus::StaticTarget),
            Color::GREEN
        );
    }

    #[test]
    fn non_object_color_attributes_uses_defaults() {
        let mut a = minimal();
        a.insert("color_attributes".into(), json!("red everywhere"));
        let config = ControllerConfig::from_attributes(&a).unwrap();
        assert_eq!(config.color_table, ColorTable::default());
    }
}
