//! Detection status and color modeling.
//!
//! The mmWave sensor reports a categorical presence/motion state; this
//! module maps it onto an RGB color through a fixed-size lookup table.
//! Every status always has a color — overrides that fail to parse fall
//! back to the default for that status, so the table can never have a
//! hole.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Detection status
// ---------------------------------------------------------------------------

/// Categorical presence/motion state reported by the sensor.
///
/// Unrecognized readings resolve to [`DetectionStatus::NoTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DetectionStatus {
    NoTarget = 0,
    MovingTarget = 1,
    StaticTarget = 2,
    MovingAndStaticTargets = 3,
}

impl DetectionStatus {
    /// Total number of statuses — used to size the color table array.
    pub const COUNT: usize = 4;

    /// All statuses, in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::NoTarget,
        Self::MovingTarget,
        Self::StaticTarget,
        Self::MovingAndStaticTargets,
    ];

    /// Canonical status string, as reported by the sensor and used as the
    /// key in `color_attributes` overrides.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoTarget => "No Target",
            Self::MovingTarget => "Moving Target",
            Self::StaticTarget => "Static Target",
            Self::MovingAndStaticTargets => "Moving and Static Targets",
        }
    }

    /// Parse a canonical status string. Some sensor firmware revisions
    /// report the raw numeric code instead, so `"0"`–`"3"` are accepted
    /// as well.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim() {
            "Moving Target" | "1" => Self::MovingTarget,
            "Static Target" | "2" => Self::StaticTarget,
            "Moving and Static Targets" | "3" => Self::MovingAndStaticTargets,
            _ => Self::NoTarget,
        }
    }

    /// Resolve a raw reading value to a status. Strings and numeric codes
    /// are recognized; anything else (or `None`) means no target.
    pub fn from_reading(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::from_str_lossy(s),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(1) => Self::MovingTarget,
                Some(2) => Self::StaticTarget,
                Some(3) => Self::MovingAndStaticTargets,
                _ => Self::NoTarget,
            },
            _ => Self::NoTarget,
        }
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// RGB channel intensities, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Color {
    /// Construct a color, clamping every channel to `[0.0, 1.0]`.
    /// NaN channels clamp to `0.0`.
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red: clamp_channel(red),
            green: clamp_channel(green),
            blue: clamp_channel(blue),
        }
    }

    pub const BLUE: Self = Self {
        red: 0.0,
        green: 0.0,
        blue: 1.0,
    };
    pub const RED: Self = Self {
        red: 1.0,
        green: 0.0,
        blue: 0.0,
    };
    pub const GREEN: Self = Self {
        red: 0.0,
        green: 1.0,
        blue: 0.0,
    };
    pub const YELLOW: Self = Self {
        red: 1.0,
        green: 1.0,
        blue: 0.0,
    };
}

fn clamp_channel(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

// ---------------------------------------------------------------------------
// Color table
// ---------------------------------------------------------------------------

/// Status → color lookup table.
///
/// Stored as a fixed array indexed by [`DetectionStatus`], so every
/// status has an entry by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    colors: [Color; DetectionStatus::COUNT],
}

impl ColorTable {
    /// Default color for a status: blue for no target, red for moving,
    /// green for static, yellow for both.
    pub const fn default_color(status: DetectionStatus) -> Color {
        match status {
            DetectionStatus::NoTarget => Color::BLUE,
            DetectionStatus::MovingTarget => Color::RED,
            DetectionStatus::StaticTarget => Color::GREEN,
            DetectionStatus::MovingAndStaticTargets => Color::YELLOW,
        }
    }

    /// Color for the given status.
    pub fn color_for(&self, status: DetectionStatus) -> Color {
        self.colors[status as usize]
    }

    /// Replace the entry for one status.
    pub fn set(&mut self, status: DetectionStatus, color: Color) {
        self.colors[status as usize] = color;
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        let mut colors = [Color::BLUE; DetectionStatus::COUNT];
        for status in DetectionStatus::ALL {
            colors[status as usize] = Self::default_color(status);
        }
        Self { colors }
    }
}
