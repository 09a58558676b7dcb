//! Presence-detection RGB LED controller.
//!
//! A host-pluggable module that polls an mmWave presence sensor once per
//! second and drives an RGB LED: blue for no target, red for a moving
//! target, green for a static one, yellow for both (all overridable from
//! configuration). The host supplies resolved sensor/LED handles and
//! drives the lifecycle (`validate_config` → `reconfigure` → `do_command`
//! / `close`); this crate owns only the control loop between them.

#![deny(unused_must_use)]

pub mod app;
pub mod color;
pub mod config;
pub mod control;

pub use app::ports::{Dependencies, ResourceHandle, RgbLedPort, SensorPort};
pub use app::service::PresenceLightController;
pub use color::{Color, ColorTable, DetectionStatus};
pub use config::{Attributes, ConfigError, ControllerConfig};
pub use control::LoopState;
