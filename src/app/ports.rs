//! Port traits — the boundary between the controller and the host's resources.
//!
//! ```text
//!   Host resource ──▶ Port trait ──▶ PresenceLightController (domain)
//! ```
//!
//! The host resolves dependency names to live resources and hands them to
//! [`reconfigure`](super::service::PresenceLightController::reconfigure) as
//! trait objects. Port calls may fail with arbitrary adapter errors; the
//! control loop treats every such failure as transient (logged, never
//! propagated).
//!
//! Handles are shared with the loop thread via `Arc`, so ports take `&self`
//! and implementations needing mutation use interior mutability.

use std::collections::HashMap;
use std::sync::Arc;

use crate::color::Color;
use crate::config::Attributes;

// ───────────────────────────────────────────────────────────────
// Sensor port (host resource → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the loop calls this each tick to fetch sensor readings.
///
/// The controller only inspects the `detection_status` key; everything
/// else in the map is ignored.
pub trait SensorPort: Send + Sync {
    fn get_readings(&self) -> anyhow::Result<Attributes>;
}

// ───────────────────────────────────────────────────────────────
// RGB LED port (domain → host resource)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the loop issues generic commands to the LED resource.
pub trait RgbLedPort: Send + Sync {
    fn do_command(&self, command: &Attributes) -> anyhow::Result<Attributes>;
}

/// Build the one-shot startup animation command.
pub fn ripple_command(duration_secs: f64) -> Attributes {
    let mut args = Attributes::new();
    args.insert("duration".into(), duration_secs.into());
    let mut cmd = Attributes::new();
    cmd.insert("ripple".into(), args.into());
    cmd
}

/// Build a `control_rgb_led` command for the given color.
pub fn color_command(color: Color) -> Attributes {
    let mut args = Attributes::new();
    args.insert("red".into(), color.red.into());
    args.insert("green".into(), color.green.into());
    args.insert("blue".into(), color.blue.into());
    let mut cmd = Attributes::new();
    cmd.insert("control_rgb_led".into(), args.into());
    cmd
}

// ───────────────────────────────────────────────────────────────
// Resolved dependencies
// ───────────────────────────────────────────────────────────────

/// A live handle resolved by the host for one dependency name.
#[derive(Clone)]
pub enum ResourceHandle {
    Sensor(Arc<dyn SensorPort>),
    RgbLed(Arc<dyn RgbLedPort>),
}

/// Dependency name → resolved handle, as supplied to `reconfigure`.
///
/// A missing entry is not fatal: the controller runs degraded with the
/// corresponding handle unbound.
pub type Dependencies = HashMap<String, ResourceHandle>;
