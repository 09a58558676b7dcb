//! The read → map → actuate control cycle.
//!
//! Per-tick decisions are pure and synchronous ([`ControlState`]); all I/O
//! happens in [`run_tick`], which the [`runner`] thread calls once per tick
//! period. Nothing in a tick can terminate the loop: sensor and LED
//! failures are logged and the next tick proceeds as usual.

pub mod runner;

use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::app::ports::{RgbLedPort, SensorPort, color_command, ripple_command};
use crate::color::{Color, ColorTable, DetectionStatus};

pub use runner::LoopState;
pub(crate) use runner::LoopRunner;

/// Fixed poll period of the control loop.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Duration argument of the one-shot startup ripple animation.
pub const RIPPLE_DURATION_SECS: f64 = 2.0;

/// Readings key carrying the detection status.
const DETECTION_STATUS_KEY: &str = "detection_status";

// ---------------------------------------------------------------------------
// Loop context
// ---------------------------------------------------------------------------

/// Everything one loop run needs, captured at start time. Handles are
/// swapped only while the loop is stopped, so the context never changes
/// mid-run.
#[derive(Clone)]
pub(crate) struct LoopContext {
    pub sensor: Option<Arc<dyn SensorPort>>,
    pub led: Option<Arc<dyn RgbLedPort>>,
    pub color_table: ColorTable,
}

// ---------------------------------------------------------------------------
// Per-tick decisions (pure)
// ---------------------------------------------------------------------------

/// Mutable loop state: the one-shot ripple flag and the last color
/// actually delivered to the LED.
pub(crate) struct ControlState {
    color_table: ColorTable,
    ripple_pending: bool,
    last_sent: Option<Color>,
}

impl ControlState {
    pub(crate) fn new(color_table: ColorTable) -> Self {
        Self {
            color_table,
            ripple_pending: true,
            last_sent: None,
        }
    }

    /// Whether the startup ripple is still due. Consumes the flag — the
    /// ripple is fire-and-forget, never retried.
    pub(crate) fn take_ripple(&mut self) -> bool {
        std::mem::replace(&mut self.ripple_pending, false)
    }

    /// Map the status through the color table and decide whether the LED
    /// needs a command this tick.
    ///
    /// Returns `Some` only when the color differs from the last color
    /// *successfully* sent — callers must confirm delivery with
    /// [`mark_color_sent`](Self::mark_color_sent), so a failed send is
    /// retried on the next tick.
    pub(crate) fn next_color(&mut self, status: DetectionStatus) -> Option<Color> {
        let color = self.color_table.color_for(status);
        (self.last_sent != Some(color)).then_some(color)
    }

    /// Record that `color` reached the LED.
    pub(crate) fn mark_color_sent(&mut self, color: Color) {
        self.last_sent = Some(color);
    }
}

// ---------------------------------------------------------------------------
// Tick execution (I/O against the ports)
// ---------------------------------------------------------------------------

/// Read the detection status. An unbound sensor, a failed read, or a
/// missing/unrecognized status all resolve to `NoTarget`.
fn read_status(sensor: Option<&dyn SensorPort>) -> DetectionStatus {
    let Some(sensor) = sensor else {
        return DetectionStatus::NoTarget;
    };
    match sensor.get_readings() {
        Ok(readings) => DetectionStatus::from_reading(readings.get(DETECTION_STATUS_KEY)),
        Err(err) => {
            warn!("sensor read failed: {err:#}");
            DetectionStatus::NoTarget
        }
    }
}

/// Run one full tick: startup ripple (first tick only) → read sensor →
/// map → actuate LED.
pub(crate) fn run_tick(state: &mut ControlState, ctx: &LoopContext) {
    if state.take_ripple() {
        // Fire-and-forget startup animation, issued before steady state.
        if let Some(led) = ctx.led.as_deref() {
            if let Err(err) = led.do_command(&ripple_command(RIPPLE_DURATION_SECS)) {
                warn!("ripple command failed: {err:#}");
            }
        }
    }

    let status = read_status(ctx.sensor.as_deref());
    if let Some(color) = state.next_color(status) {
        let Some(led) = ctx.led.as_deref() else {
            return;
        };
        match led.do_command(&color_command(color)) {
            Ok(_) => state.mark_color_sent(color),
            Err(err) => warn!("control_rgb_led command failed: {err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ControlState {
        ControlState::new(ColorTable::default())
    }

    #[test]
    fn ripple_due_on_first_tick_only() {
        let mut s = state();
        assert!(s.take_ripple());
        assert!(!s.take_ripple());
        assert!(!s.take_ripple());
    }

    #[test]
    fn repeated_status_actuates_once() {
        let mut s = state();
        assert_eq!(s.next_color(DetectionStatus::NoTarget), Some(Color::BLUE));
        s.mark_color_sent(Color::BLUE);
        assert_eq!(s.next_color(DetectionStatus::NoTarget), None);
    }

    #[test]
    fn status_change_actuates_exactly_once_more() {
        // No Target, No Target, Moving Target → blue then red, two sends.
        let mut s = state();
        let mut sent = Vec::new();
        for status in [
            DetectionStatus::NoTarget,
            DetectionStatus::NoTarget,
            DetectionStatus::MovingTarget,
        ] {
            if let Some(color) = s.next_color(status) {
                s.mark_color_sent(color);
                sent.push(color);
            }
        }
        assert_eq!(sent, vec![Color::BLUE, Color::RED]);
    }

    #[test]
    fn failed_send_is_retried_next_tick() {
        let mut s = state();
        assert_eq!(s.next_color(DetectionStatus::StaticTarget), Some(Color::GREEN));
        // Send failed: mark_color_sent not called.
        assert_eq!(s.next_color(DetectionStatus::StaticTarget), Some(Color::GREEN));
    }

    #[test]
    fn every_status_maps_to_its_table_color() {
        for status in DetectionStatus::ALL {
            let mut s = state();
            assert_eq!(
                s.next_color(status),
                Some(ColorTable::default_color(status))
            );
        }
    }
}
