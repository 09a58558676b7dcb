//! Presence-light controller — the module's lifecycle surface.
//!
//! The host drives exactly five entry points: construction,
//! [`validate_config`](PresenceLightController::validate_config),
//! [`reconfigure`](PresenceLightController::reconfigure),
//! [`do_command`](PresenceLightController::do_command) and
//! [`close`](PresenceLightController::close). Everything the controller
//! owns — handles, color table, loop thread — is instance state; two
//! controllers never share a flag or a task.

use std::sync::Arc;

use log::{info, warn};
use serde_json::Value;

use crate::color::ColorTable;
use crate::config::{Attributes, ConfigError, ControllerConfig};
use crate::control::{LoopContext, LoopRunner, LoopState, TICK_PERIOD};

use super::commands::Command;
use super::ports::{Dependencies, ResourceHandle, RgbLedPort, SensorPort};

/// Drives an RGB LED from a presence-detection sensor.
pub struct PresenceLightController {
    sensor: Option<Arc<dyn SensorPort>>,
    led: Option<Arc<dyn RgbLedPort>>,
    color_table: ColorTable,
    auto_start: bool,
    runner: LoopRunner,
}

impl PresenceLightController {
    /// Construct an unconfigured, idle controller. The host calls
    /// [`reconfigure`](Self::reconfigure) next.
    pub fn new() -> Self {
        Self {
            sensor: None,
            led: None,
            color_table: ColorTable::default(),
            auto_start: true,
            runner: LoopRunner::new(TICK_PERIOD),
        }
    }

    /// Validate host attributes and return the dependency names the host
    /// must resolve before construction.
    pub fn validate_config(attrs: &Attributes) -> Result<Vec<String>, ConfigError> {
        ControllerConfig::validate(attrs)
    }

    /// Apply a new configuration and dependency set.
    ///
    /// Stops any running loop first, rebinds handles (an unresolved or
    /// wrong-kind dependency leaves the handle unbound and the controller
    /// degraded), rebuilds the color table, and restarts the loop iff
    /// `auto_start`. Idempotent — at most one loop task is alive after
    /// any number of calls.
    pub fn reconfigure(
        &mut self,
        attrs: &Attributes,
        dependencies: &Dependencies,
    ) -> Result<(), ConfigError> {
        let config = ControllerConfig::from_attributes(attrs)?;

        // Handles are only swapped while the loop is stopped.
        self.runner.stop();

        self.sensor = match dependencies.get(&config.sensor) {
            Some(ResourceHandle::Sensor(handle)) => Some(Arc::clone(handle)),
            Some(_) => {
                warn!(
                    "dependency \"{}\" is not a sensor, running without one",
                    config.sensor
                );
                None
            }
            None => {
                warn!(
                    "sensor \"{}\" unresolved, running without one",
                    config.sensor
                );
                None
            }
        };

        self.led = match dependencies.get(&config.rgb_led) {
            Some(ResourceHandle::RgbLed(handle)) => Some(Arc::clone(handle)),
            Some(_) => {
                warn!(
                    "dependency \"{}\" is not an RGB LED, running without one",
                    config.rgb_led
                );
                None
            }
            None => {
                warn!(
                    "rgb_led \"{}\" unresolved, running without one",
                    config.rgb_led
                );
                None
            }
        };

        self.color_table = config.color_table;
        self.auto_start = config.auto_start;

        if self.auto_start {
            self.start();
        } else {
            info!("auto_start disabled, waiting for a start command");
        }
        Ok(())
    }

    /// Generic command dispatch. Each requested command name is echoed in
    /// the result map with a success boolean; unrecognized names map to
    /// `false`.
    pub fn do_command(&mut self, command: &Attributes) -> Attributes {
        let mut result = Attributes::new();
        for name in command.keys() {
            let ok = match Command::parse(name) {
                Some(Command::Start) => {
                    self.start();
                    true
                }
                Some(Command::Stop) => {
                    self.stop();
                    true
                }
                None => {
                    warn!("unrecognized command \"{name}\"");
                    false
                }
            };
            result.insert(name.clone(), Value::Bool(ok));
        }
        result
    }

    /// Tear down: stop the loop. No state is persisted.
    pub fn close(&mut self) {
        self.runner.stop();
        info!("presence light controller closed");
    }

    /// Start the control loop (no-op when already running).
    pub fn start(&mut self) {
        self.runner.start(LoopContext {
            sensor: self.sensor.clone(),
            led: self.led.clone(),
            color_table: self.color_table.clone(),
        });
    }

    /// Stop the control loop (no-op when idle).
    pub fn stop(&mut self) {
        self.runner.stop();
    }

    /// Observed loop state.
    pub fn loop_state(&self) -> LoopState {
        self.runner.state()
    }
}

impl Default for PresenceLightController {
    fn default() -> Self {
        Self::new()
    }
}
