//! Loop runner — the cancellable worker thread behind the control loop.
//!
//! Two states, one owner:
//!
//! ```text
//!          start()                stop() / close()
//!   Idle ───────────▶ Running ───────────────────▶ Idle
//!    ▲  no-op if a live          cancel flag set,
//!    └─ thread exists            bounded join
//! ```
//!
//! Each controller instance owns its own runner, flag, and thread handle.
//! Lifecycle calls are serialized by the host, so the flag has exactly one
//! writer context and one reader (the loop). The tick sleep waits on a
//! condvar, letting `stop` interrupt a sleeping loop immediately instead
//! of waiting out the period.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use super::{ControlState, LoopContext, run_tick};

/// How long `stop` waits for the loop thread before detaching it.
const STOP_GRACE_PERIODS: u32 = 2;

/// Poll interval while waiting for the loop thread to finish.
const JOIN_POLL: Duration = Duration::from_millis(5);

// ---------------------------------------------------------------------------
// Cancellation flag
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag with an interruptible timed wait.
struct CancelFlag {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl CancelFlag {
    fn new() -> Self {
        Self {
            cancelled: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    fn cancel(&self) {
        let mut cancelled = self
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.condvar.notify_all();
    }

    fn is_cancelled(&self) -> bool {
        *self
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for up to `timeout`, waking early on cancellation.
    /// Returns `true` if cancelled.
    fn wait_cancelled(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cancelled = self
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            cancelled = self
                .condvar
                .wait_timeout(cancelled, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Control loop state as observed from the lifecycle path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

struct LoopHandle {
    cancel: Arc<CancelFlag>,
    thread: thread::JoinHandle<()>,
}

/// Owns at most one live loop thread and its cancellation flag.
/// Crate-internal: hosts drive the loop through
/// [`PresenceLightController`](crate::app::service::PresenceLightController).
pub(crate) struct LoopRunner {
    period: Duration,
    handle: Option<LoopHandle>,
}

impl LoopRunner {
    pub(crate) fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    /// Current state. A thread that exited on its own (it panicked — the
    /// loop never terminates otherwise) counts as Idle.
    pub(crate) fn state(&self) -> LoopState {
        match &self.handle {
            Some(handle) if !handle.thread.is_finished() => LoopState::Running,
            _ => LoopState::Idle,
        }
    }

    /// Idle → Running. No-op when a live thread already exists.
    pub(crate) fn start(&mut self, ctx: LoopContext) {
        if self.state() == LoopState::Running {
            debug!("start requested while loop already running, ignoring");
            return;
        }

        let cancel = Arc::new(CancelFlag::new());
        let period = self.period;
        let spawned = thread::Builder::new()
            .name("presence-light-loop".into())
            .spawn({
                let cancel = Arc::clone(&cancel);
                move || run_loop(&ctx, &cancel, period)
            });

        match spawned {
            Ok(thread) => self.handle = Some(LoopHandle { cancel, thread }),
            Err(err) => error!("failed to spawn control loop thread: {err}"),
        }
    }

    /// Running → Idle. Cancels the loop and waits a bounded interval for
    /// the thread to finish; a thread stuck in a hung port call is
    /// detached with a warning rather than blocking shutdown. Safe no-op
    /// when idle.
    pub(crate) fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            debug!("stop requested while loop idle, nothing to do");
            return;
        };

        handle.cancel.cancel();

        let deadline = Instant::now() + self.period * STOP_GRACE_PERIODS;
        while !handle.thread.is_finished() {
            if Instant::now() >= deadline {
                warn!(
                    "control loop did not stop within {:?}, detaching thread",
                    self.period * STOP_GRACE_PERIODS
                );
                return;
            }
            thread::sleep(JOIN_POLL);
        }

        if handle.thread.join().is_err() {
            warn!("control loop thread panicked");
        }
    }
}

impl Drop for LoopRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Loop body
// ---------------------------------------------------------------------------

fn run_loop(ctx: &LoopContext, cancel: &CancelFlag, period: Duration) {
    info!("control loop started (period {period:?})");
    if ctx.sensor.is_none() {
        warn!("sensor unbound, loop runs degraded (all ticks read No Target)");
    }
    if ctx.led.is_none() {
        warn!("rgb_led unbound, loop runs degraded (no commands issued)");
    }

    let mut state = ControlState::new(ctx.color_table.clone());
    while !cancel.is_cancelled() {
        run_tick(&mut state, ctx);
        if cancel.wait_cancelled(period) {
            break;
        }
    }
    info!("control loop stopped");
}
