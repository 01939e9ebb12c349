//! Opt-in phase timers.
//!
//! Off by default. Set `NF_TIMING` in the environment or call
//! [`enable_timing`] to collect per-phase totals, then log them with
//! [`viscous_timing::log_summary`].

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static FORCED: AtomicBool = AtomicBool::new(false);
static FROM_ENV: OnceLock<bool> = OnceLock::new();

pub fn enable_timing() {
    FORCED.store(true, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    FORCED.load(Ordering::Relaxed)
        || *FROM_ENV.get_or_init(|| std::env::var_os("NF_TIMING").is_some())
}

/// Running measurement of one phase; a no-op when timing is off.
#[derive(Debug)]
pub struct Timer {
    label: &'static str,
    started: Option<Instant>,
}

impl Timer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            started: is_enabled().then(Instant::now),
        }
    }

    /// Elapsed time, or `None` when timing was off at start.
    pub fn stop(self) -> Option<Duration> {
        self.started.map(|t| t.elapsed())
    }

    pub fn stop_into(self, acc: &AccumulatingTimer) {
        let label = self.label;
        if let Some(elapsed) = self.stop() {
            acc.record(elapsed);
            tracing::trace!(
                phase = label,
                elapsed_us = elapsed.as_micros() as u64,
                "phase finished"
            );
        }
    }
}

/// Lock-free total and call count, usable as a `static`.
#[derive(Debug, Default)]
pub struct AccumulatingTimer {
    nanos: AtomicU64,
    calls: AtomicU64,
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            nanos: AtomicU64::new(0),
            calls: AtomicU64::new(0),
        }
    }

    pub fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::Relaxed);
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
    }

    pub fn count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Mean duration per call; zero before the first call.
    pub fn average(&self) -> Duration {
        match self.count() {
            0 => Duration::ZERO,
            n => self.total() / u32::try_from(n).unwrap_or(u32::MAX),
        }
    }

    pub fn reset(&self) {
        self.nanos.store(0, Ordering::Relaxed);
        self.calls.store(0, Ordering::Relaxed);
    }
}

/// Per-phase timers of one viscous residual evaluation.
pub mod viscous_timing {
    use super::AccumulatingTimer;

    /// Primitive/secondary variable update.
    pub static PRIMITIVES: AccumulatingTimer = AccumulatingTimer::new();
    /// Wall-function shear stress solve.
    pub static WALL_SHEAR: AccumulatingTimer = AccumulatingTimer::new();
    /// Edge viscous flux assembly (including the edge-buffer fold).
    pub static VISCOUS_FLUX: AccumulatingTimer = AccumulatingTimer::new();
    /// Wall boundary enforcement.
    pub static WALL_BC: AccumulatingTimer = AccumulatingTimer::new();

    fn all() -> [(&'static str, &'static AccumulatingTimer); 4] {
        [
            ("primitives", &PRIMITIVES),
            ("wall_shear", &WALL_SHEAR),
            ("viscous_flux", &VISCOUS_FLUX),
            ("wall_bc", &WALL_BC),
        ]
    }

    /// Reset all phase timers.
    pub fn reset_all() {
        for (_, timer) in all() {
            timer.reset();
        }
    }

    /// Log a summary of the phase timers.
    pub fn log_summary() {
        if !super::is_enabled() {
            return;
        }
        for (phase, timer) in all() {
            if timer.count() > 0 {
                tracing::info!(
                    phase,
                    calls = timer.count(),
                    total_ms = timer.total().as_secs_f64() * 1e3,
                    avg_us = timer.average().as_secs_f64() * 1e6,
                    "timing"
                );
            }
        }
    }
}
