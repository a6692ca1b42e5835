use std::time::{Duration, Instant};

use log::{trace, warn};

/// Wall-clock timing of one named phase of a step (`forces`, `integrate`).
///
/// The duration is handed back by [`PhaseTimer::finish`] and also emitted at
/// trace level under the `springs` prefix.
#[derive(Debug)]
pub struct PhaseTimer {
    phase: &'static str,
    started: Instant,
}

impl PhaseTimer {
    pub fn start(phase: &'static str) -> Self {
        Self {
            phase,
            started: Instant::now(),
        }
    }

    pub fn phase(&self) -> &'static str {
        self.phase
    }

    pub fn finish(self) -> Duration {
        let took = self.started.elapsed();
        trace!("springs::{}: {} us", self.phase, took.as_micros());
        took
    }
}

/// Warns when a single step ate more than the frame budget. Returns whether it did.
pub fn warn_if_frame_budget_exceeded(duration: Duration, budget_ms: f32) -> bool {
    let elapsed_ms = duration.as_secs_f32() * 1000.0;
    if elapsed_ms > budget_ms {
        warn!("Step exceeded frame budget: {elapsed_ms:.2} ms > {budget_ms:.2} ms");
        return true;
    }
    false
}
