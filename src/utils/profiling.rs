use std::time::Duration;

use log::info;

/// Accumulated timings and counts over the steps taken by a simulator.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepProfiler {
    pub force_time: Duration,
    pub integrator_time: Duration,
    pub total_step_time: Duration,
    pub steps: u64,
    pub over_budget_steps: u64,

    pub node_count: usize,
    pub edge_count: usize,
    pub fixed_count: usize,
}

impl StepProfiler {
    pub fn new(node_count: usize, edge_count: usize, fixed_count: usize) -> Self {
        Self {
            node_count,
            edge_count,
            fixed_count,
            ..Self::default()
        }
    }

    /// Clears the timings, keeping the topology counts.
    pub fn reset(&mut self) {
        *self = Self::new(self.node_count, self.edge_count, self.fixed_count);
    }

    pub fn record_step(&mut self, force: Duration, integrate: Duration, total: Duration, over_budget: bool) {
        self.force_time += force;
        self.integrator_time += integrate;
        self.total_step_time += total;
        self.steps += 1;
        if over_budget {
            self.over_budget_steps += 1;
        }
    }

    /// Mean wall time per step.
    pub fn average_step_time(&self) -> Duration {
        if self.steps == 0 {
            return Duration::ZERO;
        }
        self.total_step_time.div_f64(self.steps as f64)
    }

    pub fn report(&self) {
        let total_us = self.total_step_time.as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        info!(
            "Springs profile: nodes {}, edges {}, fixed {}, steps {} ({} over budget)",
            self.node_count, self.edge_count, self.fixed_count, self.steps, self.over_budget_steps
        );
        info!(
            "  Average step: {:.3} ms",
            self.average_step_time().as_secs_f32() * 1000.0
        );
        info!(
            "  Forces:     {:.2} ms ({:.1}%)",
            self.force_time.as_secs_f32() * 1000.0,
            (self.force_time.as_micros() as f32 / total_us) * 100.0
        );
        info!(
            "  Integrator: {:.2} ms ({:.1}%)",
            self.integrator_time.as_secs_f32() * 1000.0,
            (self.integrator_time.as_micros() as f32 / total_us) * 100.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_resets() {
        let mut profiler = StepProfiler::new(8, 12, 2);
        let ms = Duration::from_millis(1);
        profiler.record_step(ms, ms, ms * 2, false);
        profiler.record_step(ms, ms, ms * 4, true);
        assert_eq!(profiler.steps, 2);
        assert_eq!(profiler.over_budget_steps, 1);
        assert_eq!(profiler.average_step_time(), ms * 3);

        profiler.reset();
        assert_eq!(profiler.steps, 0);
        assert_eq!(profiler.edge_count, 12);
        assert_eq!(profiler.average_step_time(), Duration::ZERO);
    }
}
