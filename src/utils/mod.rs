//! Utility helpers: phase timers and per-step profiling.

pub mod logging;
pub mod profiling;

pub use logging::{warn_if_frame_budget_exceeded, PhaseTimer};
pub use profiling::StepProfiler;
