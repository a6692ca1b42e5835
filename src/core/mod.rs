//! Core data types shared by the graph builder and the simulator.

pub mod sim_config;
pub mod types;

pub use sim_config::SimulatorConfig;
pub use types::{Axis, Edge, FixedNodes, MassSpec};
