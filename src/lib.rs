//! Voxel Springs – real-time mass-spring simulation over voxel sets.
//!
//! Integer voxel coordinates are connected to their axis-aligned unit
//! neighbours, the resulting graph Laplacian encodes every spring at once, and
//! the state is advanced with semi-implicit Euler under gravity, linear
//! damping, and pinned-node constraints.
//!
//! ```
//! use voxel_springs::{FixedNodes, IVec3, SimulatorConfig, SpringSimulator, Vec3};
//!
//! let coords = vec![IVec3::new(0, 0, 0), IVec3::new(1, 0, 0)];
//! let config = SimulatorConfig::new(coords)
//!     .with_initial_positions(vec![Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0)])
//!     .with_fixed(FixedNodes::Indices(vec![0]));
//! let mut sim = SpringSimulator::new(config)?;
//! sim.step(0.005)?;
//! assert!(sim.positions()[1].x < 1.5);
//! # Ok::<(), voxel_springs::SimError>(())
//! ```

pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod graph;
pub mod simulator;
pub mod utils;

pub use glam::{IVec3, Vec3};

pub use crate::core::{
    sim_config::SimulatorConfig,
    types::{Axis, Edge, FixedNodes, MassSpec},
};
pub use dynamics::{ForceGenerator, NodeState, SymplecticEuler};
pub use error::{Result, SimError};
pub use graph::{SparseMatrix, SpringTopology, VoxelGraph};
pub use simulator::SpringSimulator;
pub use utils::profiling::StepProfiler;
