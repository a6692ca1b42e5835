//! Error types for the simulator.
//!
//! Construction and rebuild failures are validation errors; a bad `dt` passed
//! to [`crate::SpringSimulator::step`] is a usage error. Both leave any
//! existing simulator state untouched.

use glam::IVec3;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SimError>;

/// Every way construction, rebuild, or stepping can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A per-node array does not have one entry per coordinate.
    #[error("{what} has {actual} entries, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Two input nodes share the same voxel coordinate.
    #[error("duplicate voxel coordinate {coord} at nodes {first} and {second}")]
    DuplicateCoordinate {
        coord: IVec3,
        first: usize,
        second: usize,
    },

    /// Mass must be strictly positive and finite.
    #[error("mass of node {index} must be > 0, got {mass}")]
    NonPositiveMass { index: usize, mass: f32 },

    #[error("stiffness must be > 0, got {0}")]
    InvalidStiffness(f32),

    #[error("damping must be >= 0, got {0}")]
    InvalidDamping(f32),

    /// A pinned index does not name a node.
    #[error("fixed node index {index} out of range for {len} nodes")]
    FixedIndexOutOfRange { index: usize, len: usize },

    /// NaN or infinity in a user-supplied vector.
    #[error("{what} contains a non-finite value at index {index}")]
    NonFinite { what: &'static str, index: usize },

    /// `step` requires a strictly positive, finite timestep.
    #[error("time step must be > 0, got {0}")]
    InvalidTimeStep(f32),
}
