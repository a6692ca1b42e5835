//! Simulation dynamics: force generators and the symplectic integrator.

pub mod forces;
pub mod integrator;

pub use forces::{DampingForce, ForceGenerator, GravityForce, LaplacianSpringForce, NodeView};
pub use integrator::{NodeState, PinConstraints, SymplecticEuler};
