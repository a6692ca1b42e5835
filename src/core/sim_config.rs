use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::types::{FixedNodes, MassSpec};
use crate::{
    config::{DEFAULT_DAMPING, DEFAULT_GRAVITY, DEFAULT_STIFFNESS},
    error::{Result, SimError},
};

/// Everything needed to construct a [`crate::SpringSimulator`].
///
/// Only `coords` is required; the remaining fields start from the defaults in
/// [`crate::config`] and can be overridden with the `with_*` setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Integer voxel coordinates, one per node.
    pub coords: Vec<IVec3>,
    /// Rest-state positions; defaults to the coordinates.
    pub rest_positions: Option<Vec<Vec3>>,
    /// Starting positions; defaults to the rest positions.
    pub initial_positions: Option<Vec<Vec3>>,
    pub stiffness: f32,
    pub mass: MassSpec,
    pub damping: f32,
    pub gravity: Vec3,
    pub fixed: FixedNodes,
}

impl SimulatorConfig {
    pub fn new(coords: Vec<IVec3>) -> Self {
        Self {
            coords,
            rest_positions: None,
            initial_positions: None,
            stiffness: DEFAULT_STIFFNESS,
            mass: MassSpec::default(),
            damping: DEFAULT_DAMPING,
            gravity: Vec3::from_array(DEFAULT_GRAVITY),
            fixed: FixedNodes::None,
        }
    }

    pub fn with_rest_positions(mut self, rest: Vec<Vec3>) -> Self {
        self.rest_positions = Some(rest);
        self
    }

    pub fn with_initial_positions(mut self, initial: Vec<Vec3>) -> Self {
        self.initial_positions = Some(initial);
        self
    }

    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn with_mass(mut self, mass: MassSpec) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_fixed(mut self, fixed: FixedNodes) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn node_count(&self) -> usize {
        self.coords.len()
    }

    /// Checks every field and canonicalises the optional and dual-form inputs.
    ///
    /// Topology checks (duplicate coordinates) happen later, while the graph
    /// is being built.
    pub(crate) fn resolve(&self) -> Result<ResolvedConfig> {
        let n = self.node_count();

        validate_stiffness(self.stiffness)?;
        validate_damping(self.damping)?;
        validate_gravity(self.gravity)?;

        let rest_positions = match &self.rest_positions {
            Some(rest) => {
                check_positions("rest positions", rest, n)?;
                rest.clone()
            }
            None => self.coords.iter().map(|c| c.as_vec3()).collect(),
        };
        let initial_positions = match &self.initial_positions {
            Some(initial) => {
                check_positions("initial positions", initial, n)?;
                initial.clone()
            }
            None => rest_positions.clone(),
        };

        Ok(ResolvedConfig {
            rest_positions,
            initial_positions,
            inverse_masses: self.mass.inverse_masses(n)?,
            fixed: self.fixed.to_mask(n)?,
            stiffness: self.stiffness,
            damping: self.damping,
            gravity: self.gravity,
        })
    }
}

/// Validated, per-node form of a [`SimulatorConfig`].
#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
    pub rest_positions: Vec<Vec3>,
    pub initial_positions: Vec<Vec3>,
    pub inverse_masses: Vec<f32>,
    pub fixed: Vec<bool>,
    pub stiffness: f32,
    pub damping: f32,
    pub gravity: Vec3,
}

pub(crate) fn validate_stiffness(stiffness: f32) -> Result<()> {
    if stiffness.is_finite() && stiffness > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidStiffness(stiffness))
    }
}

pub(crate) fn validate_damping(damping: f32) -> Result<()> {
    if damping.is_finite() && damping >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidDamping(damping))
    }
}

pub(crate) fn validate_gravity(gravity: Vec3) -> Result<()> {
    match gravity.to_array().iter().position(|g| !g.is_finite()) {
        Some(index) => Err(SimError::NonFinite {
            what: "gravity",
            index,
        }),
        None => Ok(()),
    }
}

fn check_positions(what: &'static str, positions: &[Vec3], expected: usize) -> Result<()> {
    if positions.len() != expected {
        return Err(SimError::ShapeMismatch {
            what,
            expected,
            actual: positions.len(),
        });
    }
    match positions.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(SimError::NonFinite { what, index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: i32) -> Vec<IVec3> {
        (0..n).map(|i| IVec3::new(i, 0, 0)).collect()
    }

    #[test]
    fn defaults_follow_coordinates() {
        let resolved = SimulatorConfig::new(line(3)).resolve().unwrap();
        assert_eq!(resolved.rest_positions[2], Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(resolved.initial_positions, resolved.rest_positions);
        assert_eq!(resolved.fixed, vec![false; 3]);
        assert_eq!(resolved.inverse_masses, vec![1.0; 3]);
    }

    #[test]
    fn initial_positions_default_to_rest_positions() {
        let rest = vec![Vec3::splat(5.0), Vec3::splat(6.0)];
        let resolved = SimulatorConfig::new(line(2))
            .with_rest_positions(rest.clone())
            .resolve()
            .unwrap();
        assert_eq!(resolved.initial_positions, rest);
    }

    #[test]
    fn position_shapes_are_checked() {
        let err = SimulatorConfig::new(line(3))
            .with_rest_positions(vec![Vec3::ZERO; 2])
            .resolve()
            .unwrap_err();
        assert!(matches!(err, SimError::ShapeMismatch { what: "rest positions", .. }));

        let err = SimulatorConfig::new(line(3))
            .with_initial_positions(vec![Vec3::ZERO; 4])
            .resolve()
            .unwrap_err();
        assert!(matches!(err, SimError::ShapeMismatch { what: "initial positions", .. }));
    }

    #[test]
    fn scalar_parameters_are_checked() {
        let base = SimulatorConfig::new(line(2));
        assert_eq!(
            base.clone().with_stiffness(0.0).resolve().unwrap_err(),
            SimError::InvalidStiffness(0.0)
        );
        assert_eq!(
            base.clone().with_damping(-0.5).resolve().unwrap_err(),
            SimError::InvalidDamping(-0.5)
        );
        assert!(base
            .clone()
            .with_gravity(Vec3::new(0.0, f32::INFINITY, 0.0))
            .resolve()
            .is_err());
        assert!(base.with_damping(0.0).resolve().is_ok());
    }

    #[test]
    fn non_finite_positions_are_rejected() {
        let err = SimulatorConfig::new(line(2))
            .with_initial_positions(vec![Vec3::ZERO, Vec3::new(f32::NAN, 0.0, 0.0)])
            .resolve()
            .unwrap_err();
        assert_eq!(
            err,
            SimError::NonFinite {
                what: "initial positions",
                index: 1
            }
        );
    }
}
