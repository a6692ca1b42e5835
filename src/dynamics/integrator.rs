use glam::Vec3;

/// Mutable kinematic state owned by a simulator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeState {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
}

impl NodeState {
    /// Starts at `positions` with every node at rest.
    pub fn at_rest(positions: Vec<Vec3>) -> Self {
        let velocities = vec![Vec3::ZERO; positions.len()];
        Self {
            positions,
            velocities,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Hard positional constraints: pinned nodes sit exactly on their rest position.
#[derive(Clone, Copy)]
pub struct PinConstraints<'a> {
    pub fixed: &'a [bool],
    pub rest_positions: &'a [Vec3],
}

impl PinConstraints<'_> {
    /// Snaps every pinned node onto its rest position with zero velocity.
    pub fn enforce(&self, state: &mut NodeState) {
        for (node, &pinned) in self.fixed.iter().enumerate() {
            if pinned {
                state.positions[node] = self.rest_positions[node];
                state.velocities[node] = Vec3::ZERO;
            }
        }
    }
}

/// Semi-implicit (symplectic) Euler: velocity first, then position from the
/// new velocity.
///
/// The scheme is only conditionally stable. For a node of mass `m` attached
/// by springs of stiffness `k`, oscillation grows without bound once
/// `dt * sqrt(k * lambda / m) > 2`, where `lambda` is the relevant Laplacian
/// eigenvalue (at most twice the node degree).
#[derive(Debug, Clone, Default)]
pub struct SymplecticEuler {
    parallel: bool,
}

impl SymplecticEuler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parallel(&mut self, enabled: bool) {
        self.parallel = enabled;
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Advances every node by `dt` under `forces`.
    ///
    /// `forces` must already be zero on pinned nodes.
    pub fn integrate(
        &self,
        dt: f32,
        forces: &[Vec3],
        inverse_masses: &[f32],
        pins: PinConstraints<'_>,
        state: &mut NodeState,
    ) {
        let advance = |node: usize, x: &mut Vec3, v: &mut Vec3| {
            *v += dt * (forces[node] * inverse_masses[node]);
            if pins.fixed[node] {
                *v = Vec3::ZERO;
            }
            *x += dt * *v;
            if pins.fixed[node] {
                *x = pins.rest_positions[node];
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            if self.parallel {
                state
                    .positions
                    .par_iter_mut()
                    .zip(state.velocities.par_iter_mut())
                    .enumerate()
                    .for_each(|(node, (x, v))| advance(node, x, v));
                return;
            }
        }

        for (node, (x, v)) in state
            .positions
            .iter_mut()
            .zip(state.velocities.iter_mut())
            .enumerate()
        {
            advance(node, x, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn velocity_is_updated_before_position() {
        let mut state = NodeState::at_rest(vec![Vec3::ZERO]);
        let pins = PinConstraints {
            fixed: &[false],
            rest_positions: &[Vec3::ZERO],
        };
        SymplecticEuler::new().integrate(0.1, &[Vec3::new(0.0, 2.0, 0.0)], &[0.5], pins, &mut state);
        assert_relative_eq!(state.velocities[0].y, 0.1, epsilon = 1e-6);
        // Explicit Euler would leave the position untouched on the first step.
        assert_relative_eq!(state.positions[0].y, 0.01, epsilon = 1e-6);
    }

    #[test]
    fn pinned_nodes_snap_to_rest() {
        let rest = [Vec3::new(1.0, 2.0, 3.0)];
        let mut state = NodeState {
            positions: vec![Vec3::new(9.0, 9.0, 9.0)],
            velocities: vec![Vec3::ONE],
        };
        let pins = PinConstraints {
            fixed: &[true],
            rest_positions: &rest,
        };
        SymplecticEuler::new().integrate(0.5, &[Vec3::ZERO], &[1.0], pins, &mut state);
        assert_eq!(state.positions[0], rest[0]);
        assert_eq!(state.velocities[0], Vec3::ZERO);
    }

    #[test]
    fn enforce_only_touches_pinned_nodes() {
        let rest = [Vec3::ZERO, Vec3::ZERO];
        let mut state = NodeState {
            positions: vec![Vec3::ONE, Vec3::ONE],
            velocities: vec![Vec3::ONE, Vec3::ONE],
        };
        PinConstraints {
            fixed: &[false, true],
            rest_positions: &rest,
        }
        .enforce(&mut state);
        assert_eq!(state.positions, vec![Vec3::ONE, Vec3::ZERO]);
        assert_eq!(state.velocities, vec![Vec3::ONE, Vec3::ZERO]);
    }
}
