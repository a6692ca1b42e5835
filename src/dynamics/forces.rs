use glam::Vec3;

use crate::graph::SpringTopology;

/// Read-only view of the per-node state a force generator may inspect.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    pub positions: &'a [Vec3],
    pub velocities: &'a [Vec3],
    pub inverse_masses: &'a [f32],
}

/// A force contribution added into a per-node accumulator.
pub trait ForceGenerator: Send + Sync {
    fn accumulate(&self, nodes: &NodeView<'_>, forces: &mut [Vec3]);
}

/// Linear springs along every edge: `-k * L * x + k * L * x0`.
pub struct LaplacianSpringForce<'t> {
    topology: &'t SpringTopology,
    parallel: bool,
}

impl<'t> LaplacianSpringForce<'t> {
    pub fn new(topology: &'t SpringTopology) -> Self {
        Self {
            topology,
            parallel: false,
        }
    }

    /// Evaluates rows concurrently when the `parallel` feature is enabled.
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}

impl ForceGenerator for LaplacianSpringForce<'_> {
    fn accumulate(&self, nodes: &NodeView<'_>, forces: &mut [Vec3]) {
        let topology = self.topology;
        let positions = nodes.positions;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            if self.parallel {
                forces
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(node, force)| *force += topology.spring_force(node, positions));
                return;
            }
        }

        for (node, force) in forces.iter_mut().enumerate() {
            *force += topology.spring_force(node, positions);
        }
    }
}

/// Uniform gravitational field, scaled by each node's mass.
pub struct GravityForce {
    pub gravity: Vec3,
}

impl GravityForce {
    pub fn new(gravity: Vec3) -> Self {
        Self { gravity }
    }
}

impl ForceGenerator for GravityForce {
    fn accumulate(&self, nodes: &NodeView<'_>, forces: &mut [Vec3]) {
        if self.gravity == Vec3::ZERO {
            return;
        }
        for (force, &inv_mass) in forces.iter_mut().zip(nodes.inverse_masses) {
            *force += self.gravity / inv_mass;
        }
    }
}

/// Linear viscous damping opposing the velocity.
pub struct DampingForce {
    pub coefficient: f32,
}

impl DampingForce {
    pub fn new(coefficient: f32) -> Self {
        Self { coefficient }
    }
}

impl ForceGenerator for DampingForce {
    fn accumulate(&self, nodes: &NodeView<'_>, forces: &mut [Vec3]) {
        if self.coefficient == 0.0 {
            return;
        }
        for (force, &velocity) in forces.iter_mut().zip(nodes.velocities) {
            *force -= velocity * self.coefficient;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    fn view<'a>(x: &'a [Vec3], v: &'a [Vec3], inv: &'a [f32]) -> NodeView<'a> {
        NodeView {
            positions: x,
            velocities: v,
            inverse_masses: inv,
        }
    }

    #[test]
    fn gravity_scales_with_mass() {
        let x = [Vec3::ZERO; 2];
        let v = [Vec3::ZERO; 2];
        let inv = [1.0, 0.5];
        let mut forces = [Vec3::ZERO; 2];
        GravityForce::new(Vec3::new(0.0, -10.0, 0.0)).accumulate(&view(&x, &v, &inv), &mut forces);
        assert_eq!(forces, [Vec3::new(0.0, -10.0, 0.0), Vec3::new(0.0, -20.0, 0.0)]);
    }

    #[test]
    fn damping_opposes_velocity() {
        let x = [Vec3::ZERO];
        let v = [Vec3::new(2.0, 0.0, -4.0)];
        let mut forces = [Vec3::ZERO];
        DampingForce::new(0.5).accumulate(&view(&x, &v, &[1.0]), &mut forces);
        assert_eq!(forces, [Vec3::new(-1.0, 0.0, 2.0)]);
    }

    #[test]
    fn stretched_spring_pulls_back() {
        let coords = [IVec3::new(0, 0, 0), IVec3::new(1, 0, 0)];
        let rest = vec![Vec3::ZERO, Vec3::X];
        let topology = SpringTopology::new(&coords, rest, 100.0).unwrap();
        let x = [Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0)];
        let v = [Vec3::ZERO; 2];
        let mut forces = [Vec3::ZERO; 2];
        LaplacianSpringForce::new(&topology).accumulate(&view(&x, &v, &[1.0, 1.0]), &mut forces);
        assert_eq!(forces, [Vec3::new(50.0, 0.0, 0.0), Vec3::new(-50.0, 0.0, 0.0)]);
    }
}
