use std::time::Instant;

use glam::{IVec3, Vec3};
use log::{debug, warn};

use crate::{
    config::DEFAULT_FRAME_BUDGET_MS,
    core::{
        sim_config::{validate_damping, validate_gravity, ResolvedConfig},
        types::Edge,
        SimulatorConfig,
    },
    dynamics::{
        DampingForce, ForceGenerator, GravityForce, LaplacianSpringForce, NodeState, NodeView,
        PinConstraints, SymplecticEuler,
    },
    error::{Result, SimError},
    graph::SpringTopology,
    utils::{warn_if_frame_budget_exceeded, PhaseTimer, StepProfiler},
};

/// Explicit mass-spring simulator over a voxel adjacency graph.
///
/// Each call to [`SpringSimulator::step`] evaluates
/// `F = -k L x + k L x0 + m g - c v`, zeroes it on pinned nodes and advances
/// with semi-implicit Euler. Pinned nodes are snapped back onto their rest
/// positions with zero velocity at the end of every step.
///
/// The simulator owns its positions and velocities; callers only get
/// read-only views.
pub struct SpringSimulator {
    topology: SpringTopology,
    inverse_masses: Vec<f32>,
    fixed: Vec<bool>,
    damping: f32,
    gravity: Vec3,
    state: NodeState,
    scratch_forces: Vec<Vec3>,
    integrator: SymplecticEuler,
    profiler: StepProfiler,
    frame_budget_ms: f32,
    critical_dt: Option<f32>,
    stability_warned: bool,
}

impl SpringSimulator {
    /// Validates `config` and builds the graph, Laplacian and rest forcing.
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        let resolved = config.resolve()?;
        let topology = SpringTopology::new(
            &config.coords,
            resolved.rest_positions.clone(),
            resolved.stiffness,
        )?;
        Ok(Self::assemble(topology, resolved))
    }

    fn assemble(topology: SpringTopology, resolved: ResolvedConfig) -> Self {
        let n = topology.node_count();
        let fixed_count = resolved.fixed.iter().filter(|&&f| f).count();
        debug!(
            "Spring simulator: {} nodes, {} edges, {} fixed, k = {}",
            n,
            topology.edges().len(),
            fixed_count,
            topology.stiffness()
        );

        // Pinned nodes keep their initial positions until the first step ends.
        let state = NodeState::at_rest(resolved.initial_positions);
        let critical_dt = critical_time_step(&topology, &resolved.inverse_masses);

        Self {
            profiler: StepProfiler::new(n, topology.edges().len(), fixed_count),
            inverse_masses: resolved.inverse_masses,
            fixed: resolved.fixed,
            damping: resolved.damping,
            gravity: resolved.gravity,
            state,
            scratch_forces: vec![Vec3::ZERO; n],
            integrator: SymplecticEuler::new(),
            frame_budget_ms: DEFAULT_FRAME_BUDGET_MS,
            critical_dt,
            stability_warned: false,
            topology,
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// `dt` must be positive and finite. Stability is not checked beyond a
    /// one-time warning; see [`Self::critical_time_step`].
    pub fn step(&mut self, dt: f32) -> Result<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidTimeStep(dt));
        }
        self.warn_if_unstable(dt);

        let started = Instant::now();
        let mut forces = std::mem::take(&mut self.scratch_forces);

        let timer = PhaseTimer::start("forces");
        self.evaluate_forces(&mut forces);
        let force_time = timer.finish();

        let timer = PhaseTimer::start("integrate");
        self.integrator.integrate(
            dt,
            &forces,
            &self.inverse_masses,
            PinConstraints {
                fixed: &self.fixed,
                rest_positions: self.topology.rest_positions(),
            },
            &mut self.state,
        );
        let integrate_time = timer.finish();

        self.scratch_forces = forces;

        let total = started.elapsed();
        let over_budget = warn_if_frame_budget_exceeded(total, self.frame_budget_ms);
        self.profiler
            .record_step(force_time, integrate_time, total, over_budget);
        Ok(())
    }

    /// Total force on every node for the current state, zero on pinned nodes.
    pub fn forces(&self) -> Vec<Vec3> {
        let mut forces = vec![Vec3::ZERO; self.num_nodes()];
        self.evaluate_forces(&mut forces);
        forces
    }

    fn evaluate_forces(&self, forces: &mut [Vec3]) {
        forces.fill(Vec3::ZERO);

        let nodes = NodeView {
            positions: &self.state.positions,
            velocities: &self.state.velocities,
            inverse_masses: &self.inverse_masses,
        };
        let springs = LaplacianSpringForce::new(&self.topology).with_parallel(self.integrator.parallel());
        let gravity = GravityForce::new(self.gravity);
        let damping = DampingForce::new(self.damping);
        let generators: [&dyn ForceGenerator; 3] = [&springs, &gravity, &damping];
        for generator in generators {
            generator.accumulate(&nodes, forces);
        }

        for (force, &pinned) in forces.iter_mut().zip(&self.fixed) {
            if pinned {
                *force = Vec3::ZERO;
            }
        }
    }

    fn warn_if_unstable(&mut self, dt: f32) {
        if self.stability_warned {
            return;
        }
        if let Some(bound) = self.critical_time_step() {
            if dt > bound {
                warn!(
                    "dt = {dt} exceeds the explicit stability bound {bound:.5}; the simulation may diverge"
                );
                self.stability_warned = true;
            }
        }
    }

    /// Replaces the topology and parameters with those of `config`.
    ///
    /// With `carry_over_state` the current positions and velocities are kept
    /// (the node count must match) and only pinned nodes are snapped onto the
    /// new rest positions. Otherwise the state restarts from the configured
    /// initial positions at rest. On error nothing changes.
    pub fn rebuild(&mut self, config: SimulatorConfig, carry_over_state: bool) -> Result<()> {
        if carry_over_state && config.node_count() != self.num_nodes() {
            return Err(SimError::ShapeMismatch {
                what: "rebuild coordinates",
                expected: self.num_nodes(),
                actual: config.node_count(),
            });
        }

        let mut rebuilt = Self::new(config)?;
        rebuilt.integrator = self.integrator.clone();
        rebuilt.frame_budget_ms = self.frame_budget_ms;

        if carry_over_state {
            rebuilt.state = std::mem::take(&mut self.state);
            PinConstraints {
                fixed: &rebuilt.fixed,
                rest_positions: rebuilt.topology.rest_positions(),
            }
            .enforce(&mut rebuilt.state);
        }

        debug!(
            "Rebuilt spring simulator ({} state)",
            if carry_over_state { "carried-over" } else { "fresh" }
        );
        *self = rebuilt;
        Ok(())
    }

    pub fn set_damping(&mut self, damping: f32) -> Result<()> {
        validate_damping(damping)?;
        self.damping = damping;
        Ok(())
    }

    pub fn set_gravity(&mut self, gravity: Vec3) -> Result<()> {
        validate_gravity(gravity)?;
        self.gravity = gravity;
        Ok(())
    }

    /// Enables row- and node-parallel evaluation. Without the `parallel`
    /// feature this only records the flag.
    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.integrator.set_parallel(enabled);
    }

    pub fn parallel_enabled(&self) -> bool {
        self.integrator.parallel()
    }

    pub fn set_frame_budget_ms(&mut self, budget_ms: f32) {
        self.frame_budget_ms = budget_ms;
    }

    /// Largest `dt` guaranteed stable for the undamped system, `None` when
    /// there are no springs.
    pub fn critical_time_step(&self) -> Option<f32> {
        self.critical_dt
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.state
            .velocities
            .iter()
            .zip(&self.inverse_masses)
            .map(|(v, inv_mass)| 0.5 * v.length_squared() / inv_mass)
            .sum()
    }

    /// Elastic energy `k/2 * sum |(xa - xb) - (x0a - x0b)|^2` over all edges.
    pub fn spring_energy(&self) -> f32 {
        let x = &self.state.positions;
        let x0 = self.topology.rest_positions();
        let sum: f32 = self
            .edges()
            .iter()
            .map(|e| ((x[e.a] - x[e.b]) - (x0[e.a] - x0[e.b])).length_squared())
            .sum();
        0.5 * self.topology.stiffness() * sum
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.state.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.state.velocities
    }

    pub fn edges(&self) -> &[Edge] {
        self.topology.edges()
    }

    pub fn coords(&self) -> &[IVec3] {
        self.topology.graph().coords()
    }

    pub fn rest_positions(&self) -> &[Vec3] {
        self.topology.rest_positions()
    }

    pub fn fixed_mask(&self) -> &[bool] {
        &self.fixed
    }

    pub fn inverse_masses(&self) -> &[f32] {
        &self.inverse_masses
    }

    pub fn topology(&self) -> &SpringTopology {
        &self.topology
    }

    pub fn stiffness(&self) -> f32 {
        self.topology.stiffness()
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn num_nodes(&self) -> usize {
        self.topology.node_count()
    }

    pub fn num_edges(&self) -> usize {
        self.topology.edges().len()
    }

    pub fn elapsed_steps(&self) -> u64 {
        self.profiler.steps
    }

    pub fn profiler(&self) -> &StepProfiler {
        &self.profiler
    }
}

/// Conservative explicit-stability bound.
///
/// `lambda_max(L) <= 2 * max_degree`, so with the lightest node the bound is
/// `sqrt(2 * m_min / (k * max_degree))`.
fn critical_time_step(topology: &SpringTopology, inverse_masses: &[f32]) -> Option<f32> {
    let max_degree = topology.graph().max_degree();
    if max_degree == 0 {
        return None;
    }
    let max_inv_mass = inverse_masses.iter().copied().fold(0.0f32, f32::max);
    let min_mass = 1.0 / max_inv_mass;
    Some((2.0 * min_mass / (topology.stiffness() * max_degree as f32)).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FixedNodes, MassSpec};

    fn pair() -> SimulatorConfig {
        SimulatorConfig::new(vec![IVec3::ZERO, IVec3::X])
            .with_stiffness(100.0)
            .with_damping(0.0)
            .with_gravity(Vec3::ZERO)
    }

    #[test]
    fn invalid_dt_leaves_state_untouched() {
        let mut sim = SpringSimulator::new(
            pair().with_initial_positions(vec![Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0)]),
        )
        .unwrap();
        let before = sim.positions().to_vec();
        for dt in [0.0, -0.01, f32::NAN, f32::INFINITY] {
            assert!(matches!(sim.step(dt), Err(SimError::InvalidTimeStep(_))));
        }
        assert_eq!(sim.positions(), before.as_slice());
        assert_eq!(sim.elapsed_steps(), 0);
    }

    #[test]
    fn critical_time_step_uses_lightest_node() {
        let sim = SpringSimulator::new(pair().with_mass(MassSpec::PerNode(vec![2.0, 0.5]))).unwrap();
        let expected = (2.0f32 * 0.5 / 100.0).sqrt();
        assert!((sim.critical_time_step().unwrap() - expected).abs() < 1e-6);

        let lonely = SpringSimulator::new(SimulatorConfig::new(vec![IVec3::ZERO])).unwrap();
        assert_eq!(lonely.critical_time_step(), None);
    }

    #[test]
    fn failed_rebuild_keeps_previous_simulator() {
        let mut sim = SpringSimulator::new(pair()).unwrap();
        sim.step(0.01).unwrap();
        let err = sim.rebuild(pair().with_stiffness(-1.0), true).unwrap_err();
        assert_eq!(err, SimError::InvalidStiffness(-1.0));
        assert_eq!(sim.stiffness(), 100.0);
        assert_eq!(sim.elapsed_steps(), 1);
    }

    #[test]
    fn pinned_nodes_snap_to_rest_after_first_step() {
        let mut sim = SpringSimulator::new(
            pair()
                .with_initial_positions(vec![Vec3::splat(3.0), Vec3::X])
                .with_fixed(FixedNodes::Indices(vec![0])),
        )
        .unwrap();
        assert_eq!(sim.positions()[0], Vec3::splat(3.0));
        sim.step(0.01).unwrap();
        assert_eq!(sim.positions()[0], Vec3::ZERO);
        assert_eq!(sim.velocities()[0], Vec3::ZERO);
    }

    #[test]
    fn parameter_setters_validate() {
        let mut sim = SpringSimulator::new(pair()).unwrap();
        assert!(sim.set_damping(-1.0).is_err());
        assert!(sim.set_gravity(Vec3::new(f32::NAN, 0.0, 0.0)).is_err());
        sim.set_damping(0.3).unwrap();
        sim.set_gravity(Vec3::NEG_Y).unwrap();
        assert_eq!(sim.damping(), 0.3);
        assert_eq!(sim.gravity(), Vec3::NEG_Y);
    }

    #[test]
    fn energies_vanish_at_rest() {
        let sim = SpringSimulator::new(pair()).unwrap();
        assert_eq!(sim.kinetic_energy(), 0.0);
        assert_eq!(sim.spring_energy(), 0.0);
    }
}
