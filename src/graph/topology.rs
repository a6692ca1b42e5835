use glam::{IVec3, Vec3};

use super::{laplacian::SparseMatrix, voxel_graph::VoxelGraph};
use crate::{
    core::{sim_config::validate_stiffness, types::Edge},
    error::{Result, SimError},
};

/// The immutable part of a simulation: graph, Laplacian and rest forcing.
///
/// Built once from coordinates, rest positions and stiffness. Changing any of
/// those means building a new topology.
#[derive(Debug, Clone)]
pub struct SpringTopology {
    graph: VoxelGraph,
    laplacian: SparseMatrix,
    rest_positions: Vec<Vec3>,
    rest_forces: Vec<Vec3>,
    stiffness: f32,
}

impl SpringTopology {
    pub fn new(coords: &[IVec3], rest_positions: Vec<Vec3>, stiffness: f32) -> Result<Self> {
        validate_stiffness(stiffness)?;
        if rest_positions.len() != coords.len() {
            return Err(SimError::ShapeMismatch {
                what: "rest positions",
                expected: coords.len(),
                actual: rest_positions.len(),
            });
        }

        let graph = VoxelGraph::build(coords)?;
        let laplacian = SparseMatrix::laplacian(graph.node_count(), graph.edges());
        // c = k * L * x0, so that -k * L * x + c vanishes at rest.
        let rest_forces = laplacian
            .mul_vec3(&rest_positions)
            .into_iter()
            .map(|lx0| lx0 * stiffness)
            .collect();

        Ok(Self {
            graph,
            laplacian,
            rest_positions,
            rest_forces,
            stiffness,
        })
    }

    pub fn graph(&self) -> &VoxelGraph {
        &self.graph
    }

    pub fn laplacian(&self) -> &SparseMatrix {
        &self.laplacian
    }

    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn rest_positions(&self) -> &[Vec3] {
        &self.rest_positions
    }

    /// The rest-anchoring vector `k * L * x0`.
    pub fn rest_forces(&self) -> &[Vec3] {
        &self.rest_forces
    }

    pub fn stiffness(&self) -> f32 {
        self.stiffness
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Spring force on `node` for the field `positions`: `c - k * (L x)`.
    #[inline]
    pub fn spring_force(&self, node: usize, positions: &[Vec3]) -> Vec3 {
        self.rest_forces[node] - self.laplacian.row_dot(node, positions) * self.stiffness
    }
}
