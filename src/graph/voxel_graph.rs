use std::collections::HashMap;

use glam::IVec3;

use crate::{
    config::NEIGHBOR_OFFSETS,
    core::types::Edge,
    error::{Result, SimError},
};

/// Axis-aligned adjacency over a set of distinct voxel coordinates.
///
/// Two nodes are connected exactly when their coordinates differ by one unit
/// along a single axis. Diagonal neighbours are never connected.
#[derive(Debug, Clone)]
pub struct VoxelGraph {
    coords: Vec<IVec3>,
    lookup: HashMap<IVec3, usize>,
    edges: Vec<Edge>,
}

impl VoxelGraph {
    /// Builds the graph, rejecting duplicate coordinates.
    ///
    /// Only the positive offsets are looked up from each node, so every
    /// adjacency is emitted once.
    pub fn build(coords: &[IVec3]) -> Result<Self> {
        let mut lookup = HashMap::with_capacity(coords.len());
        for (index, &coord) in coords.iter().enumerate() {
            if let Some(first) = lookup.insert(coord, index) {
                return Err(SimError::DuplicateCoordinate {
                    coord,
                    first,
                    second: index,
                });
            }
        }

        let mut edges = Vec::new();
        for (index, &coord) in coords.iter().enumerate() {
            for offset in NEIGHBOR_OFFSETS {
                let Some(candidate) = offset_coord(coord, offset) else {
                    continue;
                };
                if let Some(&neighbor) = lookup.get(&candidate) {
                    edges.push(Edge::new(index, neighbor));
                }
            }
        }

        Ok(Self {
            coords: coords.to_vec(),
            lookup,
            edges,
        })
    }

    pub fn node_count(&self) -> usize {
        self.coords.len()
    }

    pub fn coords(&self) -> &[IVec3] {
        &self.coords
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn index_of(&self, coord: IVec3) -> Option<usize> {
        self.lookup.get(&coord).copied()
    }

    /// Number of neighbours of every node.
    pub fn degrees(&self) -> Vec<u32> {
        let mut degrees = vec![0u32; self.node_count()];
        for edge in &self.edges {
            degrees[edge.a] += 1;
            degrees[edge.b] += 1;
        }
        degrees
    }

    pub fn max_degree(&self) -> u32 {
        self.degrees().into_iter().max().unwrap_or(0)
    }
}

/// `coord + offset`, or `None` when any axis leaves the `i32` range.
fn offset_coord(coord: IVec3, offset: [i32; 3]) -> Option<IVec3> {
    Some(IVec3::new(
        coord.x.checked_add(offset[0])?,
        coord.y.checked_add(offset[1])?,
        coord.z.checked_add(offset[2])?,
    ))
}
