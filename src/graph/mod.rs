//! Voxel adjacency, the sparse graph Laplacian, and the immutable spring topology.

pub mod laplacian;
pub mod topology;
pub mod voxel_graph;

pub use laplacian::SparseMatrix;
pub use topology::SpringTopology;
pub use voxel_graph::VoxelGraph;
