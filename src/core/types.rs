use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Undirected spring between two node indices, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    pub fn as_pair(&self) -> (usize, usize) {
        (self.a, self.b)
    }

    /// Returns the opposite endpoint when `node` belongs to this edge.
    pub fn other(&self, node: usize) -> Option<usize> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

impl From<(usize, usize)> for Edge {
    fn from((a, b): (usize, usize)) -> Self {
        Self::new(a, b)
    }
}

/// Grid axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Node masses, either shared by every node or given per node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MassSpec {
    Uniform(f32),
    PerNode(Vec<f32>),
}

impl Default for MassSpec {
    fn default() -> Self {
        MassSpec::Uniform(crate::config::DEFAULT_MASS)
    }
}

impl MassSpec {
    /// Canonicalises the masses into one inverse mass per node.
    pub fn inverse_masses(&self, node_count: usize) -> Result<Vec<f32>> {
        let check = |index: usize, mass: f32| {
            if mass.is_finite() && mass > 0.0 {
                Ok(1.0 / mass)
            } else {
                Err(SimError::NonPositiveMass { index, mass })
            }
        };

        match self {
            MassSpec::Uniform(mass) => {
                let inv = check(0, *mass)?;
                Ok(vec![inv; node_count])
            }
            MassSpec::PerNode(masses) => {
                if masses.len() != node_count {
                    return Err(SimError::ShapeMismatch {
                        what: "per-node masses",
                        expected: node_count,
                        actual: masses.len(),
                    });
                }
                masses
                    .iter()
                    .enumerate()
                    .map(|(index, &mass)| check(index, mass))
                    .collect()
            }
        }
    }
}

/// Which nodes are pinned to their rest positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FixedNodes {
    #[default]
    None,
    Indices(Vec<usize>),
    Mask(Vec<bool>),
}

impl FixedNodes {
    /// Pins every node whose coordinate along `axis` is the maximum of the set.
    pub fn top_layer(coords: &[IVec3], axis: Axis) -> Self {
        let axis = axis.index();
        let Some(top) = coords.iter().map(|c| c[axis]).max() else {
            return FixedNodes::None;
        };
        FixedNodes::Mask(coords.iter().map(|c| c[axis] == top).collect())
    }

    /// Canonicalises into a boolean mask of length `node_count`.
    pub fn to_mask(&self, node_count: usize) -> Result<Vec<bool>> {
        match self {
            FixedNodes::None => Ok(vec![false; node_count]),
            FixedNodes::Indices(indices) => {
                let mut mask = vec![false; node_count];
                for &index in indices {
                    let slot = mask.get_mut(index).ok_or(SimError::FixedIndexOutOfRange {
                        index,
                        len: node_count,
                    })?;
                    *slot = true;
                }
                Ok(mask)
            }
            FixedNodes::Mask(mask) => {
                if mask.len() != node_count {
                    return Err(SimError::ShapeMismatch {
                        what: "fixed mask",
                        expected: node_count,
                        actual: mask.len(),
                    });
                }
                Ok(mask.clone())
            }
        }
    }
}
