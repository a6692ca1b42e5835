use std::ops::Range;

use glam::Vec3;

use crate::core::types::Edge;

/// Square sparse matrix in compressed sparse row form.
///
/// Columns within a row are strictly increasing. Structural entries are kept
/// even when their value is zero, so the diagonal of an isolated node is still
/// counted by [`SparseMatrix::nnz`].
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    dim: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f32>,
}

impl SparseMatrix {
    /// Assembles the graph Laplacian `D - A` for `dim` nodes.
    ///
    /// Every edge contributes `-1` at `(a, b)` and `(b, a)`; every row stores
    /// its diagonal degree entry. Repeated edges accumulate.
    ///
    /// Panics if an edge names a node `>= dim`.
    pub fn laplacian(dim: usize, edges: &[Edge]) -> Self {
        let mut rows: Vec<Vec<(usize, f32)>> = (0..dim).map(|i| vec![(i, 0.0)]).collect();
        for edge in edges {
            let (a, b) = edge.as_pair();
            rows[a].push((b, -1.0));
            rows[b].push((a, -1.0));
            rows[a][0].1 += 1.0;
            rows[b][0].1 += 1.0;
        }

        let mut row_offsets = Vec::with_capacity(dim + 1);
        let mut col_indices = Vec::with_capacity(dim + 2 * edges.len());
        let mut values = Vec::with_capacity(dim + 2 * edges.len());
        row_offsets.push(0);

        for mut row in rows {
            row.sort_by_key(|&(col, _)| col);
            let start = col_indices.len();
            for (col, value) in row {
                if col_indices.len() > start && col_indices.last() == Some(&col) {
                    if let Some(last) = values.last_mut() {
                        *last += value;
                    }
                } else {
                    col_indices.push(col);
                    values.push(value);
                }
            }
            row_offsets.push(col_indices.len());
        }

        Self {
            dim,
            row_offsets,
            col_indices,
            values,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored entries, explicit zeros included.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Storage range of `row`; empty for rows outside the matrix.
    fn row_range(&self, row: usize) -> Range<usize> {
        if row >= self.dim {
            return 0..0;
        }
        self.row_offsets[row]..self.row_offsets[row + 1]
    }

    /// Iterates `(column, value)` over the stored entries of `row`. Rows
    /// outside the matrix are empty, matching [`Self::get`].
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let range = self.row_range(row);
        self.col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        let range = self.row_range(row);
        match self.col_indices[range.clone()].binary_search(&col) {
            Ok(pos) => self.values[range.start + pos],
            Err(_) => 0.0,
        }
    }

    pub fn diagonal(&self) -> Vec<f32> {
        (0..self.dim).map(|i| self.get(i, i)).collect()
    }

    /// Dot product of one row with a vector field.
    #[inline]
    pub fn row_dot(&self, row: usize, x: &[Vec3]) -> Vec3 {
        self.row(row)
            .fold(Vec3::ZERO, |acc, (col, value)| acc + x[col] * value)
    }

    /// Computes `self * x` into `out`.
    pub fn mul_vec3_into(&self, x: &[Vec3], out: &mut [Vec3]) {
        debug_assert_eq!(x.len(), self.dim);
        debug_assert_eq!(out.len(), self.dim);
        for (row, slot) in out.iter_mut().enumerate() {
            *slot = self.row_dot(row, x);
        }
    }

    /// Row-parallel `self * x`; produces the same bits as [`Self::mul_vec3_into`].
    #[cfg(feature = "parallel")]
    pub fn par_mul_vec3_into(&self, x: &[Vec3], out: &mut [Vec3]) {
        use rayon::prelude::*;

        debug_assert_eq!(x.len(), self.dim);
        debug_assert_eq!(out.len(), self.dim);
        out.par_iter_mut()
            .enumerate()
            .for_each(|(row, slot)| *slot = self.row_dot(row, x));
    }

    pub fn mul_vec3(&self, x: &[Vec3]) -> Vec<Vec3> {
        let mut out = vec![Vec3::ZERO; self.dim];
        self.mul_vec3_into(x, &mut out);
        out
    }

    pub fn row_sums(&self) -> Vec<f32> {
        (0..self.dim)
            .map(|row| self.row(row).map(|(_, value)| value).sum())
            .collect()
    }

    pub fn col_sums(&self) -> Vec<f32> {
        let mut sums = vec![0.0; self.dim];
        for (&col, &value) in self.col_indices.iter().zip(&self.values) {
            sums[col] += value;
        }
        sums
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.dim).all(|row| self.row(row).all(|(col, value)| self.get(col, row) == value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> Vec<Edge> {
        (1..n).map(|i| Edge::new(i - 1, i)).collect()
    }

    #[test]
    fn rows_outside_the_matrix_are_empty() {
        let l = SparseMatrix::laplacian(3, &path(3));
        assert_eq!(l.row(3).count(), 0);
        assert_eq!(l.get(3, 0), 0.0);
        assert_eq!(l.row_dot(7, &[Vec3::ONE; 3]), Vec3::ZERO);
    }

    #[test]
    fn path_laplacian_entries() {
        let l = SparseMatrix::laplacian(3, &path(3));
        assert_eq!(l.diagonal(), vec![1.0, 2.0, 1.0]);
        assert_eq!(l.get(0, 1), -1.0);
        assert_eq!(l.get(1, 0), -1.0);
        assert_eq!(l.get(0, 2), 0.0);
        assert!(l.is_symmetric());
    }

    #[test]
    fn isolated_node_keeps_explicit_zero_diagonal() {
        let l = SparseMatrix::laplacian(3, &[Edge::new(0, 1)]);
        assert_eq!(l.nnz(), 2 + 3);
        assert_eq!(l.row(2).collect::<Vec<_>>(), vec![(2, 0.0)]);
    }

    #[test]
    fn multiplication_of_constant_field_vanishes() {
        let l = SparseMatrix::laplacian(4, &path(4));
        let out = l.mul_vec3(&[Vec3::splat(3.5); 4]);
        assert!(out.iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn repeated_edges_accumulate() {
        let l = SparseMatrix::laplacian(2, &[Edge::new(0, 1), Edge::new(1, 0)]);
        assert_eq!(l.nnz(), 4);
        assert_eq!(l.get(0, 0), 2.0);
        assert_eq!(l.get(0, 1), -2.0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_product_matches_sequential() {
        let l = SparseMatrix::laplacian(64, &path(64));
        let x: Vec<Vec3> = (0..64)
            .map(|i| Vec3::new(i as f32 * 0.37, (i * i) as f32 * 0.01, -(i as f32)))
            .collect();
        let mut par = vec![Vec3::ZERO; 64];
        l.par_mul_vec3_into(&x, &mut par);
        assert_eq!(par, l.mul_vec3(&x));
    }
}
