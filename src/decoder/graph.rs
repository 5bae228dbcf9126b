//! Tanner graph descriptor.
//!
//! This module contains the struct [`TannerGraph`], an immutable description
//! of the bipartite graph of an LDPC code in the flat edge-indexed form used
//! by the belief propagation decoder. Edge-indexed buffers are partitioned
//! into contiguous blocks, one block per variable node, holding the edges of
//! that variable in the order in which its adjacent checks were declared. A
//! precomputed transpose permutation lets the check node pass gather the
//! messages of each check node from the variable-ordered layout in O(degree)
//! time.
//!
//! The descriptor is validated at construction and never mutated afterwards,
//! so it can be shared (typically through an [`Arc`](std::sync::Arc)) by any
//! number of concurrently running decoder instances.

use crate::sparse::SparseMatrix;
use thiserror::Error;

/// Tanner graph validation error.
///
/// This enum represents the structural defects that are rejected when
/// constructing a [`TannerGraph`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum GraphError {
    /// The variable degrees and the check degrees do not add up to the same
    /// number of edges.
    #[error("variable degrees sum to {var_edges} edges but check degrees sum to {check_edges}")]
    DegreeSumMismatch {
        /// Sum of the variable node degrees.
        var_edges: usize,
        /// Sum of the check node degrees.
        check_edges: usize,
    },
    /// The transpose table does not contain one entry per edge.
    #[error("transpose table has {actual} entries for {expected} edges")]
    TransposeLengthMismatch {
        /// Number of edges of the graph.
        expected: usize,
        /// Number of entries in the transpose table.
        actual: usize,
    },
    /// A transpose entry references an edge outside the graph.
    #[error("transpose entry {value} is outside the {num_edges} edges of the graph")]
    TransposeOutOfRange {
        /// Offending transpose entry.
        value: u32,
        /// Number of edges of the graph.
        num_edges: usize,
    },
    /// An edge appears more than once in the transpose table, so the table is
    /// not a permutation.
    #[error("edge {edge} appears more than once in the transpose table")]
    TransposeRepeated {
        /// Edge index that is repeated.
        edge: u32,
    },
    /// A node has a degree that cannot be represented by the descriptor.
    #[error("node degree {degree} exceeds the supported maximum")]
    DegreeTooLarge {
        /// Offending node degree.
        degree: usize,
    },
}

/// Tanner graph descriptor.
///
/// Describes the bipartite graph of an LDPC code by the degree of each
/// variable node, the degree of each check node, and the transpose
/// permutation that maps the check-ordered edge enumeration to the
/// variable-ordered edge layout.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TannerGraph {
    var_degrees: Box<[u16]>,
    check_degrees: Box<[u16]>,
    transpose: Box<[u32]>,
    num_edges: usize,
}

impl TannerGraph {
    /// Creates a Tanner graph descriptor from its degree and transpose
    /// tables.
    ///
    /// The `transpose` table lists, for the k-th neighbor of each check node
    /// in check order, the index of the corresponding edge in the
    /// variable-ordered layout.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] if the degree sums do not match, or if
    /// `transpose` is not a permutation of the edge indices.
    pub fn new(
        var_degrees: Vec<u16>,
        check_degrees: Vec<u16>,
        transpose: Vec<u32>,
    ) -> Result<TannerGraph, GraphError> {
        let var_edges = var_degrees.iter().map(|&d| usize::from(d)).sum::<usize>();
        let check_edges = check_degrees.iter().map(|&d| usize::from(d)).sum::<usize>();
        if var_edges != check_edges {
            return Err(GraphError::DegreeSumMismatch {
                var_edges,
                check_edges,
            });
        }
        let num_edges = var_edges;
        if transpose.len() != num_edges {
            return Err(GraphError::TransposeLengthMismatch {
                expected: num_edges,
                actual: transpose.len(),
            });
        }
        let mut seen = vec![false; num_edges];
        for &t in transpose.iter() {
            let edge = usize::try_from(t).unwrap();
            if edge >= num_edges {
                return Err(GraphError::TransposeOutOfRange {
                    value: t,
                    num_edges,
                });
            }
            if seen[edge] {
                return Err(GraphError::TransposeRepeated { edge: t });
            }
            seen[edge] = true;
        }
        Ok(TannerGraph {
            var_degrees: var_degrees.into_boxed_slice(),
            check_degrees: check_degrees.into_boxed_slice(),
            transpose: transpose.into_boxed_slice(),
            num_edges,
        })
    }

    /// Creates a Tanner graph descriptor from a parity check matrix.
    ///
    /// The columns of `h` correspond to the variable nodes and the rows to
    /// the check nodes. Edges are laid out by column, in the order in which
    /// the ones of each column were inserted.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] if a row or column weight cannot be
    /// represented in the descriptor degree tables.
    pub fn from_matrix(h: &SparseMatrix) -> Result<TannerGraph, GraphError> {
        fn degree(weight: usize) -> Result<u16, GraphError> {
            u16::try_from(weight).map_err(|_| GraphError::DegreeTooLarge { degree: weight })
        }

        let var_degrees = (0..h.num_cols())
            .map(|c| degree(h.col_weight(c)))
            .collect::<Result<Vec<_>, _>>()?;
        let check_degrees = (0..h.num_rows())
            .map(|r| degree(h.row_weight(r)))
            .collect::<Result<Vec<_>, _>>()?;

        // Enumerate the edges by column and record, for each row, the edge
        // indices of its ones. Concatenating the per-row lists in row order
        // gives the transpose table.
        let mut row_edges = vec![Vec::new(); h.num_rows()];
        let mut edge = 0u32;
        for c in 0..h.num_cols() {
            for &r in h.iter_col(c) {
                row_edges[r].push(edge);
                edge += 1;
            }
        }
        let transpose = row_edges.into_iter().flatten().collect();
        TannerGraph::new(var_degrees, check_degrees, transpose)
    }

    /// Returns the number of variable nodes of the graph.
    pub fn num_variables(&self) -> usize {
        self.var_degrees.len()
    }

    /// Returns the number of check nodes of the graph.
    pub fn num_checks(&self) -> usize {
        self.check_degrees.len()
    }

    /// Returns the number of edges of the graph.
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Returns the degrees of the variable nodes.
    pub fn var_degrees(&self) -> &[u16] {
        &self.var_degrees
    }

    /// Returns the degrees of the check nodes.
    pub fn check_degrees(&self) -> &[u16] {
        &self.check_degrees
    }

    /// Returns the transpose table of the graph.
    pub fn transpose(&self) -> &[u32] {
        &self.transpose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Example 2.5 in Sarah J. Johnson - Iterative Error Correction
    fn test_matrix() -> SparseMatrix {
        let mut h = SparseMatrix::new(4, 6);
        h.insert_row(0, [0, 1, 3].iter());
        h.insert_row(1, [1, 2, 4].iter());
        h.insert_row(2, [0, 4, 5].iter());
        h.insert_row(3, [2, 3, 5].iter());
        h
    }

    #[test]
    fn from_matrix() {
        let graph = TannerGraph::from_matrix(&test_matrix()).unwrap();
        assert_eq!(graph.num_variables(), 6);
        assert_eq!(graph.num_checks(), 4);
        assert_eq!(graph.num_edges(), 12);
        assert_eq!(graph.var_degrees(), &[2, 2, 2, 2, 2, 2]);
        assert_eq!(graph.check_degrees(), &[3, 3, 3, 3]);
        // every edge appears exactly once in the transpose table
        let mut edges = graph.transpose().to_vec();
        edges.sort_unstable();
        assert_eq!(edges, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn transpose_gathers_check_neighbors() {
        let h = test_matrix();
        let graph = TannerGraph::from_matrix(&h).unwrap();
        // mark each edge with its variable node and check that the gather of
        // each check block visits exactly the variables of that row of h
        let mut edge_var = vec![0; graph.num_edges()];
        let mut edge = 0;
        for (v, &degree) in graph.var_degrees().iter().enumerate() {
            for _ in 0..degree {
                edge_var[edge] = v;
                edge += 1;
            }
        }
        let mut offset = 0;
        for (c, &degree) in graph.check_degrees().iter().enumerate() {
            let degree = usize::from(degree);
            let mut gathered = graph.transpose()[offset..offset + degree]
                .iter()
                .map(|&e| edge_var[usize::try_from(e).unwrap()])
                .collect::<Vec<_>>();
            gathered.sort_unstable();
            let mut expected = h.iter_row(c).copied().collect::<Vec<_>>();
            expected.sort_unstable();
            assert_eq!(gathered, expected);
            offset += degree;
        }
    }

    #[test]
    fn degree_sum_mismatch() {
        let err = TannerGraph::new(vec![2, 2], vec![3], vec![0, 1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            GraphError::DegreeSumMismatch {
                var_edges: 4,
                check_edges: 3
            }
        );
    }

    #[test]
    fn transpose_length_mismatch() {
        let err = TannerGraph::new(vec![1, 1], vec![2], vec![0]).unwrap_err();
        assert_eq!(
            err,
            GraphError::TransposeLengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn transpose_not_a_permutation() {
        let err = TannerGraph::new(vec![1, 1], vec![2], vec![0, 2]).unwrap_err();
        assert_eq!(
            err,
            GraphError::TransposeOutOfRange {
                value: 2,
                num_edges: 2
            }
        );
        let err = TannerGraph::new(vec![1, 1], vec![2], vec![1, 1]).unwrap_err();
        assert_eq!(err, GraphError::TransposeRepeated { edge: 1 });
    }
}
