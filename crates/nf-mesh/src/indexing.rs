//! Block sparsity pattern for solver integration.
//!
//! Maps ordered node pairs `(i, j)` of the dual mesh to contiguous block
//! slots `0..N` of a block-sparse Jacobian. Row `i` holds the diagonal block
//! plus one block per edge neighbor, columns sorted ascending.

use std::ops::Range;

use nf_core::{EdgeId, NodeId};
use rayon::prelude::*;

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;

/// Block slots touched by one edge `(i, j)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeBlocks {
    pub ii: usize,
    pub ij: usize,
    pub ji: usize,
    pub jj: usize,
}

/// Compressed-row block pattern with precomputed per-edge and diagonal slots.
#[derive(Debug, Clone)]
pub struct BlockPattern {
    /// Row `i`'s blocks are `cols[row_offsets[i]..row_offsets[i+1]]`.
    row_offsets: Vec<usize>,

    /// Column node index of each block slot.
    cols: Vec<usize>,

    /// Diagonal slot of each row.
    diag: Vec<usize>,

    /// Slots touched by each edge (index = EdgeId).
    edge_blocks: Vec<EdgeBlocks>,
}

impl BlockPattern {
    /// Build the pattern from a mesh.
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let n = mesh.nodes().len();

        let mut row_offsets = Vec::with_capacity(n + 1);
        let mut cols = Vec::with_capacity(n + 2 * mesh.edges().len());
        let mut diag = Vec::with_capacity(n);
        row_offsets.push(0);

        for node in mesh.nodes() {
            let i = node.id.idx();
            let mut row: Vec<usize> = mesh
                .node_edges(node.id)
                .iter()
                .filter_map(|&e| mesh.edge(e))
                .map(|e| if e.i().idx() == i { e.j().idx() } else { e.i().idx() })
                .collect();
            row.push(i);
            row.sort_unstable();
            row.dedup();

            let start = cols.len();
            let d = row.iter().position(|&c| c == i).unwrap_or(0);
            diag.push(start + d);
            cols.extend_from_slice(&row);
            row_offsets.push(cols.len());
        }

        let mut pattern = Self {
            row_offsets,
            cols,
            diag,
            edge_blocks: Vec::new(),
        };

        // Every edge pair is present by construction, so lookups cannot miss.
        let edge_blocks = mesh
            .edges()
            .par_iter()
            .map(|e| {
                let (i, j) = (e.i().idx(), e.j().idx());
                EdgeBlocks {
                    ii: pattern.diag[i],
                    ij: pattern.find(i, j).unwrap_or(pattern.diag[i]),
                    ji: pattern.find(j, i).unwrap_or(pattern.diag[j]),
                    jj: pattern.diag[j],
                }
            })
            .collect();
        pattern.edge_blocks = edge_blocks;
        pattern
    }

    fn find(&self, row: usize, col: usize) -> Option<usize> {
        let range = self.row_offsets[row]..self.row_offsets[row + 1];
        self.cols[range.clone()]
            .binary_search(&col)
            .ok()
            .map(|k| range.start + k)
    }

    /// Number of block rows (nodes).
    pub fn n_rows(&self) -> usize {
        self.diag.len()
    }

    /// Total number of stored blocks.
    pub fn n_blocks(&self) -> usize {
        self.cols.len()
    }

    /// Slot range of row `i`.
    pub fn row(&self, i: usize) -> Range<usize> {
        self.row_offsets[i]..self.row_offsets[i + 1]
    }

    /// Row offsets (length `n_rows + 1`).
    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    /// Column node index of a slot.
    pub fn col(&self, slot: usize) -> usize {
        self.cols[slot]
    }

    /// Diagonal slot of row `i`.
    pub fn diag(&self, i: usize) -> usize {
        self.diag[i]
    }

    /// Slot of block `(i, j)`.
    pub fn block(&self, i: NodeId, j: NodeId) -> MeshResult<usize> {
        if i.idx() >= self.n_rows() || j.idx() >= self.n_rows() {
            return Err(MeshError::IdNotFound { what: "NodeId" });
        }
        self.find(i.idx(), j.idx())
            .ok_or(MeshError::IdNotFound { what: "block" })
    }

    /// Precomputed slots of an edge.
    pub fn edge_blocks(&self, edge: EdgeId) -> MeshResult<EdgeBlocks> {
        self.edge_blocks
            .get(edge.idx())
            .copied()
            .ok_or(MeshError::IdNotFound { what: "EdgeId" })
    }

    /// All edge slots indexed by edge.
    pub fn all_edge_blocks(&self) -> &[EdgeBlocks] {
        &self.edge_blocks
    }
}
