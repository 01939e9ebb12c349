//! Residual vector and block-sparse Jacobian.

use nalgebra::{DMatrix, DVector};
use nf_core::Real;
use nf_mesh::{BlockPattern, Mesh};

/// Node residuals plus a block Jacobian laid out on a `BlockPattern`.
///
/// Blocks are `n_var × n_var`, row-major, stored back to back in slot order.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    n_var: usize,
    pattern: BlockPattern,
    residual: Vec<Real>,
    jacobian: Vec<Real>,
}

impl LinearSystem {
    pub fn new(pattern: BlockPattern, n_var: usize) -> Self {
        let residual = vec![0.0; pattern.n_rows() * n_var];
        let jacobian = vec![0.0; pattern.n_blocks() * n_var * n_var];
        Self {
            n_var,
            pattern,
            residual,
            jacobian,
        }
    }

    pub fn for_mesh(mesh: &Mesh) -> Self {
        Self::new(BlockPattern::from_mesh(mesh), nf_core::n_var(mesh.n_dim()))
    }

    pub fn n_var(&self) -> usize {
        self.n_var
    }

    pub fn block_len(&self) -> usize {
        self.n_var * self.n_var
    }

    pub fn pattern(&self) -> &BlockPattern {
        &self.pattern
    }

    pub fn zero(&mut self) {
        self.residual.fill(0.0);
        self.jacobian.fill(0.0);
    }

    pub fn residual(&self, node: usize) -> &[Real] {
        &self.residual[node * self.n_var..(node + 1) * self.n_var]
    }

    pub fn residual_mut(&mut self, node: usize) -> &mut [Real] {
        &mut self.residual[node * self.n_var..(node + 1) * self.n_var]
    }

    pub fn residual_flat(&self) -> &[Real] {
        &self.residual
    }

    pub fn block(&self, slot: usize) -> &[Real] {
        let nb = self.block_len();
        &self.jacobian[slot * nb..(slot + 1) * nb]
    }

    pub fn block_mut(&mut self, slot: usize) -> &mut [Real] {
        let nb = self.block_len();
        &mut self.jacobian[slot * nb..(slot + 1) * nb]
    }

    pub fn block_matrix(&self, slot: usize) -> DMatrix<Real> {
        DMatrix::from_row_slice(self.n_var, self.n_var, self.block(slot))
    }

    pub fn diag_block_matrix(&self, node: usize) -> DMatrix<Real> {
        self.block_matrix(self.pattern.diag(node))
    }

    /// Split borrow for parallel writers.
    pub fn parts_mut(&mut self) -> (&BlockPattern, &mut [Real], &mut [Real]) {
        (&self.pattern, &mut self.residual, &mut self.jacobian)
    }

    /// Add a single row into the diagonal block of `node`.
    pub fn add_to_diag_row(&mut self, node: usize, row: usize, values: &[Real]) {
        let n_var = self.n_var;
        let slot = self.pattern.diag(node);
        let block = self.block_mut(slot);
        for (c, v) in values.iter().take(n_var).enumerate() {
            block[row * n_var + c] += v;
        }
    }

    /// Replace equation `var` of `node` by an identity row.
    ///
    /// Every block of the row gets that line zeroed; the diagonal entry becomes 1.
    pub fn set_identity_row(&mut self, node: usize, var: usize) {
        let n_var = self.n_var;
        let nb = self.block_len();
        let diag = self.pattern.diag(node);
        for slot in self.pattern.row(node) {
            let line = &mut self.jacobian[slot * nb + var * n_var..slot * nb + (var + 1) * n_var];
            line.fill(0.0);
            if slot == diag {
                line[var] = 1.0;
            }
        }
    }

    /// Root-mean-square of each residual component over all nodes.
    pub fn residual_rms(&self) -> DVector<Real> {
        let n_rows = self.pattern.n_rows().max(1);
        let mut sums = DVector::<Real>::zeros(self.n_var);
        for row in self.residual.chunks(self.n_var) {
            for (v, r) in row.iter().enumerate() {
                sums[v] += r * r;
            }
        }
        sums.map(|s| (s / n_rows as Real).sqrt())
    }

    /// Largest absolute difference to another system with the same layout.
    pub fn max_difference(&self, other: &Self) -> (Real, Real) {
        let diff = |a: &[Real], b: &[Real]| {
            a.iter()
                .zip(b)
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, Real::max)
        };
        (
            diff(&self.residual, &other.residual),
            diff(&self.jacobian, &other.jacobian),
        )
    }
}
