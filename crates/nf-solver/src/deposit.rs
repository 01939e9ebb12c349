//! Edge-to-node deposit strategies.
//!
//! An edge flux R with blocks J_i, J_j is deposited as
//!
//! ```text
//! res[i] -= R        res[j] += R
//! jac[i,i] -= J_i    jac[i,j] -= J_j
//! jac[j,i] += J_i    jac[j,j] += J_j
//! ```
//!
//! Two strategies do this without locks:
//! - **DirectScatter**: edges of one color share no node, so each color group
//!   is split into disjoint row borrows and written in parallel.
//! - **EdgeBuffered**: fluxes land in edge-indexed buffers first; `fold_into`
//!   then sums them per node, in parallel over rows.

use nalgebra::{DMatrix, DVector};
use nf_core::{NodeId, Real};
use nf_mesh::{Edge, EdgeColoring, Mesh};
use rayon::prelude::*;

use crate::error::{SolverError, SolverResult};
use crate::linear::LinearSystem;
use crate::numerics::EdgeFlux;

/// Flux callback handed to a deposit strategy.
pub type EdgeFluxFn<'a> = dyn Fn(&Edge) -> EdgeFlux + Sync + 'a;

/// Moves per-edge fluxes into the node-indexed residual and Jacobian.
pub trait EdgeDeposit: Send + Sync {
    fn name(&self) -> &str;

    /// Evaluate `flux` on every edge and add the results to `system`.
    ///
    /// The Jacobian is only touched when `implicit` is set.
    fn assemble(
        &mut self,
        mesh: &Mesh,
        system: &mut LinearSystem,
        implicit: bool,
        flux: &EdgeFluxFn<'_>,
    ) -> SolverResult<()>;
}

fn add_scaled(target: &mut [Real], source: &DVector<Real>, sign: Real) {
    for (t, s) in target.iter_mut().zip(source.iter()) {
        *t += sign * s;
    }
}

/// Add `sign * m` to a row-major block.
fn add_block(block: &mut [Real], m: &DMatrix<Real>, sign: Real) {
    let n = m.nrows();
    for r in 0..n {
        for c in 0..n {
            block[r * n + c] += sign * m[(r, c)];
        }
    }
}

fn add_block_slice(block: &mut [Real], source: &[Real], sign: Real) {
    for (t, s) in block.iter_mut().zip(source) {
        *t += sign * s;
    }
}

/// Disjoint mutable views of everything one edge writes.
struct EdgeTask<'e, 's> {
    edge: &'e Edge,
    res_i: &'s mut [Real],
    res_j: &'s mut [Real],
    /// ii, ij, ji, jj
    jac: Option<[&'s mut [Real]; 4]>,
}

impl EdgeTask<'_, '_> {
    fn deposit(&mut self, flux: &EdgeFlux) {
        add_scaled(self.res_i, &flux.residual, -1.0);
        add_scaled(self.res_j, &flux.residual, 1.0);
        if let Some([ii, ij, ji, jj]) = &mut self.jac {
            add_block(ii, &flux.jacobian_i, -1.0);
            add_block(ij, &flux.jacobian_j, -1.0);
            add_block(ji, &flux.jacobian_i, 1.0);
            add_block(jj, &flux.jacobian_j, 1.0);
        }
    }
}

fn take_slot<'s>(slots: &mut [Option<&'s mut [Real]>], index: usize) -> SolverResult<&'s mut [Real]> {
    slots
        .get_mut(index)
        .and_then(Option::take)
        .ok_or_else(|| SolverError::InvalidState {
            what: format!("row {index} claimed twice within one edge color"),
        })
}

/// Colored, in-place deposit.
#[derive(Debug, Clone)]
pub struct DirectScatter {
    coloring: EdgeColoring,
}

impl DirectScatter {
    pub fn new(mesh: &Mesh) -> Self {
        Self {
            coloring: EdgeColoring::greedy(mesh),
        }
    }

    pub fn coloring(&self) -> &EdgeColoring {
        &self.coloring
    }
}

impl EdgeDeposit for DirectScatter {
    fn name(&self) -> &str {
        "direct_scatter"
    }

    fn assemble(
        &mut self,
        mesh: &Mesh,
        system: &mut LinearSystem,
        implicit: bool,
        flux: &EdgeFluxFn<'_>,
    ) -> SolverResult<()> {
        let n_var = system.n_var();
        let nb = system.block_len();
        let (pattern, residual, jacobian) = system.parts_mut();

        for group in self.coloring.groups() {
            let mut rows: Vec<Option<&mut [Real]>> = residual.chunks_mut(n_var).map(Some).collect();
            let mut blocks: Vec<Option<&mut [Real]>> = if implicit {
                jacobian.chunks_mut(nb).map(Some).collect()
            } else {
                Vec::new()
            };

            let mut tasks = Vec::with_capacity(group.len());
            for &edge_id in group {
                let edge = mesh.edge(edge_id).ok_or_else(|| SolverError::InvalidState {
                    what: format!("colored edge {edge_id} not on mesh"),
                })?;
                let res_i = take_slot(&mut rows, edge.i().idx())?;
                let res_j = take_slot(&mut rows, edge.j().idx())?;
                let jac = if implicit {
                    let eb = pattern.edge_blocks(edge_id)?;
                    Some([
                        take_slot(&mut blocks, eb.ii)?,
                        take_slot(&mut blocks, eb.ij)?,
                        take_slot(&mut blocks, eb.ji)?,
                        take_slot(&mut blocks, eb.jj)?,
                    ])
                } else {
                    None
                };
                tasks.push(EdgeTask {
                    edge,
                    res_i,
                    res_j,
                    jac,
                });
            }

            tasks.par_iter_mut().for_each(|task| {
                let f = flux(task.edge);
                task.deposit(&f);
            });
        }
        Ok(())
    }
}

/// Edge-indexed buffers plus a per-node fold.
#[derive(Debug, Clone, Default)]
pub struct EdgeBuffered {
    /// `n_var` residual entries per edge.
    residual: Vec<Real>,
    /// J_i then J_j, row-major, per edge.
    jacobian: Vec<Real>,
    buffered_jacobian: bool,
}

impl EdgeBuffered {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffered residual of one edge.
    pub fn edge_residual(&self, edge: usize, n_var: usize) -> &[Real] {
        &self.residual[edge * n_var..(edge + 1) * n_var]
    }

    /// Fill the buffers from `flux`, one edge per task.
    pub fn buffer(&mut self, mesh: &Mesh, n_var: usize, implicit: bool, flux: &EdgeFluxFn<'_>) {
        let nb = n_var * n_var;
        let n_edges = mesh.edges().len();
        self.residual.clear();
        self.residual.resize(n_edges * n_var, 0.0);
        self.jacobian.clear();
        self.buffered_jacobian = implicit;

        if implicit {
            self.jacobian.resize(n_edges * 2 * nb, 0.0);
            self.residual
                .par_chunks_mut(n_var)
                .zip(self.jacobian.par_chunks_mut(2 * nb))
                .zip(mesh.edges().par_iter())
                .for_each(|((res, jac), edge)| {
                    let f = flux(edge);
                    res.copy_from_slice(f.residual.as_slice());
                    let (ji, jj) = jac.split_at_mut(nb);
                    add_block(ji, &f.jacobian_i, 1.0);
                    add_block(jj, &f.jacobian_j, 1.0);
                });
        } else {
            self.residual
                .par_chunks_mut(n_var)
                .zip(mesh.edges().par_iter())
                .for_each(|(res, edge)| {
                    res.copy_from_slice(flux(edge).residual.as_slice());
                });
        }
    }

    /// Sum buffered contributions into node rows.
    pub fn fold_into(&self, mesh: &Mesh, system: &mut LinearSystem) -> SolverResult<()> {
        let n_var = system.n_var();
        let nb = system.block_len();
        let n_edges = mesh.edges().len();
        if self.residual.len() != n_edges * n_var {
            return Err(SolverError::InvalidState {
                what: format!(
                    "edge buffer holds {} values, mesh needs {}",
                    self.residual.len(),
                    n_edges * n_var
                ),
            });
        }

        let (pattern, residual, jacobian) = system.parts_mut();
        let edges = mesh.edges();

        residual
            .par_chunks_mut(n_var)
            .enumerate()
            .for_each(|(n, row)| {
                for &e in mesh.node_edges(NodeId::from_usize(n)) {
                    let sign = if edges[e.idx()].i().idx() == n { -1.0 } else { 1.0 };
                    add_block_slice(row, self.edge_residual(e.idx(), n_var), sign);
                }
            });

        if !self.buffered_jacobian {
            return Ok(());
        }

        let offsets = pattern.row_offsets();
        let mut rows: Vec<&mut [Real]> = Vec::with_capacity(pattern.n_rows());
        let mut rest = jacobian;
        for n in 0..pattern.n_rows() {
            let len = (offsets[n + 1] - offsets[n]) * nb;
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
            rows.push(head);
            rest = tail;
        }

        let edge_blocks = pattern.all_edge_blocks();
        rows.into_par_iter().enumerate().for_each(|(n, row)| {
            let local = |slot: usize| (slot - offsets[n]) * nb;
            for &e in mesh.node_edges(NodeId::from_usize(n)) {
                let eb = edge_blocks[e.idx()];
                let buf = &self.jacobian[e.idx() * 2 * nb..(e.idx() + 1) * 2 * nb];
                let (ji, jj) = buf.split_at(nb);
                if edges[e.idx()].i().idx() == n {
                    add_block_slice(&mut row[local(eb.ii)..local(eb.ii) + nb], ji, -1.0);
                    add_block_slice(&mut row[local(eb.ij)..local(eb.ij) + nb], jj, -1.0);
                } else {
                    add_block_slice(&mut row[local(eb.ji)..local(eb.ji) + nb], ji, 1.0);
                    add_block_slice(&mut row[local(eb.jj)..local(eb.jj) + nb], jj, 1.0);
                }
            }
        });
        Ok(())
    }
}

impl EdgeDeposit for EdgeBuffered {
    fn name(&self) -> &str {
        "edge_buffered"
    }

    fn assemble(
        &mut self,
        mesh: &Mesh,
        system: &mut LinearSystem,
        implicit: bool,
        flux: &EdgeFluxFn<'_>,
    ) -> SolverResult<()> {
        self.buffer(mesh, system.n_var(), implicit, flux);
        self.fold_into(mesh, system)
    }
}
