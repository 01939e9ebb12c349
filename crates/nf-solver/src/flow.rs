//! Per-node flow field storage.

use nf_core::vector::{self, Vec3};
use nf_core::{NodeId, Real};
use nf_fluids::{FluidModel, PrimitiveGradient, PrimitiveState, SecondaryState};
use nf_mesh::Mesh;

use crate::error::{SolverError, SolverResult};

/// Flow state of every node, structure-of-arrays.
///
/// Conserved vectors are stored flat, `n_var` entries per node.
#[derive(Debug, Clone)]
pub struct FlowField {
    n_dim: usize,
    n_var: usize,
    n_nodes: usize,

    pub conserved: Vec<Real>,
    pub conserved_old: Vec<Real>,
    pub primitive: Vec<PrimitiveState>,
    pub secondary: Vec<SecondaryState>,
    pub gradient: Vec<PrimitiveGradient>,
    pub turb_ke: Vec<Real>,
    pub vorticity: Vec<Vec3>,
    pub strain_mag: Vec<Real>,
    /// Wall shear stress from the wall function; zero when unset.
    pub tau_wall: Vec<Real>,
    pub roe_dissipation: Vec<Real>,
    pub hybrid_length_scale: Vec<Real>,
    /// Truncation error accumulator, flat like `conserved`.
    pub truncation_error: Vec<Real>,
}

impl FlowField {
    pub fn new(n_dim: usize, n_nodes: usize) -> Self {
        let n_var = nf_core::n_var(n_dim);
        Self {
            n_dim,
            n_var,
            n_nodes,
            conserved: vec![0.0; n_nodes * n_var],
            conserved_old: vec![0.0; n_nodes * n_var],
            primitive: vec![PrimitiveState::default(); n_nodes],
            secondary: vec![SecondaryState::default(); n_nodes],
            gradient: vec![PrimitiveGradient::default(); n_nodes],
            turb_ke: vec![0.0; n_nodes],
            vorticity: vec![vector::ZERO; n_nodes],
            strain_mag: vec![0.0; n_nodes],
            tau_wall: vec![0.0; n_nodes],
            roe_dissipation: vec![1.0; n_nodes],
            hybrid_length_scale: vec![0.0; n_nodes],
            truncation_error: vec![0.0; n_nodes * n_var],
        }
    }

    /// Field where every node holds the same density, velocity and pressure.
    pub fn uniform(
        mesh: &Mesh,
        fluid: &dyn FluidModel,
        density: Real,
        velocity: &Vec3,
        pressure: Real,
    ) -> SolverResult<Self> {
        Self::from_fn(mesh, fluid, |_| (density, *velocity, pressure))
    }

    /// Field initialised node by node from `(density, velocity, pressure)`.
    pub fn from_fn<F>(mesh: &Mesh, fluid: &dyn FluidModel, f: F) -> SolverResult<Self>
    where
        F: Fn(&nf_mesh::Node) -> (Real, Vec3, Real),
    {
        let mut field = Self::new(mesh.n_dim(), mesh.nodes().len());
        for node in mesh.nodes() {
            let (rho, vel, p) = f(node);
            let cons = fluid.conserved(mesh.n_dim(), rho, &vel, p)?;
            field.set_conserved(node.id, &cons)?;
        }
        field.conserved_old.copy_from_slice(&field.conserved);
        Ok(field)
    }

    pub fn n_dim(&self) -> usize {
        self.n_dim
    }

    pub fn n_var(&self) -> usize {
        self.n_var
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    pub fn conserved(&self, node: NodeId) -> &[Real] {
        let start = node.idx() * self.n_var;
        &self.conserved[start..start + self.n_var]
    }

    pub fn conserved_old(&self, node: NodeId) -> &[Real] {
        let start = node.idx() * self.n_var;
        &self.conserved_old[start..start + self.n_var]
    }

    pub fn set_conserved(&mut self, node: NodeId, values: &[Real]) -> SolverResult<()> {
        if values.len() != self.n_var || node.idx() >= self.n_nodes {
            return Err(SolverError::InvalidState {
                what: format!(
                    "conserved write at node {} with {} values (expected {})",
                    node,
                    values.len(),
                    self.n_var
                ),
            });
        }
        let start = node.idx() * self.n_var;
        self.conserved[start..start + self.n_var].copy_from_slice(values);
        Ok(())
    }

    /// Overwrite the stored old momentum so the old velocity equals `velocity`.
    pub fn set_old_velocity(&mut self, node: NodeId, velocity: &Vec3) {
        let start = node.idx() * self.n_var;
        let density = self.conserved[start];
        for d in 0..self.n_dim {
            self.conserved_old[start + d + 1] = density * velocity[d];
        }
    }

    /// Velocity implied by the stored old state.
    pub fn old_velocity(&self, node: NodeId) -> Vec3 {
        let old = self.conserved_old(node);
        let density = self.conserved(node)[0];
        let mut v = vector::ZERO;
        for d in 0..self.n_dim {
            v[d] = old[d + 1] / density;
        }
        v
    }

    pub fn zero_momentum_truncation_error(&mut self, node: NodeId) {
        let start = node.idx() * self.n_var;
        for d in 0..self.n_dim {
            self.truncation_error[start + d + 1] = 0.0;
        }
    }

    /// Check that the field was sized for this mesh.
    pub fn check_mesh(&self, mesh: &Mesh) -> SolverResult<()> {
        if self.n_dim != mesh.n_dim() || self.n_nodes != mesh.nodes().len() {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "field is {}D with {} nodes but mesh is {}D with {} nodes",
                    self.n_dim,
                    self.n_nodes,
                    mesh.n_dim(),
                    mesh.nodes().len()
                ),
            });
        }
        Ok(())
    }
}
