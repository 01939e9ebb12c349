//! Edge loop of the viscous residual.

use nf_mesh::{Edge, Mesh};

use crate::config::{DepositStrategy, SolverConfig};
use crate::deposit::{DirectScatter, EdgeBuffered, EdgeDeposit};
use crate::error::SolverResult;
use crate::flow::FlowField;
use crate::linear::LinearSystem;
use crate::numerics::{EdgeFlux, EdgeInput, ViscousNumerics};

/// Gathers edge inputs, calls the numerics and hands the fluxes to the
/// deposit strategy chosen at construction.
pub struct ViscousFluxAssembler {
    numerics: Box<dyn ViscousNumerics>,
    deposit: Box<dyn EdgeDeposit>,
    needs_tke: bool,
    implicit: bool,
}

impl std::fmt::Debug for ViscousFluxAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViscousFluxAssembler")
            .field("numerics", &self.numerics.name())
            .field("deposit", &self.deposit.name())
            .field("needs_tke", &self.needs_tke)
            .field("implicit", &self.implicit)
            .finish()
    }
}

impl ViscousFluxAssembler {
    pub fn new(mesh: &Mesh, config: &SolverConfig, numerics: Box<dyn ViscousNumerics>) -> Self {
        let deposit: Box<dyn EdgeDeposit> = match config.deposit {
            DepositStrategy::DirectScatter => Box::new(DirectScatter::new(mesh)),
            DepositStrategy::EdgeBuffered => Box::new(EdgeBuffered::new()),
        };
        Self::with_deposit(numerics, deposit, config.turbulence.needs_tke(), config.implicit())
    }

    pub fn with_deposit(
        numerics: Box<dyn ViscousNumerics>,
        deposit: Box<dyn EdgeDeposit>,
        needs_tke: bool,
        implicit: bool,
    ) -> Self {
        Self {
            numerics,
            deposit,
            needs_tke,
            implicit,
        }
    }

    pub fn strategy(&self) -> &str {
        self.deposit.name()
    }

    /// Add the viscous flux of every edge to `system`.
    pub fn assemble(
        &mut self,
        mesh: &Mesh,
        field: &FlowField,
        system: &mut LinearSystem,
    ) -> SolverResult<()> {
        field.check_mesh(mesh)?;
        let numerics = self.numerics.as_ref();
        let n_dim = mesh.n_dim();
        let nodes = mesh.nodes();
        let needs_tke = self.needs_tke;
        let implicit = self.implicit;

        let flux = |edge: &Edge| -> EdgeFlux {
            let (i, j) = (edge.i().idx(), edge.j().idx());
            let tke = if needs_tke {
                [field.turb_ke[i], field.turb_ke[j]]
            } else {
                [0.0; 2]
            };
            // Both endpoints see the shear stress stored at i
            let tau_wall = field.tau_wall[i];
            numerics.compute(
                &EdgeInput {
                    n_dim,
                    normal: &edge.normal,
                    coord: [&nodes[i].coord, &nodes[j].coord],
                    primitive: [&field.primitive[i], &field.primitive[j]],
                    gradient: [&field.gradient[i], &field.gradient[j]],
                    tke,
                    tau_wall: [tau_wall, tau_wall],
                },
                implicit,
            )
        };

        self.deposit.assemble(mesh, system, implicit, &flux)
    }
}
