//! Orchestration of one viscous residual evaluation.

use nf_core::timing::{Timer, viscous_timing};
use nf_core::{MarkerId, Real};
use nf_fluids::{FluidModel, IdealGas};
use nf_mesh::Mesh;
use serde::Serialize;

use crate::buffet::{BuffetMetrics, BuffetMonitor};
use crate::config::{ChtCoupling, SolverConfig, TurbulenceModel, WallCondition};
use crate::couplings::Couplings;
use crate::error::{SolverError, SolverResult};
use crate::flow::FlowField;
use crate::linear::LinearSystem;
use crate::numerics::AveragedGradient;
use crate::primitive::{self, FlowMonitor, PrimitiveStateUpdater};
use crate::reductions::AllReduce;
use crate::viscous::ViscousFluxAssembler;
use crate::wall_bc::WallBoundaryEnforcer;
use crate::wall_function::WallShearStressModel;

/// Outcome of the per-iteration preprocessing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PreprocessReport {
    /// Non-physical nodes summed over all ranks.
    pub non_physical: usize,
    /// Wall vertices whose shear stress solve did not converge on this rank.
    pub wall_shear_unconverged: usize,
    pub flow: FlowMonitor,
}

/// Summary of one full pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassReport {
    pub preprocess: PreprocessReport,
    pub wall_nodes: usize,
    /// RMS of each residual component after wall enforcement.
    pub residual_rms: Vec<Real>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffet: Option<BuffetMetrics>,
}

/// Viscous closure of a compressible finite-volume solver.
#[derive(Debug)]
pub struct ViscousSolver {
    config: SolverConfig,
    fluid: IdealGas,
    updater: PrimitiveStateUpdater,
    wall_shear: Option<WallShearStressModel>,
    wall_markers: Vec<MarkerId>,
    assembler: ViscousFluxAssembler,
    walls: WallBoundaryEnforcer,
    buffet: Option<BuffetMonitor>,
}

impl ViscousSolver {
    /// Check the configuration against the mesh and collaborators and build
    /// every component.
    pub fn new(mesh: &Mesh, config: SolverConfig, couplings: Couplings<'_>) -> SolverResult<Self> {
        config.validate()?;
        if config.n_dim != mesh.n_dim() {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "configuration is {}D but mesh is {}D",
                    config.n_dim,
                    mesh.n_dim()
                ),
            });
        }

        if config.walls.iter().any(|w| w.condition == WallCondition::Cht) {
            ChtCoupling::from_config(config.cht_coupling.as_deref())?;
            if couplings.conjugate.is_none() {
                return Err(SolverError::ProblemSetup {
                    what: "CHT wall configured without a conjugate heat partner".to_string(),
                });
            }
        }
        if config.turbulence != TurbulenceModel::None && couplings.turbulence.is_none() {
            return Err(SolverError::ProblemSetup {
                what: format!("turbulence model {:?} needs a turbulence source", config.turbulence),
            });
        }

        let fluid = config.fluid()?;
        let walls = WallBoundaryEnforcer::new(mesh, &config)?;
        let wall_markers = walls.markers().collect();
        let assembler =
            ViscousFluxAssembler::new(mesh, &config, Box::new(AveragedGradient::new(&fluid)));
        let buffet = if config.buffet.enabled {
            Some(BuffetMonitor::new(mesh, &config)?)
        } else {
            None
        };
        let wall_shear = config
            .wall_function
            .enabled
            .then(|| WallShearStressModel::new(&config));

        tracing::info!(
            n_dim = config.n_dim,
            nodes = mesh.nodes().len(),
            edges = mesh.edges().len(),
            walls = config.walls.len(),
            fluid = fluid.name(),
            deposit = assembler.strategy(),
            implicit = config.implicit(),
            wall_function = wall_shear.is_some(),
            "viscous solver ready"
        );

        Ok(Self {
            updater: PrimitiveStateUpdater::new(&config),
            config,
            fluid,
            wall_shear,
            wall_markers,
            assembler,
            walls,
            buffet,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn fluid(&self) -> &IdealGas {
        &self.fluid
    }

    /// Empty residual/Jacobian sized for the mesh.
    pub fn new_system(&self, mesh: &Mesh) -> LinearSystem {
        LinearSystem::for_mesh(mesh)
    }

    /// Primitive update, gradient invariants, Roe dissipation and wall shear.
    pub fn preprocess(
        &self,
        mesh: &Mesh,
        field: &mut FlowField,
        couplings: Couplings<'_>,
        comm: &dyn AllReduce,
    ) -> SolverResult<PreprocessReport> {
        field.check_mesh(mesh)?;

        let timer = Timer::start("primitives");
        let local = self.updater.update(&self.fluid, couplings.turbulence, field);
        let non_physical = comm.reduce_sum(local as Real) as usize;
        if non_physical > 0 {
            tracing::debug!(local, global = non_physical, "non-physical primitive states");
        }
        let flow = primitive::set_vorticity_strain(field, comm);
        primitive::set_roe_dissipation(mesh, &self.config, field)?;
        timer.stop_into(&viscous_timing::PRIMITIVES);

        let mut wall_shear_unconverged = 0;
        if let Some(model) = &self.wall_shear {
            let timer = Timer::start("wall_shear");
            wall_shear_unconverged = model.update(mesh, &self.wall_markers, field)?;
            timer.stop_into(&viscous_timing::WALL_SHEAR);
        }

        Ok(PreprocessReport {
            non_physical,
            wall_shear_unconverged,
            flow,
        })
    }

    /// Edge viscous fluxes into `system`.
    pub fn viscous_residual(
        &mut self,
        mesh: &Mesh,
        field: &FlowField,
        system: &mut LinearSystem,
    ) -> SolverResult<()> {
        let timer = Timer::start("viscous_flux");
        self.assembler.assemble(mesh, field, system)?;
        timer.stop_into(&viscous_timing::VISCOUS_FLUX);
        Ok(())
    }

    /// Strong no-slip and weak thermal conditions on every wall.
    pub fn enforce_walls(
        &self,
        mesh: &Mesh,
        field: &mut FlowField,
        system: &mut LinearSystem,
        couplings: Couplings<'_>,
    ) -> SolverResult<usize> {
        let timer = Timer::start("wall_bc");
        let touched = self.walls.enforce(mesh, field, system, &self.config, couplings)?;
        timer.stop_into(&viscous_timing::WALL_BC);
        Ok(touched)
    }

    /// Buffet metric, if enabled.
    pub fn buffet(
        &self,
        mesh: &Mesh,
        field: &FlowField,
        comm: &dyn AllReduce,
    ) -> SolverResult<Option<BuffetMetrics>> {
        self.buffet
            .as_ref()
            .map(|monitor| monitor.evaluate(mesh, field, comm))
            .transpose()
    }

    /// One outer iteration's worth of viscous work on a zeroed system.
    pub fn run_pass(
        &mut self,
        mesh: &Mesh,
        field: &mut FlowField,
        system: &mut LinearSystem,
        couplings: Couplings<'_>,
        comm: &dyn AllReduce,
    ) -> SolverResult<PassReport> {
        system.zero();
        let preprocess = self.preprocess(mesh, field, couplings, comm)?;
        self.viscous_residual(mesh, field, system)?;
        let wall_nodes = self.enforce_walls(mesh, field, system, couplings)?;
        let buffet = self.buffet(mesh, field, comm)?;

        Ok(PassReport {
            preprocess,
            wall_nodes,
            residual_rms: system.residual_rms().iter().copied().collect(),
            buffet,
        })
    }
}
