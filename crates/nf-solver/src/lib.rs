//! nf-solver: near-wall viscous closure.
//!
//! Per outer iteration:
//! 1. derive primitive state, gradient invariants and Roe dissipation
//! 2. solve the wall-function shear stress (optional)
//! 3. assemble edge viscous fluxes through the configured deposit strategy
//! 4. enforce no-slip walls with heat-flux, isothermal or CHT thermal conditions
//! 5. evaluate the buffet sensor (optional)
//!
//! [`ViscousSolver::run_pass`] runs all of them in order.

pub mod buffet;
pub mod config;
pub mod couplings;
pub mod deposit;
pub mod error;
pub mod flow;
pub mod jacobian;
pub mod linear;
pub mod moving_wall;
pub mod numerics;
pub mod primitive;
pub mod reductions;
pub mod solver;
pub mod stress;
pub mod viscous;
pub mod wall_bc;
pub mod wall_function;

pub use buffet::{BuffetMetrics, BuffetMonitor};
pub use config::{
    BuffetConfig, ChtCoupling, DepositStrategy, RecoveryPrandtl, ReferenceScales, RoeDissipation,
    SolverConfig, TimeIntegration, TurbulenceModel, WallCondition, WallFunctionConfig, WallSpec,
};
pub use couplings::{
    ConjugateHeat, ConjugateHeatData, Couplings, CustomBoundary, TurbulenceSource,
    UniformConjugate, UniformTurbulence,
};
pub use deposit::{DirectScatter, EdgeBuffered, EdgeDeposit};
pub use error::{SolverError, SolverResult};
pub use flow::FlowField;
pub use linear::LinearSystem;
pub use moving_wall::{MovingWallInput, add_moving_wall_contribution};
pub use numerics::{AveragedGradient, EdgeFlux, EdgeInput, ViscousNumerics};
pub use primitive::{FlowMonitor, PrimitiveStateUpdater};
pub use reductions::{AllReduce, MaxReduction, Reduction, SerialReducer, SumReduction, ThreadCommunicator};
pub use solver::{PassReport, PreprocessReport, ViscousSolver};
pub use viscous::ViscousFluxAssembler;
pub use wall_bc::{WallBoundaryEnforcer, WallDelta};
pub use wall_function::{WallShearInput, WallShearOutcome, WallShearStressModel};
