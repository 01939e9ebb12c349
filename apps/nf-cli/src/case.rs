//! YAML case files: channel geometry, initial flow and solver settings.

use std::path::{Path, PathBuf};

use nf_core::Real;
use nf_fluids::IdealGas;
use nf_mesh::{ChannelSpec, Mesh, build_channel, build_lid_channel};
use nf_solver::{
    ConjugateHeatData, FlowField, SolverConfig, SolverError, UniformConjugate, UniformTurbulence,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    #[error("Failed to read case file: {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse case file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid case: {0}")]
    Invalid(String),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("Failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type CaseResult<T> = Result<T, CaseError>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshCase {
    pub nx: usize,
    pub ny: usize,
    pub lx: Real,
    pub ly: Real,
    /// Slide the upper wall at `flow.lid_speed` as a moving grid.
    #[serde(default)]
    pub moving_lid: bool,
}

/// Initial flow: uniform density and pressure, velocity rising linearly
/// from zero at the lower wall to `lid_speed` at the upper wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowCase {
    pub density: Real,
    pub pressure: Real,
    #[serde(default)]
    pub lid_speed: Real,
}

/// Frozen turbulence quantities for RANS or hybrid runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurbulenceCase {
    pub eddy_viscosity: Real,
    #[serde(default)]
    pub turbulent_kinetic_energy: Real,
    #[serde(default)]
    pub hybrid_length_scale: Option<Real>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub mesh: MeshCase,
    pub flow: FlowCase,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub turbulence: Option<TurbulenceCase>,
    /// Uniform partner data for CHT walls.
    #[serde(default)]
    pub conjugate: Option<ConjugateHeatData>,
}

impl Case {
    pub fn load(path: &Path) -> CaseResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CaseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| CaseError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> CaseResult<()> {
        if !(self.flow.density > 0.0 && self.flow.pressure > 0.0) {
            return Err(CaseError::Invalid(
                "flow density and pressure must be positive".to_string(),
            ));
        }
        if !self.flow.lid_speed.is_finite() {
            return Err(CaseError::Invalid("lid_speed must be finite".to_string()));
        }
        if self.solver.n_dim != 2 {
            return Err(CaseError::Invalid(format!(
                "channel cases are 2D (solver.n_dim = {})",
                self.solver.n_dim
            )));
        }
        self.solver.validate()?;
        Ok(())
    }

    pub fn build_mesh(&self) -> CaseResult<Mesh> {
        let MeshCase {
            nx,
            ny,
            lx,
            ly,
            moving_lid,
        } = self.mesh;
        let spec = ChannelSpec { nx, ny, lx, ly };
        let mesh = if moving_lid {
            build_lid_channel(&spec, [self.flow.lid_speed, 0.0, 0.0])
        } else {
            build_channel(&spec)
        };
        Ok(mesh.map_err(SolverError::from)?)
    }

    /// Couette profile with its exact velocity gradient.
    pub fn initial_field(&self, mesh: &Mesh, gas: &IdealGas) -> CaseResult<FlowField> {
        let FlowCase {
            density,
            pressure,
            lid_speed,
        } = self.flow;
        let ly = self.mesh.ly;
        let mut field = FlowField::from_fn(mesh, gas, |node| {
            (density, [lid_speed * node.coord[1] / ly, 0.0, 0.0], pressure)
        })?;
        for g in &mut field.gradient {
            g.velocity[0][1] = lid_speed / ly;
        }
        Ok(field)
    }

    pub fn turbulence_source(&self) -> Option<UniformTurbulence> {
        self.turbulence.map(|t| UniformTurbulence {
            eddy_viscosity: t.eddy_viscosity,
            turbulent_kinetic_energy: t.turbulent_kinetic_energy,
            hybrid_length_scale: t.hybrid_length_scale,
        })
    }

    pub fn conjugate_partner(&self) -> Option<UniformConjugate> {
        self.conjugate.map(UniformConjugate)
    }
}
