//! Channels to external collaborators: turbulence model, custom boundary
//! values and the conjugate heat transfer partner.

use nf_core::{MarkerId, NodeId, Real, VertexId};
use serde::{Deserialize, Serialize};

/// Scalar outputs of an external turbulence model.
pub trait TurbulenceSource: Send + Sync {
    fn eddy_viscosity(&self, node: NodeId) -> Real;

    fn turbulent_kinetic_energy(&self, node: NodeId) -> Real;

    /// Length scale of a hybrid RANS/LES model, if one is active.
    fn hybrid_length_scale(&self, _node: NodeId) -> Option<Real> {
        None
    }
}

/// Per-face overrides for markers flagged `custom`.
///
/// Values are already nondimensional. `None` keeps the configured value.
pub trait CustomBoundary: Send + Sync {
    fn heat_flux(&self, marker: MarkerId, vertex: VertexId) -> Option<Real>;

    fn temperature(&self, marker: MarkerId, vertex: VertexId) -> Option<Real>;
}

/// Values received from the conjugate heat transfer partner at one face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConjugateHeatData {
    /// Partner temperature, dimensional.
    pub temperature: Real,
    /// Partner-side heat flux. Carried for the partner's own balance; the
    /// wall closure only reads temperature and heat transfer coefficient.
    #[serde(default)]
    pub heat_flux_density: Real,
    pub heat_transfer_coefficient: Real,
}

pub trait ConjugateHeat: Send + Sync {
    fn conjugate(&self, marker: MarkerId, vertex: VertexId) -> ConjugateHeatData;
}

/// Same turbulence outputs at every node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformTurbulence {
    pub eddy_viscosity: Real,
    pub turbulent_kinetic_energy: Real,
    pub hybrid_length_scale: Option<Real>,
}

impl TurbulenceSource for UniformTurbulence {
    fn eddy_viscosity(&self, _node: NodeId) -> Real {
        self.eddy_viscosity
    }

    fn turbulent_kinetic_energy(&self, _node: NodeId) -> Real {
        self.turbulent_kinetic_energy
    }

    fn hybrid_length_scale(&self, _node: NodeId) -> Option<Real> {
        self.hybrid_length_scale
    }
}

/// Same partner data on every face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformConjugate(pub ConjugateHeatData);

impl ConjugateHeat for UniformConjugate {
    fn conjugate(&self, _marker: MarkerId, _vertex: VertexId) -> ConjugateHeatData {
        self.0
    }
}

/// Optional collaborators handed to the solver.
#[derive(Clone, Copy, Default)]
pub struct Couplings<'a> {
    pub turbulence: Option<&'a dyn TurbulenceSource>,
    pub custom: Option<&'a dyn CustomBoundary>,
    pub conjugate: Option<&'a dyn ConjugateHeat>,
}
