//! Fluid model trait and validation helpers.

use nf_core::Real;

use crate::error::{FluidError, FluidResult};
use crate::state::{Conserved, PrimitiveState, SecondaryState};

/// Outcome of deriving primitives from a conserved state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Derived {
    pub primitive: PrimitiveState,
    pub secondary: SecondaryState,
    /// `false` when the derived state is non-physical.
    pub admissible: bool,
}

/// Equation of state plus transport laws.
///
/// Implementations must be thread-safe (Send + Sync) to support parallel evaluation.
pub trait FluidModel: Send + Sync {
    /// Get the model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Specific gas constant.
    fn gas_constant(&self) -> Real;

    /// Ratio of specific heats.
    fn gamma(&self) -> Real;

    /// Specific heat at constant pressure.
    fn cp(&self) -> Real {
        let gamma = self.gamma();
        gamma * self.gas_constant() / (gamma - 1.0)
    }

    /// Laminar Prandtl number.
    fn prandtl_lam(&self) -> Real;

    /// Turbulent Prandtl number.
    fn prandtl_turb(&self) -> Real;

    /// Laminar viscosity at a temperature.
    fn laminar_viscosity(&self, temperature: Real) -> Real;

    /// ∂μ/∂T of the viscosity law.
    fn dmu_dt(&self, temperature: Real) -> Real;

    /// Effective conductivity k = cp (μ/Pr_lam + μ_t/Pr_turb).
    fn thermal_conductivity(&self, laminar_viscosity: Real, eddy_viscosity: Real) -> Real {
        self.cp() * (laminar_viscosity / self.prandtl_lam() + eddy_viscosity / self.prandtl_turb())
    }

    /// Derive primitive and secondary variables from a conserved state.
    ///
    /// Never fails on non-physical input; the result reports admissibility instead.
    fn derive(&self, n_dim: usize, conserved: &Conserved, eddy_viscosity: Real) -> Derived;

    /// Build a conserved state from density, velocity and pressure.
    fn conserved(
        &self,
        n_dim: usize,
        density: Real,
        velocity: &nf_core::Vec3,
        pressure: Real,
    ) -> FluidResult<Vec<Real>>;
}

/// Validation helpers for fluid parameters.
pub(crate) mod validation {
    use super::*;

    pub fn validate_positive(v: Real, what: &'static str) -> FluidResult<()> {
        if !v.is_finite() || v <= 0.0 {
            return Err(FluidError::NonPhysical { what });
        }
        Ok(())
    }

    /// Ensure gamma (heat capacity ratio) is physically plausible.
    pub fn validate_gamma(gamma: Real) -> FluidResult<()> {
        if !gamma.is_finite() || gamma <= 1.0 {
            return Err(FluidError::NonPhysical {
                what: "gamma must be > 1 and finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;

    #[test]
    fn validate_positive_rejects_zero_and_nan() {
        assert!(validate_positive(287.0, "R").is_ok());
        assert!(validate_positive(0.0, "R").is_err());
        assert!(validate_positive(-1.0, "R").is_err());
        assert!(validate_positive(f64::NAN, "R").is_err());
    }

    #[test]
    fn validate_gamma_physical() {
        assert!(validate_gamma(1.4).is_ok());
        assert!(validate_gamma(1.0).is_err());
        assert!(validate_gamma(f64::INFINITY).is_err());
    }
}
