//! Per-node flow state records.

use nf_core::vector::{self, Vec3};
use nf_core::{MAX_DIM, Real};
use serde::{Deserialize, Serialize};

use crate::error::{FluidError, FluidResult};

/// Conserved variables (ρ, ρv, ρE) of one node, `n_dim + 2` long.
pub type Conserved = [Real];

/// Primitive variables of one node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveState {
    pub temperature: Real,
    pub velocity: Vec3,
    pub pressure: Real,
    pub density: Real,
    /// Total enthalpy (ρE + p)/ρ.
    pub enthalpy: Real,
    pub sound_speed: Real,
    pub laminar_viscosity: Real,
    pub eddy_viscosity: Real,
    pub thermal_conductivity: Real,
    /// Specific heat at constant pressure.
    pub cp: Real,
}

impl PrimitiveState {
    pub fn velocity_squared(&self, n_dim: usize) -> Real {
        vector::squared_norm(n_dim, &self.velocity)
    }

    pub fn total_viscosity(&self) -> Real {
        self.laminar_viscosity + self.eddy_viscosity
    }

    /// Density, pressure and temperature are positive and every field is finite.
    pub fn is_admissible(&self) -> bool {
        let finite = [
            self.temperature,
            self.pressure,
            self.density,
            self.enthalpy,
            self.sound_speed,
            self.laminar_viscosity,
            self.eddy_viscosity,
        ]
        .iter()
        .chain(self.velocity.iter())
        .all(|v| v.is_finite());
        finite && self.density > 0.0 && self.pressure > 0.0 && self.temperature > 0.0
    }
}

/// Thermodynamic derivatives used by implicit Jacobians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryState {
    /// ∂p/∂ρ at constant internal energy.
    pub dp_drho_e: Real,
    /// ∂p/∂e at constant density.
    pub dp_de_rho: Real,
    /// ∂T/∂ρ at constant internal energy.
    pub dt_drho_e: Real,
    /// ∂T/∂e at constant density.
    pub dt_de_rho: Real,
    /// ∂μ/∂T at constant density.
    pub dmu_dt_rho: Real,
    /// ∂k/∂T at constant density.
    pub dk_dt_rho: Real,
}

/// Gradients of the primitive variables at a node.
///
/// `velocity[i][j]` is ∂v_i/∂x_j.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveGradient {
    pub temperature: Vec3,
    pub velocity: [Vec3; MAX_DIM],
    pub pressure: Vec3,
}

impl PrimitiveGradient {
    /// Velocity divergence.
    pub fn divergence(&self, n_dim: usize) -> Real {
        (0..n_dim).map(|d| self.velocity[d][d]).sum()
    }

    /// Frobenius norm of the velocity gradient.
    pub fn velocity_gradient_norm(&self, n_dim: usize) -> Real {
        let mut sum = 0.0;
        for i in 0..n_dim {
            for j in 0..n_dim {
                sum += self.velocity[i][j] * self.velocity[i][j];
            }
        }
        sum.sqrt()
    }
}

/// Check a conserved slice has exactly `n_dim + 2` entries.
pub fn check_len(n_dim: usize, conserved: &Conserved) -> FluidResult<()> {
    let n_var = nf_core::n_var(n_dim);
    if conserved.len() != n_var {
        return Err(FluidError::StateLength {
            len: conserved.len(),
            n_var,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_not_admissible() {
        assert!(!PrimitiveState::default().is_admissible());
    }

    #[test]
    fn nan_velocity_is_not_admissible() {
        let state = PrimitiveState {
            temperature: 300.0,
            velocity: [Real::NAN, 0.0, 0.0],
            pressure: 1e5,
            density: 1.2,
            ..Default::default()
        };
        assert!(!state.is_admissible());
    }

    #[test]
    fn divergence_uses_active_dimensions() {
        let mut grad = PrimitiveGradient::default();
        grad.velocity[0][0] = 1.0;
        grad.velocity[1][1] = 2.0;
        grad.velocity[2][2] = 4.0;
        assert_eq!(grad.divergence(2), 3.0);
        assert_eq!(grad.divergence(3), 7.0);
    }

    #[test]
    fn state_length_is_checked() {
        assert!(check_len(2, &[1.0; 4]).is_ok());
        assert_eq!(
            check_len(3, &[1.0; 4]).unwrap_err(),
            FluidError::StateLength { len: 4, n_var: 5 }
        );
    }
}
