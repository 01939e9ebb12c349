//! Calorically perfect gas with constant or Sutherland viscosity.

use nf_core::units::{DynVisc, constants};
use nf_core::vector::{self, Vec3};
use nf_core::Real;
use serde::{Deserialize, Serialize};

use crate::error::{FluidError, FluidResult};
use crate::model::{Derived, FluidModel, validation};
use crate::state::{Conserved, PrimitiveState, SecondaryState};

/// Laminar viscosity law.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViscosityLaw {
    Constant {
        mu: Real,
    },
    /// μ = μ_ref (T/T_ref)^1.5 (T_ref + S)/(T + S)
    Sutherland {
        mu_ref: Real,
        t_ref: Real,
        s: Real,
    },
}

impl ViscosityLaw {
    pub fn constant(mu: DynVisc) -> Self {
        Self::Constant { mu: mu.value }
    }

    pub fn sutherland_air() -> Self {
        Self::Sutherland {
            mu_ref: constants::MU_REF_AIR,
            t_ref: constants::T_REF_SUTHERLAND,
            s: constants::S_SUTHERLAND_AIR,
        }
    }

    pub fn viscosity(&self, t: Real) -> Real {
        match *self {
            Self::Constant { mu } => mu,
            Self::Sutherland { mu_ref, t_ref, s } => {
                mu_ref * (t / t_ref).powf(1.5) * (t_ref + s) / (t + s)
            }
        }
    }

    pub fn derivative(&self, t: Real) -> Real {
        match *self {
            Self::Constant { .. } => 0.0,
            Self::Sutherland { s, .. } => self.viscosity(t) * (1.5 / t - 1.0 / (t + s)),
        }
    }

    fn validate(&self) -> FluidResult<()> {
        match *self {
            Self::Constant { mu } => validation::validate_positive(mu, "viscosity"),
            Self::Sutherland { mu_ref, t_ref, s } => {
                validation::validate_positive(mu_ref, "Sutherland reference viscosity")?;
                validation::validate_positive(t_ref, "Sutherland reference temperature")?;
                validation::validate_positive(s, "Sutherland constant")
            }
        }
    }
}

/// Ideal gas p = ρRT with constant γ.
#[derive(Clone, Debug, PartialEq)]
pub struct IdealGas {
    gas_constant: Real,
    gamma: Real,
    prandtl_lam: Real,
    prandtl_turb: Real,
    viscosity: ViscosityLaw,
}

impl IdealGas {
    pub fn new(
        gas_constant: Real,
        gamma: Real,
        prandtl_lam: Real,
        prandtl_turb: Real,
        viscosity: ViscosityLaw,
    ) -> FluidResult<Self> {
        validation::validate_positive(gas_constant, "gas constant")?;
        validation::validate_gamma(gamma)?;
        validation::validate_positive(prandtl_lam, "laminar Prandtl number")?;
        validation::validate_positive(prandtl_turb, "turbulent Prandtl number")?;
        viscosity.validate()?;
        Ok(Self {
            gas_constant,
            gamma,
            prandtl_lam,
            prandtl_turb,
            viscosity,
        })
    }

    /// Dry air with Sutherland viscosity, Pr = 0.72 / 0.9.
    pub fn air() -> Self {
        Self {
            gas_constant: constants::R_AIR,
            gamma: constants::GAMMA_AIR,
            prandtl_lam: 0.72,
            prandtl_turb: 0.9,
            viscosity: ViscosityLaw::sutherland_air(),
        }
    }

    pub fn viscosity_law(&self) -> &ViscosityLaw {
        &self.viscosity
    }
}

impl FluidModel for IdealGas {
    fn name(&self) -> &str {
        match self.viscosity {
            ViscosityLaw::Constant { .. } => "ideal-gas/constant-viscosity",
            ViscosityLaw::Sutherland { .. } => "ideal-gas/sutherland",
        }
    }

    fn gas_constant(&self) -> Real {
        self.gas_constant
    }

    fn gamma(&self) -> Real {
        self.gamma
    }

    fn prandtl_lam(&self) -> Real {
        self.prandtl_lam
    }

    fn prandtl_turb(&self) -> Real {
        self.prandtl_turb
    }

    fn laminar_viscosity(&self, temperature: Real) -> Real {
        self.viscosity.viscosity(temperature)
    }

    fn dmu_dt(&self, temperature: Real) -> Real {
        self.viscosity.derivative(temperature)
    }

    fn derive(&self, n_dim: usize, conserved: &Conserved, eddy_viscosity: Real) -> Derived {
        let gm1 = self.gamma - 1.0;
        let density = conserved[0];
        let mut velocity = vector::ZERO;
        for d in 0..n_dim {
            velocity[d] = conserved[d + 1] / density;
        }
        let rho_e = conserved[n_dim + 1];
        let internal = rho_e / density - 0.5 * vector::squared_norm(n_dim, &velocity);
        let pressure = gm1 * density * internal;
        let temperature = pressure / (density * self.gas_constant);
        let laminar_viscosity = self.laminar_viscosity(temperature);
        let cp = self.cp();

        let primitive = PrimitiveState {
            temperature,
            velocity,
            pressure,
            density,
            enthalpy: (rho_e + pressure) / density,
            sound_speed: (self.gamma * pressure / density).sqrt(),
            laminar_viscosity,
            eddy_viscosity,
            thermal_conductivity: self.thermal_conductivity(laminar_viscosity, eddy_viscosity),
            cp,
        };
        let dmu_dt_rho = self.dmu_dt(temperature);
        let secondary = SecondaryState {
            dp_drho_e: gm1 * internal,
            dp_de_rho: gm1 * density,
            dt_drho_e: 0.0,
            dt_de_rho: gm1 / self.gas_constant,
            dmu_dt_rho,
            dk_dt_rho: cp * dmu_dt_rho / self.prandtl_lam,
        };

        Derived {
            primitive,
            secondary,
            admissible: primitive.is_admissible(),
        }
    }

    fn conserved(
        &self,
        n_dim: usize,
        density: Real,
        velocity: &Vec3,
        pressure: Real,
    ) -> FluidResult<Vec<Real>> {
        if !(2..=3).contains(&n_dim) {
            return Err(FluidError::InvalidArg {
                what: "dimension must be 2 or 3",
            });
        }
        validation::validate_positive(density, "density")?;
        validation::validate_positive(pressure, "pressure")?;

        let mut out = vec![0.0; nf_core::n_var(n_dim)];
        out[0] = density;
        for d in 0..n_dim {
            out[d + 1] = density * velocity[d];
        }
        out[n_dim + 1] = pressure / (self.gamma - 1.0)
            + 0.5 * density * vector::squared_norm(n_dim, velocity);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::units::pa_s;

    fn gas() -> IdealGas {
        IdealGas::new(287.0, 1.4, 0.72, 0.9, ViscosityLaw::constant(pa_s(1.8e-5))).unwrap()
    }

    #[test]
    fn derive_recovers_pressure_and_temperature() {
        let gas = gas();
        let u = gas.conserved(2, 1.2, &[10.0, -3.0, 0.0], 101_325.0).unwrap();
        let d = gas.derive(2, &u, 0.0);
        assert!(d.admissible);
        assert!((d.primitive.pressure - 101_325.0).abs() < 1e-8);
        assert!((d.primitive.temperature - 101_325.0 / (1.2 * 287.0)).abs() < 1e-9);
        assert!((d.primitive.velocity[1] + 3.0).abs() < 1e-12);
        assert_eq!(d.primitive.laminar_viscosity, 1.8e-5);
    }

    #[test]
    fn negative_energy_is_flagged_not_raised() {
        let gas = gas();
        let d = gas.derive(2, &[1.0, 10.0, 0.0, 1.0], 0.0);
        assert!(!d.admissible);
        assert!(d.primitive.pressure < 0.0);
    }

    #[test]
    fn sutherland_matches_reference_point() {
        let law = ViscosityLaw::sutherland_air();
        let mu = law.viscosity(constants::T_REF_SUTHERLAND);
        assert!((mu - constants::MU_REF_AIR).abs() < 1e-15);

        let t = 300.0;
        let h = 1e-3;
        let fd = (law.viscosity(t + h) - law.viscosity(t - h)) / (2.0 * h);
        assert!((law.derivative(t) - fd).abs() < 1e-12);
    }

    #[test]
    fn conductivity_uses_both_prandtl_numbers() {
        let gas = gas();
        let k = gas.thermal_conductivity(1.8e-5, 1.8e-4);
        let cp = 1.4 * 287.0 / 0.4;
        assert!((k - cp * (1.8e-5 / 0.72 + 1.8e-4 / 0.9)).abs() < 1e-12);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(IdealGas::new(287.0, 1.0, 0.72, 0.9, ViscosityLaw::sutherland_air()).is_err());
        assert!(
            IdealGas::new(-1.0, 1.4, 0.72, 0.9, ViscosityLaw::Constant { mu: 1e-5 }).is_err()
        );
    }
}
