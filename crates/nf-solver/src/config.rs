//! Solver configuration.
//!
//! Everything is serde-deserializable so a case file can carry it verbatim.
//! Dimensional wall values (temperature in K, heat flux in W/m²) are divided
//! by the reference scales when the boundary conditions are enforced.

use std::collections::HashSet;

use nf_core::Real;
use nf_core::units::{self, HeatFlux, Temperature, constants};
use nf_core::vector::Vec3;
use nf_fluids::{IdealGas, ViscosityLaw};
use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

/// Time integration scheme; only implicit runs touch the Jacobian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeIntegration {
    Explicit,
    #[default]
    Implicit,
}

/// How edge contributions reach the node-indexed residual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStrategy {
    /// Colored edge groups write straight into node rows.
    #[default]
    DirectScatter,
    /// Edge-indexed buffer folded into node rows afterwards.
    EdgeBuffered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurbulenceModel {
    #[default]
    None,
    Sa,
    Sst,
    SstSust,
}

impl TurbulenceModel {
    /// SST variants feed turbulence kinetic energy into the stress tensor.
    pub fn needs_tke(self) -> bool {
        matches!(self, Self::Sst | Self::SstSust)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoeDissipation {
    #[default]
    None,
    Fd,
    FdDucros,
    Nts,
    NtsDucros,
}

/// Which Prandtl number sets the wall-function recovery factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPrandtl {
    #[default]
    Laminar,
    Turbulent,
}

/// Conjugate heat transfer coupling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChtCoupling {
    AveragedNeumann,
    AveragedRobin,
    DirectNeumann,
    DirectRobin,
}

impl ChtCoupling {
    pub fn parse(s: &str) -> SolverResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "averaged_temperature_neumann_heatflux" => Ok(Self::AveragedNeumann),
            "averaged_temperature_robin_heatflux" => Ok(Self::AveragedRobin),
            "direct_temperature_neumann_heatflux" => Ok(Self::DirectNeumann),
            "direct_temperature_robin_heatflux" => Ok(Self::DirectRobin),
            other => Err(SolverError::Configuration {
                what: format!("Unknown CHT coupling method '{other}'"),
            }),
        }
    }

    /// Resolve the configured mode, failing when it is missing or unknown.
    pub fn from_config(mode: Option<&str>) -> SolverResult<Self> {
        match mode {
            Some(s) => Self::parse(s),
            None => Err(SolverError::Configuration {
                what: "CHT wall present but no CHT coupling method configured".to_string(),
            }),
        }
    }

    pub fn is_averaged(self) -> bool {
        matches!(self, Self::AveragedNeumann | Self::AveragedRobin)
    }
}

/// Boundary condition carried by a wall marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WallCondition {
    /// Prescribed heat flux [W/m²].
    HeatFlux { heat_flux: Real },
    /// Prescribed temperature [K].
    Isothermal { temperature: Real },
    /// Temperature from a conjugate heat transfer partner.
    Cht,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSpec {
    pub marker: String,
    pub condition: WallCondition,
    /// Per-vertex values come from the custom boundary source.
    #[serde(default)]
    pub custom: bool,
    /// Contributes to the buffet metric.
    #[serde(default)]
    pub monitoring: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceScales {
    pub temperature: Real,
    pub heat_flux: Real,
    pub viscosity: Real,
}

impl Default for ReferenceScales {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            heat_flux: 1.0,
            viscosity: 1.0,
        }
    }
}

impl ReferenceScales {
    pub fn nondim_temperature(&self, t: Temperature) -> Real {
        t.value / self.temperature
    }

    pub fn nondim_heat_flux(&self, q: HeatFlux) -> Real {
        q.value / self.heat_flux
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallFunctionConfig {
    pub enabled: bool,
    pub max_iterations: usize,
    pub tolerance: Real,
    pub relaxation: Real,
    pub kappa: Real,
    pub b: Real,
    pub recovery_prandtl: RecoveryPrandtl,
}

impl Default for WallFunctionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_iterations: 10,
            tolerance: 1e-6,
            relaxation: 0.25,
            kappa: 0.4,
            b: 5.5,
            recovery_prandtl: RecoveryPrandtl::Laminar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuffetConfig {
    pub enabled: bool,
    pub k: Real,
    pub lambda: Real,
    pub ref_area: Real,
    pub freestream_density: Real,
    pub freestream_velocity: Vec3,
}

impl Default for BuffetConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            k: 10.0,
            lambda: 0.0,
            ref_area: 1.0,
            freestream_density: 1.2,
            freestream_velocity: [1.0, 0.0, 0.0],
        }
    }
}

/// Top-level configuration of the viscous closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub n_dim: usize,
    pub gas_constant: Real,
    pub gamma: Real,
    /// Freestream laminar viscosity law.
    pub viscosity: ViscosityLaw,
    pub prandtl_lam: Real,
    pub prandtl_turb: Real,
    pub turbulence: TurbulenceModel,
    pub hybrid_rans_les: bool,
    pub time_integration: TimeIntegration,
    pub deposit: DepositStrategy,
    pub walls: Vec<WallSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cht_coupling: Option<String>,
    pub reference: ReferenceScales,
    pub wall_function: WallFunctionConfig,
    pub roe_dissipation: RoeDissipation,
    pub des_constant: Real,
    pub inverse_time_scale: Real,
    pub buffet: BuffetConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            n_dim: 2,
            gas_constant: constants::R_AIR,
            gamma: constants::GAMMA_AIR,
            viscosity: ViscosityLaw::sutherland_air(),
            prandtl_lam: 0.72,
            prandtl_turb: 0.9,
            turbulence: TurbulenceModel::None,
            hybrid_rans_les: false,
            time_integration: TimeIntegration::Implicit,
            deposit: DepositStrategy::DirectScatter,
            walls: Vec::new(),
            cht_coupling: None,
            reference: ReferenceScales::default(),
            wall_function: WallFunctionConfig::default(),
            roe_dissipation: RoeDissipation::None,
            des_constant: 0.65,
            inverse_time_scale: 1.0,
            buffet: BuffetConfig::default(),
        }
    }
}

fn positive(v: Real, what: &str) -> SolverResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(SolverError::Configuration {
            what: format!("{what} must be positive and finite (got {v})"),
        })
    }
}

impl SolverConfig {
    pub fn implicit(&self) -> bool {
        self.time_integration == TimeIntegration::Implicit
    }

    pub fn cp(&self) -> Real {
        self.gamma * self.gas_constant / (self.gamma - 1.0)
    }

    /// Effective conductivity cp (μ/Pr_lam + μ_t/Pr_turb).
    pub fn thermal_conductivity(&self, laminar_viscosity: Real, eddy_viscosity: Real) -> Real {
        self.cp() * (laminar_viscosity / self.prandtl_lam + eddy_viscosity / self.prandtl_turb)
    }

    /// Nondimensional wall heat flux of a configured value.
    pub fn wall_heat_flux(&self, heat_flux: Real) -> Real {
        self.reference.nondim_heat_flux(units::w_per_m2(heat_flux))
    }

    /// Nondimensional wall temperature of a configured value.
    pub fn wall_temperature(&self, temperature: Real) -> Real {
        self.reference.nondim_temperature(units::k(temperature))
    }

    pub fn fluid(&self) -> SolverResult<IdealGas> {
        Ok(IdealGas::new(
            self.gas_constant,
            self.gamma,
            self.prandtl_lam,
            self.prandtl_turb,
            self.viscosity,
        )?)
    }

    pub fn wall(&self, marker: &str) -> Option<&WallSpec> {
        self.walls.iter().find(|w| w.marker == marker)
    }

    /// Check physical ranges and internal consistency.
    pub fn validate(&self) -> SolverResult<()> {
        if !(2..=3).contains(&self.n_dim) {
            return Err(SolverError::Configuration {
                what: format!("n_dim must be 2 or 3 (got {})", self.n_dim),
            });
        }
        positive(self.gas_constant, "gas_constant")?;
        if !(self.gamma.is_finite() && self.gamma > 1.0) {
            return Err(SolverError::Configuration {
                what: format!("gamma must be > 1 (got {})", self.gamma),
            });
        }
        positive(self.prandtl_lam, "prandtl_lam")?;
        positive(self.prandtl_turb, "prandtl_turb")?;
        positive(self.reference.temperature, "reference.temperature")?;
        positive(self.reference.heat_flux, "reference.heat_flux")?;
        positive(self.reference.viscosity, "reference.viscosity")?;
        positive(self.des_constant, "des_constant")?;
        if !(self.inverse_time_scale.is_finite() && self.inverse_time_scale >= 0.0) {
            return Err(SolverError::Configuration {
                what: "inverse_time_scale must be non-negative".to_string(),
            });
        }

        let wf = &self.wall_function;
        if wf.max_iterations == 0 {
            return Err(SolverError::Configuration {
                what: "wall_function.max_iterations must be at least 1".to_string(),
            });
        }
        positive(wf.tolerance, "wall_function.tolerance")?;
        positive(wf.kappa, "wall_function.kappa")?;
        if !(wf.relaxation > 0.0 && wf.relaxation <= 1.0) {
            return Err(SolverError::Configuration {
                what: format!("wall_function.relaxation must be in (0, 1] (got {})", wf.relaxation),
            });
        }

        if self.buffet.enabled {
            positive(self.buffet.ref_area, "buffet.ref_area")?;
            positive(self.buffet.freestream_density, "buffet.freestream_density")?;
            let v2: Real = self.buffet.freestream_velocity[..self.n_dim]
                .iter()
                .map(|v| v * v)
                .sum();
            positive(v2, "buffet freestream speed")?;
        }

        let mut seen = HashSet::with_capacity(self.walls.len());
        for wall in &self.walls {
            if !seen.insert(wall.marker.as_str()) {
                return Err(SolverError::Configuration {
                    what: format!("Wall marker '{}' is configured twice", wall.marker),
                });
            }
            match wall.condition {
                WallCondition::HeatFlux { heat_flux } if !heat_flux.is_finite() => {
                    return Err(SolverError::Configuration {
                        what: format!("Heat flux on '{}' is not finite", wall.marker),
                    });
                }
                WallCondition::Isothermal { temperature } => {
                    positive(temperature, "wall temperature")?;
                }
                _ => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SolverConfig::default().validate().unwrap();
    }

    #[test]
    fn duplicate_wall_marker_is_rejected() {
        let wall = WallSpec {
            marker: "wall".into(),
            condition: WallCondition::HeatFlux { heat_flux: 0.0 },
            custom: false,
            monitoring: false,
        };
        let config = SolverConfig {
            walls: vec![wall.clone(), wall],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SolverError::Configuration { .. })
        ));
    }

    #[test]
    fn bad_relaxation_is_rejected() {
        let mut config = SolverConfig::default();
        config.wall_function.relaxation = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn cht_coupling_modes_parse() {
        assert_eq!(
            ChtCoupling::parse("AVERAGED_TEMPERATURE_ROBIN_HEATFLUX").unwrap(),
            ChtCoupling::AveragedRobin
        );
        assert!(ChtCoupling::parse("direct_temperature_neumann_heatflux").is_ok());
        assert!(ChtCoupling::parse("bogus").is_err());
        assert!(matches!(
            ChtCoupling::from_config(None),
            Err(SolverError::Configuration { .. })
        ));
    }

    #[test]
    fn wall_values_are_scaled_by_reference() {
        let config = SolverConfig {
            reference: ReferenceScales {
                temperature: 300.0,
                heat_flux: 100.0,
                viscosity: 1.0,
            },
            ..Default::default()
        };
        assert!((config.wall_temperature(600.0) - 2.0).abs() < 1e-12);
        assert!((config.wall_heat_flux(50.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn yaml_round_trip_keeps_walls() {
        let yaml = r#"
n_dim: 2
deposit: edge_buffered
walls:
  - marker: lower_wall
    condition: { type: isothermal, temperature: 300.0 }
    monitoring: true
  - marker: upper_wall
    condition: { type: heat_flux, heat_flux: 0.0 }
wall_function:
  enabled: true
"#;
        let config: SolverConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.deposit, DepositStrategy::EdgeBuffered);
        assert_eq!(config.walls.len(), 2);
        assert!(config.walls[0].monitoring);
        assert_eq!(config.wall_function.max_iterations, 10);
        assert!(config.wall_function.enabled);
        config.validate().unwrap();
    }
}
