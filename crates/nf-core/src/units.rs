//! Typed SI inputs for the dimensional values a case file carries.
//!
//! Configured wall temperatures, heat fluxes and viscosities pass through
//! these constructors before being divided by the reference scales.

use uom::si::dynamic_viscosity::pascal_second;
use uom::si::f64::{DynamicViscosity, HeatFluxDensity, ThermodynamicTemperature};
use uom::si::heat_flux_density::watt_per_square_meter;
use uom::si::thermodynamic_temperature::kelvin;

pub type Temperature = ThermodynamicTemperature;
pub type HeatFlux = HeatFluxDensity;
pub type DynVisc = DynamicViscosity;

#[inline]
pub fn k(v: f64) -> Temperature {
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn w_per_m2(v: f64) -> HeatFlux {
    HeatFlux::new::<watt_per_square_meter>(v)
}

#[inline]
pub fn pa_s(v: f64) -> DynVisc {
    DynVisc::new::<pascal_second>(v)
}

/// Dry air.
pub mod constants {
    /// Specific gas constant [J/(kg·K)].
    pub const R_AIR: f64 = 287.058;

    pub const GAMMA_AIR: f64 = 1.4;

    /// Sutherland reference viscosity [Pa·s] at [`T_REF_SUTHERLAND`].
    pub const MU_REF_AIR: f64 = 1.716e-5;

    /// Sutherland reference temperature [K].
    pub const T_REF_SUTHERLAND: f64 = 273.15;

    /// Sutherland constant [K].
    pub const S_SUTHERLAND_AIR: f64 = 110.4;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_store_si_values() {
        assert_eq!(k(300.0).value, 300.0);
        assert_eq!(w_per_m2(500.0).value, 500.0);
        assert_eq!(pa_s(1.8e-5).value, 1.8e-5);
    }
}
