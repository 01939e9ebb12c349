//! Property tests for the ideal-gas model.

use nf_fluids::{FluidModel, IdealGas};
use proptest::prelude::*;

proptest! {
    #[test]
    fn conserved_round_trip_is_admissible(
        rho in 0.01_f64..50.0,
        u in -300.0_f64..300.0,
        v in -300.0_f64..300.0,
        w in -300.0_f64..300.0,
        p in 100.0_f64..1e7,
    ) {
        let gas = IdealGas::air();
        let cons = gas.conserved(3, rho, &[u, v, w], p).unwrap();
        let d = gas.derive(3, &cons, 0.0);
        prop_assert!(d.admissible);
        prop_assert!((d.primitive.pressure - p).abs() <= 1e-8 * p);
        prop_assert!((d.primitive.density - rho).abs() <= 1e-12 * rho);
        let t = p / (rho * gas.gas_constant());
        prop_assert!((d.primitive.temperature - t).abs() <= 1e-8 * t);
    }

    #[test]
    fn zero_or_negative_density_is_never_admissible(rho in -10.0_f64..=0.0) {
        let gas = IdealGas::air();
        let d = gas.derive(2, &[rho, 1.0, 0.0, 2.5e5], 0.0);
        prop_assert!(!d.admissible);
    }
}

#[test]
fn air_sound_speed_at_room_temperature() {
    let gas = IdealGas::air();
    let rho = 101_325.0 / (gas.gas_constant() * 288.15);
    let cons = gas.conserved(2, rho, &[0.0; 3], 101_325.0).unwrap();
    let d = gas.derive(2, &cons, 0.0);
    assert!((d.primitive.sound_speed - 340.3).abs() < 0.5);
}
