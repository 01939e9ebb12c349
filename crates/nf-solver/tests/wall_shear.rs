//! Wall-function shear stress: bounded iteration and field update.

mod common;

use nf_core::Real;
use nf_solver::{
    Couplings, SerialReducer, SolverConfig, ViscousSolver, WallShearInput, WallShearStressModel,
};
use proptest::prelude::*;

fn model() -> WallShearStressModel {
    WallShearStressModel::new(&SolverConfig::default())
}

proptest! {
    #[test]
    fn solve_is_bounded_and_non_negative(
        u in 1e-4f64..300.0,
        p in 1e3f64..1e6,
        t in 150.0f64..800.0,
        d in 1e-7f64..1e-1,
        mu in 1e-6f64..1e-4,
        seed in prop_oneof![Just(0.0), Just(Real::NAN), 1e-6f64..1e4],
    ) {
        let out = model().solve(&WallShearInput {
            tangential_velocity: u,
            pressure: p,
            temperature: t,
            distance: d,
            laminar_viscosity: mu,
            seed,
        });
        prop_assert!(out.iterations <= 10);
        prop_assert!(out.tau_wall.is_finite());
        prop_assert!(out.tau_wall >= 0.0);
    }

    #[test]
    fn viscous_sublayer_recovers_linear_profile(
        u in 1e-3f64..2e-2,
        mu in 1e-5f64..5e-5,
    ) {
        let d = 1e-6;
        let exact = mu * u / d;
        let out = model().solve(&WallShearInput {
            tangential_velocity: u,
            pressure: 1e5,
            temperature: 290.0,
            distance: d,
            laminar_viscosity: mu,
            seed: exact,
        });
        prop_assert!(out.converged);
        prop_assert!(((out.tau_wall - exact) / exact).abs() < 1e-3);
    }
}

#[test]
fn preprocess_fills_tau_wall_on_wall_nodes_only() {
    let mesh = common::channel();
    let mut config = common::adiabatic_config();
    config.wall_function.enabled = true;
    let mut field = common::shear_field(&mesh, &config);
    let solver = ViscousSolver::new(&mesh, config, Couplings::default()).unwrap();

    let report = solver
        .preprocess(&mesh, &mut field, Couplings::default(), &SerialReducer)
        .unwrap();
    assert_eq!(report.non_physical, 0);

    let mut on_wall = vec![false; mesh.nodes().len()];
    for name in ["lower_wall", "upper_wall"] {
        for v in &mesh.marker_by_name(name).unwrap().vertices {
            on_wall[v.node.idx()] = true;
        }
    }
    for (n, &wall) in on_wall.iter().enumerate() {
        if wall {
            assert!(field.tau_wall[n] > 0.0, "node {n}");
        } else {
            assert_eq!(field.tau_wall[n], 0.0, "node {n}");
        }
    }
}

#[test]
fn disabled_wall_function_leaves_tau_wall_at_zero() {
    let mesh = common::channel();
    let config = common::adiabatic_config();
    let mut field = common::shear_field(&mesh, &config);
    let solver = ViscousSolver::new(&mesh, config, Couplings::default()).unwrap();
    let report = solver
        .preprocess(&mesh, &mut field, Couplings::default(), &SerialReducer)
        .unwrap();
    assert_eq!(report.wall_shear_unconverged, 0);
    assert!(field.tau_wall.iter().all(|&t| t == 0.0));
}
