//! Shared channel-flow fixtures.

#![allow(dead_code)]

use nf_core::Real;
use nf_fluids::IdealGas;
use nf_mesh::{ChannelSpec, Mesh, build_channel, build_lid_channel};
use nf_solver::{
    FlowField, PrimitiveStateUpdater, SolverConfig, WallCondition, WallSpec,
};

pub const DENSITY: Real = 1.2;
pub const PRESSURE: Real = 1e5;
pub const LID_SPEED: Real = 10.0;

const CHANNEL: ChannelSpec = ChannelSpec {
    nx: 6,
    ny: 5,
    lx: 2.0,
    ly: 1.0,
};

pub fn channel() -> Mesh {
    build_channel(&CHANNEL).unwrap()
}

/// Same channel with the upper wall sliding at `LID_SPEED`.
pub fn lid_channel() -> Mesh {
    build_lid_channel(&CHANNEL, [LID_SPEED, 0.0, 0.0]).unwrap()
}

pub fn wall(marker: &str, condition: WallCondition) -> WallSpec {
    WallSpec {
        marker: marker.to_string(),
        condition,
        custom: false,
        monitoring: false,
    }
}

/// Both channel walls adiabatic.
pub fn adiabatic_config() -> SolverConfig {
    SolverConfig {
        walls: vec![
            wall("lower_wall", WallCondition::HeatFlux { heat_flux: 0.0 }),
            wall("upper_wall", WallCondition::HeatFlux { heat_flux: 0.0 }),
        ],
        ..Default::default()
    }
}

/// Couette-like shear flow u = U y / ly with its exact gradient and derived primitives.
pub fn shear_field(mesh: &Mesh, config: &SolverConfig) -> FlowField {
    let gas = config.fluid().unwrap();
    let ly = 1.0;
    let mut field = FlowField::from_fn(mesh, &gas, |node| {
        (DENSITY, [LID_SPEED * node.coord[1] / ly, 0.0, 0.0], PRESSURE)
    })
    .unwrap();
    for g in &mut field.gradient {
        g.velocity[0][1] = LID_SPEED / ly;
    }
    refresh(config, &gas, &mut field);
    field
}

/// Fluid at rest with uniform temperature.
pub fn quiescent_field(mesh: &Mesh, config: &SolverConfig) -> FlowField {
    let gas = config.fluid().unwrap();
    let mut field = FlowField::uniform(mesh, &gas, DENSITY, &[0.0; 3], PRESSURE).unwrap();
    refresh(config, &gas, &mut field);
    field
}

fn refresh(config: &SolverConfig, gas: &IdealGas, field: &mut FlowField) {
    let bad = PrimitiveStateUpdater::new(config).update(gas, None, field);
    assert_eq!(bad, 0);
}
