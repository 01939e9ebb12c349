//! No-slip viscous walls: heat-flux, isothermal and conjugate heat transfer.
//!
//! Every owned wall vertex yields a [`WallDelta`]: the velocity to impose,
//! the energy residual increment and, for implicit runs, an energy Jacobian
//! row. Deltas are computed in parallel and applied afterwards, so vertex
//! order only affects round-off.

use std::collections::BTreeMap;

use nf_core::vector::{self, Vec3};
use nf_core::{MarkerId, NodeId, Real};
use nf_mesh::{Mesh, Vertex};
use rayon::prelude::*;

use crate::config::{ChtCoupling, SolverConfig, WallCondition, WallSpec};
use crate::couplings::{ConjugateHeat, ConjugateHeatData, Couplings, CustomBoundary};
use crate::error::{SolverError, SolverResult};
use crate::flow::FlowField;
use crate::linear::LinearSystem;
use crate::moving_wall::{MovingWallInput, add_moving_wall_contribution};

/// Additive effect of one wall vertex on its node.
#[derive(Debug, Clone, PartialEq)]
pub struct WallDelta {
    pub node: NodeId,
    /// Velocity imposed on the stored old state.
    pub wall_velocity: Vec3,
    /// Convective minus viscous energy contribution.
    pub energy_residual: Real,
    /// Energy equation row added to the diagonal block.
    pub energy_row: Option<Vec<Real>>,
}

impl WallDelta {
    pub fn new(node: NodeId, wall_velocity: Vec3) -> Self {
        Self {
            node,
            wall_velocity,
            energy_residual: 0.0,
            energy_row: None,
        }
    }

    /// Combine two deltas of the same node.
    pub fn merge(mut self, other: Self) -> Self {
        self.energy_residual += other.energy_residual;
        self.energy_row = match (self.energy_row, other.energy_row) {
            (Some(mut a), Some(b)) => {
                for (x, y) in a.iter_mut().zip(&b) {
                    *x += y;
                }
                Some(a)
            }
            (a, b) => a.or(b),
        };
        self
    }

    /// Write the delta into the field and the linear system.
    pub fn apply(&self, field: &mut FlowField, system: &mut LinearSystem, implicit: bool) {
        let n_dim = field.n_dim();
        let node = self.node.idx();

        field.set_old_velocity(self.node, &self.wall_velocity);
        field.zero_momentum_truncation_error(self.node);

        let res = system.residual_mut(node);
        res[1..=n_dim].fill(0.0);
        res[n_dim + 1] += self.energy_residual;

        if implicit {
            if let Some(row) = &self.energy_row {
                system.add_to_diag_row(node, n_dim + 1, row);
            }
            for d in 0..n_dim {
                system.set_identity_row(node, d + 1);
            }
        }
    }
}

/// Wall temperature from a CHT partner.
///
/// Averaged modes weight the local and partner temperatures by their heat
/// transfer coefficients; direct modes take the partner temperature.
pub fn cht_wall_temperature(
    coupling: ChtCoupling,
    local_temperature: Real,
    local_coefficient: Real,
    partner_temperature: Real,
    partner_coefficient: Real,
) -> Real {
    if coupling.is_averaged() {
        (local_temperature * local_coefficient + partner_temperature * partner_coefficient)
            / (local_coefficient + partner_coefficient)
    } else {
        partner_temperature
    }
}

/// Energy Jacobian row of an isothermal wall, k/d · ∂T/∂U · A.
#[allow(clippy::too_many_arguments)]
pub fn isothermal_energy_row(
    n_dim: usize,
    conductivity: Real,
    distance: Real,
    area: Real,
    density: Real,
    velocity: &Vec3,
    wall_temperature: Real,
    gamma: Real,
    gas_constant: Real,
) -> Vec<Real> {
    let gm1 = gamma - 1.0;
    let vel2 = vector::squared_norm(n_dim, velocity);
    let dt_drho = (-wall_temperature + gm1 / gas_constant * (vel2 / 2.0)) / density;
    let mut row = vec![0.0; n_dim + 2];
    row[0] = conductivity / distance * dt_drho * area;
    row[n_dim + 1] = conductivity / distance * gm1 / (gas_constant * density) * area;
    row
}

/// Resolved temperature source of an isothermal-type wall.
#[derive(Clone, Copy)]
enum TemperatureSource<'a> {
    Fixed(Real),
    Conjugate {
        coupling: ChtCoupling,
        partner: &'a dyn ConjugateHeat,
    },
}

#[derive(Debug, Clone)]
struct ResolvedWall {
    marker: MarkerId,
    spec: WallSpec,
}

/// Shared read-only context of one enforcement pass.
struct Context<'a> {
    mesh: &'a Mesh,
    field: &'a FlowField,
    config: &'a SolverConfig,
    custom: Option<&'a dyn CustomBoundary>,
    implicit: bool,
}

impl Context<'_> {
    /// Area and fluid-facing unit normal of a vertex.
    fn face(&self, vertex: &Vertex) -> (Real, Vec3) {
        let n_dim = self.mesh.n_dim();
        match vector::unit(n_dim, &vertex.normal) {
            Some((area, outward)) => (area, vector::scale(n_dim, &outward, -1.0)),
            None => (0.0, vector::ZERO),
        }
    }

    fn wall_velocity(&self, vertex: &Vertex) -> Vec3 {
        if self.mesh.is_dynamic() {
            self.mesh.nodes()[vertex.node.idx()].grid_velocity
        } else {
            vector::ZERO
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn moving_wall(
        &self,
        vertex: &Vertex,
        area: Real,
        unit: &Vec3,
        grid_velocity: &Vec3,
        row: Option<&mut [Real]>,
        res_conv: &mut Real,
        res_visc: &mut Real,
    ) {
        let node = vertex.node.idx();
        let p = &self.field.primitive[node];
        let input = MovingWallInput {
            n_dim: self.mesh.n_dim(),
            unit_normal: unit,
            grid_velocity,
            velocity_gradient: &self.field.gradient[node].velocity,
            total_viscosity: p.total_viscosity(),
            area,
            density: p.density,
            pressure: p.pressure,
            distance: self.mesh.wall_normal_distance(vertex),
            gamma: self.config.gamma,
        };
        add_moving_wall_contribution(&input, row, res_conv, res_visc);
    }

    fn heat_flux_delta(
        &self,
        marker: MarkerId,
        spec: &WallSpec,
        heat_flux: Real,
        vertex: &Vertex,
    ) -> WallDelta {
        let n_var = nf_core::n_var(self.mesh.n_dim());
        let (area, unit) = self.face(vertex);
        let wall_velocity = self.wall_velocity(vertex);

        let mut q = self.config.wall_heat_flux(heat_flux);
        if spec.custom {
            if let Some(v) = self.custom.and_then(|c| c.heat_flux(marker, vertex.id)) {
                q = v;
            }
        }

        let mut res_conv = 0.0;
        let mut res_visc = q * area;
        let mut row = None;
        if self.mesh.is_dynamic() {
            let mut energy_row = self.implicit.then(|| vec![0.0; n_var]);
            self.moving_wall(
                vertex,
                area,
                &unit,
                &wall_velocity,
                energy_row.as_deref_mut(),
                &mut res_conv,
                &mut res_visc,
            );
            row = energy_row;
        }

        WallDelta {
            node: vertex.node,
            wall_velocity,
            energy_residual: res_conv - res_visc,
            energy_row: row,
        }
    }

    fn isothermal_delta(
        &self,
        marker: MarkerId,
        spec: &WallSpec,
        source: TemperatureSource<'_>,
        vertex: &Vertex,
    ) -> WallDelta {
        let n_dim = self.mesh.n_dim();
        let (area, unit) = self.face(vertex);
        let wall_velocity = self.wall_velocity(vertex);
        let wall = &self.field.primitive[vertex.node.idx()];
        let there = self.field.primitive[vertex.normal_neighbor.idx()].temperature;
        let distance = self.mesh.wall_normal_distance(vertex);
        let conductivity = self
            .config
            .thermal_conductivity(wall.laminar_viscosity, wall.eddy_viscosity);

        let t_wall = match source {
            TemperatureSource::Conjugate { coupling, partner } => {
                let ConjugateHeatData {
                    temperature,
                    heat_transfer_coefficient,
                    ..
                } = partner.conjugate(marker, vertex.id);
                let partner_temperature = self.config.wall_temperature(temperature);
                let local_coefficient = conductivity * self.config.reference.viscosity / distance;
                cht_wall_temperature(
                    coupling,
                    there,
                    local_coefficient,
                    partner_temperature,
                    heat_transfer_coefficient,
                )
            }
            TemperatureSource::Fixed(t) => {
                let custom = if spec.custom {
                    self.custom.and_then(|c| c.temperature(marker, vertex.id))
                } else {
                    None
                };
                custom.unwrap_or(t)
            }
        };

        let dtdn = -(there - t_wall) / distance;
        let mut res_conv = 0.0;
        let mut res_visc = conductivity * dtdn * area;

        let mut row = self.implicit.then(|| {
            isothermal_energy_row(
                n_dim,
                conductivity,
                distance,
                area,
                wall.density,
                &wall.velocity,
                t_wall,
                self.config.gamma,
                self.config.gas_constant,
            )
        });

        if self.mesh.is_dynamic() {
            self.moving_wall(
                vertex,
                area,
                &unit,
                &wall_velocity,
                row.as_deref_mut(),
                &mut res_conv,
                &mut res_visc,
            );
        }

        WallDelta {
            node: vertex.node,
            wall_velocity,
            energy_residual: res_conv - res_visc,
            energy_row: row,
        }
    }
}

/// Applies the configured wall conditions to residual, Jacobian and field.
#[derive(Debug, Clone)]
pub struct WallBoundaryEnforcer {
    walls: Vec<ResolvedWall>,
}

impl WallBoundaryEnforcer {
    /// Resolve every configured wall against the mesh markers.
    pub fn new(mesh: &Mesh, config: &SolverConfig) -> SolverResult<Self> {
        let walls = config
            .walls
            .iter()
            .map(|spec| {
                let marker = mesh.marker_by_name(&spec.marker).ok_or_else(|| {
                    SolverError::ProblemSetup {
                        what: format!("wall marker '{}' not on mesh", spec.marker),
                    }
                })?;
                Ok(ResolvedWall {
                    marker: marker.id,
                    spec: spec.clone(),
                })
            })
            .collect::<SolverResult<Vec<_>>>()?;
        Ok(Self { walls })
    }

    pub fn markers(&self) -> impl Iterator<Item = MarkerId> + '_ {
        self.walls.iter().map(|w| w.marker)
    }

    /// Deltas of one marker, merged per node in node order.
    pub fn marker_deltas(
        &self,
        mesh: &Mesh,
        field: &FlowField,
        config: &SolverConfig,
        couplings: Couplings<'_>,
        marker: MarkerId,
    ) -> SolverResult<Vec<WallDelta>> {
        let wall = self
            .walls
            .iter()
            .find(|w| w.marker == marker)
            .ok_or_else(|| SolverError::ProblemSetup {
                what: format!("marker {marker} is not a configured wall"),
            })?;
        let vertices = &mesh
            .marker(marker)
            .ok_or_else(|| SolverError::ProblemSetup {
                what: format!("wall marker '{}' not on mesh", wall.spec.marker),
            })?
            .vertices;

        let ctx = Context {
            mesh,
            field,
            config,
            custom: couplings.custom,
            implicit: config.implicit(),
        };
        let spec = &wall.spec;
        let owned = |v: &&Vertex| mesh.nodes()[v.node.idx()].domain;

        let deltas: Vec<WallDelta> = match spec.condition {
            WallCondition::HeatFlux { heat_flux } => vertices
                .par_iter()
                .filter(owned)
                .map(|v| ctx.heat_flux_delta(marker, spec, heat_flux, v))
                .collect(),
            WallCondition::Isothermal { temperature } => {
                let source = TemperatureSource::Fixed(config.wall_temperature(temperature));
                vertices
                    .par_iter()
                    .filter(owned)
                    .map(|v| ctx.isothermal_delta(marker, spec, source, v))
                    .collect()
            }
            WallCondition::Cht => {
                let coupling = ChtCoupling::from_config(config.cht_coupling.as_deref())?;
                let partner = couplings.conjugate.ok_or_else(|| SolverError::ProblemSetup {
                    what: format!("CHT wall '{}' has no conjugate heat partner", spec.marker),
                })?;
                let source = TemperatureSource::Conjugate { coupling, partner };
                vertices
                    .par_iter()
                    .filter(owned)
                    .map(|v| ctx.isothermal_delta(marker, spec, source, v))
                    .collect()
            }
        };

        let mut merged: BTreeMap<NodeId, WallDelta> = BTreeMap::new();
        for delta in deltas {
            match merged.remove(&delta.node) {
                Some(prev) => merged.insert(delta.node, prev.merge(delta)),
                None => merged.insert(delta.node, delta),
            };
        }
        Ok(merged.into_values().collect())
    }

    /// Enforce every wall; returns the number of wall nodes touched.
    pub fn enforce(
        &self,
        mesh: &Mesh,
        field: &mut FlowField,
        system: &mut LinearSystem,
        config: &SolverConfig,
        couplings: Couplings<'_>,
    ) -> SolverResult<usize> {
        field.check_mesh(mesh)?;
        let implicit = config.implicit();
        let mut touched = 0;
        for wall in &self.walls {
            let deltas = self.marker_deltas(mesh, field, config, couplings, wall.marker)?;
            for delta in &deltas {
                delta.apply(field, system, implicit);
            }
            touched += deltas.len();
        }
        Ok(touched)
    }
}
