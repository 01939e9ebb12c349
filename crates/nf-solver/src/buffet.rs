//! Buffet onset sensor.
//!
//! Skin friction aligned with the freestream marks attached flow; friction
//! pointing against it marks separation. A smoothed step of the alignment is
//! integrated over monitored walls and normalised by the reference area.

use nf_core::vector::{self, Vec3};
use nf_core::{MarkerId, Real};
use nf_mesh::{Mesh, Vertex};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{BuffetConfig, SolverConfig};
use crate::error::{SolverError, SolverResult};
use crate::flow::FlowField;
use crate::reductions::AllReduce;
use crate::stress;

/// Integrated sensor per wall marker and in total.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuffetMetrics {
    pub per_marker: Vec<(String, Real)>,
    pub total: Real,
}

#[derive(Debug, Clone)]
struct MonitoredWall {
    marker: MarkerId,
    name: String,
    monitoring: bool,
}

#[derive(Debug, Clone)]
pub struct BuffetMonitor {
    params: BuffetConfig,
    n_dim: usize,
    walls: Vec<MonitoredWall>,
}

impl BuffetMonitor {
    pub fn new(mesh: &Mesh, config: &SolverConfig) -> SolverResult<Self> {
        let walls = config
            .walls
            .iter()
            .map(|w| {
                let marker = mesh.marker_by_name(&w.marker).ok_or_else(|| {
                    SolverError::ProblemSetup {
                        what: format!("wall marker '{}' not on mesh", w.marker),
                    }
                })?;
                Ok(MonitoredWall {
                    marker: marker.id,
                    name: w.marker.clone(),
                    monitoring: w.monitoring,
                })
            })
            .collect::<SolverResult<Vec<_>>>()?;
        Ok(Self {
            params: config.buffet,
            n_dim: mesh.n_dim(),
            walls,
        })
    }

    /// Skin friction vector at a wall vertex.
    pub fn skin_friction(&self, field: &FlowField, vertex: &Vertex) -> Vec3 {
        let n_dim = self.n_dim;
        let Some((_, outward)) = vector::unit(n_dim, &vertex.normal) else {
            return vector::ZERO;
        };
        let unit = vector::scale(n_dim, &outward, -1.0);
        let node = vertex.node.idx();
        let p = &field.primitive[node];
        let tau = stress::stress_tensor(
            n_dim,
            &field.gradient[node].velocity,
            p.laminar_viscosity,
            p.density,
            0.0,
        );
        let traction = stress::tangential_traction(n_dim, &tau, &unit);
        let v = &self.params.freestream_velocity;
        let dyn_pressure = 0.5 * self.params.freestream_density * vector::squared_norm(n_dim, v);
        vector::scale(n_dim, &traction, 1.0 / dyn_pressure)
    }

    /// Smoothed separation indicator in (0, 1) for a skin friction vector.
    pub fn sensor(&self, skin_friction: &Vec3) -> Real {
        let n_dim = self.n_dim;
        let v = &self.params.freestream_velocity;
        let cf = vector::norm(n_dim, skin_friction);
        let vel = vector::norm(n_dim, v);
        let alignment = if cf > 0.0 && vel > 0.0 {
            vector::dot(n_dim, skin_friction, v) / (cf * vel)
        } else {
            0.0
        };
        1.0 / (1.0 + (2.0 * self.params.k * (alignment + self.params.lambda)).exp())
    }

    /// Integrate the sensor over the wall markers and reduce across ranks.
    pub fn evaluate(
        &self,
        mesh: &Mesh,
        field: &FlowField,
        comm: &dyn AllReduce,
    ) -> SolverResult<BuffetMetrics> {
        field.check_mesh(mesh)?;
        let nodes = mesh.nodes();
        let ref_area = self.params.ref_area;

        let mut local = Vec::with_capacity(self.walls.len());
        for wall in &self.walls {
            let marker = mesh.marker(wall.marker).ok_or_else(|| SolverError::ProblemSetup {
                what: format!("wall marker '{}' not on mesh", wall.name),
            })?;
            let metric: Real = if wall.monitoring {
                marker
                    .vertices
                    .par_iter()
                    .filter(|v| nodes[v.node.idx()].domain)
                    .map(|v| {
                        let area = vector::norm(self.n_dim, &v.normal);
                        self.sensor(&self.skin_friction(field, v)) * area / ref_area
                    })
                    .sum()
            } else {
                0.0
            };
            local.push(metric);
        }

        let total = comm.reduce_sum(local.iter().sum());
        comm.reduce_sum_slice(&mut local);
        Ok(BuffetMetrics {
            per_marker: self
                .walls
                .iter()
                .map(|w| w.name.clone())
                .zip(local)
                .collect(),
            total,
        })
    }
}
