//! Structured 2D channel generator.
//!
//! Builds the vertex-centred dual of an `nx × ny` Cartesian grid spanning
//! `[0, lx] × [0, ly]`, with four markers: `lower_wall` (y = 0),
//! `upper_wall` (y = ly), `inlet` (x = 0) and `outlet` (x = lx).
//! [`build_lid_channel`] additionally slides the upper wall nodes.

use nf_core::vector::Vec3;
use nf_core::{NodeId, Real};

use crate::builder::MeshBuilder;
use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSpec {
    pub nx: usize,
    pub ny: usize,
    pub lx: Real,
    pub ly: Real,
}

pub fn build_channel(spec: &ChannelSpec) -> MeshResult<Mesh> {
    assemble(spec, None)
}

/// Channel whose upper wall nodes move with `lid_velocity`. The mesh is
/// flagged dynamic even for a zero lid velocity.
pub fn build_lid_channel(spec: &ChannelSpec, lid_velocity: Vec3) -> MeshResult<Mesh> {
    assemble(spec, Some(lid_velocity))
}

fn assemble(spec: &ChannelSpec, lid_velocity: Option<Vec3>) -> MeshResult<Mesh> {
    if spec.nx < 2 || spec.ny < 2 {
        return Err(MeshError::InvalidSpec {
            what: "nx and ny must be at least 2",
        });
    }
    if !(spec.lx > 0.0 && spec.ly > 0.0) {
        return Err(MeshError::InvalidSpec {
            what: "channel extents must be positive",
        });
    }

    let (nx, ny) = (spec.nx, spec.ny);
    let dx = spec.lx / (nx - 1) as Real;
    let dy = spec.ly / (ny - 1) as Real;
    // Dual faces and volumes are halved on the grid boundary
    let half_x = |i: usize| if i == 0 || i == nx - 1 { 0.5 } else { 1.0 };
    let half_y = |j: usize| if j == 0 || j == ny - 1 { 0.5 } else { 1.0 };

    let mut b = MeshBuilder::new(2);
    let mut ids: Vec<NodeId> = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let (x, y) = (i as Real * dx, j as Real * dy);
            let id = b.add_node([x, y, 0.0], dx * dy * half_x(i) * half_y(j));
            b.set_wall_distance(id, y.min(spec.ly - y));
            b.set_max_length(id, dx.max(dy));
            ids.push(id);
        }
    }
    let at = |i: usize, j: usize| ids[j * nx + i];

    if let Some(velocity) = lid_velocity {
        b.set_dynamic(true);
        for i in 0..nx {
            b.set_grid_velocity(at(i, ny - 1), velocity);
        }
    }

    for j in 0..ny {
        for i in 0..nx - 1 {
            b.add_edge(at(i, j), at(i + 1, j), [dy * half_y(j), 0.0, 0.0]);
        }
    }
    for j in 0..ny - 1 {
        for i in 0..nx {
            b.add_edge(at(i, j), at(i, j + 1), [0.0, dx * half_x(i), 0.0]);
        }
    }

    let lower = b.add_marker("lower_wall");
    let upper = b.add_marker("upper_wall");
    for i in 0..nx {
        let len = dx * half_x(i);
        b.add_vertex(lower, at(i, 0), [0.0, -len, 0.0], at(i, 1))?;
        b.add_vertex(upper, at(i, ny - 1), [0.0, len, 0.0], at(i, ny - 2))?;
    }
    let inlet = b.add_marker("inlet");
    let outlet = b.add_marker("outlet");
    for j in 0..ny {
        let len = dy * half_y(j);
        b.add_vertex(inlet, at(0, j), [-len, 0.0, 0.0], at(1, j))?;
        b.add_vertex(outlet, at(nx - 1, j), [len, 0.0, 0.0], at(nx - 2, j))?;
    }

    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volumes_sum_to_domain_area() {
        let mesh = build_channel(&ChannelSpec {
            nx: 5,
            ny: 4,
            lx: 2.0,
            ly: 1.0,
        })
        .unwrap();
        let total: Real = mesh.nodes().iter().map(|n| n.volume).sum();
        assert!((total - 2.0).abs() < 1e-12);
        assert_eq!(mesh.edges().len(), 4 * 4 + 3 * 5);
        assert_eq!(mesh.markers().len(), 4);
    }

    #[test]
    fn dual_faces_close_each_control_volume() {
        let mesh = build_channel(&ChannelSpec {
            nx: 4,
            ny: 3,
            lx: 1.0,
            ly: 1.0,
        })
        .unwrap();
        let mut closure = vec![[0.0; 3]; mesh.nodes().len()];
        for e in mesh.edges() {
            for d in 0..2 {
                closure[e.i().idx()][d] += e.normal[d];
                closure[e.j().idx()][d] -= e.normal[d];
            }
        }
        for marker in mesh.markers() {
            for v in &marker.vertices {
                for d in 0..2 {
                    closure[v.node.idx()][d] += v.normal[d];
                }
            }
        }
        for c in closure {
            assert!(c[0].abs() < 1e-12 && c[1].abs() < 1e-12);
        }
    }

    #[test]
    fn lid_channel_moves_only_the_upper_wall() {
        let spec = ChannelSpec {
            nx: 3,
            ny: 3,
            lx: 1.0,
            ly: 1.0,
        };
        assert!(!build_channel(&spec).unwrap().is_dynamic());

        let mesh = build_lid_channel(&spec, [2.0, 0.0, 0.0]).unwrap();
        assert!(mesh.is_dynamic());
        let upper = mesh.marker_by_name("upper_wall").unwrap();
        for v in &upper.vertices {
            assert_eq!(mesh.nodes()[v.node.idx()].grid_velocity, [2.0, 0.0, 0.0]);
        }
        let moving = mesh
            .nodes()
            .iter()
            .filter(|n| n.grid_velocity != [0.0; 3])
            .count();
        assert_eq!(moving, upper.vertices.len());
    }

    #[test]
    fn rejects_degenerate_spec() {
        let spec = ChannelSpec {
            nx: 1,
            ny: 4,
            lx: 1.0,
            ly: 1.0,
        };
        assert!(matches!(
            build_channel(&spec),
            Err(MeshError::InvalidSpec { .. })
        ));
    }
}
