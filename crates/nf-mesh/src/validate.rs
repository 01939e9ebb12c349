//! Mesh validation logic.

use std::collections::{HashMap, HashSet};

use nf_core::vector;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{Edge, Marker, Node};

/// Validate the mesh structure: all references exist, normals are usable, etc.
pub(crate) fn validate_structure(
    n_dim: usize,
    nodes: &[Node],
    edges: &[Edge],
    markers: &[Marker],
) -> MeshResult<()> {
    if !(2..=3).contains(&n_dim) {
        return Err(MeshError::UnsupportedDimension { n_dim });
    }

    for node in nodes {
        if !node.volume.is_finite() || node.volume <= 0.0 {
            return Err(MeshError::InvalidVolume {
                node: node.id,
                volume: node.volume,
            });
        }
    }

    // Each edge references two distinct, existing nodes and no pair repeats
    let mut seen = HashMap::with_capacity(edges.len());
    for (i, edge) in edges.iter().enumerate() {
        for node in edge.nodes {
            if node.idx() >= nodes.len() {
                return Err(MeshError::InvalidEdgeNode {
                    edge: edge.id,
                    node,
                });
            }
        }
        if edge.i() == edge.j() {
            return Err(MeshError::SelfLoop { edge: edge.id });
        }
        let key = (edge.i().min(edge.j()), edge.i().max(edge.j()));
        if let Some(&first) = seen.get(&key) {
            return Err(MeshError::DuplicateEdge {
                first,
                second: edge.id,
            });
        }
        seen.insert(key, edge.id);

        if vector::unit(n_dim, &edge.normal).is_none() {
            return Err(MeshError::DegenerateNormal {
                what: "edge",
                index: i,
            });
        }
    }

    let mut names = HashSet::with_capacity(markers.len());
    for marker in markers {
        if !names.insert(marker.name.as_str()) {
            return Err(MeshError::DuplicateMarker {
                name: marker.name.clone(),
            });
        }
        for (i, vertex) in marker.vertices.iter().enumerate() {
            for node in [vertex.node, vertex.normal_neighbor] {
                if node.idx() >= nodes.len() {
                    return Err(MeshError::InvalidVertexNode {
                        marker: marker.id,
                        node,
                    });
                }
            }
            if vertex.node == vertex.normal_neighbor {
                return Err(MeshError::NormalNeighborIsSelf {
                    marker: marker.id,
                    node: vertex.node,
                });
            }
            if vector::unit(n_dim, &vertex.normal).is_none() {
                return Err(MeshError::DegenerateNormal {
                    what: "vertex",
                    index: i,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::builder::MeshBuilder;
    use crate::error::MeshError;

    #[test]
    fn rejects_one_dimensional_mesh() {
        let builder = MeshBuilder::new(1);
        assert_eq!(
            builder.build().unwrap_err(),
            MeshError::UnsupportedDimension { n_dim: 1 }
        );
    }

    #[test]
    fn rejects_duplicate_edge_either_direction() {
        let mut builder = MeshBuilder::new(2);
        let a = builder.add_node([0.0, 0.0, 0.0], 1.0);
        let b = builder.add_node([1.0, 0.0, 0.0], 1.0);
        builder.add_edge(a, b, [1.0, 0.0, 0.0]);
        builder.add_edge(b, a, [-1.0, 0.0, 0.0]);
        assert!(matches!(
            builder.build(),
            Err(MeshError::DuplicateEdge { .. })
        ));
    }

    #[test]
    fn rejects_self_loop() {
        let mut builder = MeshBuilder::new(2);
        let a = builder.add_node([0.0, 0.0, 0.0], 1.0);
        builder.add_edge(a, a, [1.0, 0.0, 0.0]);
        assert!(matches!(builder.build(), Err(MeshError::SelfLoop { .. })));
    }

    #[test]
    fn rejects_zero_edge_normal() {
        let mut builder = MeshBuilder::new(3);
        let a = builder.add_node([0.0, 0.0, 0.0], 1.0);
        let b = builder.add_node([1.0, 0.0, 0.0], 1.0);
        builder.add_edge(a, b, [0.0, 0.0, 0.0]);
        assert!(matches!(
            builder.build(),
            Err(MeshError::DegenerateNormal { what: "edge", .. })
        ));
    }

    #[test]
    fn rejects_vertex_neighbor_equal_to_node() {
        let mut builder = MeshBuilder::new(2);
        let a = builder.add_node([0.0, 0.0, 0.0], 1.0);
        let wall = builder.add_marker("wall");
        builder.add_vertex(wall, a, [0.0, -1.0, 0.0], a).unwrap();
        assert!(matches!(
            builder.build(),
            Err(MeshError::NormalNeighborIsSelf { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_marker_names() {
        let mut builder = MeshBuilder::new(2);
        builder.add_marker("wall");
        builder.add_marker("wall");
        assert!(matches!(
            builder.build(),
            Err(MeshError::DuplicateMarker { .. })
        ));
    }

    #[test]
    fn rejects_negative_volume() {
        let mut builder = MeshBuilder::new(2);
        builder.add_node([0.0, 0.0, 0.0], -1.0);
        assert!(matches!(
            builder.build(),
            Err(MeshError::InvalidVolume { .. })
        ));
    }
}
