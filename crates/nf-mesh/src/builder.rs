//! Incremental mesh builder.

use nf_core::vector::{self, Vec3};
use nf_core::{EdgeId, Id, MarkerId, NodeId, Real, VertexId};

use crate::error::{MeshError, MeshResult};
use crate::mesh::{Edge, Marker, Mesh, Node, Vertex};
use crate::validate;

/// Builder for constructing a mesh incrementally.
///
/// Use `add_node`, `add_edge`, `add_marker` and `add_vertex` to build up the
/// mesh, then call `build()` to validate and freeze it into an immutable `Mesh`.
#[derive(Debug)]
pub struct MeshBuilder {
    n_dim: usize,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    markers: Vec<Marker>,
    dynamic: bool,
}

impl MeshBuilder {
    /// Create a new empty builder for a 2D or 3D mesh.
    pub fn new(n_dim: usize) -> Self {
        Self {
            n_dim,
            nodes: Vec::new(),
            edges: Vec::new(),
            markers: Vec::new(),
            dynamic: false,
        }
    }

    /// Add an owned control volume and return its ID.
    pub fn add_node(&mut self, coord: Vec3, volume: Real) -> NodeId {
        let id = Id::from_usize(self.nodes.len());
        self.nodes.push(Node {
            id,
            coord,
            volume,
            grid_velocity: vector::ZERO,
            domain: true,
            max_length: volume.abs().powf(1.0 / self.n_dim.max(1) as Real),
            wall_distance: Real::INFINITY,
        });
        id
    }

    /// Mark a node as a halo copy owned by another process.
    pub fn set_halo(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(node.idx()) {
            n.domain = false;
        }
    }

    /// Set the mesh velocity of a node and flag the grid as moving.
    pub fn set_grid_velocity(&mut self, node: NodeId, velocity: Vec3) {
        if let Some(n) = self.nodes.get_mut(node.idx()) {
            n.grid_velocity = velocity;
            self.dynamic = true;
        }
    }

    /// Flag the grid as moving even if all grid velocities are zero.
    pub fn set_dynamic(&mut self, dynamic: bool) {
        self.dynamic = dynamic;
    }

    pub fn set_wall_distance(&mut self, node: NodeId, distance: Real) {
        if let Some(n) = self.nodes.get_mut(node.idx()) {
            n.wall_distance = distance;
        }
    }

    pub fn set_max_length(&mut self, node: NodeId, length: Real) {
        if let Some(n) = self.nodes.get_mut(node.idx()) {
            n.max_length = length;
        }
    }

    /// Add an edge between two nodes with an area-weighted normal pointing from `i` to `j`.
    pub fn add_edge(&mut self, i: NodeId, j: NodeId, normal: Vec3) -> EdgeId {
        let id = Id::from_usize(self.edges.len());
        self.edges.push(Edge {
            id,
            nodes: [i, j],
            normal,
        });
        id
    }

    /// Add an (empty) boundary marker.
    pub fn add_marker(&mut self, name: impl Into<String>) -> MarkerId {
        let id = Id::from_usize(self.markers.len());
        self.markers.push(Marker {
            id,
            name: name.into(),
            vertices: Vec::new(),
        });
        id
    }

    /// Add a boundary vertex to a marker.
    ///
    /// `normal` is area-weighted and points out of the fluid domain.
    pub fn add_vertex(
        &mut self,
        marker: MarkerId,
        node: NodeId,
        normal: Vec3,
        normal_neighbor: NodeId,
    ) -> MeshResult<VertexId> {
        let m = self
            .markers
            .get_mut(marker.idx())
            .ok_or(MeshError::IdNotFound { what: "MarkerId" })?;
        let id = Id::from_usize(m.vertices.len());
        m.vertices.push(Vertex {
            id,
            node,
            normal,
            normal_neighbor,
        });
        Ok(id)
    }

    /// Build and validate the mesh, returning an immutable `Mesh`.
    ///
    /// This performs validation and constructs compact adjacency lists.
    pub fn build(self) -> MeshResult<Mesh> {
        validate::validate_structure(self.n_dim, &self.nodes, &self.edges, &self.markers)?;

        let (node_edge_offsets, node_edges) = Self::build_adjacency(&self.nodes, &self.edges);

        Ok(Mesh {
            n_dim: self.n_dim,
            nodes: self.nodes,
            edges: self.edges,
            markers: self.markers,
            dynamic: self.dynamic,
            node_edge_offsets,
            node_edges,
        })
    }

    /// Build compact adjacency lists: for each node, collect its incident edges.
    fn build_adjacency(nodes: &[Node], edges: &[Edge]) -> (Vec<usize>, Vec<EdgeId>) {
        let mut per_node: Vec<Vec<EdgeId>> = vec![Vec::new(); nodes.len()];
        for edge in edges {
            per_node[edge.i().idx()].push(edge.id);
            per_node[edge.j().idx()].push(edge.id);
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat = Vec::with_capacity(edges.len() * 2);
        offsets.push(0);
        for mut list in per_node {
            // Edges were pushed in ID order already; keep it explicit for determinism
            list.sort_by_key(|e| e.index());
            flat.extend_from_slice(&list);
            offsets.push(flat.len());
        }

        (offsets, flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_basic() {
        let mut builder = MeshBuilder::new(2);
        let n1 = builder.add_node([0.0, 0.0, 0.0], 1.0);
        let n2 = builder.add_node([1.0, 0.0, 0.0], 1.0);
        let e1 = builder.add_edge(n1, n2, [1.0, 0.0, 0.0]);

        assert_eq!(n1.index(), 0);
        assert_eq!(n2.index(), 1);
        assert_eq!(e1.index(), 0);
        assert_eq!(builder.nodes.len(), 2);
        assert_eq!(builder.edges.len(), 1);
    }

    #[test]
    fn grid_velocity_flags_dynamic() {
        let mut builder = MeshBuilder::new(2);
        let n1 = builder.add_node([0.0, 0.0, 0.0], 1.0);
        assert!(!builder.dynamic);
        builder.set_grid_velocity(n1, [1.0, 0.0, 0.0]);
        assert!(builder.dynamic);
    }

    #[test]
    fn builder_build_adjacency() {
        let mut builder = MeshBuilder::new(2);
        let n1 = builder.add_node([0.0, 0.0, 0.0], 1.0);
        let n2 = builder.add_node([1.0, 0.0, 0.0], 1.0);
        let n3 = builder.add_node([2.0, 0.0, 0.0], 1.0);
        builder.add_edge(n1, n2, [1.0, 0.0, 0.0]);
        builder.add_edge(n2, n3, [1.0, 0.0, 0.0]);

        let mesh = builder.build().unwrap();
        assert_eq!(mesh.node_edges(n1).len(), 1);
        assert_eq!(mesh.node_edges(n2).len(), 2);
        assert_eq!(mesh.node_edges(n3).len(), 1);
    }

    #[test]
    fn vertex_on_unknown_marker_fails() {
        let mut builder = MeshBuilder::new(2);
        let n1 = builder.add_node([0.0, 0.0, 0.0], 1.0);
        let err = builder
            .add_vertex(Id::from_index(3), n1, [0.0, -1.0, 0.0], n1)
            .unwrap_err();
        assert_eq!(err, MeshError::IdNotFound { what: "MarkerId" });
    }
}
