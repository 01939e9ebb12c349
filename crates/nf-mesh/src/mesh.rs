//! Core mesh data structures.

use nf_core::vector::{self, Vec3};
use nf_core::{EdgeId, MarkerId, NodeId, Real, VertexId};

/// A control volume of the dual mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub coord: Vec3,
    pub volume: Real,
    /// Mesh velocity; zero unless the grid moves.
    pub grid_velocity: Vec3,
    /// `true` when this process owns the node, `false` for halo copies.
    pub domain: bool,
    /// Largest characteristic length of the control volume.
    pub max_length: Real,
    /// Distance to the nearest viscous wall.
    pub wall_distance: Real,
}

/// A connection between two control volumes.
///
/// `normal` is area-weighted and points from `nodes[0]` towards `nodes[1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub nodes: [NodeId; 2],
    pub normal: Vec3,
}

impl Edge {
    pub fn i(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn j(&self) -> NodeId {
        self.nodes[1]
    }
}

/// A boundary vertex: one dual face of a marker.
///
/// `normal` is area-weighted and points out of the fluid domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub node: NodeId,
    pub normal: Vec3,
    /// Closest interior node along the wall normal.
    pub normal_neighbor: NodeId,
}

/// A named boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub name: String,
    pub vertices: Vec<Vertex>,
}

/// The mesh: a validated, immutable collection of nodes, edges and markers.
///
/// The mesh stores:
/// - All nodes, edges, and markers in vectors (indexed by their IDs).
/// - Compact adjacency: for each node, which edges are incident.
///
/// This structure is optimized for parallel iteration and solver indexing.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) n_dim: usize,
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) markers: Vec<Marker>,
    pub(crate) dynamic: bool,

    /// Offsets for node->edge adjacency: node i's edges are in node_edges[node_edge_offsets[i]..node_edge_offsets[i+1]].
    pub(crate) node_edge_offsets: Vec<usize>,

    /// Flat list of edge IDs incident to nodes (sorted by node ID then edge ID for determinism).
    pub(crate) node_edges: Vec<EdgeId>,
}

impl Mesh {
    /// Spatial dimension (2 or 3).
    pub fn n_dim(&self) -> usize {
        self.n_dim
    }

    /// Whether the grid moves (grid velocities are meaningful).
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Return all nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return all edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Return all markers.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Get a node by ID (returns None if ID out of bounds).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.idx())
    }

    /// Get an edge by ID (returns None if ID out of bounds).
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.idx())
    }

    /// Get a marker by ID (returns None if ID out of bounds).
    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.idx())
    }

    /// Look up a marker by name.
    pub fn marker_by_name(&self, name: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.name == name)
    }

    /// Edge IDs incident to a given node.
    pub fn node_edges(&self, node_id: NodeId) -> &[EdgeId] {
        let idx = node_id.idx();
        if idx >= self.nodes.len() {
            return &[];
        }
        let start = self.node_edge_offsets[idx];
        let end = self.node_edge_offsets[idx + 1];
        &self.node_edges[start..end]
    }

    /// Distance between the two endpoints of an edge.
    pub fn edge_length(&self, edge: &Edge) -> Real {
        vector::distance(
            self.n_dim,
            &self.nodes[edge.i().idx()].coord,
            &self.nodes[edge.j().idx()].coord,
        )
    }

    /// Distance between a boundary vertex and its normal neighbor.
    pub fn wall_normal_distance(&self, vertex: &Vertex) -> Real {
        vector::distance(
            self.n_dim,
            &self.nodes[vertex.node.idx()].coord,
            &self.nodes[vertex.normal_neighbor.idx()].coord,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::Id;

    #[test]
    fn edge_accessors() {
        let edge = Edge {
            id: Id::from_index(0),
            nodes: [Id::from_index(4), Id::from_index(5)],
            normal: [1.0, 0.0, 0.0],
        };
        assert_eq!(edge.i().index(), 4);
        assert_eq!(edge.j().index(), 5);
    }
}
