//! Mesh-specific error types.

use nf_core::{EdgeId, MarkerId, NfError, NodeId};

pub type MeshResult<T> = Result<T, MeshError>;

/// Mesh construction and validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Only 2D and 3D meshes are supported.
    UnsupportedDimension { n_dim: usize },

    /// An edge refers to a node that doesn't exist.
    InvalidEdgeNode { edge: EdgeId, node: NodeId },

    /// An edge connects a node to itself.
    SelfLoop { edge: EdgeId },

    /// Two edges connect the same pair of nodes.
    DuplicateEdge { first: EdgeId, second: EdgeId },

    /// A face normal is zero or not finite.
    DegenerateNormal { what: &'static str, index: usize },

    /// A boundary vertex refers to a node that doesn't exist.
    InvalidVertexNode { marker: MarkerId, node: NodeId },

    /// A boundary vertex's normal neighbor is the vertex node itself.
    NormalNeighborIsSelf { marker: MarkerId, node: NodeId },

    /// Two markers share a name.
    DuplicateMarker { name: String },

    /// A control volume has a non-positive or non-finite volume.
    InvalidVolume { node: NodeId, volume: f64 },

    /// Structured generator parameters are out of range.
    InvalidSpec { what: &'static str },

    /// ID not found in the mesh or block pattern.
    IdNotFound { what: &'static str },
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::UnsupportedDimension { n_dim } => {
                write!(f, "Unsupported mesh dimension {} (expected 2 or 3)", n_dim)
            }
            MeshError::InvalidEdgeNode { edge, node } => {
                write!(f, "Edge {} refers to non-existent node {}", edge, node)
            }
            MeshError::SelfLoop { edge } => {
                write!(f, "Edge {} connects a node to itself", edge)
            }
            MeshError::DuplicateEdge { first, second } => {
                write!(f, "Edges {} and {} connect the same node pair", first, second)
            }
            MeshError::DegenerateNormal { what, index } => {
                write!(f, "Degenerate {} normal at index {}", what, index)
            }
            MeshError::InvalidVertexNode { marker, node } => {
                write!(f, "Marker {} refers to non-existent node {}", marker, node)
            }
            MeshError::NormalNeighborIsSelf { marker, node } => {
                write!(
                    f,
                    "Marker {} vertex at node {} uses itself as normal neighbor",
                    marker, node
                )
            }
            MeshError::DuplicateMarker { name } => {
                write!(f, "Marker name '{}' is used more than once", name)
            }
            MeshError::InvalidVolume { node, volume } => {
                write!(f, "Node {} has invalid volume {}", node, volume)
            }
            MeshError::InvalidSpec { what } => {
                write!(f, "Invalid structured mesh spec: {}", what)
            }
            MeshError::IdNotFound { what } => {
                write!(f, "{} not found", what)
            }
        }
    }
}

impl std::error::Error for MeshError {}

impl From<MeshError> for NfError {
    fn from(err: MeshError) -> Self {
        NfError::Invariant {
            what: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::Id;

    #[test]
    fn display_mentions_ids() {
        let err = MeshError::InvalidEdgeNode {
            edge: Id::from_index(3),
            node: Id::from_index(9),
        };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('9'));
    }

    #[test]
    fn converts_into_core_error() {
        let err: NfError = MeshError::DuplicateMarker {
            name: "wall".into(),
        }
        .into();
        assert!(matches!(err, NfError::Invariant { .. }));
    }
}
