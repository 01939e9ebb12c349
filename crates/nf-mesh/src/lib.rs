//! nf-mesh: dual-mesh layer for navflow.
//!
//! Provides:
//! - Arena-allocated mesh records (Node, Edge, Marker, Vertex) addressed by dense ids
//! - Incremental mesh builder with validation
//! - Block sparsity pattern for the implicit Jacobian
//! - Greedy edge coloring for lock-free direct scatter
//! - A structured channel generator for tests and demos
//!
//! # Example
//!
//! ```
//! use nf_mesh::MeshBuilder;
//!
//! let mut builder = MeshBuilder::new(2);
//! let a = builder.add_node([0.0, 0.0, 0.0], 0.5);
//! let b = builder.add_node([1.0, 0.0, 0.0], 0.5);
//! builder.add_edge(a, b, [1.0, 0.0, 0.0]);
//! let mesh = builder.build().unwrap();
//!
//! assert_eq!(mesh.nodes().len(), 2);
//! assert_eq!(mesh.edges().len(), 1);
//! ```

pub mod builder;
pub mod coloring;
pub mod error;
pub mod indexing;
pub mod mesh;
pub mod structured;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::MeshBuilder;
pub use coloring::EdgeColoring;
pub use error::{MeshError, MeshResult};
pub use indexing::{BlockPattern, EdgeBlocks};
pub use mesh::{Edge, Marker, Mesh, Node, Vertex};
pub use structured::{ChannelSpec, build_channel, build_lid_channel};
