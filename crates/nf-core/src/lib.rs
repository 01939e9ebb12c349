//! nf-core: stable foundation for navflow.
//!
//! Contains:
//! - units (uom SI types + constructors for dimensional case inputs)
//! - numeric (Real, dimension limits, variable counts)
//! - vector (fixed-size spatial vector helpers for 2D/3D meshes)
//! - ids (stable compact IDs for mesh objects)
//! - error (shared error types)
//! - timing (opt-in phase timers)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;
pub mod vector;

// Re-exports: nice ergonomics for downstream crates
pub use error::{NfError, NfResult};
pub use ids::*;
pub use numeric::*;
pub use vector::Vec3;
