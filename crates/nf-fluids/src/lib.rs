//! nf-fluids: equation of state and per-node flow records for navflow.
//!
//! Provides:
//! - `PrimitiveState`, `SecondaryState` and `PrimitiveGradient` records
//! - The `FluidModel` trait (conserved → primitive derivation with admissibility)
//! - `IdealGas` with constant or Sutherland viscosity

pub mod error;
pub mod ideal_gas;
pub mod model;
pub mod state;

pub use error::{FluidError, FluidResult};
pub use ideal_gas::{IdealGas, ViscosityLaw};
pub use model::{Derived, FluidModel};
pub use state::{Conserved, PrimitiveGradient, PrimitiveState, SecondaryState, check_len};
