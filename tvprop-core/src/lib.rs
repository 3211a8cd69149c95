#![warn(clippy::all)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_arguments)]

//! Helmholtz energy derivatives and thermodynamic state functions in
//! temperature, volume and composition.
//!
//! Engines implement [Residual] and [IdealGas] and are combined with a
//! [CompositionTransform] into an [EquationOfState]. Every property is a
//! method on the equation of state that accepts a [ThermoPoint] and a
//! [DerivativeRequest]; only the requested derivatives are evaluated.

/// Molar gas constant in J/(mol K).
pub const RGAS: f64 = 8.31446261815324;

pub mod composition;
mod equation_of_state;
mod errors;
mod helmholtz;
pub mod parameter;
mod properties;
mod request;
mod state;
pub mod virial;

#[cfg(test)]
mod test_models;

pub use composition::{ApparentMoles, CompositionTransform, RealMoles};
pub use equation_of_state::{Capability, EquationOfState, IdealGas, Residual};
pub use errors::{ThermoError, ThermoResult};
pub use request::{DerivativeRequest, Derivatives, Partial, VectorDerivatives};
pub use state::{Contributions, Derivative, StateHD, ThermoPoint};
