#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

//! Engines for [tvprop_core]: cubic and multiparameter residual models,
//! the Joback ideal gas and the runtime selection of a backend from a
//! configuration file.
//!
//! ```no_run
//! # use tvprop::{build_equation_of_state, ThermoConfig};
//! # use tvprop_core::{DerivativeRequest, Partial, ThermoPoint};
//! # fn main() -> tvprop_core::ThermoResult<()> {
//! let config = ThermoConfig::from_json("config.json")?;
//! let eos = build_equation_of_state(&config)?;
//! let mut context = eos.new_context();
//! let point = ThermoPoint::new(300.0, 1e-3, ndarray::arr1(&[0.4, 0.6]))?;
//! let p = eos.pressure(&mut context, &point, DerivativeRequest::from([Partial::V]))?;
//! # Ok(())
//! # }
//! ```

mod config;
pub mod cubic;
mod eos;
pub mod ideal_gas;
pub mod multiparameter;

pub use config::{build_equation_of_state, ThermoConfig};
pub use eos::{BackendKind, ResidualContext, ResidualModel, ThermoEquationOfState};
