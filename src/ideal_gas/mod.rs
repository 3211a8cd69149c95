//! Ideal gas models.
mod joback;
pub use joback::{Joback, JobackParameters, JobackRecord};
