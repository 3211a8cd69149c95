use crate::parameter::ParameterError;
use crate::request::Partial;
use thiserror::Error;

/// Error type for invalid configurations, unsupported requests and
/// failed evaluations.
#[derive(Error, Debug)]
pub enum ThermoError {
    #[error("Unknown equation of state backend `{0}`.")]
    UnknownBackend(String),
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("The {backend} backend does not support {feature}.")]
    Unsupported { backend: String, feature: String },
    #[error("Domain error: {0}")]
    Domain(String),
    #[error("Singular linear system in {0}.")]
    SingularSystem(String),
    #[error("Equation of state is initialized for {0} components while the input specifies {1} components.")]
    IncompatibleComponents(usize, usize),
    #[error("Invalid state in {0}: {1} = {2}.")]
    InvalidState(String, String, f64),
    #[error("The derivative {0} was not requested.")]
    MissingDerivative(Partial),
    #[error(transparent)]
    ParameterError(#[from] ParameterError),
}

impl ThermoError {
    /// Build a capability error and log the rejection.
    pub fn unsupported<B: Into<String>, F: Into<String>>(backend: B, feature: F) -> Self {
        let (backend, feature) = (backend.into(), feature.into());
        tracing::debug!(%backend, %feature, "rejected unsupported request");
        Self::Unsupported { backend, feature }
    }
}

/// Convenience type for `Result<T, ThermoError>`.
pub type ThermoResult<T> = Result<T, ThermoError>;
