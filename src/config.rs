//! Construction of an equation of state from a JSON configuration file.
//!
//! ```json
//! {
//!     "backend": "peng-robinson",
//!     "substances": ["propane", "butane"],
//!     "parameters": "cubic.json",
//!     "binary_parameters": "cubic_binary.json",
//!     "ideal_gas_parameters": "joback.json",
//!     "alpha": "soave2019",
//!     "volume_shift": false
//! }
//! ```
//!
//! Relative paths are resolved against the directory of the configuration
//! file. With a `stoichiometry` matrix (one row per real species, one column
//! per apparent component) `substances` names the real species.
use crate::cubic::{AlphaFunction, Cubic, CubicParameters};
use crate::eos::{BackendKind, ResidualModel, ThermoEquationOfState};
use crate::ideal_gas::{Joback, JobackParameters};
use crate::multiparameter::{MultiParameter, MultiParameterParameters};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tvprop_core::parameter::{IdentifierOption, Parameter, ParameterError};
use tvprop_core::{CompositionTransform, EquationOfState, ThermoError, ThermoResult};

/// Configuration of an equation of state.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ThermoConfig {
    /// Backend selector, see [BackendKind].
    pub backend: String,
    /// Substances in the order of the real composition.
    pub substances: Vec<String>,
    /// File with the pure component records of the residual engine.
    pub parameters: PathBuf,
    /// File with binary records of the residual engine.
    #[serde(default)]
    pub binary_parameters: Option<PathBuf>,
    /// File with the Joback records.
    pub ideal_gas_parameters: PathBuf,
    #[serde(default)]
    pub identifier_option: IdentifierOption,
    /// Alpha function of the cubic backends.
    #[serde(default)]
    pub alpha: AlphaFunction,
    /// Initial volume shift flag of new evaluation contexts.
    #[serde(default)]
    pub volume_shift: bool,
    /// Rows of the stoichiometric matrix (real × apparent).
    #[serde(default)]
    pub stoichiometry: Option<Vec<Vec<f64>>>,
}

impl ThermoConfig {
    /// Read a configuration from a JSON file.
    pub fn from_json<P: AsRef<Path>>(file: P) -> ThermoResult<Self> {
        let file = file.as_ref();
        let reader = BufReader::new(File::open(file).map_err(ParameterError::from)?);
        let mut config: Self = serde_json::from_reader(reader).map_err(ParameterError::from)?;
        if let Some(dir) = file.parent() {
            config.resolve_paths(dir);
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, dir: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        };
        resolve(&mut self.parameters);
        resolve(&mut self.ideal_gas_parameters);
        if let Some(path) = self.binary_parameters.as_mut() {
            resolve(path);
        }
    }

    pub fn backend(&self) -> ThermoResult<BackendKind> {
        self.backend.parse()
    }
}

/// Build the equation of state described by a configuration.
pub fn build_equation_of_state(config: &ThermoConfig) -> ThermoResult<ThermoEquationOfState> {
    let kind = config.backend()?;
    let substances: Vec<&str> = config.substances.iter().map(String::as_str).collect();
    let binary = config.binary_parameters.as_ref();
    let option = config.identifier_option;

    let residual = match kind.cubic_kind() {
        Some(cubic_kind) => {
            let parameters =
                CubicParameters::from_json(&substances, &config.parameters, binary, option)?;
            tracing::debug!(backend = %kind, components = ?parameters.identifiers(), "loaded cubic parameters");
            ResidualModel::Cubic(
                Cubic::with_alpha(Arc::new(parameters), cubic_kind, config.alpha)
                    .with_volume_shift(config.volume_shift),
            )
        }
        None => {
            if config.volume_shift {
                return Err(ThermoError::Configuration(format!(
                    "the {kind} backend does not support a volume shift"
                )));
            }
            if config.alpha != AlphaFunction::default() {
                return Err(ThermoError::Configuration(format!(
                    "the {kind} backend has no alpha function"
                )));
            }
            let parameters =
                MultiParameterParameters::from_json(&substances, &config.parameters, binary, option)?;
            tracing::debug!(components = ?parameters.identifiers(), "loaded multiparameter records");
            ResidualModel::MultiParameter(MultiParameter::new(Arc::new(parameters)))
        }
    };

    let ideal_gas = JobackParameters::from_json(
        &substances,
        &config.ideal_gas_parameters,
        None,
        option,
    )?;
    let transform = match &config.stoichiometry {
        Some(rows) => CompositionTransform::from_rows(rows)?,
        None => CompositionTransform::identity(substances.len()),
    };
    EquationOfState::with_transform(
        Arc::new(Joback::new(Arc::new(ideal_gas))),
        Arc::new(residual),
        transform,
    )
}
