use crate::cubic::{Cubic, CubicContext, CubicKind};
use crate::ideal_gas::Joback;
use crate::multiparameter::MultiParameter;
use ndarray::Array1;
use num_dual::DualNum;
use std::fmt;
use std::str::FromStr;
use tvprop_core::{
    Capability, DerivativeRequest, Derivatives, EquationOfState, Residual, StateHD, ThermoError,
    ThermoResult,
};

/// Selector of the residual engine.
///
/// ```
/// # use tvprop::BackendKind;
/// let kind: BackendKind = "pr".parse().unwrap();
/// assert_eq!(kind, BackendKind::PengRobinson);
/// assert!("virial".parse::<BackendKind>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    PengRobinson,
    SoaveRedlichKwong,
    MultiParameter,
}

impl BackendKind {
    /// The cubic kind of a cubic backend.
    pub fn cubic_kind(&self) -> Option<CubicKind> {
        match self {
            Self::PengRobinson => Some(CubicKind::PengRobinson),
            Self::SoaveRedlichKwong => Some(CubicKind::SoaveRedlichKwong),
            Self::MultiParameter => None,
        }
    }
}

impl FromStr for BackendKind {
    type Err = ThermoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "peng-robinson" | "pr" => Ok(Self::PengRobinson),
            "soave-redlich-kwong" | "srk" => Ok(Self::SoaveRedlichKwong),
            "multiparameter" | "reference" => Ok(Self::MultiParameter),
            _ => Err(ThermoError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PengRobinson => write!(f, "peng-robinson"),
            Self::SoaveRedlichKwong => write!(f, "soave-redlich-kwong"),
            Self::MultiParameter => write!(f, "multiparameter"),
        }
    }
}

/// Collection of the available residual engines.
///
/// Used where the engine is selected at runtime, e.g. from a configuration file.
pub enum ResidualModel {
    Cubic(Cubic),
    MultiParameter(MultiParameter),
}

impl From<Cubic> for ResidualModel {
    fn from(cubic: Cubic) -> Self {
        Self::Cubic(cubic)
    }
}

impl From<MultiParameter> for ResidualModel {
    fn from(multiparameter: MultiParameter) -> Self {
        Self::MultiParameter(multiparameter)
    }
}

/// Evaluation context of a [ResidualModel].
#[derive(Clone, Debug)]
pub enum ResidualContext {
    Cubic(CubicContext),
    MultiParameter,
}

impl ResidualContext {
    pub fn cubic(&self) -> Option<&CubicContext> {
        match self {
            Self::Cubic(context) => Some(context),
            Self::MultiParameter => None,
        }
    }

    /// Enable or disable the volume shift. Only cubic contexts can be shifted.
    pub fn set_volume_shift(&mut self, volume_shift: bool) -> ThermoResult<()> {
        match self {
            Self::Cubic(context) => {
                context.set_volume_shift(volume_shift);
                Ok(())
            }
            Self::MultiParameter if !volume_shift => Ok(()),
            Self::MultiParameter => Err(ThermoError::unsupported(
                "multiparameter",
                "volume translation",
            )),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Cubic(_) => "cubic",
            Self::MultiParameter => "multiparameter",
        }
    }
}

fn context_mismatch(model: &ResidualModel, context: &ResidualContext) -> ThermoError {
    ThermoError::Configuration(format!(
        "a {} context was passed to the {} backend",
        context.kind(),
        model.name()
    ))
}

impl Residual for ResidualModel {
    type Context = ResidualContext;

    fn name(&self) -> &'static str {
        match self {
            Self::Cubic(model) => model.name(),
            Self::MultiParameter(model) => model.name(),
        }
    }

    fn components(&self) -> usize {
        match self {
            Self::Cubic(model) => model.components(),
            Self::MultiParameter(model) => model.components(),
        }
    }

    fn new_context(&self) -> ResidualContext {
        match self {
            Self::Cubic(model) => ResidualContext::Cubic(model.new_context()),
            Self::MultiParameter(_) => ResidualContext::MultiParameter,
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        match self {
            Self::Cubic(model) => model.supports(capability),
            Self::MultiParameter(model) => model.supports(capability),
        }
    }

    fn residual_helmholtz_energy<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> D {
        match self {
            Self::Cubic(model) => model.residual_helmholtz_energy(state),
            Self::MultiParameter(model) => model.residual_helmholtz_energy(state),
        }
    }

    fn pressure(
        &self,
        context: &mut ResidualContext,
        temperature: f64,
        volume: f64,
        moles: &Array1<f64>,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        match (self, context) {
            (Self::Cubic(model), ResidualContext::Cubic(context)) => {
                model.pressure(context, temperature, volume, moles, request)
            }
            (Self::MultiParameter(model), ResidualContext::MultiParameter) => {
                model.pressure(&mut (), temperature, volume, moles, request)
            }
            (model, context) => Err(context_mismatch(model, context)),
        }
    }

    fn pressure_density_derivatives(
        &self,
        context: &mut ResidualContext,
        temperature: f64,
        density: f64,
        moles: &Array1<f64>,
    ) -> ThermoResult<[f64; 3]> {
        match (self, context) {
            (Self::Cubic(model), ResidualContext::Cubic(context)) => {
                model.pressure_density_derivatives(context, temperature, density, moles)
            }
            (Self::MultiParameter(model), ResidualContext::MultiParameter) => {
                model.pressure_density_derivatives(&mut (), temperature, density, moles)
            }
            (model, context) => Err(context_mismatch(model, context)),
        }
    }
}

/// Equation of state with a runtime selected residual engine and the Joback ideal gas.
pub type ThermoEquationOfState = EquationOfState<Joback, ResidualModel>;
