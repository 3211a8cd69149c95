//! Engine traits and the equation of state that combines them.
use crate::composition::CompositionTransform;
use crate::errors::{ThermoError, ThermoResult};
use crate::request::{DerivativeRequest, Derivatives};
use crate::state::StateHD;
use ndarray::Array1;
use num_dual::DualNum;
use std::fmt;
use std::sync::Arc;

/// Optional features an engine may or may not provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Second volume derivative of the pressure from the native pressure primitive.
    PressureVolumeCurvature,
    /// Second order derivatives of the free energy.
    FreeEnergySecondDerivatives,
    /// Evaluation in a real composition space that differs from the apparent one.
    RealComposition,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PressureVolumeCurvature => write!(f, "the second volume derivative of the pressure"),
            Self::FreeEnergySecondDerivatives => write!(f, "second derivatives of the free energy"),
            Self::RealComposition => write!(f, "a non-trivial composition transform"),
        }
    }
}

/// Residual part of an equation of state.
pub trait Residual: Send + Sync {
    /// Mutable scratch state that is owned by exactly one worker.
    type Context: Send;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Number of (real) components.
    fn components(&self) -> usize;

    /// Create a fresh evaluation context for a worker.
    fn new_context(&self) -> Self::Context;

    fn supports(&self, capability: Capability) -> bool;

    /// Evaluate the reduced residual Helmholtz energy $A^\mathrm{res}/(RT)$.
    fn residual_helmholtz_energy<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> D;

    /// Total pressure in Pa (including the ideal gas term $NRT/V$) and the
    /// requested derivatives with respect to $T$, $V$ and the real mole numbers.
    fn pressure(
        &self,
        context: &mut Self::Context,
        temperature: f64,
        volume: f64,
        moles: &Array1<f64>,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives>;

    /// Pressure and its first and second derivative with respect to the
    /// molar density $\rho=1/V$ at constant mole numbers.
    fn pressure_density_derivatives(
        &self,
        _context: &mut Self::Context,
        _temperature: f64,
        _density: f64,
        _moles: &Array1<f64>,
    ) -> ThermoResult<[f64; 3]> {
        Err(ThermoError::unsupported(
            self.name(),
            "density derivatives of the pressure",
        ))
    }
}

/// Ideal gas part of an equation of state.
pub trait IdealGas: Send + Sync {
    /// Number of (real) components.
    fn components(&self) -> usize;

    /// Evaluate the reduced ideal gas Helmholtz energy $A^\mathrm{ig}/(RT)$.
    fn ideal_gas_helmholtz_energy<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> D;
}

/// An equation of state consisting of an ideal gas model, a residual model
/// and the map from apparent to real composition.
///
/// The equation of state is immutable and can be shared between workers.
/// Everything that changes during an evaluation lives in the worker-owned
/// [Residual::Context].
pub struct EquationOfState<I, R> {
    pub ideal_gas: Arc<I>,
    pub residual: Arc<R>,
    transform: CompositionTransform,
}

impl<I, R> Clone for EquationOfState<I, R> {
    fn clone(&self) -> Self {
        Self {
            ideal_gas: self.ideal_gas.clone(),
            residual: self.residual.clone(),
            transform: self.transform.clone(),
        }
    }
}

impl<I: IdealGas, R: Residual> EquationOfState<I, R> {
    /// Combine the models of a mixture without dissociation.
    pub fn new(ideal_gas: Arc<I>, residual: Arc<R>) -> ThermoResult<Self> {
        let transform = CompositionTransform::identity(residual.components());
        Self::with_transform(ideal_gas, residual, transform)
    }

    /// Combine the models with an explicit composition transform.
    pub fn with_transform(
        ideal_gas: Arc<I>,
        residual: Arc<R>,
        transform: CompositionTransform,
    ) -> ThermoResult<Self> {
        let real = transform.real_components();
        if residual.components() != real {
            return Err(ThermoError::IncompatibleComponents(
                residual.components(),
                real,
            ));
        }
        if ideal_gas.components() != real {
            return Err(ThermoError::IncompatibleComponents(
                ideal_gas.components(),
                real,
            ));
        }
        if !transform.is_identity() && !residual.supports(Capability::RealComposition) {
            return Err(ThermoError::unsupported(
                residual.name(),
                Capability::RealComposition.to_string(),
            ));
        }
        tracing::debug!(
            backend = residual.name(),
            apparent = transform.apparent_components(),
            real,
            "initialized equation of state"
        );
        Ok(Self {
            ideal_gas,
            residual,
            transform,
        })
    }

    /// Number of apparent components.
    pub fn components(&self) -> usize {
        self.transform.apparent_components()
    }

    pub fn transform(&self) -> &CompositionTransform {
        &self.transform
    }

    /// Create a fresh evaluation context for a worker.
    pub fn new_context(&self) -> R::Context {
        self.residual.new_context()
    }

    /// Evaluate `f` for all points in parallel, one evaluation context per worker.
    #[cfg(feature = "rayon")]
    pub fn par_evaluate<T, F>(
        &self,
        points: &[crate::ThermoPoint],
        f: F,
    ) -> Vec<ThermoResult<T>>
    where
        T: Send,
        F: Fn(&Self, &mut R::Context, &crate::ThermoPoint) -> ThermoResult<T> + Sync + Send,
    {
        use rayon::prelude::*;
        points
            .par_iter()
            .map_init(|| self.new_context(), |context, point| f(self, context, point))
            .collect()
    }
}
