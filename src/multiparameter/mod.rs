//! Multiparameter (reference) equations of state in reduced density and
//! inverse reduced temperature.
//!
//! The residual Helmholtz energy of every pure substance is a sum of
//! empirical terms $\alpha^r_i(\delta,\tau)$. Mixtures use linear
//! corresponding states mixing of the reducing functions and the
//! pure component contributions:
//! $$T_r=\sum_ix_iT_{c,i}\qquad\frac{1}{\rho_r}=\sum_i\frac{x_i}{\rho_{c,i}}\qquad\alpha^r=\sum_ix_i\alpha^r_i(\delta,\tau)$$
use ndarray::{Array1, Array2};
use num_dual::{Dual, Dual2_64, Dual64, DualNum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tvprop_core::parameter::{Parameter, ParameterError, PureRecord};
use tvprop_core::{
    Capability, DerivativeRequest, Derivatives, Partial, Residual, StateHD, ThermoError,
    ThermoResult, RGAS,
};

mod residual_function;
pub use residual_function::{ResidualFunction, ResidualFunctionJson};

/// Multiparameter record of a single substance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiParameterRecord {
    /// reducing temperature in K
    tc: f64,
    /// reducing density in mol/m³
    rhoc: f64,
    residual: Vec<ResidualFunctionJson>,
}

impl MultiParameterRecord {
    pub fn new(tc: f64, rhoc: f64, residual: Vec<ResidualFunctionJson>) -> Self {
        Self { tc, rhoc, residual }
    }
}

impl fmt::Display for MultiParameterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MultiParameterRecord(tc={} K, rhoc={} mol/m³, blocks={})",
            self.tc,
            self.rhoc,
            self.residual.len()
        )
    }
}

/// Parameters of one or more substances described by multiparameter equations.
pub struct MultiParameterParameters {
    tc: Array1<f64>,
    rhoc: Array1<f64>,
    terms: Vec<Vec<ResidualFunction>>,
    pure_records: Vec<PureRecord<MultiParameterRecord>>,
}

impl Parameter for MultiParameterParameters {
    type Pure = MultiParameterRecord;
    type Binary = ();

    fn from_records(
        pure_records: Vec<PureRecord<Self::Pure>>,
        binary_records: Option<Array2<Self::Binary>>,
    ) -> Result<Self, ParameterError> {
        if binary_records.is_some() {
            return Err(ParameterError::IncompatibleParameters(
                "multiparameter mixtures do not use binary parameters.".into(),
            ));
        }
        if pure_records.is_empty() {
            return Err(ParameterError::IncompatibleParameters(
                "at least one component is required.".into(),
            ));
        }
        let tc = pure_records.iter().map(|r| r.model_record.tc).collect();
        let rhoc = pure_records.iter().map(|r| r.model_record.rhoc).collect();
        let terms = pure_records
            .iter()
            .map(|r| {
                r.model_record
                    .residual
                    .iter()
                    .map(ResidualFunctionJson::terms)
                    .collect::<Result<Vec<_>, _>>()
                    .map(|blocks| blocks.concat())
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            tc,
            rhoc,
            terms,
            pure_records,
        })
    }

    fn pure_records(&self) -> &[PureRecord<MultiParameterRecord>] {
        &self.pure_records
    }
}

/// A multiparameter equation of state.
pub struct MultiParameter {
    parameters: Arc<MultiParameterParameters>,
}

impl MultiParameter {
    pub fn new(parameters: Arc<MultiParameterParameters>) -> Self {
        Self { parameters }
    }

    /// Reducing temperature and density of the mixture.
    fn reducing<D: DualNum<f64> + Copy>(&self, molefracs: &Array1<D>) -> (D, D) {
        let p = &self.parameters;
        let temperature = molefracs
            .iter()
            .zip(p.tc.iter())
            .fold(D::zero(), |acc, (&x, &tc)| acc + x * tc);
        let inverse_density = molefracs
            .iter()
            .zip(p.rhoc.iter())
            .fold(D::zero(), |acc, (&x, &rhoc)| acc + x / rhoc);
        (temperature, inverse_density.recip())
    }

    /// Reduced residual Helmholtz energy per mole $\alpha^r(\delta,\tau,x)$.
    pub fn alpha_r<D: DualNum<f64> + Copy>(&self, delta: D, tau: D, molefracs: &Array1<D>) -> D {
        self.parameters
            .terms
            .iter()
            .zip(molefracs.iter())
            .map(|(terms, &x)| x * terms.iter().map(|t| t.evaluate(delta, tau)).sum::<D>())
            .sum()
    }

    /// Pressure as a function of temperature, $\rho=1/V$ and mole numbers.
    fn pressure_density<D: DualNum<f64> + Copy>(
        &self,
        temperature: D,
        density: D,
        moles: &Array1<D>,
    ) -> D {
        let total = moles.sum();
        let molefracs = moles.mapv(|n| n / total);
        let (t_r, rho_r) = self.reducing(&molefracs);
        let rho = total * density;
        let delta = rho / rho_r;
        let tau = t_r / temperature;
        let alpha_r_delta = self
            .alpha_r(
                Dual::new(delta, D::one()),
                Dual::from_re(tau),
                &molefracs.mapv(Dual::from_re),
            )
            .eps;
        rho * temperature * RGAS * (delta * alpha_r_delta + 1.0)
    }
}

impl fmt::Display for MultiParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiparameter")
    }
}

impl Residual for MultiParameter {
    type Context = ();

    fn name(&self) -> &'static str {
        "multiparameter"
    }

    fn components(&self) -> usize {
        self.parameters.tc.len()
    }

    fn new_context(&self) {}

    fn supports(&self, capability: Capability) -> bool {
        matches!(capability, Capability::FreeEnergySecondDerivatives)
    }

    fn residual_helmholtz_energy<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> D {
        let total = state.moles.sum();
        let (t_r, rho_r) = self.reducing(&state.molefracs);
        let delta = total / state.volume / rho_r;
        let tau = t_r / state.temperature;
        total * self.alpha_r(delta, tau, &state.molefracs)
    }

    fn pressure(
        &self,
        _: &mut (),
        temperature: f64,
        volume: f64,
        moles: &Array1<f64>,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        request.iter().try_for_each(|p| match p {
            Partial::T | Partial::V | Partial::N => Ok(()),
            p => Err(ThermoError::unsupported(
                self.name(),
                format!("the derivative {p} of the native pressure"),
            )),
        })?;

        let density = volume.recip();
        let mut p = Derivatives::new(self.pressure_density(temperature, density, moles));
        let n = moles.mapv(Dual64::from);
        if request.contains(Partial::T) {
            let t = Dual64::from(temperature).derivative();
            p.t = Some(self.pressure_density(t, Dual64::from(density), &n).eps);
        }
        if request.contains(Partial::V) {
            let rho = Dual64::from(density).derivative();
            let p_rho = self.pressure_density(Dual64::from(temperature), rho, &n).eps;
            p.v = Some(-p_rho * density * density);
        }
        if request.contains(Partial::N) {
            let (t, rho) = (Dual64::from(temperature), Dual64::from(density));
            p.n = Some(Array1::from_shape_fn(moles.len(), |i| {
                let mut n = n.clone();
                n[i] = n[i].derivative();
                self.pressure_density(t, rho, &n).eps
            }));
        }
        Ok(p)
    }

    fn pressure_density_derivatives(
        &self,
        _: &mut (),
        temperature: f64,
        density: f64,
        moles: &Array1<f64>,
    ) -> ThermoResult<[f64; 3]> {
        let p = self.pressure_density(
            Dual2_64::from(temperature),
            Dual2_64::from(density).derivative(),
            &moles.mapv(Dual2_64::from),
        );
        Ok([p.re, p.v1, p.v2])
    }
}
