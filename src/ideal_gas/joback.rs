//! Implementation of the ideal gas heat capacity of
//! [Joback and Reid, 1987](https://doi.org/10.1080/00986448708960487).
use ndarray::{Array1, Array2};
use num_dual::DualNum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tvprop_core::parameter::{Parameter, ParameterError, PureRecord};
use tvprop_core::{IdealGas, StateHD, RGAS};

/// Reference temperature of the enthalpy and entropy integrals in K.
const T0: f64 = 298.15;
/// Reference pressure in Pa.
const P0: f64 = 1.0e5;

/// Heat capacity polynomial $c_p^\mathrm{ig}=a+bT+cT^2+dT^3+eT^4$ in J/(mol K).
///
/// `e` defaults to zero, which is the form of the group contribution method.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct JobackRecord {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    #[serde(default)]
    e: f64,
}

impl JobackRecord {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64) -> Self {
        Self { a, b, c, d, e }
    }

    fn coefficients(&self) -> [f64; 5] {
        [self.a, self.b, self.c, self.d, self.e]
    }
}

impl fmt::Display for JobackRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cp = {}", self.a)?;
        for (k, c) in self.coefficients().into_iter().enumerate().skip(1) {
            write!(f, " + {c} T^{k}")?;
        }
        Ok(())
    }
}

/// Heat capacity coefficients of all components, one row per component.
pub struct JobackParameters {
    coefficients: Array2<f64>,
    pure_records: Vec<PureRecord<JobackRecord>>,
}

impl Parameter for JobackParameters {
    type Pure = JobackRecord;
    type Binary = ();

    fn from_records(
        pure_records: Vec<PureRecord<Self::Pure>>,
        binary_records: Option<Array2<Self::Binary>>,
    ) -> Result<Self, ParameterError> {
        if binary_records.is_some() {
            return Err(ParameterError::IncompatibleParameters(String::from(
                "the Joback ideal gas has no binary parameters",
            )));
        }
        if let Some(r) = pure_records
            .iter()
            .find(|r| r.model_record.coefficients().iter().any(|c| !c.is_finite()))
        {
            return Err(ParameterError::IncompatibleParameters(format!(
                "non-finite heat capacity coefficients for {}",
                r.identifier
            )));
        }
        let coefficients = Array2::from_shape_fn((pure_records.len(), 5), |(i, k)| {
            pure_records[i].model_record.coefficients()[k]
        });
        Ok(Self {
            coefficients,
            pure_records,
        })
    }

    fn pure_records(&self) -> &[PureRecord<JobackRecord>] {
        &self.pure_records
    }
}

/// Ideal gas with the heat capacity of
/// [Joback and Reid, 1987](https://doi.org/10.1080/00986448708960487).
///
/// $$\frac{A^\mathrm{ig}}{RT}=\sum_in_i\left(\ln\frac{\rho_iRT}{p_0}-1+\frac{h_i(T)-Ts_i(T)}{RT}\right)$$
///
/// with $h_i$ and $s_i$ integrated from $T_0=298.15$ K at $p_0=1$ bar.
pub struct Joback {
    pub parameters: Arc<JobackParameters>,
}

impl Joback {
    pub fn new(parameters: Arc<JobackParameters>) -> Self {
        Self { parameters }
    }

    /// Molar isobaric heat capacity of the ideal gas mixture in J/(mol K).
    pub fn molar_isobaric_heat_capacity(&self, temperature: f64, molefracs: &Array1<f64>) -> f64 {
        let powers = Array1::from_shape_fn(5, |k| temperature.powi(k as i32));
        molefracs.dot(&self.parameters.coefficients.dot(&powers))
    }

    /// $(h_i-Ts_i)/(RT)$ of component `i`.
    fn reference_terms<D: DualNum<f64> + Copy>(&self, i: usize, t: D) -> D {
        let coefficients = self.parameters.coefficients.row(i);
        // the T^0 term integrates to a logarithm in the entropy
        let mut h = (t - T0) * coefficients[0];
        let mut s = (t / T0).ln() * coefficients[0];
        let (mut t_k, mut t0_k) = (t, T0);
        for (k, &c) in coefficients.iter().enumerate().skip(1) {
            let (t_k1, t0_k1) = (t_k * t, t0_k * T0);
            h += (t_k1 - t0_k1) * (c / (k + 1) as f64);
            s += (t_k - t0_k) * (c / k as f64);
            (t_k, t0_k) = (t_k1, t0_k1);
        }
        (h - t * s) / (t * RGAS)
    }
}

impl IdealGas for Joback {
    fn components(&self) -> usize {
        self.parameters.pure_records.len()
    }

    fn ideal_gas_helmholtz_energy<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> D {
        let t = state.temperature;
        let mut f = D::zero();
        for (i, (&n, &rho)) in state.moles.iter().zip(&state.partial_density).enumerate() {
            // absent components do not contribute
            if n.re() > 0.0 {
                f += n * ((rho * t * RGAS / P0).ln() - 1.0 + self.reference_terms(i, t));
            }
        }
        f
    }
}

impl fmt::Display for Joback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Joback ideal gas ({} components)", self.components())
    }
}
