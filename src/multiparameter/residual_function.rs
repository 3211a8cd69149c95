use num_dual::DualNum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tvprop_core::parameter::ParameterError;

/// A block of residual terms of one type, stored column-wise.
///
/// Every entry of `parameters` is a column holding one value per term:
/// ```json
/// {"type": "ResidualHelmholtzPower", "d": [1, 2], "l": [0, 1], "n": [0.5, -0.1], "t": [0.25, 1.0]}
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResidualFunctionJson {
    #[serde(rename = "type")]
    ty: String,
    #[serde(flatten)]
    parameters: HashMap<String, Vec<Value>>,
}

impl ResidualFunctionJson {
    /// Split the columns into individual terms.
    pub fn terms(&self) -> Result<Vec<ResidualFunction>, ParameterError> {
        let count = self.parameters.values().next().map_or(0, Vec::len);
        if let Some((name, column)) = self.parameters.iter().find(|(_, c)| c.len() != count) {
            return Err(ParameterError::IncompatibleParameters(format!(
                "column '{name}' of {} has {} entries, expected {count}.",
                self.ty,
                column.len()
            )));
        }
        (0..count)
            .map(|index| {
                let mut term: Map<String, Value> = self
                    .parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), v[index].clone()))
                    .collect();
                term.insert("type".into(), Value::String(self.ty.clone()));
                serde_json::from_value(Value::Object(term)).map_err(|e| {
                    ParameterError::IncompatibleParameters(format!(
                        "term {index} of {}: {e}",
                        self.ty
                    ))
                })
            })
            .collect()
    }
}

/// A single term of the reduced residual Helmholtz energy $\alpha^r(\delta,\tau)$.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ResidualFunction {
    ResidualHelmholtzPower {
        d: i32,
        l: i32,
        n: f64,
        t: f64,
    },
    ResidualHelmholtzExponential {
        d: i32,
        g: f64,
        l: i32,
        n: f64,
        t: f64,
    },
    ResidualHelmholtzGaussian {
        d: i32,
        n: f64,
        t: f64,
        beta: f64,
        epsilon: f64,
        eta: f64,
        gamma: f64,
    },
}

impl ResidualFunction {
    pub fn evaluate<D: DualNum<f64> + Copy>(&self, delta: D, tau: D) -> D {
        match *self {
            Self::ResidualHelmholtzPower { d, l, n, t } => {
                let mut pre = delta.powi(d) * tau.powf(t) * n;
                if l != 0 {
                    pre *= (-delta.powi(l)).exp()
                };
                pre
            }
            Self::ResidualHelmholtzExponential { d, g, l, n, t } => {
                delta.powi(d) * tau.powf(t) * n * (-delta.powi(l) * g).exp()
            }
            Self::ResidualHelmholtzGaussian {
                d,
                n,
                t,
                beta,
                epsilon,
                eta,
                gamma,
            } => {
                (delta.powi(d) * tau.powf(t) * n)
                    * (-(delta - epsilon).powi(2) * eta - (tau - gamma).powi(2) * beta).exp()
            }
        }
    }
}
