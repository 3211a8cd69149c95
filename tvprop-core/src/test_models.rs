//! Van der Waals fluid with a monatomic ideal gas for unit tests.
use crate::composition::CompositionTransform;
use crate::equation_of_state::{Capability, EquationOfState, IdealGas, Residual};
use crate::errors::ThermoResult;
use crate::request::{DerivativeRequest, Derivatives, Partial};
use crate::state::StateHD;
use crate::RGAS;
use ndarray::{arr2, Array1, Array2};
use num_dual::DualNum;
use std::sync::Arc;

pub struct VanDerWaals {
    a: Array2<f64>,
    b: Array1<f64>,
}

impl VanDerWaals {
    fn new(a: &[f64], b: &[f64]) -> Self {
        let n = a.len();
        Self {
            a: Array2::from_shape_fn((n, n), |(i, j)| (a[i] * a[j]).sqrt()),
            b: Array1::from_vec(b.to_vec()),
        }
    }

    fn mixture(&self, moles: &Array1<f64>) -> (f64, f64) {
        (moles.dot(&self.a.dot(moles)), moles.dot(&self.b))
    }
}

impl Residual for VanDerWaals {
    type Context = ();

    fn name(&self) -> &'static str {
        "van der Waals"
    }

    fn components(&self) -> usize {
        self.b.len()
    }

    fn new_context(&self) -> Self::Context {}

    fn supports(&self, capability: Capability) -> bool {
        !matches!(capability, Capability::PressureVolumeCurvature)
    }

    fn residual_helmholtz_energy<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> D {
        let n = &state.moles;
        let nc = n.len();
        let mut a = D::zero();
        for i in 0..nc {
            for j in 0..nc {
                a += n[i] * n[j] * self.a[(i, j)];
            }
        }
        let b = (0..nc).fold(D::zero(), |acc, i| acc + n[i] * self.b[i]);
        let v = state.volume;
        -n.sum() * (-(b / v)).ln_1p() - a / (state.temperature * v * RGAS)
    }

    fn pressure(
        &self,
        _: &mut (),
        temperature: f64,
        volume: f64,
        moles: &Array1<f64>,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        let (a, b) = self.mixture(moles);
        let (t, v, n) = (temperature, volume, moles.sum());
        let mut p = Derivatives::new(n * RGAS * t / (v - b) - a / (v * v));
        if request.contains(Partial::T) {
            p.t = Some(n * RGAS / (v - b));
        }
        if request.contains(Partial::V) {
            p.v = Some(-n * RGAS * t / (v - b).powi(2) + 2.0 * a / v.powi(3));
        }
        if request.contains(Partial::N) {
            let da = self.a.dot(moles) * 2.0;
            p.n = Some(
                (&self.b * (n * RGAS * t / (v - b).powi(2))) + RGAS * t / (v - b) - da / (v * v),
            );
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
        let (a, b) = self.mixture(moles);
        let nrt = moles.sum() * RGAS * temperature;
        let x = 1.0 - b * density;
        Ok([
            nrt * density / x - a * density * density,
            nrt / (x * x) - 2.0 * a * density,
            2.0 * nrt * b / x.powi(3) - 2.0 * a,
        ])
    }
}

/// Monatomic ideal gas with a component specific reference.
pub struct Monatomic {
    offset: Array1<f64>,
}

impl IdealGas for Monatomic {
    fn components(&self) -> usize {
        self.offset.len()
    }

    fn ideal_gas_helmholtz_energy<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> D {
        let ln_t = state.temperature.ln() * 1.5;
        let mut f = D::zero();
        for (i, &rho) in state.partial_density.iter().enumerate() {
            if rho.re() > 0.0 {
                f += state.moles[i] * (rho.ln() - ln_t + self.offset[i] - 1.0);
            }
        }
        f
    }
}

fn monatomic(n: usize) -> Monatomic {
    Monatomic {
        offset: Array1::from_shape_fn(n, |i| 0.5 * i as f64),
    }
}

pub fn van_der_waals(a: &[f64], b: &[f64]) -> EquationOfState<Monatomic, VanDerWaals> {
    EquationOfState::new(Arc::new(monatomic(a.len())), Arc::new(VanDerWaals::new(a, b))).unwrap()
}

/// Solvent and a 1:1 salt that dissociates completely.
pub fn van_der_waals_salt() -> EquationOfState<Monatomic, VanDerWaals> {
    let transform =
        CompositionTransform::new(arr2(&[[1.0, 0.0], [0.0, 1.0], [0.0, 1.0]])).unwrap();
    EquationOfState::with_transform(
        Arc::new(monatomic(3)),
        Arc::new(VanDerWaals::new(&[0.3, 0.1, 0.2], &[3e-5, 1e-5, 2e-5])),
        transform,
    )
    .unwrap()
}
