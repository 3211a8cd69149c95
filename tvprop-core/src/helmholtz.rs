//! Reduced Helmholtz energy $F=A/(RT)$ and its partial derivatives.
//!
//! Every requested partial is obtained from one evaluation of the engine in
//! the dual number that carries exactly that derivative, so partials that are
//! not requested are never evaluated.
use crate::composition::RealMoles;
use crate::equation_of_state::{EquationOfState, IdealGas, Residual};
use crate::errors::{ThermoError, ThermoResult};
use crate::request::{DerivativeRequest, Derivatives, Partial};
use crate::state::{Contributions, Derivative, RealPoint, StateHD, ThermoPoint};
use ndarray::{Array1, Array2};
use num_dual::DualNum;

const COMPOSITION_DERIVATIVES: [Partial; 4] = [Partial::N, Partial::TN, Partial::VN, Partial::NN];

trait HelmholtzEnergy {
    fn helmholtz_energy<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> D;
}

struct ResidualPart<'a, R>(&'a R);

impl<R: Residual> HelmholtzEnergy for ResidualPart<'_, R> {
    fn helmholtz_energy<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> D {
        self.0.residual_helmholtz_energy(state)
    }
}

struct IdealGasPart<'a, I>(&'a I);

impl<I: IdealGas> HelmholtzEnergy for IdealGasPart<'_, I> {
    fn helmholtz_energy<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> D {
        self.0.ideal_gas_helmholtz_energy(state)
    }
}

fn derivatives<H: HelmholtzEnergy>(
    model: &H,
    point: &RealPoint,
    request: DerivativeRequest,
) -> Derivatives {
    use Derivative::*;
    let nc = point.components();
    let mut d = Derivatives::new(model.helmholtz_energy(&point.derive0()));

    if request.contains(Partial::TT) {
        let f = model.helmholtz_energy(&point.derive2(DT));
        d.tt = Some(f.v2);
        d.t = request.contains(Partial::T).then_some(f.v1);
    } else if request.contains(Partial::T) {
        d.t = Some(model.helmholtz_energy(&point.derive1(DT)).eps);
    }

    if request.contains(Partial::VVV) {
        let f = model.helmholtz_energy(&point.derive3(DV));
        d.vvv = Some(f.v3);
        d.vv = request.contains(Partial::VV).then_some(f.v2);
        d.v = request.contains(Partial::V).then_some(f.v1);
    } else if request.contains(Partial::VV) {
        let f = model.helmholtz_energy(&point.derive2(DV));
        d.vv = Some(f.v2);
        d.v = request.contains(Partial::V).then_some(f.v1);
    } else if request.contains(Partial::V) {
        d.v = Some(model.helmholtz_energy(&point.derive1(DV)).eps);
    }

    if request.contains(Partial::TV) {
        d.tv = Some(model.helmholtz_energy(&point.derive2_mixed(DT, DV)).eps1eps2);
    }
    if request.contains(Partial::N) {
        d.n = Some(Array1::from_shape_fn(nc, |i| {
            model.helmholtz_energy(&point.derive1(DN(i))).eps
        }));
    }
    if request.contains(Partial::TN) {
        d.tn = Some(Array1::from_shape_fn(nc, |i| {
            model.helmholtz_energy(&point.derive2_mixed(DT, DN(i))).eps1eps2
        }));
    }
    if request.contains(Partial::VN) {
        d.vn = Some(Array1::from_shape_fn(nc, |i| {
            model.helmholtz_energy(&point.derive2_mixed(DV, DN(i))).eps1eps2
        }));
    }
    if request.contains(Partial::NN) {
        let mut nn = Array2::zeros((nc, nc));
        for i in 0..nc {
            for j in i..nc {
                let f = model
                    .helmholtz_energy(&point.derive2_mixed(DN(i), DN(j)))
                    .eps1eps2;
                nn[(i, j)] = f;
                nn[(j, i)] = f;
            }
        }
        d.nn = Some(nn);
    }
    d
}

impl<I: IdealGas, R: Residual> EquationOfState<I, R> {
    pub(crate) fn real_moles(&self, point: &ThermoPoint) -> ThermoResult<RealMoles> {
        let nc = point.moles().len();
        if nc != self.components() {
            return Err(ThermoError::IncompatibleComponents(self.components(), nc));
        }
        Ok(self.transform().to_real(point.moles()))
    }

    fn evaluate<H: HelmholtzEnergy>(
        &self,
        model: &H,
        point: &ThermoPoint,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        let moles = self.real_moles(point)?;
        let real = RealPoint::new(point.temperature(), point.volume(), &moles);
        let d = derivatives(model, &real, request);
        Ok(self.transform().derivatives_to_apparent(d))
    }

    /// Reduced residual Helmholtz energy and the requested derivatives.
    pub fn residual_helmholtz(
        &self,
        point: &ThermoPoint,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        self.evaluate(&ResidualPart(&*self.residual), point, request)
    }

    /// Reduced ideal gas Helmholtz energy and the requested derivatives.
    ///
    /// The third volume derivative is only available for the residual part.
    /// Composition derivatives require all real mole numbers to be positive,
    /// $\partial F^\mathrm{ig}/\partial n_i$ diverges for $n_i\to 0$.
    pub fn ideal_gas_helmholtz(
        &self,
        point: &ThermoPoint,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        if request.contains(Partial::VVV) {
            return Err(ThermoError::unsupported(
                "ideal gas",
                "the third volume derivative of the Helmholtz energy",
            ));
        }
        if COMPOSITION_DERIVATIVES.iter().any(|&p| request.contains(p)) {
            let moles = self.real_moles(point)?;
            if let Some(i) = moles.iter().position(|&n| n == 0.0) {
                return Err(ThermoError::InvalidState(
                    String::from("ideal gas Helmholtz energy"),
                    format!("moles of real species {i}"),
                    0.0,
                ));
            }
        }
        self.evaluate(&IdealGasPart(&*self.ideal_gas), point, request)
    }

    /// Reduced Helmholtz energy of the selected contributions.
    pub fn helmholtz(
        &self,
        point: &ThermoPoint,
        contributions: Contributions,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        match contributions {
            Contributions::IdealGas => self.ideal_gas_helmholtz(point, request),
            Contributions::Residual => self.residual_helmholtz(point, request),
            Contributions::Total => Ok(self.ideal_gas_helmholtz(point, request)?
                + self.residual_helmholtz(point, request)?),
        }
    }
}
