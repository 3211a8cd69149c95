//! Thermodynamic properties from Helmholtz energy derivatives.
//!
//! All extensive properties are returned in SI units (Pa, J, J/K) together
//! with the requested partial derivatives at constant remaining variables of
//! $(T, V, n)$.
use crate::equation_of_state::{Capability, EquationOfState, IdealGas, Residual};
use crate::errors::{ThermoError, ThermoResult};
use crate::request::{DerivativeRequest, Derivatives, Partial, VectorDerivatives};
use crate::state::{Contributions, ThermoPoint};
use crate::RGAS;
use ndarray::Array2;
use Partial::*;

const FIRST_ORDER: [Partial; 3] = [T, V, N];

impl<I: IdealGas, R: Residual> EquationOfState<I, R> {
    /// Pressure $p$ in Pa.
    ///
    /// Supported derivatives: `T`, `V`, `N`, `VV`. Engines without a native
    /// second volume derivative obtain it from the density derivatives:
    /// $\frac{\partial^2 p}{\partial V^2}=\rho^4\frac{\partial^2 p}{\partial\rho^2}+2\rho^3\frac{\partial p}{\partial\rho}$.
    pub fn pressure(
        &self,
        context: &mut R::Context,
        point: &ThermoPoint,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        request.ensure_within(&[T, V, N, VV], self.residual.name(), "pressure")?;
        let moles = self.real_moles(point)?;
        let (t, v) = (point.temperature(), point.volume());

        let native_curvature = self.residual.supports(Capability::PressureVolumeCurvature);
        let native_request = if native_curvature {
            request
        } else {
            request.without(VV)
        };
        let mut p = self
            .residual
            .pressure(context, t, v, &moles, native_request)?;

        if request.contains(VV) && !native_curvature {
            let rho = v.recip();
            let [_, dp_drho, d2p_drho2] = self
                .residual
                .pressure_density_derivatives(context, t, rho, &moles)?;
            let dp_drho = p.v.map_or(dp_drho, |dp_dv| -dp_dv * v * v);
            p.vv = Some(rho.powi(4) * d2p_drho2 + 2.0 * rho.powi(3) * dp_drho);
        }
        Ok(self.transform().derivatives_to_apparent(p))
    }

    /// Compressibility factor $Z=\frac{pV}{NRT}$ with $N$ the total number of real particles.
    pub fn compressibility(&self, context: &mut R::Context, point: &ThermoPoint) -> ThermoResult<f64> {
        let p = self.pressure(context, point, DerivativeRequest::new())?;
        let n = self.real_moles(point)?.total();
        Ok(p.value * point.volume() / (n * RGAS * point.temperature()))
    }

    /// Internal energy $U=-RT^2F_T$ in J.
    ///
    /// Supported derivatives: `T`, `V`, `N`.
    pub fn internal_energy(
        &self,
        point: &ThermoPoint,
        contributions: Contributions,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        request.ensure_within(&FIRST_ORDER, self.residual.name(), "internal energy")?;
        let f_request = request.iter().fold(DerivativeRequest::from([T]), |r, p| match p {
            T => r.with(TT),
            V => r.with(TV),
            _ => r.with(TN),
        });
        let f = self.helmholtz(point, contributions, f_request)?;

        let t = point.temperature();
        let f_t = f.scalar(T)?;
        let mut u = Derivatives::new(-RGAS * t * t * f_t);
        if request.contains(T) {
            u.t = Some(-RGAS * (2.0 * t * f_t + t * t * f.scalar(TT)?));
        }
        if request.contains(V) {
            u.v = Some(-RGAS * t * t * f.scalar(TV)?);
        }
        if request.contains(N) {
            u.n = Some(f.vector(TN)? * (-RGAS * t * t));
        }
        Ok(u)
    }

    /// Helmholtz free energy $A=RTF$ in J.
    ///
    /// Supported derivatives: all first and second order derivatives. Second
    /// order derivatives require [Capability::FreeEnergySecondDerivatives].
    pub fn free_energy(
        &self,
        point: &ThermoPoint,
        contributions: Contributions,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        let name = self.residual.name();
        request.ensure_within(&[T, V, N, TT, TV, VV, TN, VN, NN], name, "free energy")?;
        if !self.residual.supports(Capability::FreeEnergySecondDerivatives) {
            if let Some(p) = request.iter().find(|p| p.is_higher_order()) {
                return Err(ThermoError::unsupported(
                    name,
                    format!("the derivative {p} of the free energy"),
                ));
            }
        }
        let f_request = request
            .iter()
            .fold(DerivativeRequest::new(), |r, p| match p {
                TT => r.union([T, TT].into()),
                TV => r.union([V, TV].into()),
                TN => r.union([N, TN].into()),
                p => r.with(p),
            });
        let f = self.helmholtz(point, contributions, f_request)?;

        let t = point.temperature();
        let rt = RGAS * t;
        let mut a = Derivatives::new(rt * f.value);
        for p in request.iter() {
            match p {
                T => a.t = Some(RGAS * (f.value + t * f.scalar(T)?)),
                V => a.v = Some(rt * f.scalar(V)?),
                N => a.n = Some(f.vector(N)? * rt),
                TT => a.tt = Some(RGAS * (2.0 * f.scalar(T)? + t * f.scalar(TT)?)),
                TV => a.tv = Some(RGAS * (f.scalar(V)? + t * f.scalar(TV)?)),
                VV => a.vv = Some(rt * f.scalar(VV)?),
                TN => a.tn = Some((f.vector(N)? + &(f.vector(TN)? * t)) * RGAS),
                VN => a.vn = Some(f.vector(VN)? * rt),
                NN => a.nn = Some(f.matrix()? * rt),
                VVV => {}
            }
        }
        Ok(a)
    }

    /// Entropy $S=-R(F+TF_T)$ in J/K.
    ///
    /// Supported derivatives: `T`, `V`, `N`.
    pub fn entropy(
        &self,
        point: &ThermoPoint,
        contributions: Contributions,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        request.ensure_within(&FIRST_ORDER, self.residual.name(), "entropy")?;
        let f_request = request.iter().fold(DerivativeRequest::from([T]), |r, p| match p {
            T => r.with(TT),
            V => r.union([V, TV].into()),
            _ => r.union([N, TN].into()),
        });
        let f = self.helmholtz(point, contributions, f_request)?;

        let t = point.temperature();
        let f_t = f.scalar(T)?;
        let mut s = Derivatives::new(-RGAS * (f.value + t * f_t));
        if request.contains(T) {
            s.t = Some(-RGAS * (2.0 * f_t + t * f.scalar(TT)?));
        }
        if request.contains(V) {
            s.v = Some(-RGAS * (f.scalar(V)? + t * f.scalar(TV)?));
        }
        if request.contains(N) {
            s.n = Some((f.vector(N)? + &(f.vector(TN)? * t)) * (-RGAS));
        }
        Ok(s)
    }

    /// Enthalpy $H=-RT(TF_T+VF_V)$ in J.
    ///
    /// Supported derivatives: `T`, `V`, `N`.
    pub fn enthalpy(
        &self,
        point: &ThermoPoint,
        contributions: Contributions,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        request.ensure_within(&FIRST_ORDER, self.residual.name(), "enthalpy")?;
        let f_request = request
            .iter()
            .fold(DerivativeRequest::from([T, V]), |r, p| match p {
                T => r.union([TT, TV].into()),
                V => r.union([TV, VV].into()),
                _ => r.union([TN, VN].into()),
            });
        let f = self.helmholtz(point, contributions, f_request)?;

        let (t, v) = (point.temperature(), point.volume());
        let (f_t, f_v) = (f.scalar(T)?, f.scalar(V)?);
        let h_t = -RGAS * (t * f_t + v * f_v);
        let mut h = Derivatives::new(h_t * t);
        if request.contains(T) {
            let f_tt = f.scalar(TT)?;
            let f_tv = f.scalar(TV)?;
            h.t = Some(h_t - RGAS * t * (f_t + t * f_tt + v * f_tv));
        }
        if request.contains(V) {
            let f_tv = f.scalar(TV)?;
            let f_vv = f.scalar(VV)?;
            h.v = Some(-RGAS * t * (t * f_tv + f_v + v * f_vv));
        }
        if request.contains(N) {
            h.n = Some((f.vector(TN)? * t + &(f.vector(VN)? * v)) * (-RGAS * t));
        }
        Ok(h)
    }

    /// Logarithm of the fugacity coefficients of the apparent components.
    ///
    /// With multiplicities $m=A^T1$ of the composition transform:
    /// $\ln\varphi_i=F^\mathrm{res}_{n_i}-m_i\ln Z$.
    ///
    /// Supported derivatives: `T`, `V`, `N`.
    pub fn ln_phi(
        &self,
        point: &ThermoPoint,
        request: DerivativeRequest,
    ) -> ThermoResult<VectorDerivatives> {
        request.ensure_within(&FIRST_ORDER, self.residual.name(), "fugacity coefficients")?;
        let f_request = request
            .iter()
            .fold(DerivativeRequest::from([N, V]), |r, p| match p {
                T => r.union([TV, TN].into()),
                V => r.union([VV, VN].into()),
                _ => r.union([NN, VN].into()),
            });
        let f = self.residual_helmholtz(point, f_request)?;

        let v = point.volume();
        let n = self.real_moles(point)?.total();
        let m = self.transform().multiplicities();
        let f_v = f.scalar(V)?;
        let z = 1.0 - v * f_v / n;
        if z <= 0.0 {
            return Err(ThermoError::InvalidState(
                String::from("ln_phi"),
                String::from("compressibility"),
                z,
            ));
        }

        let mut ln_phi = VectorDerivatives::new(f.vector(N)? - &(&m * z.ln()));
        if request.contains(T) {
            let z_t = -v * f.scalar(TV)? / n;
            ln_phi.t = Some(f.vector(TN)? - &(&m * (z_t / z)));
        }
        if request.contains(V) {
            let z_v = -(f_v + v * f.scalar(VV)?) / n;
            ln_phi.v = Some(f.vector(VN)? - &(&m * (z_v / z)));
        }
        if request.contains(N) {
            let z_n = f.vector(VN)? * (-v / n) + &(&m * (v * f_v / (n * n)));
            let f_nn = f.matrix()?;
            let nc = m.len();
            ln_phi.n = Some(Array2::from_shape_fn((nc, nc), |(i, j)| {
                f_nn[(i, j)] - m[i] * z_n[j] / z
            }));
        }
        Ok(ln_phi)
    }

    /// Chemical potential $\mu_i=RTF_{n_i}$ in J/mol.
    ///
    /// Supported derivatives: `T`, `V`, `N`.
    pub fn chemical_potential(
        &self,
        point: &ThermoPoint,
        contributions: Contributions,
        request: DerivativeRequest,
    ) -> ThermoResult<VectorDerivatives> {
        request.ensure_within(&FIRST_ORDER, self.residual.name(), "chemical potential")?;
        let f_request = request.iter().fold(DerivativeRequest::from([N]), |r, p| match p {
            T => r.with(TN),
            V => r.with(VN),
            _ => r.with(NN),
        });
        let f = self.helmholtz(point, contributions, f_request)?;

        let rt = RGAS * point.temperature();
        let f_n = f.vector(N)?;
        let mut mu = VectorDerivatives::new(f_n * rt);
        if request.contains(T) {
            mu.t = Some(f_n * RGAS + &(f.vector(TN)? * rt));
        }
        if request.contains(V) {
            mu.v = Some(f.vector(VN)? * rt);
        }
        if request.contains(N) {
            mu.n = Some(f.matrix()? * rt);
        }
        Ok(mu)
    }
}
