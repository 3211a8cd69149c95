//! Second and third virial coefficients from the low density limit of the
//! residual Helmholtz energy.
//!
//! For a composition normalized to one mole the coefficients follow from
//! volume derivatives at a large reference volume $V_0$:
//! $B=-V_0^2F_V$ and $C=V_0^4\left(F_{VV}+\frac{2F_V}{V_0}\right)$.
use crate::equation_of_state::{EquationOfState, IdealGas, Residual};
use crate::errors::{ThermoError, ThermoResult};
use crate::request::{DerivativeRequest, Partial};
use crate::state::ThermoPoint;
use nalgebra::{Matrix2, Vector2};
use ndarray::{arr2, Array1, Array2};

/// Volume in m³ at which one mole of mixture approximates the zero density limit.
pub const VIRIAL_REFERENCE_VOLUME: f64 = 1.0e3;

/// Split between the two components used for the mixture evaluations of the second virial matrix.
pub const SECOND_VIRIAL_SPLIT: f64 = 0.5;

/// Split used for the two samples of the binary third virial matrix.
pub const THIRD_VIRIAL_SPLIT: f64 = 0.3;

fn pure_composition(nc: usize, i: usize) -> Array1<f64> {
    let mut moles = Array1::zeros(nc);
    moles[i] = 1.0;
    moles
}

fn binary_composition(nc: usize, i: usize, j: usize, x: f64) -> Array1<f64> {
    let mut moles = Array1::zeros(nc);
    moles[i] = x;
    moles[j] = 1.0 - x;
    moles
}

fn check_split(x: f64) -> ThermoResult<()> {
    if x > 0.0 && x < 1.0 {
        Ok(())
    } else {
        Err(ThermoError::Domain(format!(
            "the mole fraction split has to be in (0, 1), got {x}"
        )))
    }
}

/// Recover the cross coefficients $C_{112}$ and $C_{122}$ of a binary mixture.
///
/// `pure` contains $C_{111}$ and $C_{222}$, each sample is a pair of mole
/// fractions $(x_1, x_2)$ and the mixture third virial coefficient
/// $C=x_1^3C_{111}+3x_1^2x_2C_{112}+3x_1x_2^2C_{122}+x_2^3C_{222}$.
pub fn binary_third_virial_cross_coefficients(
    pure: [f64; 2],
    samples: [([f64; 2], f64); 2],
) -> ThermoResult<[f64; 2]> {
    let row = |[x1, x2]: [f64; 2]| [3.0 * x1 * x1 * x2, 3.0 * x1 * x2 * x2];
    let rhs = |([x1, x2], c): ([f64; 2], f64)| c - x1.powi(3) * pure[0] - x2.powi(3) * pure[1];
    let [r1, r2] = [row(samples[0].0), row(samples[1].0)];
    let matrix = Matrix2::new(r1[0], r1[1], r2[0], r2[1]);

    let scale = matrix.amax().powi(2);
    if matrix.determinant().abs() <= 1e-12 * scale {
        tracing::debug!(?samples, "singular binary third virial system");
        return Err(ThermoError::SingularSystem(String::from(
            "binary third virial coefficient recovery",
        )));
    }
    let solution = matrix
        .lu()
        .solve(&Vector2::new(rhs(samples[0]), rhs(samples[1])))
        .ok_or_else(|| {
            ThermoError::SingularSystem(String::from("binary third virial coefficient recovery"))
        })?;
    Ok([solution[0], solution[1]])
}

impl<I: IdealGas, R: Residual> EquationOfState<I, R> {
    /// Second and third virial coefficients in m³/mol and m⁶/mol² for the
    /// composition given by `moles`.
    pub fn virial_coefficients(&self, temperature: f64, moles: &Array1<f64>) -> ThermoResult<(f64, f64)> {
        let point = ThermoPoint::new(temperature, VIRIAL_REFERENCE_VOLUME, moles / moles.sum())?;
        let f = self.residual_helmholtz(&point, DerivativeRequest::from([Partial::V, Partial::VV]))?;
        let v = VIRIAL_REFERENCE_VOLUME;
        let (f_v, f_vv) = (f.scalar(Partial::V)?, f.scalar(Partial::VV)?);
        tracing::trace!(temperature, f_v, f_vv, "virial evaluation");
        Ok((-v * v * f_v, v.powi(4) * (f_vv + 2.0 * f_v / v)))
    }

    /// Second virial coefficient $B$ in m³/mol.
    pub fn second_virial_coefficient(&self, temperature: f64, moles: &Array1<f64>) -> ThermoResult<f64> {
        let point = ThermoPoint::new(temperature, VIRIAL_REFERENCE_VOLUME, moles / moles.sum())?;
        let f = self.residual_helmholtz(&point, DerivativeRequest::from([Partial::V]))?;
        Ok(-VIRIAL_REFERENCE_VOLUME.powi(2) * f.scalar(Partial::V)?)
    }

    /// Third virial coefficient $C$ in m⁶/mol².
    pub fn third_virial_coefficient(&self, temperature: f64, moles: &Array1<f64>) -> ThermoResult<f64> {
        self.virial_coefficients(temperature, moles).map(|(_, c)| c)
    }

    /// Symmetric matrix of second virial coefficients $B_{ij}$.
    pub fn second_virial_matrix(&self, temperature: f64) -> ThermoResult<Array2<f64>> {
        self.second_virial_matrix_at(temperature, SECOND_VIRIAL_SPLIT)
    }

    /// Second virial matrix with off-diagonal entries from mixtures at $(x, 1-x)$.
    pub fn second_virial_matrix_at(&self, temperature: f64, x: f64) -> ThermoResult<Array2<f64>> {
        check_split(x)?;
        let nc = self.components();
        let mut b = Array2::zeros((nc, nc));
        for i in 0..nc {
            b[(i, i)] = self.second_virial_coefficient(temperature, &pure_composition(nc, i))?;
        }
        let y = 1.0 - x;
        for i in 0..nc {
            for j in i + 1..nc {
                let b_mix = self.second_virial_coefficient(temperature, &binary_composition(nc, i, j, x))?;
                let b_ij = (b_mix - b[(i, i)] * x * x - b[(j, j)] * y * y) / (2.0 * x * y);
                b[(i, j)] = b_ij;
                b[(j, i)] = b_ij;
            }
        }
        Ok(b)
    }

    /// Third virial coefficients of a binary mixture as
    /// $\begin{pmatrix}C_{111}&C_{112}\\\\C_{122}&C_{222}\end{pmatrix}$.
    pub fn third_virial_matrix(&self, temperature: f64) -> ThermoResult<Array2<f64>> {
        self.third_virial_matrix_at(temperature, THIRD_VIRIAL_SPLIT)
    }

    /// Binary third virial matrix from mixture samples at $(x, 1-x)$ and $(1-x, x)$.
    ///
    /// The two samples coincide for `x = 0.5`, which results in a singular system.
    pub fn third_virial_matrix_at(&self, temperature: f64, x: f64) -> ThermoResult<Array2<f64>> {
        let nc = self.components();
        if nc != 2 {
            return Err(ThermoError::Domain(format!(
                "the third virial matrix is only defined for binary mixtures, not for {nc} components"
            )));
        }
        check_split(x)?;
        let c1 = self.third_virial_coefficient(temperature, &pure_composition(2, 0))?;
        let c2 = self.third_virial_coefficient(temperature, &pure_composition(2, 1))?;
        let y = 1.0 - x;
        let c_x = self.third_virial_coefficient(temperature, &binary_composition(2, 0, 1, x))?;
        let c_y = self.third_virial_coefficient(temperature, &binary_composition(2, 0, 1, y))?;
        let [c112, c122] =
            binary_third_virial_cross_coefficients([c1, c2], [([x, y], c_x), ([y, x], c_y)])?;
        Ok(arr2(&[[c1, c112], [c122, c2]]))
    }
}
