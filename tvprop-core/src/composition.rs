//! Apparent and real composition spaces and the stoichiometric map between them.
//!
//! Mixtures with internal dissociation or association are specified in terms
//! of apparent species (e.g. a salt) while the engines are evaluated for the
//! real species (e.g. the ions). The map $n^\mathrm{real} = A n^\mathrm{app}$
//! is linear and fixed at configuration time, so derivatives with respect to
//! apparent mole numbers follow from the real-space derivatives by the chain
//! rule: gradients transform as $A^T g$ and bilinear forms as $A^T M A$.
use crate::errors::{ThermoError, ThermoResult};
use crate::request::Derivatives;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use std::ops::Deref;

/// Mole numbers of the apparent (externally specified) species in mol.
#[derive(Clone, Debug, PartialEq)]
pub struct ApparentMoles(Array1<f64>);

/// Mole numbers of the real species in mol, as seen by the engines.
#[derive(Clone, Debug, PartialEq)]
pub struct RealMoles(Array1<f64>);

macro_rules! impl_moles {
    ($moles:ident) => {
        impl $moles {
            pub fn new(moles: Array1<f64>) -> Self {
                Self(moles)
            }

            pub fn total(&self) -> f64 {
                self.0.sum()
            }

            pub fn into_inner(self) -> Array1<f64> {
                self.0
            }
        }

        impl Deref for $moles {
            type Target = Array1<f64>;

            fn deref(&self) -> &Array1<f64> {
                &self.0
            }
        }
    };
}

impl_moles!(ApparentMoles);
impl_moles!(RealMoles);

/// Linear map from apparent to real mole numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositionTransform {
    apparent: usize,
    /// Stoichiometric matrix with one row per real and one column per apparent species.
    stoichiometry: Option<Array2<f64>>,
}

impl CompositionTransform {
    /// The transform of a mixture without dissociation.
    pub fn identity(components: usize) -> Self {
        Self {
            apparent: components,
            stoichiometry: None,
        }
    }

    /// Create a transform from a stoichiometric matrix of shape `[real, apparent]`.
    pub fn new(stoichiometry: Array2<f64>) -> ThermoResult<Self> {
        let (real, apparent) = stoichiometry.dim();
        if real < apparent {
            return Err(ThermoError::Configuration(format!(
                "the stoichiometric matrix maps {apparent} apparent species to only {real} real species"
            )));
        }
        if stoichiometry.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return Err(ThermoError::Configuration(String::from(
                "stoichiometric coefficients have to be finite and non-negative",
            )));
        }
        if let Some(j) = (0..apparent).find(|&j| stoichiometry.column(j).iter().all(|&a| a == 0.0))
        {
            return Err(ThermoError::Configuration(format!(
                "apparent species {j} does not map to any real species"
            )));
        }
        Ok(Self {
            apparent,
            stoichiometry: Some(stoichiometry),
        })
    }

    /// Create a transform from nested rows, one per real species.
    pub fn from_rows(rows: &[Vec<f64>]) -> ThermoResult<Self> {
        let apparent = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != apparent) {
            return Err(ThermoError::Configuration(String::from(
                "all rows of the stoichiometric matrix need the same length",
            )));
        }
        Self::new(Array2::from_shape_fn((rows.len(), apparent), |(i, j)| {
            rows[i][j]
        }))
    }

    pub fn is_identity(&self) -> bool {
        self.stoichiometry.is_none()
    }

    pub fn apparent_components(&self) -> usize {
        self.apparent
    }

    pub fn real_components(&self) -> usize {
        self.stoichiometry
            .as_ref()
            .map_or(self.apparent, |a| a.nrows())
    }

    /// Number of real particles created per apparent particle, $A^T 1$.
    pub fn multiplicities(&self) -> Array1<f64> {
        match &self.stoichiometry {
            Some(a) => a.sum_axis(ndarray::Axis(0)),
            None => Array1::ones(self.apparent),
        }
    }

    pub fn to_real(&self, moles: &ApparentMoles) -> RealMoles {
        match &self.stoichiometry {
            Some(a) => RealMoles(a.dot(&moles.0)),
            None => RealMoles(moles.0.clone()),
        }
    }

    /// Map real mole numbers back to apparent species.
    ///
    /// For a non-trivial stoichiometry the apparent mole numbers are the
    /// least-squares solution of $A n^\mathrm{app} = n^\mathrm{real}$.
    pub fn to_apparent(&self, moles: &RealMoles) -> ThermoResult<ApparentMoles> {
        let Some(a) = &self.stoichiometry else {
            return Ok(ApparentMoles(moles.0.clone()));
        };
        let (real, apparent) = a.dim();
        if moles.len() != real {
            return Err(ThermoError::IncompatibleComponents(real, moles.len()));
        }
        let a = DMatrix::from_fn(real, apparent, |i, j| a[(i, j)]);
        let rhs = a.transpose() * DVector::from_iterator(real, moles.iter().copied());
        let x = (a.transpose() * &a)
            .lu()
            .solve(&rhs)
            .ok_or_else(|| ThermoError::SingularSystem(String::from("real to apparent mapping")))?;
        Ok(ApparentMoles(Array1::from_iter(x.iter().copied())))
    }

    /// Push a gradient with respect to real mole numbers to apparent space.
    pub fn gradient_to_apparent(&self, gradient: Array1<f64>) -> Array1<f64> {
        match &self.stoichiometry {
            Some(a) => a.t().dot(&gradient),
            None => gradient,
        }
    }

    /// Push a bilinear form in real mole numbers to apparent space.
    pub fn bilinear_to_apparent(&self, hessian: Array2<f64>) -> Array2<f64> {
        match &self.stoichiometry {
            Some(a) => a.t().dot(&hessian).dot(a),
            None => hessian,
        }
    }

    pub(crate) fn derivatives_to_apparent(&self, mut d: Derivatives) -> Derivatives {
        if self.is_identity() {
            return d;
        }
        d.n = d.n.map(|g| self.gradient_to_apparent(g));
        d.tn = d.tn.map(|g| self.gradient_to_apparent(g));
        d.vn = d.vn.map(|g| self.gradient_to_apparent(g));
        d.nn = d.nn.map(|m| self.bilinear_to_apparent(m));
        d
    }
}
