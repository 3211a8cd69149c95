//! Derivative requests and the bundles that carry the requested results.
use crate::errors::{ThermoError, ThermoResult};
use ndarray::{Array1, Array2};
use std::fmt;
use std::ops::Add;

/// A single partial derivative of a quantity with respect to
/// temperature, volume and/or mole numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partial {
    T,
    V,
    N,
    TT,
    TV,
    VV,
    TN,
    VN,
    NN,
    VVV,
}

impl Partial {
    pub const ALL: [Partial; 10] = [
        Partial::T,
        Partial::V,
        Partial::N,
        Partial::TT,
        Partial::TV,
        Partial::VV,
        Partial::TN,
        Partial::VN,
        Partial::NN,
        Partial::VVV,
    ];

    fn bit(self) -> u16 {
        1 << self as u16
    }

    /// Returns `true` for derivatives of second or higher order.
    pub fn is_higher_order(self) -> bool {
        !matches!(self, Partial::T | Partial::V | Partial::N)
    }
}

impl fmt::Display for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Partial::T => "d/dT",
            Partial::V => "d/dV",
            Partial::N => "d/dn",
            Partial::TT => "d²/dT²",
            Partial::TV => "d²/dTdV",
            Partial::VV => "d²/dV²",
            Partial::TN => "d²/dTdn",
            Partial::VN => "d²/dVdn",
            Partial::NN => "d²/dn²",
            Partial::VVV => "d³/dV³",
        };
        write!(f, "{s}")
    }
}

/// Set of partial derivatives requested from an evaluation.
///
/// ```
/// # use tvprop_core::{DerivativeRequest, Partial};
/// let request = DerivativeRequest::new().with(Partial::T).with(Partial::VV);
/// assert!(request.contains(Partial::VV));
/// assert!(!request.contains(Partial::V));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivativeRequest(u16);

impl DerivativeRequest {
    /// An empty request: only the value is computed.
    pub fn new() -> Self {
        Self(0)
    }

    pub fn with(self, partial: Partial) -> Self {
        Self(self.0 | partial.bit())
    }

    pub fn without(self, partial: Partial) -> Self {
        Self(self.0 & !partial.bit())
    }

    pub fn contains(&self, partial: Partial) -> bool {
        self.0 & partial.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// All partials contained in either request.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Partial> + '_ {
        Partial::ALL.into_iter().filter(|&p| self.contains(p))
    }

    /// Fail with a capability error if the request contains a partial
    /// outside of `allowed`.
    pub(crate) fn ensure_within(
        &self,
        allowed: &[Partial],
        backend: &str,
        property: &str,
    ) -> ThermoResult<()> {
        match self.iter().find(|p| !allowed.contains(p)) {
            Some(p) => Err(ThermoError::unsupported(
                backend,
                format!("the derivative {p} of the {property}"),
            )),
            None => Ok(()),
        }
    }
}

impl FromIterator<Partial> for DerivativeRequest {
    fn from_iter<I: IntoIterator<Item = Partial>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::with)
    }
}

impl<const N: usize> From<[Partial; N]> for DerivativeRequest {
    fn from(partials: [Partial; N]) -> Self {
        partials.into_iter().collect()
    }
}

/// Value of a scalar quantity and the requested partial derivatives.
///
/// Vector entries have the length of the (apparent) composition, `nn` is
/// the corresponding square matrix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Derivatives {
    pub value: f64,
    pub t: Option<f64>,
    pub v: Option<f64>,
    pub n: Option<Array1<f64>>,
    pub tt: Option<f64>,
    pub tv: Option<f64>,
    pub vv: Option<f64>,
    pub tn: Option<Array1<f64>>,
    pub vn: Option<Array1<f64>>,
    pub nn: Option<Array2<f64>>,
    pub vvv: Option<f64>,
}

impl Derivatives {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            ..Default::default()
        }
    }

    /// The set of derivatives present in the bundle.
    pub fn request(&self) -> DerivativeRequest {
        let present = [
            (Partial::T, self.t.is_some()),
            (Partial::V, self.v.is_some()),
            (Partial::N, self.n.is_some()),
            (Partial::TT, self.tt.is_some()),
            (Partial::TV, self.tv.is_some()),
            (Partial::VV, self.vv.is_some()),
            (Partial::TN, self.tn.is_some()),
            (Partial::VN, self.vn.is_some()),
            (Partial::NN, self.nn.is_some()),
            (Partial::VVV, self.vvv.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(p, is_some)| is_some.then_some(p))
            .collect()
    }

    /// Scalar derivative `T`, `V`, `TT`, `TV`, `VV` or `VVV`.
    pub fn scalar(&self, partial: Partial) -> ThermoResult<f64> {
        let d = match partial {
            Partial::T => self.t,
            Partial::V => self.v,
            Partial::TT => self.tt,
            Partial::TV => self.tv,
            Partial::VV => self.vv,
            Partial::VVV => self.vvv,
            Partial::N | Partial::TN | Partial::VN | Partial::NN => None,
        };
        d.ok_or(ThermoError::MissingDerivative(partial))
    }

    /// Composition derivative `N`, `TN` or `VN`.
    pub fn vector(&self, partial: Partial) -> ThermoResult<&Array1<f64>> {
        let d = match partial {
            Partial::N => self.n.as_ref(),
            Partial::TN => self.tn.as_ref(),
            Partial::VN => self.vn.as_ref(),
            _ => None,
        };
        d.ok_or(ThermoError::MissingDerivative(partial))
    }

    /// Second composition derivative `NN`.
    pub fn matrix(&self) -> ThermoResult<&Array2<f64>> {
        self.nn
            .as_ref()
            .ok_or(ThermoError::MissingDerivative(Partial::NN))
    }
}

fn add_option<T: Add<Output = T>>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (a, None) => a,
        (None, b) => b,
    }
}

impl Add for Derivatives {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
            t: add_option(self.t, rhs.t),
            v: add_option(self.v, rhs.v),
            n: add_option(self.n, rhs.n),
            tt: add_option(self.tt, rhs.tt),
            tv: add_option(self.tv, rhs.tv),
            vv: add_option(self.vv, rhs.vv),
            tn: add_option(self.tn, rhs.tn),
            vn: add_option(self.vn, rhs.vn),
            nn: add_option(self.nn, rhs.nn),
            vvv: add_option(self.vvv, rhs.vvv),
        }
    }
}

/// Value of a vector-valued quantity (one entry per component) and the
/// requested partial derivatives.
///
/// `n[(i, j)]` is the derivative of entry `i` with respect to `n_j`.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorDerivatives {
    pub value: Array1<f64>,
    pub t: Option<Array1<f64>>,
    pub v: Option<Array1<f64>>,
    pub n: Option<Array2<f64>>,
}

impl VectorDerivatives {
    pub fn new(value: Array1<f64>) -> Self {
        Self {
            value,
            t: None,
            v: None,
            n: None,
        }
    }

    /// Derivative vector with respect to `T` or `V`.
    pub fn vector(&self, partial: Partial) -> ThermoResult<&Array1<f64>> {
        let d = match partial {
            Partial::T => self.t.as_ref(),
            Partial::V => self.v.as_ref(),
            _ => None,
        };
        d.ok_or(ThermoError::MissingDerivative(partial))
    }

    /// Jacobian with respect to the mole numbers.
    pub fn jacobian(&self) -> ThermoResult<&Array2<f64>> {
        self.n
            .as_ref()
            .ok_or(ThermoError::MissingDerivative(Partial::N))
    }
}
