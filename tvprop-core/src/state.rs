//! Thermodynamic points and their representation in (hyper-)dual numbers.
use crate::composition::{ApparentMoles, RealMoles};
use crate::errors::{ThermoError, ThermoResult};
use ndarray::Array1;
use num_dual::*;

/// Part of the Helmholtz energy a property is evaluated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contributions {
    /// Ideal gas part only.
    IdealGas,
    /// Deviation from the ideal gas at the same temperature, volume and moles.
    Residual,
    /// Ideal gas and residual part.
    Total,
}

/// Temperature in K, volume in m³ and apparent mole numbers in mol.
///
/// The point is validated on construction and immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ThermoPoint {
    temperature: f64,
    volume: f64,
    moles: ApparentMoles,
}

impl ThermoPoint {
    pub fn new(temperature: f64, volume: f64, moles: Array1<f64>) -> ThermoResult<Self> {
        validate(temperature, volume, &moles)?;
        Ok(Self {
            temperature,
            volume,
            moles: ApparentMoles::new(moles),
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn moles(&self) -> &ApparentMoles {
        &self.moles
    }
}

fn validate(temperature: f64, volume: f64, moles: &Array1<f64>) -> ThermoResult<()> {
    let invalid = |quantity: &str, value: f64| {
        ThermoError::InvalidState(String::from("validate"), String::from(quantity), value)
    };
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(invalid("temperature", temperature));
    }
    if !volume.is_finite() || volume <= 0.0 {
        return Err(invalid("volume", volume));
    }
    if let Some(&n) = moles.iter().find(|n| !n.is_finite() || n.is_sign_negative()) {
        return Err(invalid("moles", n));
    }
    if moles.sum() <= 0.0 {
        return Err(invalid("total moles", moles.sum()));
    }
    Ok(())
}

/// Thermodynamic state in (generalized) dual numbers.
///
/// The Helmholtz energy of an engine is a function of a `StateHD`; the dual
/// parts of temperature, volume and moles select the derivative that is
/// propagated through the evaluation.
#[derive(Clone, Debug)]
pub struct StateHD<D> {
    /// temperature in K
    pub temperature: D,
    /// volume in m³
    pub volume: D,
    /// mole numbers of the real species in mol
    pub moles: Array1<D>,
    /// mole fractions
    pub molefracs: Array1<D>,
    /// partial densities in mol/m³
    pub partial_density: Array1<D>,
}

impl<D: DualNum<f64> + Copy> StateHD<D> {
    /// Create a new `StateHD` for given temperature, volume and moles.
    pub fn new(temperature: D, volume: D, moles: Array1<D>) -> Self {
        let total_moles = moles.sum();
        let partial_density = moles.mapv(|n| n / volume);
        let molefracs = moles.mapv(|n| n / total_moles);

        Self {
            temperature,
            volume,
            moles,
            molefracs,
            partial_density,
        }
    }
}

/// Direction of a derivative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Derivative {
    /// Seed the volume.
    DV,
    /// Seed the temperature.
    DT,
    /// Seed the moles of real species `i`.
    DN(usize),
}

/// Point in real composition space from which dual states are seeded.
pub(crate) struct RealPoint<'a> {
    pub temperature: f64,
    pub volume: f64,
    pub moles: &'a RealMoles,
}

impl<'a> RealPoint<'a> {
    pub fn new(temperature: f64, volume: f64, moles: &'a RealMoles) -> Self {
        Self {
            temperature,
            volume,
            moles,
        }
    }

    pub fn components(&self) -> usize {
        self.moles.len()
    }

    pub fn derive0(&self) -> StateHD<f64> {
        StateHD::new(self.temperature, self.volume, (**self.moles).clone())
    }

    /// State seeded for a first derivative.
    pub fn derive1(&self, derivative: Derivative) -> StateHD<Dual64> {
        let mut t = Dual64::from(self.temperature);
        let mut v = Dual64::from(self.volume);
        let mut n = self.moles.mapv(Dual64::from);
        match derivative {
            Derivative::DT => t = t.derivative(),
            Derivative::DV => v = v.derivative(),
            Derivative::DN(i) => n[i] = n[i].derivative(),
        }
        StateHD::new(t, v, n)
    }

    /// State seeded for first and second derivatives in a single direction.
    pub fn derive2(&self, derivative: Derivative) -> StateHD<Dual2_64> {
        let mut t = Dual2_64::from(self.temperature);
        let mut v = Dual2_64::from(self.volume);
        let mut n = self.moles.mapv(Dual2_64::from);
        match derivative {
            Derivative::DT => t = t.derivative(),
            Derivative::DV => v = v.derivative(),
            Derivative::DN(i) => n[i] = n[i].derivative(),
        }
        StateHD::new(t, v, n)
    }

    /// State seeded for a mixed second derivative in two directions.
    pub fn derive2_mixed(
        &self,
        derivative1: Derivative,
        derivative2: Derivative,
    ) -> StateHD<HyperDual64> {
        let mut t = HyperDual64::from(self.temperature);
        let mut v = HyperDual64::from(self.volume);
        let mut n = self.moles.mapv(HyperDual64::from);
        match derivative1 {
            Derivative::DT => t = t.derivative1(),
            Derivative::DV => v = v.derivative1(),
            Derivative::DN(i) => n[i] = n[i].derivative1(),
        }
        match derivative2 {
            Derivative::DT => t = t.derivative2(),
            Derivative::DV => v = v.derivative2(),
            Derivative::DN(i) => n[i] = n[i].derivative2(),
        }
        StateHD::new(t, v, n)
    }

    /// State seeded for derivatives up to third order in a single direction.
    pub fn derive3(&self, derivative: Derivative) -> StateHD<Dual3_64> {
        let mut t = Dual3_64::from(self.temperature);
        let mut v = Dual3_64::from(self.volume);
        let mut n = self.moles.mapv(Dual3_64::from);
        match derivative {
            Derivative::DT => t = t.derivative(),
            Derivative::DV => v = v.derivative(),
            Derivative::DN(i) => n[i] = n[i].derivative(),
        };
        StateHD::new(t, v, n)
    }
}
