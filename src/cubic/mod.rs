//! Cubic equations of state of the Peng-Robinson and Soave-Redlich-Kwong type.
//!
//! Both kinds share the generic two-parameter form
//! $$p=\frac{NRT}{V-B}-\frac{A}{(V+\delta_1B)(V+\delta_2B)}$$
//! with the van der Waals one-fluid mixing rules for $A$ and $B$.
//! An optional Peneloux volume translation can be applied to the
//! pressure evaluation.
use ndarray::{Array1, Array2};
use num_dual::{Dual2_64, Dual64, DualNum};
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tvprop_core::parameter::{Identifier, Parameter, ParameterError, PureRecord};
use tvprop_core::{
    Capability, DerivativeRequest, Derivatives, Partial, Residual, StateHD, ThermoError,
    ThermoResult, RGAS,
};

mod alpha;
pub use alpha::AlphaFunction;

/// The two supported cubic equations of state.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CubicKind {
    PengRobinson,
    SoaveRedlichKwong,
}

impl CubicKind {
    /// The constants $\delta_1$ and $\delta_2$ of the attractive term.
    pub fn delta(&self) -> (f64, f64) {
        match self {
            Self::PengRobinson => (1.0 + SQRT_2, 1.0 - SQRT_2),
            Self::SoaveRedlichKwong => (1.0, 0.0),
        }
    }

    /// The constants $\Omega_a$ and $\Omega_b$ that relate the pure
    /// component parameters to the critical point.
    pub fn omega(&self) -> (f64, f64) {
        match self {
            Self::PengRobinson => (0.45724, 0.07780),
            Self::SoaveRedlichKwong => (0.42748, 0.08664),
        }
    }
}

impl fmt::Display for CubicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PengRobinson => write!(f, "Peng-Robinson"),
            Self::SoaveRedlichKwong => write!(f, "Soave-Redlich-Kwong"),
        }
    }
}

/// Critical data of one substance.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CubicRecord {
    /// critical temperature in Kelvin
    tc: f64,
    /// critical pressure in Pascal
    pc: f64,
    /// acentric factor
    acentric_factor: f64,
    /// Peneloux volume translation in m³/mol
    #[serde(default)]
    volume_shift: f64,
}

impl CubicRecord {
    /// Create a new pure substance record for a cubic equation of state.
    pub fn new(tc: f64, pc: f64, acentric_factor: f64) -> Self {
        Self {
            tc,
            pc,
            acentric_factor,
            volume_shift: 0.0,
        }
    }

    /// Set the Peneloux volume translation in m³/mol.
    pub fn with_volume_shift(mut self, volume_shift: f64) -> Self {
        self.volume_shift = volume_shift;
        self
    }
}

impl fmt::Display for CubicRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CubicRecord(tc={} K", self.tc)?;
        write!(f, ", pc={} Pa", self.pc)?;
        write!(f, ", acentric factor={}", self.acentric_factor)?;
        if self.volume_shift != 0.0 {
            write!(f, ", volume shift={} m³/mol", self.volume_shift)?;
        }
        write!(f, ")")
    }
}

/// Cubic parameters for one or more substances.
pub struct CubicParameters {
    /// Critical temperature in Kelvin
    tc: Array1<f64>,
    /// Critical pressure in Pascal
    pc: Array1<f64>,
    acentric_factor: Array1<f64>,
    /// Volume translation in m³/mol
    volume_shift: Array1<f64>,
    /// Binary interaction parameter
    k_ij: Array2<f64>,
    /// Records the parameters were built from
    pure_records: Vec<PureRecord<CubicRecord>>,
}

impl fmt::Display for CubicParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pure_records
            .iter()
            .try_for_each(|pr| writeln!(f, "{}", pr))?;
        writeln!(f, "\nk_ij:\n{}", self.k_ij)
    }
}

impl CubicParameters {
    /// Parameters from critical data only, all k_ij = 0.
    pub fn new_simple(
        tc: &[f64],
        pc: &[f64],
        acentric_factor: &[f64],
    ) -> Result<Self, ParameterError> {
        if [pc.len(), acentric_factor.len()]
            .iter()
            .any(|&l| l != tc.len())
        {
            return Err(ParameterError::IncompatibleParameters(String::from(
                "each component has to have parameters.",
            )));
        }
        let records = (0..tc.len())
            .map(|i| {
                let record = CubicRecord::new(tc[i], pc[i], acentric_factor[i]);
                PureRecord::new(Identifier::default(), record)
            })
            .collect();
        Self::from_records(records, None)
    }

    /// Binary interaction parameters.
    pub fn k_ij(&self) -> &Array2<f64> {
        &self.k_ij
    }
}

impl Parameter for CubicParameters {
    type Pure = CubicRecord;
    type Binary = f64;

    fn from_records(
        pure_records: Vec<PureRecord<Self::Pure>>,
        binary_records: Option<Array2<Self::Binary>>,
    ) -> Result<Self, ParameterError> {
        let n = pure_records.len();
        if n == 0 {
            return Err(ParameterError::IncompatibleParameters(
                "at least one component is required.".into(),
            ));
        }

        let mut tc = Array1::zeros(n);
        let mut pc = Array1::zeros(n);
        let mut acentric_factor = Array1::zeros(n);
        let mut volume_shift = Array1::zeros(n);
        for (i, record) in pure_records.iter().enumerate() {
            let r = &record.model_record;
            if !(r.tc > 0.0 && r.pc > 0.0) {
                return Err(ParameterError::IncompatibleParameters(format!(
                    "critical temperature and pressure of {} have to be positive.",
                    record.identifier
                )));
            }
            tc[i] = r.tc;
            pc[i] = r.pc;
            acentric_factor[i] = r.acentric_factor;
            volume_shift[i] = r.volume_shift;
        }

        let k_ij = match binary_records {
            Some(k_ij) if k_ij.dim() != (n, n) => {
                return Err(ParameterError::IncompatibleParameters(format!(
                    "the binary matrix has shape {:?}, expected ({n}, {n}).",
                    k_ij.dim()
                )))
            }
            Some(k_ij) => k_ij,
            None => Array2::zeros([n; 2]),
        };

        Ok(Self {
            tc,
            pc,
            acentric_factor,
            volume_shift,
            k_ij,
            pure_records,
        })
    }

    fn pure_records(&self) -> &[PureRecord<CubicRecord>] {
        &self.pure_records
    }
}

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(0);

/// Temperature dependent attractive parameters of the last evaluated temperature.
///
/// Entries are only valid for the engine that wrote them.
#[derive(Clone, Debug, Default)]
struct AttractionCache {
    engine: Option<u64>,
    temperature: Option<f64>,
    attraction: Array1<f64>,
    hit: u64,
    miss: u64,
}

/// Evaluation context of the cubic engine.
///
/// Holds the volume shift flag and the cache of the attractive parameters.
/// A context belongs to exactly one worker.
#[derive(Clone, Debug, Default)]
pub struct CubicContext {
    volume_shift: bool,
    cache: AttractionCache,
}

impl CubicContext {
    pub fn volume_shift(&self) -> bool {
        self.volume_shift
    }

    /// Enable or disable the Peneloux translation of the pressure.
    pub fn set_volume_shift(&mut self, volume_shift: bool) {
        self.volume_shift = volume_shift;
    }

    /// Number of pressure evaluations that reused the attractive parameters.
    pub fn cache_hits(&self) -> u64 {
        self.cache.hit
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache.miss
    }
}

/// Disables the volume shift of a context for its lifetime.
struct VolumeShiftGuard<'a> {
    context: &'a mut CubicContext,
    previous: bool,
}

impl<'a> VolumeShiftGuard<'a> {
    fn disable(context: &'a mut CubicContext) -> Self {
        let previous = context.volume_shift;
        context.volume_shift = false;
        Self { context, previous }
    }
}

impl Deref for VolumeShiftGuard<'_> {
    type Target = CubicContext;

    fn deref(&self) -> &CubicContext {
        self.context
    }
}

impl DerefMut for VolumeShiftGuard<'_> {
    fn deref_mut(&mut self) -> &mut CubicContext {
        self.context
    }
}

impl Drop for VolumeShiftGuard<'_> {
    fn drop(&mut self) {
        self.context.volume_shift = self.previous;
    }
}

/// A cubic equation of state.
pub struct Cubic {
    parameters: Arc<CubicParameters>,
    kind: CubicKind,
    /// Pure component attractive parameters at the critical point
    a: Array1<f64>,
    /// Pure component covolumes
    b: Array1<f64>,
    /// Slopes of the alpha function
    m: Array1<f64>,
    volume_shift: bool,
    id: u64,
}

impl Cubic {
    /// Cubic engine of the given kind with the Soave alpha function.
    pub fn new(parameters: Arc<CubicParameters>, kind: CubicKind) -> Self {
        Self::with_alpha(parameters, kind, AlphaFunction::default())
    }

    /// Create a new equation of state with a specific alpha function.
    pub fn with_alpha(
        parameters: Arc<CubicParameters>,
        kind: CubicKind,
        alpha: AlphaFunction,
    ) -> Self {
        let (omega_a, omega_b) = kind.omega();
        let p = &parameters;
        let a = omega_a * RGAS.powi(2) * &p.tc * &p.tc / &p.pc;
        let b = omega_b * RGAS * &p.tc / &p.pc;
        let m = alpha.slope(kind, &p.acentric_factor);
        Self {
            parameters,
            kind,
            a,
            b,
            m,
            volume_shift: false,
            id: NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Set the initial volume shift flag of new evaluation contexts.
    pub fn with_volume_shift(mut self, volume_shift: bool) -> Self {
        self.volume_shift = volume_shift;
        self
    }

    pub fn kind(&self) -> CubicKind {
        self.kind
    }

    pub fn parameters(&self) -> &Arc<CubicParameters> {
        &self.parameters
    }

    /// Pure component covolumes $b_i$ in m³/mol.
    pub fn covolume(&self) -> &Array1<f64> {
        &self.b
    }

    /// Pure component attractive parameters $a_i\alpha_i(T)$ in Pa m⁶/mol².
    pub fn attraction<D: DualNum<f64> + Copy>(&self, temperature: D) -> Array1<D> {
        let reduced_temperature = self.parameters.tc.mapv(|tc| temperature / tc);
        alpha::soave(&self.m, &reduced_temperature) * &self.a
    }

    /// Total volume translation $\sum_in_ic_i$ in m³.
    pub fn volume_translation(&self, moles: &Array1<f64>) -> f64 {
        (moles * &self.parameters.volume_shift).sum()
    }

    fn cached_attraction<'c>(
        &self,
        cache: &'c mut AttractionCache,
        temperature: f64,
    ) -> &'c Array1<f64> {
        if cache.engine == Some(self.id) && cache.temperature == Some(temperature) {
            cache.hit += 1;
            tracing::trace!(temperature, hits = cache.hit, "attraction cache hit");
        } else {
            cache.miss += 1;
            tracing::trace!(temperature, misses = cache.miss, "attraction cache miss");
            cache.attraction = self.attraction(temperature);
            cache.engine = Some(self.id);
            cache.temperature = Some(temperature);
        }
        &cache.attraction
    }

    /// Mixture parameters $A$ and $B$ for mole numbers (not mole fractions).
    fn mixture<D: DualNum<f64> + Copy>(&self, moles: &Array1<D>, attraction: &Array1<D>) -> (D, D) {
        let k_ij = &self.parameters.k_ij;
        let mut a = D::zero();
        for i in 0..attraction.len() {
            for j in 0..attraction.len() {
                a += (attraction[i] * attraction[j]).sqrt() * moles[i] * moles[j] * (1.0 - k_ij[(i, j)]);
            }
        }
        let b = moles
            .iter()
            .zip(self.b.iter())
            .fold(D::zero(), |acc, (&n, &b)| acc + n * b);
        (a, b)
    }

    fn pressure_from<D: DualNum<f64> + Copy>(
        &self,
        temperature: D,
        volume: D,
        moles: &Array1<D>,
        attraction: &Array1<D>,
    ) -> D {
        let (a, b) = self.mixture(moles, attraction);
        let (d1, d2) = self.kind.delta();
        moles.sum() * temperature * RGAS / (volume - b)
            - a / ((volume + b * d1) * (volume + b * d2))
    }
}

impl fmt::Display for Cubic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Residual for Cubic {
    type Context = CubicContext;

    fn name(&self) -> &'static str {
        match self.kind {
            CubicKind::PengRobinson => "peng-robinson",
            CubicKind::SoaveRedlichKwong => "soave-redlich-kwong",
        }
    }

    fn components(&self) -> usize {
        self.b.len()
    }

    fn new_context(&self) -> CubicContext {
        CubicContext {
            volume_shift: self.volume_shift,
            cache: AttractionCache::default(),
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::PressureVolumeCurvature => true,
            Capability::FreeEnergySecondDerivatives => false,
            Capability::RealComposition => true,
        }
    }

    fn residual_helmholtz_energy<D: DualNum<f64> + Copy>(&self, state: &StateHD<D>) -> D {
        let attraction = self.attraction(state.temperature);
        let (a, b) = self.mixture(&state.moles, &attraction);
        let (d1, d2) = self.kind.delta();
        let v = state.volume;
        let repulsion = -state.moles.sum() * (-(b / v)).ln_1p();
        let dispersion = a / (state.temperature * RGAS * b * (d1 - d2))
            * (b * (d1 - d2) / (v + b * d2)).ln_1p();
        repulsion - dispersion
    }

    fn pressure(
        &self,
        context: &mut CubicContext,
        temperature: f64,
        volume: f64,
        moles: &Array1<f64>,
        request: DerivativeRequest,
    ) -> ThermoResult<Derivatives> {
        if context.volume_shift {
            if !request.is_empty() {
                return Err(ThermoError::unsupported(
                    self.name(),
                    "derivatives of the volume-shifted pressure",
                ));
            }
            let shifted = volume + self.volume_translation(moles);
            if shifted <= 0.0 {
                return Err(ThermoError::InvalidState(
                    "pressure".into(),
                    "shifted volume".into(),
                    shifted,
                ));
            }
            tracing::trace!(volume, shifted, "volume-shifted pressure");
            let mut guard = VolumeShiftGuard::disable(context);
            return self.pressure(&mut guard, temperature, shifted, moles, request);
        }
        request.iter().try_for_each(|p| match p {
            Partial::T | Partial::V | Partial::N | Partial::VV => Ok(()),
            p => Err(ThermoError::unsupported(
                self.name(),
                format!("the derivative {p} of the native pressure"),
            )),
        })?;

        let attraction = self.cached_attraction(&mut context.cache, temperature);
        let mut p = Derivatives::new(self.pressure_from(temperature, volume, moles, attraction));

        if request.contains(Partial::T) {
            let t = Dual64::from(temperature).derivative();
            let a = self.attraction(t);
            let n = moles.mapv(Dual64::from);
            p.t = Some(self.pressure_from(t, Dual64::from(volume), &n, &a).eps);
        }

        if request.contains(Partial::VV) {
            let a = attraction.mapv(Dual2_64::from);
            let n = moles.mapv(Dual2_64::from);
            let v = Dual2_64::from(volume).derivative();
            let res = self.pressure_from(Dual2_64::from(temperature), v, &n, &a);
            p.vv = Some(res.v2);
            if request.contains(Partial::V) {
                p.v = Some(res.v1);
            }
        } else if request.contains(Partial::V) {
            let a = attraction.mapv(Dual64::from);
            let n = moles.mapv(Dual64::from);
            let v = Dual64::from(volume).derivative();
            p.v = Some(self.pressure_from(Dual64::from(temperature), v, &n, &a).eps);
        }

        if request.contains(Partial::N) {
            let a = attraction.mapv(Dual64::from);
            let t = Dual64::from(temperature);
            let v = Dual64::from(volume);
            p.n = Some(Array1::from_shape_fn(moles.len(), |i| {
                let mut n = moles.mapv(Dual64::from);
                n[i] = n[i].derivative();
                self.pressure_from(t, v, &n, &a).eps
            }));
        }
        Ok(p)
    }
}
