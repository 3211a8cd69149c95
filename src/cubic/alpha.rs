use super::CubicKind;
use ndarray::Array1;
use num_dual::DualNum;
use serde::{Deserialize, Serialize};

/// Temperature dependence of the attractive parameter.
///
/// All variants share the Soave form $\alpha=\left(1+m\left(1-\sqrt{T_r}\right)\right)^2$
/// and differ in the correlation of $m$ with the acentric factor.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlphaFunction {
    /// Original correlation for the respective cubic kind.
    #[default]
    Soave,
    /// Reparameterization for both kinds.
    ///
    /// https://doi.org/10.1016/j.fluid.2018.12.007
    Soave2019,
}

impl AlphaFunction {
    /// Slope $m$ of the alpha function for every component.
    pub fn slope(&self, kind: CubicKind, acentric_factor: &Array1<f64>) -> Array1<f64> {
        acentric_factor.mapv(|w| match (self, kind) {
            (Self::Soave, CubicKind::PengRobinson) => 0.37464 + w * (1.54226 - w * 0.26992),
            (Self::Soave, CubicKind::SoaveRedlichKwong) => 0.48 + w * (1.574 - w * 0.176),
            (Self::Soave2019, CubicKind::PengRobinson) => {
                0.3919 + w * (1.4996 - w * (0.2721 - w * 0.1063))
            }
            (Self::Soave2019, CubicKind::SoaveRedlichKwong) => {
                0.481 + w * (1.5963 - w * (0.2963 - w * 0.1223))
            }
        })
    }
}

/// Evaluate the Soave form for the given slopes and reduced temperatures.
pub(super) fn soave<D: DualNum<f64> + Copy>(
    slope: &Array1<f64>,
    reduced_temperature: &Array1<D>,
) -> Array1<D> {
    ((-reduced_temperature.mapv(|t| t.sqrt()) + 1.0) * slope + 1.0).mapv(|a| a.powi(2))
}
