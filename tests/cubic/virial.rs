use super::cubic;
use approx::assert_relative_eq;
use ndarray::arr1;
use std::error::Error;
use tvprop::cubic::CubicKind;
use tvprop_core::{Residual, ThermoError, RGAS};

#[test]
fn pure_virial_coefficients() -> Result<(), Box<dyn Error>> {
    for kind in [CubicKind::PengRobinson, CubicKind::SoaveRedlichKwong] {
        let eos = cubic(&["propane"], kind)?;
        let t = 350.0;
        let a = eos.residual.attraction(t)[0];
        let b = eos.residual.covolume()[0];
        let (d1, d2) = kind.delta();
        let (b_virial, c_virial) = eos.virial_coefficients(t, &arr1(&[1.0]))?;
        assert_relative_eq!(b_virial, b - a / (RGAS * t), max_relative = 1e-6);
        assert_relative_eq!(
            c_virial,
            b * b + (d1 + d2) * a * b / (RGAS * t),
            max_relative = 1e-5
        );
    }
    Ok(())
}

#[test]
fn second_virial_matrix() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["propane", "butane"], CubicKind::PengRobinson)?;
    let t = 400.0;
    let a = eos.residual.attraction(t);
    let b = eos.residual.covolume();
    let k_ij = 0.0033;
    let a_12 = (a[0] * a[1]).sqrt() * (1.0 - k_ij);
    let b_12 = 0.5 * (b[0] + b[1]) - a_12 / (RGAS * t);

    let matrix = eos.second_virial_matrix_at(t, 0.3)?;
    assert_relative_eq!(matrix[(0, 1)], matrix[(1, 0)]);
    assert_relative_eq!(matrix[(0, 0)], b[0] - a[0] / (RGAS * t), max_relative = 1e-6);
    assert_relative_eq!(matrix[(1, 1)], b[1] - a[1] / (RGAS * t), max_relative = 1e-6);
    assert_relative_eq!(matrix[(0, 1)], b_12, max_relative = 1e-6);

    let other = eos.second_virial_matrix_at(t, 0.7)?;
    assert_relative_eq!(other, matrix, max_relative = 1e-6);

    let x = arr1(&[0.25, 0.75]);
    assert_relative_eq!(
        eos.second_virial_coefficient(t, &x)?,
        x.dot(&matrix.dot(&x)),
        max_relative = 1e-6
    );
    Ok(())
}

#[test]
fn third_virial_matrix_reconstructs_mixture() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["methane", "propane"], CubicKind::SoaveRedlichKwong)?;
    let t = 300.0;
    let c = eos.third_virial_matrix_at(t, 0.3)?;
    let (x1, x2): (f64, f64) = (0.6, 0.4);
    let reconstructed = x1.powi(3) * c[(0, 0)]
        + 3.0 * x1 * x1 * x2 * c[(0, 1)]
        + 3.0 * x1 * x2 * x2 * c[(1, 0)]
        + x2.powi(3) * c[(1, 1)];
    let c_mix = eos.third_virial_coefficient(t, &arr1(&[x1, x2]))?;
    assert_relative_eq!(reconstructed, c_mix, max_relative = 1e-5);

    assert!(matches!(
        eos.third_virial_matrix_at(t, 0.5),
        Err(ThermoError::SingularSystem(_))
    ));
    Ok(())
}

#[test]
fn third_virial_matrix_requires_a_binary_mixture() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["methane", "ethane", "propane"], CubicKind::PengRobinson)?;
    assert_eq!(eos.residual.components(), 3);
    assert!(matches!(
        eos.third_virial_matrix(300.0),
        Err(ThermoError::Domain(_))
    ));
    assert!(eos.second_virial_matrix(300.0).is_ok());
    Ok(())
}
