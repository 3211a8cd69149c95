use super::cubic;
use approx::assert_relative_eq;
use ndarray::{arr1, Array1};
use proptest::prelude::*;
use std::error::Error;
use tvprop::cubic::CubicKind;
use tvprop_core::{
    CompositionTransform, Contributions, DerivativeRequest, EquationOfState, Partial, ThermoError,
    ThermoPoint, RGAS,
};

const KINDS: [CubicKind; 2] = [CubicKind::PengRobinson, CubicKind::SoaveRedlichKwong];

#[test]
fn pressure_is_negative_volume_derivative() -> Result<(), Box<dyn Error>> {
    for kind in KINDS {
        let eos = cubic(&["propane", "butane"], kind)?;
        let mut context = eos.new_context();
        let (t, v) = (320.0, 2.0e-3);
        let n = arr1(&[0.3, 0.7]);
        let point = ThermoPoint::new(t, v, n.clone())?;
        let p = eos.pressure(&mut context, &point, DerivativeRequest::new())?;

        let h = 1e-6 * v;
        let a = |v: f64| -> Result<f64, Box<dyn Error>> {
            let point = ThermoPoint::new(t, v, n.clone())?;
            Ok(eos
                .free_energy(&point, Contributions::Total, DerivativeRequest::new())?
                .value)
        };
        let a_v = (a(v + h)? - a(v - h)?) / (2.0 * h);
        assert_relative_eq!(p.value, -a_v, max_relative = 1e-7);

        let a = eos.free_energy(&point, Contributions::Total, [Partial::V].into())?;
        assert_relative_eq!(p.value, -a.scalar(Partial::V)?, max_relative = 1e-10);
    }
    Ok(())
}

#[test]
fn entropy_is_negative_temperature_derivative() -> Result<(), Box<dyn Error>> {
    for kind in KINDS {
        let eos = cubic(&["methane", "propane"], kind)?;
        let (t, v) = (250.0, 5.0e-4);
        let n = arr1(&[0.6, 0.4]);
        let point = ThermoPoint::new(t, v, n.clone())?;
        for contributions in [Contributions::Residual, Contributions::Total] {
            let s = eos.entropy(&point, contributions, DerivativeRequest::new())?;
            let h = 1e-4;
            let a = |t: f64| -> Result<f64, Box<dyn Error>> {
                let point = ThermoPoint::new(t, v, n.clone())?;
                Ok(eos
                    .free_energy(&point, contributions, DerivativeRequest::new())?
                    .value)
            };
            let a_t = (a(t + h)? - a(t - h)?) / (2.0 * h);
            assert_relative_eq!(s.value, -a_t, max_relative = 1e-7);
        }
    }
    Ok(())
}

#[test]
fn entropy_contributions_add_up() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["methane", "ethane", "propane"], CubicKind::PengRobinson)?;
    let point = ThermoPoint::new(280.0, 1.0e-3, arr1(&[0.2, 0.3, 0.5]))?;
    let request = [Partial::T, Partial::V, Partial::N].into();
    let total = eos.entropy(&point, Contributions::Total, request)?;
    let residual = eos.entropy(&point, Contributions::Residual, request)?;
    let ideal_gas = eos.entropy(&point, Contributions::IdealGas, request)?;
    assert_relative_eq!(total.value - residual.value, ideal_gas.value, max_relative = 1e-12);
    assert_relative_eq!(
        total.scalar(Partial::T)? - residual.scalar(Partial::T)?,
        ideal_gas.scalar(Partial::T)?,
        max_relative = 1e-12
    );
    assert_relative_eq!(
        total.vector(Partial::N)? - residual.vector(Partial::N)?,
        ideal_gas.vector(Partial::N)?.view(),
        max_relative = 1e-12
    );
    Ok(())
}

#[test]
fn pure_propane_state_functions() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["propane"], CubicKind::PengRobinson)?;
    let mut context = eos.new_context();
    let (t, v) = (300.0, 1.0e-3);
    let point = ThermoPoint::new(t, v, arr1(&[1.0]))?;
    let request = DerivativeRequest::new();
    let p = eos.pressure(&mut context, &point, request)?.value;
    let u = eos.internal_energy(&point, Contributions::Total, request)?.value;
    let s = eos.entropy(&point, Contributions::Total, request)?.value;
    let h = eos.enthalpy(&point, Contributions::Total, request)?.value;
    let a = eos.free_energy(&point, Contributions::Total, request)?.value;

    assert!(p > 0.0 && p < RGAS * t / v);
    assert_relative_eq!(a, u - t * s, max_relative = 1e-6);
    assert_relative_eq!(h, u + p * v, max_relative = 1e-6);

    let z = eos.compressibility(&mut context, &point)?;
    assert_relative_eq!(z, p * v / (RGAS * t), max_relative = 1e-12);
    Ok(())
}

#[test]
fn second_volume_derivative_of_pressure() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["ethane", "propane"], CubicKind::SoaveRedlichKwong)?;
    let mut context = eos.new_context();
    let (t, v) = (300.0, 4.0e-4);
    let n = arr1(&[0.5, 0.5]);
    let point = ThermoPoint::new(t, v, n.clone())?;
    let p = eos.pressure(&mut context, &point, [Partial::VV].into())?;
    assert!(p.v.is_none());

    let h = 1e-5 * v;
    let p_v = |v: f64| -> Result<f64, Box<dyn Error>> {
        let point = ThermoPoint::new(t, v, n.clone())?;
        Ok(eos
            .pressure(&mut eos.new_context(), &point, [Partial::V].into())?
            .scalar(Partial::V)?)
    };
    let p_vv = (p_v(v + h)? - p_v(v - h)?) / (2.0 * h);
    assert_relative_eq!(p.scalar(Partial::VV)?, p_vv, max_relative = 1e-6);
    Ok(())
}

#[test]
fn second_derivatives_of_the_free_energy_are_unsupported() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["propane"], CubicKind::PengRobinson)?;
    let point = ThermoPoint::new(300.0, 1.0e-3, arr1(&[1.0]))?;
    for partial in [Partial::TT, Partial::VV, Partial::NN] {
        let request = DerivativeRequest::new().with(partial);
        let res = eos.free_energy(&point, Contributions::Residual, request);
        assert!(matches!(res, Err(ThermoError::Unsupported { .. })));
    }
    let a = eos.free_energy(&point, Contributions::Residual, [Partial::T, Partial::V].into())?;
    assert!(a.t.is_some() && a.v.is_some());
    Ok(())
}

#[test]
fn dissociating_mixture() -> Result<(), Box<dyn Error>> {
    let real = cubic(&["methane", "ethane", "propane"], CubicKind::PengRobinson)?;
    let transform = CompositionTransform::from_rows(&[
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![0.0, 1.0],
    ])?;
    let apparent =
        EquationOfState::with_transform(real.ideal_gas.clone(), real.residual.clone(), transform)?;
    assert_eq!(apparent.components(), 2);

    let (t, v) = (300.0, 1.0e-3);
    let point = ThermoPoint::new(t, v, arr1(&[0.4, 0.3]))?;
    let real_point = ThermoPoint::new(t, v, arr1(&[0.4, 0.3, 0.3]))?;
    let request = [Partial::T, Partial::V, Partial::N].into();
    let p = apparent.pressure(&mut apparent.new_context(), &point, request)?;
    let p_real = real.pressure(&mut real.new_context(), &real_point, request)?;
    assert_relative_eq!(p.value, p_real.value, max_relative = 1e-14);
    assert_relative_eq!(p.scalar(Partial::T)?, p_real.scalar(Partial::T)?, max_relative = 1e-14);
    let p_n = p_real.vector(Partial::N)?;
    assert_relative_eq!(p.vector(Partial::N)?[0], p_n[0], max_relative = 1e-14);
    assert_relative_eq!(p.vector(Partial::N)?[1], p_n[1] + p_n[2], max_relative = 1e-12);

    let ln_phi = apparent.ln_phi(&point, DerivativeRequest::new())?;
    assert_eq!(ln_phi.value.len(), 2);
    assert!(ln_phi.value.iter().all(|x| x.is_finite()));

    let wrong = ThermoPoint::new(t, v, arr1(&[0.4, 0.3, 0.3]))?;
    assert!(matches!(
        apparent.pressure(&mut apparent.new_context(), &wrong, DerivativeRequest::new()),
        Err(ThermoError::IncompatibleComponents(..))
    ));
    Ok(())
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_evaluation() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["propane", "butane"], CubicKind::PengRobinson)?;
    let points = (0..64)
        .map(|i| ThermoPoint::new(250.0 + i as f64, 1.0e-3, arr1(&[0.5, 0.5])))
        .collect::<Result<Vec<_>, _>>()?;
    let parallel = eos.par_evaluate(&points, |eos, context, point| {
        eos.pressure(context, point, DerivativeRequest::new())
    });
    for (point, p) in points.iter().zip(parallel) {
        let expected = eos.pressure(&mut eos.new_context(), point, DerivativeRequest::new())?;
        assert_eq!(p?.value, expected.value);
    }
    Ok(())
}

fn total_pressure(t: f64, v: f64, n: &Array1<f64>) -> (f64, f64) {
    let eos = cubic(&["propane", "butane"], CubicKind::PengRobinson).unwrap();
    let point = ThermoPoint::new(t, v, n.clone()).unwrap();
    let p = eos
        .pressure(&mut eos.new_context(), &point, DerivativeRequest::new())
        .unwrap();
    let a = eos
        .free_energy(&point, Contributions::Total, [Partial::V].into())
        .unwrap();
    (p.value, -a.scalar(Partial::V).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn native_pressure_agrees_with_free_energy(
        t in 200.0..600.0f64,
        v in 2.0e-4..1.0e-1f64,
        x in 0.05..0.95f64,
    ) {
        let (p, p_from_a) = total_pressure(t, v, &arr1(&[x, 1.0 - x]));
        prop_assert!((p - p_from_a).abs() <= 1e-9 * RGAS * t / v);
    }
}

#[test]
fn chemical_potential_of_a_vanishing_component() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["propane", "butane"], CubicKind::PengRobinson)?;
    let (t, v) = (300.0, 1.0e-2);
    let mu = |n2: f64, contributions| -> Result<f64, Box<dyn Error>> {
        let point = ThermoPoint::new(t, v, arr1(&[1.0, n2]))?;
        Ok(eos
            .chemical_potential(&point, contributions, DerivativeRequest::new())?
            .value[1])
    };

    // the ideal gas part diverges logarithmically
    let mu_3 = mu(1e-3, Contributions::Total)?;
    let mu_9 = mu(1e-9, Contributions::Total)?;
    let mu_15 = mu(1e-15, Contributions::Total)?;
    assert!(mu_3 > mu_9 && mu_9 > mu_15);
    assert_relative_eq!(mu_3 - mu_9, RGAS * t * 1e6f64.ln(), max_relative = 1e-3);

    let point = ThermoPoint::new(t, v, arr1(&[1.0, 0.0]))?;
    for contributions in [Contributions::Total, Contributions::IdealGas] {
        assert!(matches!(
            eos.chemical_potential(&point, contributions, DerivativeRequest::new()),
            Err(ThermoError::InvalidState(..))
        ));
    }
    assert!(matches!(
        eos.entropy(&point, Contributions::Total, [Partial::N].into()),
        Err(ThermoError::InvalidState(..))
    ));
    assert!(eos.entropy(&point, Contributions::Total, [Partial::T].into()).is_ok());

    // the residual part has a finite limit
    let mu_res = mu(0.0, Contributions::Residual)?;
    assert!(mu_res.is_finite());
    assert_relative_eq!(mu_res, mu(1e-12, Contributions::Residual)?, max_relative = 1e-8);
    Ok(())
}
