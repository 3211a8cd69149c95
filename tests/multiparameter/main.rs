use approx::assert_relative_eq;
use ndarray::arr1;
use std::error::Error;
use std::sync::Arc;
use tvprop::ideal_gas::{Joback, JobackParameters};
use tvprop::multiparameter::{MultiParameter, MultiParameterParameters};
use tvprop_core::parameter::{IdentifierOption, Parameter};
use tvprop_core::{
    Capability, CompositionTransform, Contributions, DerivativeRequest, EquationOfState, Partial,
    Residual, ThermoError, ThermoPoint, ThermoResult, RGAS,
};

type MultiParameterEquationOfState = EquationOfState<Joback, MultiParameter>;

fn models(substances: &[&str]) -> ThermoResult<(Arc<Joback>, Arc<MultiParameter>)> {
    let parameters = MultiParameterParameters::from_json(
        substances,
        "tests/parameters/multiparameter.json",
        None,
        IdentifierOption::Name,
    )?;
    let joback = JobackParameters::from_json(
        substances,
        "tests/parameters/joback.json",
        None,
        IdentifierOption::Name,
    )?;
    Ok((
        Arc::new(Joback::new(Arc::new(joback))),
        Arc::new(MultiParameter::new(Arc::new(parameters))),
    ))
}

fn multiparameter(substances: &[&str]) -> ThermoResult<MultiParameterEquationOfState> {
    let (ideal_gas, residual) = models(substances)?;
    EquationOfState::new(ideal_gas, residual)
}

#[test]
fn second_volume_derivative_from_density_derivatives() -> Result<(), Box<dyn Error>> {
    let eos = multiparameter(&["argon", "krypton"])?;
    let (t, v) = (220.0, 2.0e-4);
    let n = arr1(&[0.7, 0.3]);
    let point = ThermoPoint::new(t, v, n.clone())?;

    let p_v = |v: f64| -> Result<f64, Box<dyn Error>> {
        let point = ThermoPoint::new(t, v, n.clone())?;
        Ok(eos
            .pressure(&mut (), &point, [Partial::V].into())?
            .scalar(Partial::V)?)
    };
    let h = 1e-5 * v;
    let p_vv = (p_v(v + h)? - p_v(v - h)?) / (2.0 * h);

    let only_vv = eos.pressure(&mut (), &point, [Partial::VV].into())?;
    assert!(only_vv.v.is_none());
    assert_relative_eq!(only_vv.scalar(Partial::VV)?, p_vv, max_relative = 1e-6);

    let both = eos.pressure(&mut (), &point, [Partial::V, Partial::VV].into())?;
    assert_relative_eq!(both.scalar(Partial::V)?, p_v(v)?, max_relative = 1e-12);
    assert_relative_eq!(
        both.scalar(Partial::VV)?,
        only_vv.scalar(Partial::VV)?,
        max_relative = 1e-10
    );
    Ok(())
}

#[test]
fn free_energy_second_derivatives() -> Result<(), Box<dyn Error>> {
    let eos = multiparameter(&["argon"])?;
    let (t, v) = (160.0, 1.0e-4);
    let point = ThermoPoint::new(t, v, arr1(&[1.0]))?;
    let a = eos.free_energy(
        &point,
        Contributions::Total,
        [Partial::V, Partial::VV, Partial::TV, Partial::NN].into(),
    )?;
    let p = eos.pressure(&mut (), &point, [Partial::T, Partial::V].into())?;
    assert_relative_eq!(-a.scalar(Partial::V)?, p.value, max_relative = 1e-10);
    assert_relative_eq!(-a.scalar(Partial::VV)?, p.scalar(Partial::V)?, max_relative = 1e-8);
    assert_relative_eq!(-a.scalar(Partial::TV)?, p.scalar(Partial::T)?, max_relative = 1e-8);
    assert_eq!(a.matrix()?.dim(), (1, 1));
    Ok(())
}

#[test]
fn pure_fugacity_coefficient() -> Result<(), Box<dyn Error>> {
    let eos = multiparameter(&["krypton"])?;
    let (t, v) = (250.0, 5.0e-4);
    let point = ThermoPoint::new(t, v, arr1(&[1.0]))?;
    let ln_phi = eos.ln_phi(&point, DerivativeRequest::new())?.value[0];
    let f = eos.residual_helmholtz(&point, DerivativeRequest::new())?.value;
    let p = eos.pressure(&mut (), &point, DerivativeRequest::new())?.value;
    let z = p * v / (RGAS * t);
    assert_relative_eq!(ln_phi, f + z - 1.0 - z.ln(), max_relative = 1e-10);
    Ok(())
}

#[test]
fn dissociation_is_rejected() -> Result<(), Box<dyn Error>> {
    let (ideal_gas, residual) = models(&["argon", "krypton"])?;
    assert!(!residual.supports(Capability::RealComposition));
    let transform = CompositionTransform::from_rows(&[vec![1.0], vec![1.0]])?;
    let res = EquationOfState::with_transform(ideal_gas, residual, transform);
    assert!(matches!(res, Err(ThermoError::Unsupported { .. })));
    Ok(())
}

#[test]
fn third_virial_matrix() -> Result<(), Box<dyn Error>> {
    let eos = multiparameter(&["argon", "krypton"])?;
    let t = 300.0;
    let c = eos.third_virial_matrix(t)?;
    let c_argon = eos.third_virial_coefficient(t, &arr1(&[1.0, 0.0]))?;
    let c_krypton = eos.third_virial_coefficient(t, &arr1(&[0.0, 1.0]))?;
    assert_relative_eq!(c[(0, 0)], c_argon, max_relative = 1e-14);
    assert_relative_eq!(c[(1, 1)], c_krypton, max_relative = 1e-14);
    assert!(c.iter().all(|c| c.is_finite()));

    let pure = multiparameter(&["argon"])?;
    let (b, c) = pure.virial_coefficients(t, &arr1(&[2.0]))?;
    assert_relative_eq!(b, pure.second_virial_coefficient(t, &arr1(&[1.0]))?, max_relative = 1e-14);
    assert_relative_eq!(c, c_argon, max_relative = 1e-12);
    Ok(())
}
