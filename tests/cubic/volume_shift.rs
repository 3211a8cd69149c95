use super::cubic;
use approx::assert_relative_eq;
use ndarray::arr1;
use std::error::Error;
use tvprop::cubic::CubicKind;
use tvprop_core::{DerivativeRequest, Partial, ThermoError, ThermoPoint};

#[test]
fn shifted_pressure() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["methane", "propane"], CubicKind::PengRobinson)?;
    let (t, v) = (300.0, 1.0e-3);
    let n = arr1(&[0.5, 1.5]);
    let translation = eos.residual.volume_translation(&n);
    assert_relative_eq!(translation, 0.5 * -5.2e-6 + 1.5 * 3.9e-6, max_relative = 1e-12);

    let mut context = eos.new_context();
    assert!(!context.volume_shift());
    context.set_volume_shift(true);
    let point = ThermoPoint::new(t, v, n.clone())?;
    let shifted = eos.pressure(&mut context, &point, DerivativeRequest::new())?;
    assert!(context.volume_shift());

    let translated = ThermoPoint::new(t, v + translation, n)?;
    let expected = eos.pressure(&mut eos.new_context(), &translated, DerivativeRequest::new())?;
    assert_relative_eq!(shifted.value, expected.value, max_relative = 1e-14);
    Ok(())
}

#[test]
fn shifted_pressure_has_no_derivatives() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["propane"], CubicKind::SoaveRedlichKwong)?;
    let mut context = eos.new_context();
    context.set_volume_shift(true);
    let point = ThermoPoint::new(300.0, 1.0e-3, arr1(&[1.0]))?;
    for partial in [Partial::T, Partial::V, Partial::N, Partial::VV] {
        let request = DerivativeRequest::new().with(partial);
        let res = eos.pressure(&mut context, &point, request);
        assert!(matches!(res, Err(ThermoError::Unsupported { .. })));
        assert!(context.volume_shift());
    }
    assert_eq!(context.cache_hits() + context.cache_misses(), 0);

    context.set_volume_shift(false);
    let p = eos.pressure(&mut context, &point, [Partial::V].into())?;
    assert!(p.v.is_some());
    Ok(())
}

#[test]
fn attraction_cache_is_per_context() -> Result<(), Box<dyn Error>> {
    let eos = cubic(&["propane", "butane"], CubicKind::PengRobinson)?;
    let mut first = eos.new_context();
    let mut second = eos.new_context();
    for v in [1.0e-3, 2.0e-3, 4.0e-3] {
        let point = ThermoPoint::new(310.0, v, arr1(&[0.5, 0.5]))?;
        eos.pressure(&mut first, &point, [Partial::V].into())?;
    }
    assert_eq!(first.cache_misses(), 1);
    assert_eq!(first.cache_hits(), 2);
    assert_eq!(second.cache_hits() + second.cache_misses(), 0);

    let point = ThermoPoint::new(320.0, 1.0e-3, arr1(&[0.5, 0.5]))?;
    eos.pressure(&mut second, &point, DerivativeRequest::new())?;
    assert_eq!(second.cache_misses(), 1);
    assert_eq!(first.cache_misses(), 1);
    Ok(())
}
