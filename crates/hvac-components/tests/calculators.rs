use hvac_components::{
    CalculationContext, ComponentError, DuctMaterial, DuctProfile, ElementFactory, FittingType,
    FlowCalculator, FlowLimits, NetworkElement,
};
use hvac_core::{Point3, Vector3};
use proptest::prelude::*;

fn straight(factory: &ElementFactory, length: f64, diameter: f64) -> NetworkElement {
    factory
        .round_segment(
            "run",
            Point3::origin(),
            Point3::new(length, 0.0, 0.0),
            diameter,
        )
        .unwrap()
        .into()
}

#[test]
fn segment_without_upstream_uses_fallback_velocity() {
    let duct = straight(&ElementFactory::default(), 120.0, 12.0);
    let flow = duct.calculate(&CalculationContext::standard()).unwrap();
    let area = DuctProfile::round(12.0).area_sq_ft();
    assert!((flow.airflow - area * 1000.0).abs() < 1e-9);
    assert!((flow.velocity - 1000.0).abs() < 1e-9);
    assert!(!flow.is_calculated);
}

#[test]
fn rougher_walls_lose_more_pressure() {
    let ctx = CalculationContext::standard().with_upstream(Some(800.0));
    let smooth = straight(&ElementFactory::new(DuctMaterial::Pvc), 240.0, 10.0);
    let rough = straight(&ElementFactory::new(DuctMaterial::Flexible), 240.0, 10.0);
    let smooth = smooth.calculate(&ctx).unwrap();
    let rough = rough.calculate(&ctx).unwrap();
    assert!(rough.pressure_drop > smooth.pressure_drop);
    assert_eq!(rough.velocity, smooth.velocity);
}

#[test]
fn elbow_uses_catalog_coefficient() {
    let elbow = ElementFactory::default()
        .elbow(
            "90",
            Point3::origin(),
            -Vector3::x(),
            Vector3::y(),
            DuctProfile::rectangular(12.0, 12.0),
        )
        .unwrap();
    let ctx = CalculationContext::standard().with_upstream(Some(4005.0));
    let flow = elbow.calculate(&ctx).unwrap();
    assert!((flow.velocity - 4005.0).abs() < 1e-9);
    assert!((flow.pressure_drop - 0.3).abs() < 1e-9);
}

#[test]
fn reducer_loss_uses_inlet_velocity() {
    let reducer = ElementFactory::default()
        .inline_change(
            "reducer",
            FittingType::Reducer,
            Point3::new(100.0, 0.0, 0.0),
            Vector3::x(),
            DuctProfile::rectangular(12.0, 12.0),
            DuctProfile::rectangular(8.0, 8.0),
        )
        .unwrap();
    assert_eq!(reducer.inlet.position, Point3::new(94.0, 0.0, 0.0));
    assert_eq!(reducer.outlets[0].position, Point3::new(106.0, 0.0, 0.0));

    let ctx = CalculationContext::standard().with_upstream(Some(4005.0));
    let flow = reducer.calculate(&ctx).unwrap();
    assert!((flow.velocity - 4005.0).abs() < 1e-9);
    assert!((flow.pressure_drop - 0.1).abs() < 1e-9);
}

#[test]
fn degenerate_elements_are_rejected() {
    let factory = ElementFactory::default();
    assert!(matches!(
        factory.round_segment("zero", Point3::origin(), Point3::origin(), 12.0),
        Err(ComponentError::Degenerate { .. })
    ));
    assert!(
        factory
            .round_segment(
                "flat",
                Point3::origin(),
                Point3::new(10.0, 0.0, 0.0),
                0.0
            )
            .is_err()
    );
    assert!(
        factory
            .elbow(
                "nowhere",
                Point3::origin(),
                Vector3::zeros(),
                Vector3::y(),
                DuctProfile::round(8.0),
            )
            .is_err()
    );
}

#[test]
fn limits_flag_fast_small_duct() {
    let duct = straight(&ElementFactory::default(), 600.0, 6.0);
    let ctx = CalculationContext::standard().with_upstream(Some(600.0));
    let flow = duct.calculate(&ctx).unwrap();
    let check = FlowLimits::default().check(&flow);
    assert!(check.is_ok());
    assert!(check.warnings.iter().any(|w| w.starts_with("High velocity")));
    assert!(check.warnings.iter().any(|w| w.starts_with("High pressure drop")));
}

proptest! {
    #[test]
    fn velocity_is_airflow_over_area(airflow in 1.0f64..5000.0, diameter in 4.0f64..36.0) {
        let duct = straight(&ElementFactory::default(), 120.0, diameter);
        let ctx = CalculationContext::standard().with_upstream(Some(airflow));
        let flow = duct.calculate(&ctx).unwrap();
        let area = DuctProfile::round(diameter).area_sq_ft();
        prop_assert!((flow.velocity - airflow / area).abs() <= 1e-9 * flow.velocity.max(1.0));
        prop_assert!(flow.pressure_drop >= 0.0);
    }

    #[test]
    fn pressure_drop_scales_with_length(airflow in 50.0f64..3000.0, length in 12.0f64..1200.0) {
        let factory = ElementFactory::default();
        let ctx = CalculationContext::standard().with_upstream(Some(airflow));
        let short = straight(&factory, length, 12.0).calculate(&ctx).unwrap();
        let long = straight(&factory, 2.0 * length, 12.0).calculate(&ctx).unwrap();
        prop_assert!((long.pressure_drop - 2.0 * short.pressure_drop).abs() <= 1e-9 * long.pressure_drop.max(1e-12));
        prop_assert_eq!(long.friction_rate, short.friction_rate);
    }
}
