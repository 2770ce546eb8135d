//! Connection validation scenarios against a live topology.

use hvac_components::{DuctProfile, ElementFactory, FittingType, NetworkElement, PointId};
use hvac_connect::{ConnectionConfig, ConnectionPointManager};
use hvac_core::{NodeId, Point3};
use hvac_graph::TopologyManager;

fn add(topo: &mut TopologyManager, x0: f64, x1: f64, profile: DuctProfile) -> NodeId {
    let seg = ElementFactory::default()
        .segment(
            "duct",
            Point3::new(x0, 0.0, 0.0),
            Point3::new(x1, 0.0, 0.0),
            profile,
        )
        .unwrap();
    topo.add_node(NetworkElement::from(seg))
}

fn outlet() -> PointId {
    "outlet".into()
}

fn inlet() -> PointId {
    "inlet".into()
}

#[test]
fn opposing_round_segments_join_directly() {
    let mut topo = TopologyManager::new();
    let a = add(&mut topo, 0.0, 120.0, DuctProfile::round(12.0));
    let b = add(&mut topo, 120.2, 240.0, DuctProfile::round(12.0));
    let cpm = ConnectionPointManager::default();

    let r = cpm.validate_connection(&topo, a, b, &outlet(), &inlet());
    assert!(r.is_valid);
    assert!(r.can_connect);
    assert!(!r.requires_fitting);
    assert_eq!(r.alignment_score, 1.0);
    assert!((r.distance - 0.2).abs() < 1e-9);
}

#[test]
fn round_to_rectangular_requires_transition() {
    let mut topo = TopologyManager::new();
    let a = add(&mut topo, 0.0, 120.0, DuctProfile::round(12.0));
    let b = add(&mut topo, 120.1, 240.0, DuctProfile::rectangular(12.0, 8.0));
    let cpm = ConnectionPointManager::default();

    let r = cpm.validate_connection(&topo, a, b, &outlet(), &inlet());
    assert!(r.requires_fitting);
    assert_eq!(
        r.suggested_fitting.map(|s| s.fitting_type),
        Some(FittingType::Transition)
    );
}

#[test]
fn distant_points_cannot_connect() {
    let mut topo = TopologyManager::new();
    let a = add(&mut topo, 0.0, 120.0, DuctProfile::round(12.0));
    let b = add(&mut topo, 140.0, 240.0, DuctProfile::round(12.0));
    let cpm = ConnectionPointManager::default();

    let r = cpm.validate_connection(&topo, a, b, &outlet(), &inlet());
    assert!(!r.can_connect);
    assert!(r.errors.iter().any(|e| e.contains("maximum connection distance")));
}

#[test]
fn validation_does_not_mutate() {
    let mut topo = TopologyManager::new();
    let a = add(&mut topo, 0.0, 120.0, DuctProfile::round(12.0));
    let b = add(&mut topo, 120.0, 240.0, DuctProfile::round(12.0));
    topo.drain_events();
    let cpm = ConnectionPointManager::new(ConnectionConfig::strict());

    let _ = cpm.validate_connection(&topo, a, b, &outlet(), &inlet());
    assert_eq!(topo.connection_count(), 0);
    assert!(topo.pending_events().is_empty());
}

#[test]
fn already_connected_and_missing_points_are_errors() {
    let mut topo = TopologyManager::new();
    let a = add(&mut topo, 0.0, 120.0, DuctProfile::round(12.0));
    let b = add(&mut topo, 120.0, 240.0, DuctProfile::round(12.0));
    let c = add(&mut topo, 120.0, 240.0, DuctProfile::round(12.0));
    let mut cpm = ConnectionPointManager::default();
    assert!(cpm.attempt_connection(&mut topo, a, b, &outlet(), &inlet()).can_connect);

    let r = cpm.validate_connection(&topo, a, c, &outlet(), &inlet());
    assert!(r.errors[0].contains("already connected"));

    let r = cpm.validate_connection(&topo, a, c, &"side".into(), &inlet());
    assert!(r.errors[0].contains("no connection point"));

    let r = cpm.validate_connection(&topo, a, NodeId::from_index(50), &outlet(), &inlet());
    assert!(r.errors[0].contains("not found"));
}
