use std::time::Duration;

use hvac_components::{DuctProfile, ElementFactory, EquipmentCapacity, EquipmentKind};
use hvac_core::{ManualClock, NodeId, Point3, Vector3};
use hvac_engine::{CalculationConfig, CalculationEngine};
use hvac_graph::TopologyManager;
use proptest::prelude::*;

fn supply(airflow: f64) -> (TopologyManager, NodeId, NodeId) {
    let factory = ElementFactory::default();
    let mut topology = TopologyManager::new();
    let fan = topology.add_node(
        factory
            .fan(
                "supply fan",
                Point3::origin(),
                Vector3::x(),
                DuctProfile::rectangular(12.0, 12.0),
                airflow,
                1.5,
            )
            .unwrap(),
    );
    let main = topology.add_node(
        factory
            .rectangular_segment(
                "main",
                Point3::origin(),
                Point3::new(240.0, 0.0, 0.0),
                12.0,
                12.0,
            )
            .unwrap(),
    );
    topology
        .create_connection(fan, main, &"outlet".into(), &"inlet".into())
        .unwrap();
    (topology, fan, main)
}

fn manual_engine() -> (CalculationEngine<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let engine = CalculationEngine::with_clock(CalculationConfig::default(), clock.clone());
    (engine, clock)
}

#[test]
fn fan_airflow_sets_segment_velocity() {
    let (mut topology, _, main) = supply(2000.0);
    let (mut engine, _) = manual_engine();
    engine.trigger_system_calculation(&mut topology);
    let results = engine.calculate_now(&mut topology).unwrap();

    let flow = topology.node(main).unwrap().flow();
    assert!(flow.is_calculated);
    assert_eq!(flow.airflow, 2000.0);
    assert_eq!(flow.velocity, 2000.0);
    assert!(flow.pressure_drop > 0.0);
    assert_eq!(results.failed_elements, 0);
    assert!(results.system_valid);
}

#[test]
fn high_velocity_is_reported() {
    let (mut topology, _, main) = supply(3000.0);
    let (mut engine, _) = manual_engine();
    engine.trigger_system_calculation(&mut topology);
    let results = engine.calculate_now(&mut topology).unwrap();

    assert_eq!(topology.node(main).unwrap().flow().velocity, 3000.0);
    assert!(
        results
            .system_warnings
            .iter()
            .any(|w| w.contains("'main'") && w.contains("2500"))
    );
    // Warnings do not fail the node.
    assert!(results.result_for(main).unwrap().success);
}

#[test]
fn rapid_triggers_coalesce_into_one_pass() {
    let (mut topology, fan, main) = supply(1000.0);
    let (mut engine, clock) = manual_engine();

    for i in 0..5 {
        let node = if i % 2 == 0 { fan } else { main };
        assert!(engine.trigger_calculation(&mut topology, node));
        assert!(engine.poll(&mut topology).is_none());
        clock.advance(Duration::from_millis(20));
    }
    assert_eq!(engine.pass_count(), 0);

    // The window restarts on every trigger; the last came 20 ms ago.
    clock.advance(Duration::from_millis(460));
    assert!(engine.poll(&mut topology).is_none());
    clock.advance(Duration::from_millis(20));
    let results = engine.poll(&mut topology).unwrap();

    assert_eq!(engine.pass_count(), 1);
    assert_eq!(results.calculated_elements, 2);
    assert!(engine.poll(&mut topology).is_none());
    assert_eq!(engine.pass_count(), 1);
}

#[test]
fn downstream_nodes_follow_upstream_changes() {
    let factory = ElementFactory::default();
    let (mut topology, fan, main) = supply(1000.0);
    let diffuser = topology.add_node(
        factory
            .equipment(
                "diffuser",
                EquipmentKind::Diffuser,
                Point3::new(240.0, 0.0, 0.0),
                -Vector3::x(),
                DuctProfile::rectangular(12.0, 12.0),
                EquipmentCapacity::default(),
            )
            .unwrap(),
    );
    topology
        .create_connection(main, diffuser, &"outlet".into(), &"inlet".into())
        .unwrap();

    let (mut engine, _) = manual_engine();
    engine.trigger_system_calculation(&mut topology);
    engine.calculate_now(&mut topology).unwrap();
    assert_eq!(topology.node(diffuser).unwrap().flow().airflow, 1000.0);

    let faster = factory
        .fan(
            "supply fan",
            Point3::origin(),
            Vector3::x(),
            DuctProfile::rectangular(12.0, 12.0),
            1500.0,
            1.5,
        )
        .unwrap();
    topology.update_node(fan, faster).unwrap();
    for event in topology.drain_events() {
        engine.handle_event(&mut topology, &event);
    }
    let results = engine.calculate_now(&mut topology).unwrap();

    assert_eq!(results.results.len(), 3);
    assert_eq!(topology.node(diffuser).unwrap().flow().airflow, 1500.0);
    let critical = topology.critical_path().unwrap();
    assert_eq!(critical.nodes, vec![fan, main, diffuser]);
}

#[test]
fn last_results_match_returned_pass() {
    let (mut topology, _, _) = supply(800.0);
    let (mut engine, _) = manual_engine();
    assert!(engine.last_results().is_none());
    engine.trigger_system_calculation(&mut topology);
    let results = engine.calculate_now(&mut topology).unwrap();
    assert_eq!(engine.last_results(), Some(&results));
}

proptest! {
    #[test]
    fn segment_carries_source_airflow(airflow in 50.0f64..2400.0) {
        let (mut topology, _, main) = supply(airflow);
        let (mut engine, _) = manual_engine();
        engine.trigger_system_calculation(&mut topology);
        engine.calculate_now(&mut topology).unwrap();
        let flow = topology.node(main).unwrap().flow();
        prop_assert!((flow.airflow - airflow).abs() < 1e-9);
        prop_assert!((flow.velocity - airflow).abs() < 1e-9);
        prop_assert!(topology.dirty_nodes().is_empty());
    }
}
