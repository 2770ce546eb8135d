//! A small supply network used by the CLI and by tests.

use hvac_components::{DuctProfile, EquipmentCapacity, EquipmentKind};
use hvac_core::{Clock, NodeId, Point3, Vector3};

use crate::error::AppResult;
use crate::network::HvacNetwork;

/// Node ids of the demo network, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoNodes {
    pub fan: NodeId,
    pub main: NodeId,
    pub tee: NodeId,
    pub run: NodeId,
    pub branch: NodeId,
    pub run_diffuser: NodeId,
    pub branch_diffuser: NodeId,
}

/// Build a fan feeding a 12" trunk that splits at a tee into a straight run
/// and a 10" branch, each ending at a diffuser.
///
/// The branch diffuser has a square neck, so connecting it inserts a
/// transition fitting.
pub fn populate<C: Clock>(network: &mut HvacNetwork<C>, airflow: f64) -> AppResult<DemoNodes> {
    let f = network.factory();
    let trunk = DuctProfile::round(12.0);
    let branch_profile = DuctProfile::round(10.0);

    let fan = network.add_element(f.fan(
        "supply fan",
        Point3::origin(),
        Vector3::x(),
        trunk,
        airflow,
        1.5,
    )?);
    let main = network.add_element(f.round_segment(
        "main trunk",
        Point3::origin(),
        Point3::new(240.0, 0.0, 0.0),
        12.0,
    )?);
    let tee = network.add_element(f.tee(
        "tee 1",
        Point3::new(246.0, 0.0, 0.0),
        Vector3::x(),
        Vector3::y(),
        trunk,
        branch_profile,
    )?);
    let run = network.add_element(f.round_segment(
        "run",
        Point3::new(252.0, 0.0, 0.0),
        Point3::new(492.0, 0.0, 0.0),
        12.0,
    )?);
    let branch = network.add_element(f.round_segment(
        "branch",
        Point3::new(246.0, 6.0, 0.0),
        Point3::new(246.0, 126.0, 0.0),
        10.0,
    )?);
    let run_diffuser = network.add_element(f.equipment(
        "diffuser 1",
        EquipmentKind::Diffuser,
        Point3::new(492.0, 0.0, 0.0),
        -Vector3::x(),
        trunk,
        EquipmentCapacity::default(),
    )?);
    let branch_diffuser = network.add_element(f.equipment(
        "diffuser 2",
        EquipmentKind::Diffuser,
        Point3::new(246.0, 126.0, 0.0),
        -Vector3::y(),
        DuctProfile::rectangular(10.0, 10.0),
        EquipmentCapacity::default(),
    )?);

    let outlet = "outlet".into();
    let inlet = "inlet".into();
    network.try_connect(fan, main, &outlet, &inlet)?;
    network.try_connect(main, tee, &outlet, &inlet)?;
    network.try_connect(tee, run, &outlet, &inlet)?;
    network.try_connect(tee, branch, &"branch".into(), &inlet)?;
    network.try_connect(run, run_diffuser, &outlet, &inlet)?;
    network.try_connect(branch, branch_diffuser, &outlet, &inlet)?;

    Ok(DemoNodes {
        fan,
        main,
        tee,
        run,
        branch,
        run_diffuser,
        branch_diffuser,
    })
}
