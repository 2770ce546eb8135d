//! Element factory: builds well-formed elements with initialized ports.
//!
//! Port naming convention:
//! - segments: `inlet` at `start`, `outlet` at `end`
//! - source equipment: `outlet`; terminal equipment: `inlet`; in-line: both
//! - fittings: `inlet`, `outlet`, and `branch` for tees and wyes
//!
//! Every port is built with its declared [`PortRole`].

use hvac_core::geometry::{midpoint, unit};
use hvac_core::{Point3, Vector3};

use crate::element::{
    DuctSegment, Equipment, EquipmentCapacity, EquipmentKind, Fitting, FittingType,
};
use crate::error::{ComponentError, ComponentResult};
use crate::point::{ConnectionPoint, PortRole};
use crate::profile::{DuctMaterial, DuctProfile};

/// Builds network elements with validated geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementFactory {
    /// Material applied to segments built without an explicit one.
    pub default_material: DuctMaterial,
}

impl ElementFactory {
    pub fn new(default_material: DuctMaterial) -> Self {
        Self { default_material }
    }

    /// Straight duct from `start` to `end` (inches).
    pub fn segment(
        &self,
        name: impl Into<String>,
        start: Point3,
        end: Point3,
        profile: DuctProfile,
    ) -> ComponentResult<DuctSegment> {
        self.segment_with_material(name, start, end, profile, self.default_material)
    }

    pub fn segment_with_material(
        &self,
        name: impl Into<String>,
        start: Point3,
        end: Point3,
        profile: DuctProfile,
        material: DuctMaterial,
    ) -> ComponentResult<DuctSegment> {
        let name = name.into();
        profile.validate()?;
        let axis = unit(&(end - start)).map_err(|_| ComponentError::Degenerate {
            name: name.clone(),
            reason: "segment start and end coincide".into(),
        })?;

        Ok(DuctSegment {
            inlet: ConnectionPoint::inlet("inlet", start, -axis, profile),
            outlet: ConnectionPoint::outlet("outlet", end, axis, profile),
            name,
            start,
            end,
            profile,
            material,
            design_airflow: None,
        })
    }

    pub fn round_segment(
        &self,
        name: impl Into<String>,
        start: Point3,
        end: Point3,
        diameter: f64,
    ) -> ComponentResult<DuctSegment> {
        self.segment(name, start, end, DuctProfile::round(diameter))
    }

    pub fn rectangular_segment(
        &self,
        name: impl Into<String>,
        start: Point3,
        end: Point3,
        width: f64,
        height: f64,
    ) -> ComponentResult<DuctSegment> {
        self.segment(name, start, end, DuctProfile::rectangular(width, height))
    }

    /// Equipment centered at `position` with its flow axis along `facing`.
    ///
    /// Sources get a single `outlet` facing `facing`; terminals a single
    /// `inlet` facing `facing`; in-line equipment gets an `inlet` and an
    /// `outlet` half a hydraulic diameter either side of `position`.
    pub fn equipment(
        &self,
        name: impl Into<String>,
        kind: EquipmentKind,
        position: Point3,
        facing: Vector3,
        profile: DuctProfile,
        capacity: EquipmentCapacity,
    ) -> ComponentResult<Equipment> {
        profile.validate()?;
        let facing = unit(&facing)?;
        if !(capacity.airflow.is_finite() && capacity.airflow >= 0.0) {
            return Err(ComponentError::InvalidArg {
                what: "equipment airflow capacity must be non-negative",
            });
        }
        if !(capacity.static_pressure.is_finite() && capacity.static_pressure >= 0.0) {
            return Err(ComponentError::InvalidArg {
                what: "equipment static pressure must be non-negative",
            });
        }

        let points = if kind.is_source_by_default() {
            vec![ConnectionPoint::outlet("outlet", position, facing, profile)]
        } else if kind.is_terminal() {
            vec![ConnectionPoint::inlet("inlet", position, facing, profile)]
        } else {
            let offset = facing * (profile.hydraulic_diameter() / 2.0);
            vec![
                ConnectionPoint::inlet("inlet", position - offset, -facing, profile),
                ConnectionPoint::outlet("outlet", position + offset, facing, profile),
            ]
        };

        Ok(Equipment {
            name: name.into(),
            kind,
            position,
            capacity,
            is_source: kind.is_source_by_default(),
            loss_coefficient: None,
            points,
        })
    }

    /// Supply fan discharging along `facing`.
    pub fn fan(
        &self,
        name: impl Into<String>,
        position: Point3,
        facing: Vector3,
        profile: DuctProfile,
        airflow: f64,
        static_pressure: f64,
    ) -> ComponentResult<Equipment> {
        self.equipment(
            name,
            EquipmentKind::Fan,
            position,
            facing,
            profile,
            EquipmentCapacity {
                airflow,
                static_pressure,
            },
        )
    }

    /// Fitting from explicit ports. `inlet` is declared an inlet and every
    /// entry of `outlets` an outlet, whatever roles they carried.
    pub fn fitting(
        &self,
        name: impl Into<String>,
        fitting_type: FittingType,
        position: Point3,
        inlet: ConnectionPoint,
        outlets: Vec<ConnectionPoint>,
    ) -> ComponentResult<Fitting> {
        let name = name.into();
        let inlet = inlet.with_role(PortRole::Inlet);
        let outlets: Vec<ConnectionPoint> = outlets
            .into_iter()
            .map(|p| p.with_role(PortRole::Outlet))
            .collect();
        for point in std::iter::once(&inlet).chain(&outlets) {
            point.profile.validate()?;
            unit(&point.direction)?;
        }
        match (fitting_type, outlets.len()) {
            (FittingType::Cap, 0) => {}
            (FittingType::Cap, _) => {
                return Err(ComponentError::Degenerate {
                    name,
                    reason: "a cap has no outlets".into(),
                });
            }
            (_, 0) => {
                return Err(ComponentError::Degenerate {
                    name,
                    reason: format!("a {fitting_type} needs at least one outlet"),
                });
            }
            _ => {}
        }

        Ok(Fitting {
            name,
            fitting_type,
            position,
            inlet,
            outlets,
            loss_coefficient: None,
        })
    }

    /// Elbow turning from `inlet_dir` to `outlet_dir` (both outward-facing).
    pub fn elbow(
        &self,
        name: impl Into<String>,
        position: Point3,
        inlet_dir: Vector3,
        outlet_dir: Vector3,
        profile: DuctProfile,
    ) -> ComponentResult<Fitting> {
        let inlet_dir = unit(&inlet_dir)?;
        let outlet_dir = unit(&outlet_dir)?;
        let r = profile.hydraulic_diameter() / 2.0;
        self.fitting(
            name,
            FittingType::Elbow,
            position,
            ConnectionPoint::new("inlet", position + inlet_dir * r, inlet_dir, profile),
            vec![ConnectionPoint::new(
                "outlet",
                position + outlet_dir * r,
                outlet_dir,
                profile,
            )],
        )
    }

    /// Straight-through fitting changing profile along `axis`.
    ///
    /// `fitting_type` should be `Transition` (shape change) or `Reducer`
    /// (size change).
    pub fn inline_change(
        &self,
        name: impl Into<String>,
        fitting_type: FittingType,
        position: Point3,
        axis: Vector3,
        inlet_profile: DuctProfile,
        outlet_profile: DuctProfile,
    ) -> ComponentResult<Fitting> {
        let axis = unit(&axis)?;
        let half = inlet_profile
            .hydraulic_diameter()
            .max(outlet_profile.hydraulic_diameter())
            / 2.0;
        self.fitting(
            name,
            fitting_type,
            position,
            ConnectionPoint::new("inlet", position - axis * half, -axis, inlet_profile),
            vec![ConnectionPoint::new(
                "outlet",
                position + axis * half,
                axis,
                outlet_profile,
            )],
        )
    }

    /// Tee with a straight run along `axis` and a branch along `branch_dir`.
    pub fn tee(
        &self,
        name: impl Into<String>,
        position: Point3,
        axis: Vector3,
        branch_dir: Vector3,
        profile: DuctProfile,
        branch_profile: DuctProfile,
    ) -> ComponentResult<Fitting> {
        let axis = unit(&axis)?;
        let branch_dir = unit(&branch_dir)?;
        let r = profile.hydraulic_diameter() / 2.0;
        self.fitting(
            name,
            FittingType::Tee,
            position,
            ConnectionPoint::new("inlet", position - axis * r, -axis, profile),
            vec![
                ConnectionPoint::new("outlet", position + axis * r, axis, profile),
                ConnectionPoint::new(
                    "branch",
                    position + branch_dir * r,
                    branch_dir,
                    branch_profile,
                ),
            ],
        )
    }

    /// Fitting that bridges two existing ports.
    ///
    /// The fitting's `inlet` sits on `from` facing back at it and its `outlet`
    /// sits on `to` facing back at it, so both sides join directly with zero
    /// gap and perfect alignment. The fitting body is placed at the midpoint.
    pub fn splice_fitting(
        &self,
        fitting_type: FittingType,
        from: &ConnectionPoint,
        to: &ConnectionPoint,
    ) -> ComponentResult<Fitting> {
        let from_dir = unit(&from.direction)?;
        let to_dir = unit(&to.direction)?;
        self.fitting(
            format!("{fitting_type} (auto)"),
            fitting_type,
            midpoint(&from.position, &to.position),
            ConnectionPoint::new("inlet", from.position, -from_dir, from.profile),
            vec![ConnectionPoint::new(
                "outlet",
                to.position,
                -to_dir,
                to.profile,
            )],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Shape;
    use hvac_core::geometry::{alignment_score, distance};

    #[test]
    fn segment_ports_face_outward() {
        let seg = ElementFactory::default()
            .round_segment("s", Point3::origin(), Point3::new(10.0, 0.0, 0.0), 12.0)
            .unwrap();
        assert_eq!(seg.inlet.direction, Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(seg.outlet.direction, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(seg.outlet.position, Point3::new(10.0, 0.0, 0.0));
        assert_eq!(seg.material, DuctMaterial::GalvanizedSteel);
    }

    #[test]
    fn zero_length_segment_is_rejected() {
        let err = ElementFactory::default()
            .round_segment("s", Point3::origin(), Point3::origin(), 12.0)
            .unwrap_err();
        assert!(matches!(err, ComponentError::Degenerate { .. }));
    }

    #[test]
    fn fan_is_source_with_single_outlet() {
        let fan = ElementFactory::default()
            .fan(
                "AHU-1 fan",
                Point3::origin(),
                Vector3::x(),
                DuctProfile::rectangular(12.0, 12.0),
                2000.0,
                1.5,
            )
            .unwrap();
        assert!(fan.is_source);
        assert_eq!(fan.points.len(), 1);
        assert_eq!(fan.points[0].id.as_str(), "outlet");
    }

    #[test]
    fn inline_equipment_has_two_ports() {
        let vav = ElementFactory::default()
            .equipment(
                "VAV-1",
                EquipmentKind::VavBox,
                Point3::origin(),
                Vector3::x(),
                DuctProfile::round(10.0),
                EquipmentCapacity {
                    airflow: 600.0,
                    static_pressure: 0.0,
                },
            )
            .unwrap();
        assert!(!vav.is_source);
        assert_eq!(vav.points.len(), 2);
        assert!((distance(&vav.points[0].position, &vav.points[1].position) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let err = ElementFactory::default().fan(
            "f",
            Point3::origin(),
            Vector3::x(),
            DuctProfile::round(10.0),
            -5.0,
            0.0,
        );
        assert!(err.is_err());
    }

    #[test]
    fn splice_fitting_meets_both_ports_head_on() {
        let f = ElementFactory::default();
        let a = f
            .round_segment("a", Point3::origin(), Point3::new(10.0, 0.0, 0.0), 12.0)
            .unwrap();
        let b = f
            .rectangular_segment(
                "b",
                Point3::new(14.0, 0.0, 0.0),
                Point3::new(30.0, 0.0, 0.0),
                12.0,
                8.0,
            )
            .unwrap();
        let fit = f
            .splice_fitting(FittingType::Transition, &a.outlet, &b.inlet)
            .unwrap();

        assert_eq!(fit.position, Point3::new(12.0, 0.0, 0.0));
        assert_eq!(fit.inlet.shape(), Shape::Round);
        assert_eq!(fit.outlets[0].shape(), Shape::Rectangular);
        assert_eq!(distance(&fit.inlet.position, &a.outlet.position), 0.0);
        assert_eq!(alignment_score(&a.outlet.direction, &fit.inlet.direction), 1.0);
        assert_eq!(alignment_score(&fit.outlets[0].direction, &b.inlet.direction), 1.0);
    }

    #[test]
    fn cap_with_outlets_is_rejected() {
        let f = ElementFactory::default();
        let p = DuctProfile::round(8.0);
        let inlet = ConnectionPoint::new("inlet", Point3::origin(), -Vector3::x(), p);
        let outlet = ConnectionPoint::new("outlet", Point3::origin(), Vector3::x(), p);
        assert!(
            f.fitting("cap", FittingType::Cap, Point3::origin(), inlet.clone(), vec![outlet])
                .is_err()
        );
        assert!(
            f.fitting("cap", FittingType::Cap, Point3::origin(), inlet, vec![])
                .is_ok()
        );
    }

    #[test]
    fn tee_declares_branch() {
        let tee = ElementFactory::default()
            .tee(
                "T-1",
                Point3::origin(),
                Vector3::x(),
                Vector3::y(),
                DuctProfile::round(12.0),
                DuctProfile::round(8.0),
            )
            .unwrap();
        assert_eq!(tee.outlets.len(), 2);
        assert_eq!(tee.outlets[1].id.as_str(), "branch");
        assert_eq!(tee.inlet.role(), PortRole::Inlet);
        assert!(tee.outlets.iter().all(|p| p.role() == PortRole::Outlet));
    }

    #[test]
    fn custom_fitting_ports_get_roles_from_their_slot() {
        let p = DuctProfile::round(8.0);
        let fit = ElementFactory::default()
            .fitting(
                "wye",
                FittingType::Wye,
                Point3::origin(),
                ConnectionPoint::new("collar", Point3::origin(), -Vector3::x(), p),
                vec![ConnectionPoint::new("left", Point3::origin(), Vector3::y(), p)],
            )
            .unwrap();
        assert_eq!(fit.inlet.role(), PortRole::Inlet);
        assert_eq!(fit.outlets[0].role(), PortRole::Outlet);
    }

    #[test]
    fn equipment_ports_declare_roles() {
        let f = ElementFactory::default();
        let p = DuctProfile::round(10.0);
        let fan = f
            .fan("f", Point3::origin(), Vector3::x(), p, 800.0, 1.0)
            .unwrap();
        assert_eq!(fan.points[0].role(), PortRole::Outlet);
        let seg = f
            .round_segment("s", Point3::origin(), Point3::new(5.0, 0.0, 0.0), 10.0)
            .unwrap();
        assert_eq!(seg.inlet.role(), PortRole::Inlet);
        assert_eq!(seg.outlet.role(), PortRole::Outlet);
    }
}
