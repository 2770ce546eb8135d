//! Loss coefficient tables.
//!
//! Fitting K-factors multiply velocity pressure; equipment coefficients
//! multiply `(airflow / 1000)^2`. Both are policy values and can be replaced
//! through configuration.

use serde::{Deserialize, Serialize};

use crate::element::{EquipmentKind, FittingType};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FittingCoefficients {
    pub elbow: f64,
    pub tee: f64,
    pub wye: f64,
    pub reducer: f64,
    pub transition: f64,
    pub cap: f64,
}

impl Default for FittingCoefficients {
    fn default() -> Self {
        Self {
            elbow: 0.3,
            tee: 0.5,
            wye: 0.3,
            reducer: 0.1,
            transition: 0.15,
            cap: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentCoefficients {
    pub fan: f64,
    pub air_handler: f64,
    pub vav_box: f64,
    pub damper: f64,
    pub filter: f64,
    pub coil: f64,
    pub diffuser: f64,
    pub grille: f64,
}

impl Default for EquipmentCoefficients {
    fn default() -> Self {
        Self {
            fan: 0.0,
            air_handler: 0.5,
            vav_box: 0.25,
            damper: 0.05,
            filter: 0.35,
            coil: 0.4,
            diffuser: 0.08,
            grille: 0.06,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LossCoefficients {
    pub fittings: FittingCoefficients,
    pub equipment: EquipmentCoefficients,
}

impl LossCoefficients {
    pub fn fitting(&self, fitting_type: FittingType) -> f64 {
        let t = &self.fittings;
        match fitting_type {
            FittingType::Elbow => t.elbow,
            FittingType::Tee => t.tee,
            FittingType::Wye => t.wye,
            FittingType::Reducer => t.reducer,
            FittingType::Transition => t.transition,
            FittingType::Cap => t.cap,
        }
    }

    pub fn equipment(&self, kind: EquipmentKind) -> f64 {
        let t = &self.equipment;
        match kind {
            EquipmentKind::Fan => t.fan,
            EquipmentKind::AirHandler => t.air_handler,
            EquipmentKind::VavBox => t.vav_box,
            EquipmentKind::Damper => t.damper,
            EquipmentKind::Filter => t.filter,
            EquipmentKind::Coil => t.coil,
            EquipmentKind::Diffuser => t.diffuser,
            EquipmentKind::Grille => t.grille,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup() {
        let c = LossCoefficients::default();
        assert_eq!(c.fitting(FittingType::Elbow), 0.3);
        assert_eq!(c.fitting(FittingType::Transition), 0.15);
        assert_eq!(c.equipment(EquipmentKind::VavBox), 0.25);
    }
}
