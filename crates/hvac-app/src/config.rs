//! Top-level configuration, loadable from YAML or JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use hvac_connect::ConnectionConfig;
use hvac_engine::CalculationConfig;
use hvac_graph::TopologyConfig;

use crate::error::{AppError, AppResult};

/// Every tunable of a network, with defaults for anything left out.
///
/// Lengths and positions are inches, airflow CFM, velocity FPM and pressure
/// in. w.g.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HvacConfig {
    pub connection: ConnectionConfig,
    pub calculation: CalculationConfig,
    pub topology: TopologyConfig,
}

impl HvacConfig {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        let config: HvacConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> AppResult<Self> {
        let config: HvacConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_yaml(path: &Path) -> AppResult<Self> {
        Self::from_yaml_str(&read(path)?)
    }

    pub fn load_json(path: &Path) -> AppResult<Self> {
        Self::from_json_str(&read(path)?)
    }

    /// Pick the format from the file extension; anything but `.json` is YAML.
    pub fn load(path: &Path) -> AppResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_yaml(path),
        }
    }

    pub fn to_yaml_string(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save_yaml(&self, path: &Path) -> AppResult<()> {
        self.validate()?;
        let content = self.to_yaml_string()?;
        std::fs::write(path, content).map_err(|source| AppError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_json(&self, path: &Path) -> AppResult<()> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| AppError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject thresholds that contradict each other.
    pub fn validate(&self) -> AppResult<()> {
        let c = &self.connection;
        positive("connection.max_distance", c.max_distance)?;
        non_negative("connection.direct_distance", c.direct_distance)?;
        non_negative("connection.extension_distance", c.extension_distance)?;
        if c.direct_distance > c.max_distance || c.extension_distance > c.max_distance {
            return Err(invalid(
                "connection distances must not exceed connection.max_distance",
            ));
        }
        for (name, value) in [
            ("connection.direct_alignment", c.direct_alignment),
            ("connection.extension_alignment", c.extension_alignment),
            ("connection.elbow_alignment", c.elbow_alignment),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        if c.round_transition_limit < c.round_diameter_tolerance
            || c.rect_transition_limit < c.rect_area_tolerance
        {
            return Err(invalid(
                "transition limits must be at least the matching size tolerance",
            ));
        }

        let t = &self.topology;
        non_negative("topology.direct_tolerance", t.direct_tolerance)?;
        if t.max_fitting_distance < t.direct_tolerance {
            return Err(invalid(
                "topology.max_fitting_distance must be at least topology.direct_tolerance",
            ));
        }

        let calc = &self.calculation;
        let limits = &calc.limits;
        positive("calculation.fallback_velocity", calc.fallback_velocity)?;
        positive("calculation.limits.max_velocity", limits.max_velocity)?;
        non_negative("calculation.limits.min_velocity", limits.min_velocity)?;
        if limits.min_velocity >= limits.max_velocity {
            return Err(invalid(
                "calculation.limits.min_velocity must be below max_velocity",
            ));
        }
        positive("calculation.limits.max_pressure_drop", limits.max_pressure_drop)?;
        positive("calculation.limits.max_system_pressure", limits.max_system_pressure)?;
        positive("calculation.air.density", calc.air.density)?;
        positive(
            "calculation.air.kinematic_viscosity",
            calc.air.kinematic_viscosity,
        )?;
        Ok(())
    }
}

fn read(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::InvalidConfig(message.into())
}

fn positive(name: &str, value: f64) -> AppResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive, got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> AppResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be non-negative, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        HvacConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "calculation:\n  debounce_ms: 250\n  limits:\n    max_velocity: 2000\n";
        let config = HvacConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.calculation.debounce_ms, 250);
        assert_eq!(config.calculation.limits.max_velocity, 2000.0);
        assert_eq!(config.calculation.limits.min_velocity, 300.0);
        assert_eq!(config.connection, ConnectionConfig::default());
    }

    #[test]
    fn json_is_accepted() {
        let json = r#"{"connection": {"auto_fitting": false}}"#;
        let config = HvacConfig::from_json_str(json).unwrap();
        assert!(!config.connection.auto_fitting);
        assert_eq!(config.connection.max_distance, 12.0);
    }

    #[test]
    fn contradictory_limits_are_rejected() {
        let yaml = "calculation:\n  limits:\n    min_velocity: 3000\n";
        let err = HvacConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[test]
    fn alignment_out_of_range_is_rejected() {
        let yaml = "connection:\n  direct_alignment: 1.5\n";
        let err = HvacConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("direct_alignment"));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = HvacConfig::from_yaml_str("connection: [1, 2").unwrap_err();
        assert!(matches!(err, AppError::Yaml(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = HvacConfig::load_yaml(Path::new("/nonexistent/hvac.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hvac.yaml"));
    }
}
