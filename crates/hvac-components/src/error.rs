//! Error types for element construction and flow calculations.

use hvac_core::error::HvacError;
use thiserror::Error;

/// Errors that can occur while building elements or calculating flow.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Degenerate element '{name}': {reason}")]
    Degenerate { name: String, reason: String },

    #[error("Geometry error: {0}")]
    Geometry(#[from] HvacError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for HvacError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { what } => HvacError::InvalidArg { what },
            ComponentError::InvalidArg { what } => HvacError::InvalidArg { what },
            ComponentError::Degenerate { .. } => HvacError::InvalidArg {
                what: "degenerate element",
            },
            ComponentError::Geometry(inner) => inner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::NonPhysical { what: "area" };
        assert!(err.to_string().contains("area"));
    }

    #[test]
    fn error_conversion() {
        let comp_err = ComponentError::InvalidArg { what: "test" };
        let err: HvacError = comp_err.into();
        assert!(matches!(err, HvacError::InvalidArg { .. }));
    }
}
