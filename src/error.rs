//! Crate error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlateError {
    #[error("{field} = {value} must be in range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Unknown icon: {0}")]
    UnknownIcon(String),

    #[error("Malformed icon table at line {line}: {content}")]
    MalformedIcons { line: usize, content: String },

    #[error("Plate {0} has no page to add widgets to")]
    NoPage(String),

    #[error("Invalid grid layout: {0}")]
    InvalidLayout(String),

    #[error("Plate already registered: {0}")]
    DuplicatePlate(String),

    #[error("Plate not found: {0}")]
    UnknownPlate(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PlateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = PlateError::OutOfRange {
            field: "val",
            value: 2,
            min: 0,
            max: 1,
        };
        assert_eq!(err.to_string(), "val = 2 must be in range [0, 1]");
    }
}
