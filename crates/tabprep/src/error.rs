//! Error types for the preprocessing stages.
//!
//! Every stage returns [`Result`], so a caller can match on the exact failure
//! (an unknown column, an out-of-range fraction, an unencoded feature) and
//! report it without the table having been touched.
//!
//! Errors are serializable as `{ code, message }` so a front end can branch on
//! the code and display the message.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the preprocessing stages.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// A missing-value technique name was not recognized.
    #[error("Invalid missing value technique '{0}' (expected Drop, FillMean, FillMedian or FillMode)")]
    InvalidTechnique(String),

    /// A column with zero rows was given to a statistic that needs values.
    #[error("Column '{0}' is empty")]
    EmptyColumn(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A new column would overwrite an existing one.
    #[error("Column '{0}' already exists in dataset")]
    DuplicateColumn(String),

    /// Test fraction outside of [0, 1].
    #[error("Invalid test fraction {0} (must be between 0.0 and 1.0)")]
    InvalidFraction(f64),

    /// A feature column is not numeric and must be encoded first.
    #[error("Feature column '{0}' is not numeric; encode it before building a model")]
    NonNumericFeature(String),

    /// Model inputs contain missing values.
    #[error("Column '{0}' contains missing values; handle them before building a model")]
    MissingValues(String),

    /// The training target does not have at least two classes.
    #[error("Training target has {0} distinct class(es); at least 2 are required")]
    InsufficientClasses(usize),

    /// A train/test partition has no rows.
    #[error("The {0} partition is empty")]
    EmptyPartition(&'static str),

    /// A model was used for prediction before being fitted.
    #[error("Model has not been fitted")]
    ModelNotFitted,

    /// Model input dimensions do not agree.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl PreprocessingError {
    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTechnique(_) => "INVALID_TECHNIQUE",
            Self::EmptyColumn(_) => "EMPTY_COLUMN",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::InvalidFraction(_) => "INVALID_FRACTION",
            Self::NonNumericFeature(_) => "NON_NUMERIC_FEATURE",
            Self::MissingValues(_) => "MISSING_VALUES",
            Self::InsufficientClasses(_) => "INSUFFICIENT_CLASSES",
            Self::EmptyPartition(_) => "EMPTY_PARTITION",
            Self::ModelNotFitted => "MODEL_NOT_FITTED",
            Self::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
        }
    }
}

/// Serialize errors as a struct with `code` and `message` fields.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PreprocessingError::InvalidTechnique("Fill with zero".to_string()).error_code(),
            "INVALID_TECHNIQUE"
        );
        assert_eq!(
            PreprocessingError::ColumnNotFound("test".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            PreprocessingError::InsufficientClasses(1).error_code(),
            "INSUFFICIENT_CLASSES"
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = PreprocessingError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_polars_error_converts() {
        fn lookup(df: &polars::prelude::DataFrame) -> Result<usize> {
            Ok(df.column("missing")?.len())
        }
        let error = lookup(&polars::prelude::DataFrame::empty()).unwrap_err();
        assert_eq!(error.error_code(), "POLARS_ERROR");
    }
}
