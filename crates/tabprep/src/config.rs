//! Configuration types for the preprocessing pipeline.
//!
//! Every user choice (which technique, which columns, which split) travels in
//! an explicit [`PipelineConfig`] value; no stage reads process-wide state.

use crate::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default fraction of rows held out for testing.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Default seed for row shuffling.
pub const DEFAULT_SEED: u64 = 42;

/// Technique for handling missing values across the whole table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissingValueTechnique {
    /// Remove every row with at least one missing value
    Drop,
    /// Fill numeric columns with their mean
    FillMean,
    /// Fill numeric columns with their median
    FillMedian,
    /// Fill every column with its most frequent value
    FillMode,
}

impl MissingValueTechnique {
    /// All techniques, in display order.
    pub const ALL: [MissingValueTechnique; 4] = [
        MissingValueTechnique::Drop,
        MissingValueTechnique::FillMean,
        MissingValueTechnique::FillMedian,
        MissingValueTechnique::FillMode,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Drop => "Drop",
            Self::FillMean => "Fill with mean",
            Self::FillMedian => "Fill with median",
            Self::FillMode => "Fill with mode",
        }
    }
}

impl fmt::Display for MissingValueTechnique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MissingValueTechnique {
    type Err = PreprocessingError;

    /// Parse a technique name, ignoring case, spaces, `_` and `-`.
    ///
    /// Accepts both the variant names (`FillMean`) and the labels
    /// (`Fill with mean`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "drop" => Ok(Self::Drop),
            "mean" | "fillmean" | "fillwithmean" => Ok(Self::FillMean),
            "median" | "fillmedian" | "fillwithmedian" => Ok(Self::FillMedian),
            "mode" | "fillmode" | "fillwithmode" => Ok(Self::FillMode),
            _ => Err(PreprocessingError::InvalidTechnique(s.to_string())),
        }
    }
}

/// Method for removing outliers from numeric data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutlierRemoval {
    /// Leave the data as-is
    #[default]
    None,
    /// Z-score pass over a single column (|z| > 3).
    ///
    /// Outlier rows keep their original value and all other rows are replaced
    /// by their numeric coercion. No rows are removed.
    ZScore,
    /// Drop rows outside the 1.5 * IQR bounds of any numeric column
    Iqr,
}

/// Method for converting categorical columns to numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EncodingMethod {
    /// Replace each category by an integer code
    #[default]
    LabelEncoding,
    /// Replace each column by one indicator column per category
    OneHotEncoding,
}

/// Parameters of a seeded train/test split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitParams {
    /// Fraction of rows assigned to the test partition (0.0 - 1.0).
    pub test_fraction: f64,
    /// Seed for the row permutation.
    pub seed: u64,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

impl SplitParams {
    /// Create split parameters.
    pub fn new(test_fraction: f64, seed: u64) -> Self {
        Self {
            test_fraction,
            seed,
        }
    }
}

/// Configuration for the preprocessing pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use tabprep::config::{EncodingMethod, MissingValueTechnique, OutlierRemoval, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .missing_value_technique(MissingValueTechnique::FillMedian)
///     .outlier_removal(OutlierRemoval::Iqr)
///     .encode_columns(["Sex", "Embarked"])
///     .encode_method(EncodingMethod::OneHotEncoding)
///     .target_column("Survived")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Columns removed before any other stage.
    /// Default: none
    pub columns_to_drop: Vec<String>,

    /// Missing value technique, or `None` to skip the stage.
    /// Default: None
    pub missing_value_technique: Option<MissingValueTechnique>,

    /// Outlier removal method.
    /// Default: None
    pub outlier_removal: OutlierRemoval,

    /// Column for the z-score pass. If None, the first column is used.
    /// Default: None
    pub zscore_column: Option<String>,

    /// Columns to encode. Empty skips the stage.
    /// Default: none
    pub encode_columns: Vec<String>,

    /// Encoding method for `encode_columns`.
    /// Default: LabelEncoding
    pub encode_method: EncodingMethod,

    /// Target column. Without it no split is made and no model is built.
    /// Default: None
    pub target_column: Option<String>,

    /// User-facing train/test split (exposed to the caller as partitions).
    /// Default: 0.2 / 42
    pub split: SplitParams,

    /// Split used internally to score the baseline model. Kept separate from
    /// `split` so neither silently overrides the other.
    /// Default: 0.2 / 42
    pub evaluation_split: SplitParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns_to_drop: Vec::new(),
            missing_value_technique: None,
            outlier_removal: OutlierRemoval::default(),
            zscore_column: None,
            encode_columns: Vec::new(),
            encode_method: EncodingMethod::default(),
            target_column: None,
            split: SplitParams::default(),
            evaluation_split: SplitParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validate_fraction("split.test_fraction", self.split.test_fraction)?;
        validate_fraction(
            "evaluation_split.test_fraction",
            self.evaluation_split.test_fraction,
        )?;

        if let Some(target) = &self.target_column
            && self.columns_to_drop.contains(target)
        {
            return Err(ConfigValidationError::TargetDropped(target.clone()));
        }

        Ok(())
    }
}

fn validate_fraction(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigValidationError::InvalidFraction {
            field: field.to_string(),
            value,
        })
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid fraction for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidFraction { field: String, value: f64 },

    #[error("Target column '{0}' is also listed in columns_to_drop")]
    TargetDropped(String),
}

impl From<ConfigValidationError> for PreprocessingError {
    fn from(err: ConfigValidationError) -> Self {
        PreprocessingError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the columns to drop before processing.
    pub fn columns_to_drop<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.columns_to_drop = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the missing value technique.
    pub fn missing_value_technique(mut self, technique: MissingValueTechnique) -> Self {
        self.config.missing_value_technique = Some(technique);
        self
    }

    /// Set the outlier removal method.
    pub fn outlier_removal(mut self, method: OutlierRemoval) -> Self {
        self.config.outlier_removal = method;
        self
    }

    /// Set the column used by the z-score pass.
    pub fn zscore_column(mut self, column: impl Into<String>) -> Self {
        self.config.zscore_column = Some(column.into());
        self
    }

    /// Set the columns to encode.
    pub fn encode_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.encode_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the encoding method.
    pub fn encode_method(mut self, method: EncodingMethod) -> Self {
        self.config.encode_method = method;
        self
    }

    /// Set the target column.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.config.target_column = Some(column.into());
        self
    }

    /// Set the user-facing test fraction.
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.config.split.test_fraction = fraction;
        self
    }

    /// Set the user-facing split seed.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.split.seed = seed;
        self
    }

    /// Set the split used to score the baseline model.
    pub fn evaluation_split(mut self, split: SplitParams) -> Self {
        self.config.evaluation_split = split;
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!(config.columns_to_drop.is_empty());
        assert_eq!(config.missing_value_technique, None);
        assert_eq!(config.outlier_removal, OutlierRemoval::None);
        assert_eq!(config.encode_method, EncodingMethod::LabelEncoding);
        assert_eq!(config.split, SplitParams::new(0.2, 42));
        assert_eq!(config.evaluation_split, SplitParams::new(0.2, 42));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .columns_to_drop(["PassengerId"])
            .missing_value_technique(MissingValueTechnique::FillMode)
            .outlier_removal(OutlierRemoval::Iqr)
            .encode_columns(["Sex"])
            .encode_method(EncodingMethod::OneHotEncoding)
            .target_column("Survived")
            .test_fraction(0.3)
            .random_seed(7)
            .build()
            .unwrap();

        assert_eq!(config.columns_to_drop, vec!["PassengerId".to_string()]);
        assert_eq!(
            config.missing_value_technique,
            Some(MissingValueTechnique::FillMode)
        );
        assert_eq!(config.outlier_removal, OutlierRemoval::Iqr);
        assert_eq!(config.encode_method, EncodingMethod::OneHotEncoding);
        assert_eq!(config.split, SplitParams::new(0.3, 7));
        // The evaluation split is independent of the user split
        assert_eq!(config.evaluation_split, SplitParams::new(0.2, 42));
    }

    #[test]
    fn test_validation_invalid_fraction() {
        let result = PipelineConfig::builder().test_fraction(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidFraction { .. }
        ));

        let result = PipelineConfig::builder()
            .evaluation_split(SplitParams::new(-0.1, 42))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_target_dropped() {
        let result = PipelineConfig::builder()
            .columns_to_drop(["label"])
            .target_column("label")
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::TargetDropped(_)
        ));
    }

    #[test]
    fn test_technique_from_str() {
        assert_eq!(
            "Drop".parse::<MissingValueTechnique>().unwrap(),
            MissingValueTechnique::Drop
        );
        assert_eq!(
            "Fill with mean".parse::<MissingValueTechnique>().unwrap(),
            MissingValueTechnique::FillMean
        );
        assert_eq!(
            "fill_median".parse::<MissingValueTechnique>().unwrap(),
            MissingValueTechnique::FillMedian
        );
        assert_eq!(
            "FillMode".parse::<MissingValueTechnique>().unwrap(),
            MissingValueTechnique::FillMode
        );
    }

    #[test]
    fn test_technique_from_str_invalid() {
        let err = "Fill with zero".parse::<MissingValueTechnique>().unwrap_err();
        assert!(matches!(err, PreprocessingError::InvalidTechnique(ref s) if s == "Fill with zero"));
    }

    #[test]
    fn test_technique_labels_round_trip() {
        for technique in MissingValueTechnique::ALL {
            assert_eq!(
                technique.label().parse::<MissingValueTechnique>().unwrap(),
                technique
            );
        }
    }

    #[test]
    fn test_pipeline_config_from_json() {
        let json = r#"{
            "columns_to_drop": ["Name"],
            "missing_value_technique": "FillMedian",
            "outlier_removal": "ZScore",
            "zscore_column": "Fare",
            "encode_columns": ["Sex"],
            "encode_method": "OneHotEncoding",
            "target_column": "Survived",
            "split": { "test_fraction": 0.25, "seed": 1 }
        }"#;

        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.columns_to_drop, vec!["Name".to_string()]);
        assert_eq!(
            config.missing_value_technique,
            Some(MissingValueTechnique::FillMedian)
        );
        assert_eq!(config.outlier_removal, OutlierRemoval::ZScore);
        assert_eq!(config.zscore_column.as_deref(), Some("Fare"));
        assert_eq!(config.encode_method, EncodingMethod::OneHotEncoding);
        assert_eq!(config.split, SplitParams::new(0.25, 1));
        // Omitted fields fall back to defaults
        assert_eq!(config.evaluation_split, SplitParams::default());
        assert!(config.validate().is_ok());
    }
}
