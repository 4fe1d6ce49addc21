use crate::evaluation::TrainTestSplit;
use crate::utils::DtypeCategory;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

// ============================================================================
// Outlier Report
// ============================================================================

/// Outlier percentage of a single numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutliers {
    pub column: String,
    /// Share of rows outside the IQR bounds, 0 - 100.
    pub percentage: f64,
}

/// IQR outlier percentages per numeric column, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub columns: Vec<ColumnOutliers>,
}

impl OutlierReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column entry.
    pub fn push(&mut self, column: impl Into<String>, percentage: f64) {
        self.columns.push(ColumnOutliers {
            column: column.into(),
            percentage,
        });
    }

    /// Percentage for a column, if it was analyzed.
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.percentage)
    }

    /// Column with the highest non-zero outlier percentage.
    ///
    /// The first column wins ties. Returns `None` when no column has outliers.
    pub fn highest(&self) -> Option<&ColumnOutliers> {
        self.columns.iter().fold(None, |best: Option<&ColumnOutliers>, c| {
            match best {
                Some(b) if b.percentage >= c.percentage => Some(b),
                _ if c.percentage > 0.0 => Some(c),
                _ => best,
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnOutliers> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ============================================================================
// Dataset Profile
// ============================================================================

/// Describe-style statistics of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1); 0 for a single value.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub category: DtypeCategory,
    pub null_count: usize,
    pub null_percentage: f64,
    pub unique_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_summary: Option<NumericSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub shape: (usize, usize),
    pub column_profiles: Vec<ColumnProfile>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
}

impl DatasetProfile {
    /// Total number of missing values across all columns.
    pub fn total_missing(&self) -> usize {
        self.column_profiles.iter().map(|c| c.null_count).sum()
    }

    /// Profile of a single column.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_profiles.iter().find(|c| c.name == name)
    }
}

// ============================================================================
// Pipeline Result
// ============================================================================

/// Summary of what a pipeline run did.
///
/// Serializable so a front end (or `--json` on the CLI) can render it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessingSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,

    /// Missing values per column before processing (columns with none omitted).
    pub missing_before: Vec<(String, usize)>,
    /// Missing values per column after processing (columns with none omitted).
    pub missing_after: Vec<(String, usize)>,

    /// IQR outlier percentages, measured before outlier removal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlier_report: Option<OutlierReport>,

    /// Row counts of the user-facing split (train, test).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_sizes: Option<(usize, usize)>,

    /// Accuracy of the baseline model on the evaluation split.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,

    /// Human-readable steps, in execution order.
    pub processing_steps: Vec<String>,
}

impl PreprocessingSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a processing step.
    pub fn add_step(&mut self, step: impl Into<String>) {
        self.processing_steps.push(step.into());
    }

    /// Number of rows removed by the run.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Output of [`crate::Pipeline::process`].
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The processed table.
    pub data: DataFrame,
    /// User-facing train/test partitions, when a target column was set.
    pub split: Option<TrainTestSplit>,
    pub summary: PreprocessingSummary,
}
