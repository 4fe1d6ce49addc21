//! Main preprocessing pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! running the preprocessing stages over a table.

use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, OutlierRemoval, PipelineConfig};
use crate::encoders::CategoricalEncoder;
use crate::error::Result;
use crate::evaluation::Evaluator;
use crate::imputers::MissingValueHandler;
use crate::outliers::OutlierAnalyzer;
use crate::types::{PipelineResult, PreprocessingSummary};
use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, error, info};

/// The main preprocessing pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use tabprep::{Pipeline, PipelineConfig};
/// use tabprep::config::{MissingValueTechnique, OutlierRemoval};
///
/// let config = PipelineConfig::builder()
///     .columns_to_drop(["PassengerId", "Name"])
///     .missing_value_technique(MissingValueTechnique::FillMedian)
///     .outlier_removal(OutlierRemoval::Iqr)
///     .encode_columns(["Sex"])
///     .target_column("Survived")
///     .build()?;
///
/// let result = Pipeline::builder().config(config).build()?.process(&df)?;
/// println!("accuracy: {:?}", result.summary.accuracy);
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

// A built pipeline can be shared across threads
static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every configured stage over `df`.
    ///
    /// The input is never modified. The first failing stage aborts the run
    /// and its error is returned.
    pub fn process(&self, df: &DataFrame) -> Result<PipelineResult> {
        self.process_internal(df).inspect_err(|e| {
            error!("Pipeline error: {}", e);
        })
    }

    fn process_internal(&self, df: &DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        info!("Starting preprocessing pipeline...");

        let mut summary = PreprocessingSummary::new();
        summary.rows_before = df.height();
        summary.columns_before = df.width();
        summary.missing_before = nonzero_missing(df);

        // Step 1: Drop unwanted columns
        let mut data = if self.config.columns_to_drop.is_empty() {
            df.clone()
        } else {
            info!("Step 1: Dropping {} columns...", self.config.columns_to_drop.len());
            let dropped = DataCleaner::drop_columns(df, &self.config.columns_to_drop)?;
            summary.add_step(format!(
                "Dropped columns: {}",
                self.config.columns_to_drop.join(", ")
            ));
            dropped
        };

        // Step 2: Missing values
        if let Some(technique) = self.config.missing_value_technique {
            info!("Step 2: Handling missing values ({})...", technique);
            let rows = data.height();
            data = MissingValueHandler::handle_missing_values(&data, technique)?;
            summary.add_step(format!(
                "Missing values: {} ({} rows removed)",
                technique.label(),
                rows - data.height()
            ));
        }

        // Step 3: Outlier check, measured before any removal
        if data.height() > 0 {
            info!("Step 3: Checking outliers...");
            let report = OutlierAnalyzer::check_outliers(&data)?;
            match report.highest() {
                Some(top) => summary.add_step(format!(
                    "Outlier check: '{}' has the most outliers ({:.2}%)",
                    top.column, top.percentage
                )),
                None => summary.add_step("Outlier check: no outliers found"),
            }
            summary.outlier_report = Some(report);
        } else {
            debug!("Step 3: Skipping outlier check on an empty table");
        }

        // Step 4: Outlier removal
        match self.config.outlier_removal {
            OutlierRemoval::None => {}
            OutlierRemoval::Iqr => {
                info!("Step 4: Removing IQR outliers...");
                let rows = data.height();
                data = OutlierAnalyzer::remove_outliers_iqr(&data)?;
                summary.add_step(format!(
                    "Outlier removal (IQR): {} rows removed",
                    rows - data.height()
                ));
            }
            OutlierRemoval::ZScore => {
                info!("Step 4: Applying z-score pass...");
                data = OutlierAnalyzer::remove_outliers_zscore_in(
                    &data,
                    self.config.zscore_column.as_deref(),
                )?;
                summary.add_step(format!(
                    "Z-score pass on '{}'",
                    self.config
                        .zscore_column
                        .as_deref()
                        .or_else(|| data.get_column_names_str().first().copied())
                        .unwrap_or_default()
                ));
            }
        }

        // Step 5: Encoding
        if !self.config.encode_columns.is_empty() {
            info!(
                "Step 5: Encoding {} columns ({:?})...",
                self.config.encode_columns.len(),
                self.config.encode_method
            );
            data = CategoricalEncoder::encode(
                &data,
                &self.config.encode_columns,
                self.config.encode_method,
            )?;
            summary.add_step(format!(
                "Encoded columns ({:?}): {}",
                self.config.encode_method,
                self.config.encode_columns.join(", ")
            ));
        }

        // Step 6: Split and baseline model
        let mut split = None;
        if let Some(target) = &self.config.target_column {
            info!("Step 6: Splitting on target '{}'...", target);
            let user_split = Evaluator::split(
                &data,
                target,
                self.config.split.test_fraction,
                self.config.split.seed,
            )?;
            let (train_rows, test_rows) = user_split.sizes();
            summary.split_sizes = Some((train_rows, test_rows));
            summary.add_step(format!(
                "Train/test split: {} train, {} test rows",
                train_rows, test_rows
            ));

            let evaluation = Evaluator::split(
                &data,
                target,
                self.config.evaluation_split.test_fraction,
                self.config.evaluation_split.seed,
            )?;
            let accuracy = Evaluator::build_model(&evaluation.train, &evaluation.test)?;
            summary.accuracy = Some(accuracy);
            summary.add_step(format!("Baseline model accuracy: {:.4}", accuracy));

            split = Some(user_split);
        }

        summary.rows_after = data.height();
        summary.columns_after = data.width();
        summary.missing_after = nonzero_missing(&data);
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Pipeline completed in {}ms: {} -> {} rows, {} -> {} columns",
            summary.duration_ms,
            summary.rows_before,
            summary.rows_after,
            summary.columns_before,
            summary.columns_after
        );

        Ok(PipelineResult {
            data,
            split,
            summary,
        })
    }
}

fn nonzero_missing(df: &DataFrame) -> Vec<(String, usize)> {
    DataCleaner::missing_value_counts(df)
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(Pipeline { config })
    }
}
