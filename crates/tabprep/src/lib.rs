//! Tabular Data Preprocessing Library
//!
//! Prepares a table for a classifier, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Cleaning**: drop unwanted columns, count missing values
//! - **Profiling**: shape, column types and describe-style statistics
//! - **Missing values**: drop incomplete rows or fill with mean, median or mode
//! - **Outliers**: IQR percentages and row removal, and a z-score pass
//! - **Encoding**: label and one-hot encoding of categorical columns
//! - **Evaluation**: seeded train/test split and a logistic-regression baseline
//!
//! Every stage takes a `&DataFrame` and returns a new one, so a failed stage
//! never leaves a half-processed table behind.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabprep::{Pipeline, PipelineConfig};
//! use tabprep::config::{EncodingMethod, MissingValueTechnique, OutlierRemoval};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("titanic.csv".into()))?
//!     .finish()?;
//!
//! let config = PipelineConfig::builder()
//!     .columns_to_drop(["PassengerId", "Name", "Ticket", "Cabin"])
//!     .missing_value_technique(MissingValueTechnique::FillMode)
//!     .outlier_removal(OutlierRemoval::Iqr)
//!     .encode_columns(["Sex", "Embarked"])
//!     .encode_method(EncodingMethod::OneHotEncoding)
//!     .target_column("Survived")
//!     .build()?;
//!
//! let result = Pipeline::builder().config(config).build()?.process(&df)?;
//!
//! println!("Rows: {} -> {}", result.summary.rows_before, result.summary.rows_after);
//! println!("Accuracy: {:?}", result.summary.accuracy);
//! ```
//!
//! # Individual stages
//!
//! The stages can also be called directly:
//!
//! ```rust,ignore
//! use tabprep::{CategoricalEncoder, Evaluator, MissingValueHandler, OutlierAnalyzer};
//! use tabprep::config::MissingValueTechnique;
//!
//! let filled = MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::FillMedian)?;
//! let report = OutlierAnalyzer::check_outliers(&filled)?;
//! let cleaned = OutlierAnalyzer::remove_outliers_iqr(&filled)?;
//! let encoded = CategoricalEncoder::label_encode(&cleaned, &["Sex"])?;
//! let split = Evaluator::split(&encoded, "Survived", 0.2, 42)?;
//! let accuracy = Evaluator::build_model(&split.train, &split.test)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod encoders;
pub mod error;
pub mod evaluation;
pub mod imputers;
pub mod outliers;
pub mod pipeline;
pub mod profiler;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{
    ConfigValidationError, EncodingMethod, MissingValueTechnique, OutlierRemoval, PipelineConfig,
    PipelineConfigBuilder, SplitParams,
};
pub use encoders::CategoricalEncoder;
pub use error::{PreprocessingError, Result as PreprocessingResult};
pub use evaluation::{Evaluator, LogisticRegression, TrainTestSplit};
pub use imputers::MissingValueHandler;
pub use outliers::{IqrBounds, OutlierAnalyzer};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use profiler::DataProfiler;
pub use types::{
    ColumnOutliers, ColumnProfile, DatasetProfile, NumericSummary, OutlierReport, PipelineResult,
    PreprocessingSummary,
};
pub use utils::{DtypeCategory, get_dtype_category, is_numeric_dtype, parse_numeric_string};
