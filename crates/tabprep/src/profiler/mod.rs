//! Dataset profiling: shape, per-column types, missing values and
//! describe-style statistics.

mod statistics;

use crate::error::Result;
use crate::types::{ColumnProfile, DatasetProfile};
use crate::utils::{categorical_column_names, get_dtype_category, is_numeric_dtype, numeric_column_names};
use polars::prelude::*;
use tracing::debug;

/// Data profiler for inspecting a table before processing it.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of a table.
    pub fn profile(df: &DataFrame) -> Result<DatasetProfile> {
        let column_profiles = df
            .get_columns()
            .iter()
            .map(|col| Self::profile_column(col.as_materialized_series(), df.height()))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Profiled {} columns over {} rows",
            column_profiles.len(),
            df.height()
        );

        Ok(DatasetProfile {
            shape: (df.height(), df.width()),
            column_profiles,
            numeric_columns: numeric_column_names(df),
            categorical_columns: categorical_column_names(df),
        })
    }

    fn profile_column(series: &Series, n_rows: usize) -> Result<ColumnProfile> {
        let null_count = series.null_count();
        let null_percentage = if n_rows > 0 {
            (null_count as f64 / n_rows as f64) * 100.0
        } else {
            0.0
        };

        let numeric_summary = if is_numeric_dtype(series.dtype()) {
            statistics::numeric_summary(series)?
        } else {
            None
        };

        Ok(ColumnProfile {
            name: series.name().to_string(),
            dtype: format!("{}", series.dtype()),
            category: get_dtype_category(series.dtype()),
            null_count,
            null_percentage,
            unique_count: series.drop_nulls().n_unique()?,
            numeric_summary,
        })
    }
}
