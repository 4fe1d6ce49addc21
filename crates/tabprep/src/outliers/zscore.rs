//! Z-score pass over a single column.
//!
//! Despite its name, [`OutlierAnalyzer::remove_outliers_zscore`] removes
//! nothing: rows with `|z| <= 3` are replaced by their numeric coercion and
//! outlier rows keep their original value. The row count never changes. This
//! literal behavior is kept on purpose; callers that want outlier rows gone
//! should use [`OutlierAnalyzer::remove_outliers_iqr`].

use super::OutlierAnalyzer;
use crate::error::{PreprocessingError, Result};
use crate::utils::{coerce_numeric, is_numeric_dtype, mean, population_std, string_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Absolute z-score above which a value is an outlier.
pub const ZSCORE_THRESHOLD: f64 = 3.0;

impl OutlierAnalyzer {
    /// Flag rows whose z-score exceeds [`ZSCORE_THRESHOLD`] in absolute value.
    ///
    /// The column is coerced to numbers first; missing and unparseable
    /// entries are excluded from the mean and the population standard
    /// deviation and are never flagged. A column with zero spread has no
    /// outliers.
    pub fn zscore_outlier_mask(series: &Series) -> Result<Vec<bool>> {
        if series.is_empty() {
            return Err(PreprocessingError::EmptyColumn(series.name().to_string()));
        }

        let values = coerce_numeric(series)?;
        Ok(zscore_mask(&values))
    }

    /// Coerce a column to numbers, keeping the original value of z-score
    /// outliers.
    ///
    /// Numeric input comes back as `Float64`. Text input comes back as text:
    /// non-outlier rows hold the coerced number (null when unparseable) and
    /// outlier rows keep their original text.
    pub fn remove_outliers_zscore(series: &Series) -> Result<Series> {
        if series.is_empty() {
            return Err(PreprocessingError::EmptyColumn(series.name().to_string()));
        }

        let values = coerce_numeric(series)?;
        let mask = zscore_mask(&values);
        let outliers = mask.iter().filter(|m| **m).count();
        debug!(
            "Column '{}': {} z-score outliers kept as original values",
            series.name(),
            outliers
        );

        let name = series.name().clone();
        if is_numeric_dtype(series.dtype()) || matches!(series.dtype(), DataType::Boolean) {
            // Original and coerced values coincide for numeric input
            return Ok(Series::new(name, values));
        }

        let originals = string_values(series)?;
        let merged: Vec<Option<String>> = values
            .iter()
            .zip(originals)
            .zip(&mask)
            .map(|((coerced, original), is_outlier)| {
                if *is_outlier {
                    original
                } else {
                    coerced.map(|v| v.to_string())
                }
            })
            .collect();

        Ok(Series::new(name, merged))
    }

    /// Apply [`Self::remove_outliers_zscore`] to one column of a table.
    ///
    /// Uses the first column when `column` is `None`. Returns a new table
    /// with that column replaced.
    pub fn remove_outliers_zscore_in(df: &DataFrame, column: Option<&str>) -> Result<DataFrame> {
        let name = match column {
            Some(name) => name.to_string(),
            None => df
                .get_column_names()
                .first()
                .map(|n| n.to_string())
                .ok_or_else(|| PreprocessingError::EmptyColumn("<no columns>".to_string()))?,
        };

        let col = df
            .column(&name)
            .map_err(|_| PreprocessingError::ColumnNotFound(name.clone()))?;
        let processed = Self::remove_outliers_zscore(col.as_materialized_series())?;

        let mut result = df.clone();
        result.replace(&name, processed)?;
        info!("Applied z-score pass to column '{}'", name);
        Ok(result)
    }
}

fn zscore_mask(values: &[Option<f64>]) -> Vec<bool> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let (Some(m), Some(std)) = (mean(&present), population_std(&present)) else {
        return vec![false; values.len()];
    };
    if std == 0.0 {
        return vec![false; values.len()];
    }

    values
        .iter()
        .map(|v| v.is_some_and(|x| ((x - m) / std).abs() > ZSCORE_THRESHOLD))
        .collect()
}
