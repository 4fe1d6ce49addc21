//! Statistical imputation methods.
//!
//! Provides row dropping and mean, median, and mode filling over a whole
//! table.

use crate::config::MissingValueTechnique;
use crate::error::Result;
use crate::utils::{CategoryKey, category_keys, coerce_numeric, is_numeric_dtype, mean, median, mode};
use polars::prelude::*;
use tracing::{debug, info};

/// Applies a [`MissingValueTechnique`] to every column of a table.
pub struct MissingValueHandler;

impl MissingValueHandler {
    /// Handle missing values with the selected technique.
    ///
    /// Returns a new table; `df` is never modified, so a failure leaves the
    /// caller's table as it was.
    ///
    /// - `Drop` removes every row with a missing value in any column.
    /// - `FillMean` / `FillMedian` fill numeric columns only; other columns
    ///   have no mean or median and are left unchanged.
    /// - `FillMode` fills every column with its most frequent value, lowest
    ///   value first on ties.
    pub fn handle_missing_values(
        df: &DataFrame,
        technique: MissingValueTechnique,
    ) -> Result<DataFrame> {
        let result = match technique {
            MissingValueTechnique::Drop => Self::drop_incomplete_rows(df)?,
            MissingValueTechnique::FillMean => Self::fill_numeric(df, "mean", mean)?,
            MissingValueTechnique::FillMedian => Self::fill_numeric(df, "median", median)?,
            MissingValueTechnique::FillMode => Self::fill_mode(df)?,
        };

        info!(
            "Applied '{}': {} -> {} rows, {} -> {} missing values",
            technique,
            df.height(),
            result.height(),
            total_nulls(df),
            total_nulls(&result)
        );
        Ok(result)
    }

    fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame> {
        Ok(df.drop_nulls::<String>(None)?)
    }

    /// Fill nulls of each numeric column with `stat` of its present values.
    fn fill_numeric(
        df: &DataFrame,
        method: &str,
        stat: fn(&[f64]) -> Option<f64>,
    ) -> Result<DataFrame> {
        let mut result = df.clone();

        for col in df.get_columns() {
            if !is_numeric_dtype(col.dtype()) || col.null_count() == 0 {
                continue;
            }

            let series = col.as_materialized_series();
            let values = coerce_numeric(series)?;
            let present: Vec<f64> = values.iter().flatten().copied().collect();

            let Some(fill_value) = stat(&present) else {
                debug!("Column '{}' has no values, skipping {} fill", col.name(), method);
                continue;
            };

            let filled = fill_float_nulls(series.name().clone(), &values, fill_value);
            result.replace(col.name().as_str(), filled)?;
            debug!(
                "Filled '{}' with {}: {:.2}",
                col.name(),
                method,
                fill_value
            );
        }

        Ok(result)
    }

    /// Fill nulls of every column with the column's mode.
    fn fill_mode(df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for col in df.get_columns() {
            if col.null_count() == 0 {
                continue;
            }

            let series = col.as_materialized_series();
            let keys = category_keys(series)?;
            let Some(mode_value) = mode(&keys) else {
                debug!("Column '{}' has no values, skipping mode fill", col.name());
                continue;
            };

            let name = series.name().clone();
            let filled = match &mode_value {
                CategoryKey::Number(v) => {
                    let values = coerce_numeric(series)?;
                    fill_float_nulls(name, &values, *v)
                }
                CategoryKey::Bool(b) => {
                    let values: Vec<bool> = series
                        .bool()?
                        .into_iter()
                        .map(|v| v.unwrap_or(*b))
                        .collect();
                    Series::new(name, values)
                }
                CategoryKey::Text(_) => {
                    // Fill from a row holding the mode so the column keeps its dtype
                    let Some(idx) = keys.iter().position(|k| k.as_ref() == Some(&mode_value))
                    else {
                        continue;
                    };
                    let fill = series.new_from_index(idx, series.len());
                    series.zip_with(&series.is_not_null(), &fill)?
                }
            };

            result.replace(col.name().as_str(), filled)?;
            debug!("Filled '{}' with mode: '{}'", col.name(), mode_value);
        }

        Ok(result)
    }
}

/// Build a Float64 Series from optional values, replacing nulls.
fn fill_float_nulls(name: PlSmallStr, values: &[Option<f64>], fill_value: f64) -> Series {
    let filled: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill_value)).collect();
    Series::new(name, filled)
}

fn total_nulls(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|c| c.null_count()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_at(df: &DataFrame, col: &str, idx: usize) -> f64 {
        df.column(col)
            .unwrap()
            .get(idx)
            .unwrap()
            .try_extract::<f64>()
            .unwrap()
    }

    fn str_at(df: &DataFrame, col: &str, idx: usize) -> String {
        df.column(col)
            .unwrap()
            .str()
            .unwrap()
            .get(idx)
            .unwrap()
            .to_string()
    }

    fn mixed_df() -> DataFrame {
        df![
            "age" => [Some(20.0), None, Some(40.0), Some(30.0)],
            "city" => [Some("Paris"), Some("Rome"), None, Some("Rome")],
            "id" => [1i64, 2, 3, 4],
        ]
        .unwrap()
    }

    // ========================================================================
    // Drop
    // ========================================================================

    #[test]
    fn test_drop_removes_incomplete_rows() {
        let df = mixed_df();
        let result =
            MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::Drop).unwrap();

        assert_eq!(result.height(), 2);
        assert_eq!(total_nulls(&result), 0);
        // Only rows 0 and 3 were complete
        let ids: Vec<i64> = result
            .column("id")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_drop_leaves_input_untouched() {
        let df = mixed_df();
        let _ = MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::Drop).unwrap();
        assert_eq!(df.height(), 4);
    }

    // ========================================================================
    // FillMean / FillMedian
    // ========================================================================

    #[test]
    fn test_fill_mean_numeric_only() {
        let df = mixed_df();
        let result =
            MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::FillMean)
                .unwrap();

        // Mean of [20, 40, 30] = 30
        assert_eq!(f64_at(&result, "age", 1), 30.0);
        assert_eq!(result.column("age").unwrap().null_count(), 0);
        // Text column has no mean and keeps its null
        assert_eq!(result.column("city").unwrap().null_count(), 1);
    }

    #[test]
    fn test_fill_median() {
        let df = df![
            "values" => [Some(1.0), None, Some(3.0), None, Some(10.0)],
        ]
        .unwrap();
        let result =
            MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::FillMedian)
                .unwrap();

        assert_eq!(f64_at(&result, "values", 1), 3.0);
        assert_eq!(f64_at(&result, "values", 3), 3.0);
        assert_eq!(f64_at(&result, "values", 4), 10.0);
    }

    #[test]
    fn test_fill_mean_integer_column_becomes_float() {
        let df = df!["n" => [Some(1i64), None, Some(2)]].unwrap();
        let result =
            MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::FillMean)
                .unwrap();

        assert_eq!(result.column("n").unwrap().dtype(), &DataType::Float64);
        assert_eq!(f64_at(&result, "n", 1), 1.5);
    }

    #[test]
    fn test_fill_mean_all_null_column_unchanged() {
        let df = df!["values" => [Option::<f64>::None, None]].unwrap();
        let result =
            MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::FillMean)
                .unwrap();
        assert_eq!(result.column("values").unwrap().null_count(), 2);
    }

    #[test]
    fn test_fill_mean_preserves_complete_columns() {
        let df = mixed_df();
        let result =
            MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::FillMean)
                .unwrap();
        assert_eq!(result.column("id").unwrap().dtype(), &DataType::Int64);
    }

    // ========================================================================
    // FillMode
    // ========================================================================

    #[test]
    fn test_fill_mode_text_and_numeric() {
        let df = df![
            "city" => [Some("Rome"), None, Some("Paris"), Some("Rome")],
            "score" => [Some(5.0), Some(7.0), Some(7.0), None],
        ]
        .unwrap();
        let result =
            MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::FillMode)
                .unwrap();

        assert_eq!(str_at(&result, "city", 1), "Rome");
        assert_eq!(f64_at(&result, "score", 3), 7.0);
        assert_eq!(total_nulls(&result), 0);
    }

    #[test]
    fn test_fill_mode_tie_uses_lowest_value() {
        let df = df![
            "city" => [Some("Rome"), Some("Paris"), None],
            "score" => [Some(9.0), Some(2.0), None],
        ]
        .unwrap();
        let result =
            MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::FillMode)
                .unwrap();

        assert_eq!(str_at(&result, "city", 2), "Paris");
        assert_eq!(f64_at(&result, "score", 2), 2.0);
    }

    #[test]
    fn test_fill_mode_boolean_column() {
        let df = df!["flag" => [Some(true), Some(true), Some(false), None]].unwrap();
        let result =
            MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::FillMode)
                .unwrap();

        let flag = result.column("flag").unwrap();
        assert_eq!(flag.dtype(), &DataType::Boolean);
        assert_eq!(flag.bool().unwrap().get(3), Some(true));
    }

    #[test]
    fn test_fill_mode_keeps_date_dtype() {
        // Days since epoch; 19000 is 2022-01-08
        let dates = Series::new("joined".into(), &[Some(19000i32), None, Some(19000), Some(19001)])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![dates.into()]).unwrap();
        let result =
            MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::FillMode)
                .unwrap();

        let joined = result.column("joined").unwrap();
        assert_eq!(joined.dtype(), &DataType::Date);
        let days: Vec<Option<i32>> = joined
            .cast(&DataType::Int32)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(days, vec![Some(19000), Some(19000), Some(19000), Some(19001)]);
    }

    #[test]
    fn test_fill_mode_text_column_stays_string() {
        let df = mixed_df();
        let result =
            MissingValueHandler::handle_missing_values(&df, MissingValueTechnique::FillMode)
                .unwrap();

        assert_eq!(result.column("city").unwrap().dtype(), &DataType::String);
        assert_eq!(str_at(&result, "city", 2), "Rome");
        assert_eq!(str_at(&result, "city", 0), "Paris");
    }

    #[test]
    fn test_technique_parsed_from_label() {
        let technique: MissingValueTechnique = "Fill with median".parse().unwrap();
        let df = df!["v" => [Some(1.0), None, Some(2.0), Some(100.0)]].unwrap();
        let result = MissingValueHandler::handle_missing_values(&df, technique).unwrap();
        assert_eq!(f64_at(&result, "v", 1), 2.0);
    }
}
