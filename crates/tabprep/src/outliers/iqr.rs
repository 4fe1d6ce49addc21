//! Interquartile-range outlier statistics and row filtering.

use super::OutlierAnalyzer;
use crate::error::{PreprocessingError, Result};
use crate::types::OutlierReport;
use crate::utils::{coerce_numeric, is_numeric_dtype, quantile_sorted, sorted_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Width of the fence beyond the quartiles, in IQRs.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Quartiles and fences of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Compute bounds from the present values of a column.
    ///
    /// Quartiles use linear interpolation between closest ranks. Returns
    /// `None` when there are no values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted_values(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;

        Some(Self {
            q1,
            q3,
            lower: q1 - IQR_MULTIPLIER * iqr,
            upper: q3 + IQR_MULTIPLIER * iqr,
        })
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Check whether a value lies strictly outside the fences.
    #[inline]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

impl OutlierAnalyzer {
    /// Percentage (0 - 100) of a column's rows that are IQR outliers.
    ///
    /// Missing values never count as outliers but do count toward the
    /// column length.
    ///
    /// # Errors
    ///
    /// [`PreprocessingError::EmptyColumn`] when the column has no rows.
    pub fn calculate_outlier_percentage(series: &Series) -> Result<f64> {
        if series.is_empty() {
            return Err(PreprocessingError::EmptyColumn(series.name().to_string()));
        }

        let values = coerce_numeric(series)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let Some(bounds) = IqrBounds::from_values(&present) else {
            return Ok(0.0);
        };

        let outliers = present.iter().filter(|v| bounds.is_outlier(**v)).count();
        Ok(outliers as f64 / series.len() as f64 * 100.0)
    }

    /// Outlier percentage of every numeric column, in column order.
    ///
    /// Text and boolean columns are not part of the report.
    pub fn check_outliers(df: &DataFrame) -> Result<OutlierReport> {
        let mut report = OutlierReport::new();

        for col in df.get_columns() {
            if !is_numeric_dtype(col.dtype()) {
                continue;
            }
            let percentage = Self::calculate_outlier_percentage(col.as_materialized_series())?;
            debug!("{}: {:.2}% outliers", col.name(), percentage);
            report.push(col.name().to_string(), percentage);
        }

        Ok(report)
    }

    /// Drop every row that is an IQR outlier in at least one numeric column.
    ///
    /// Bounds are computed per column over the full input before any row is
    /// dropped. Missing values are kept. Returns a new table.
    pub fn remove_outliers_iqr(df: &DataFrame) -> Result<DataFrame> {
        let mut keep = vec![true; df.height()];

        for col in df.get_columns() {
            if !is_numeric_dtype(col.dtype()) {
                continue;
            }

            let values = coerce_numeric(col.as_materialized_series())?;
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            let Some(bounds) = IqrBounds::from_values(&present) else {
                continue;
            };

            for (row, value) in values.iter().enumerate() {
                if let Some(v) = value
                    && bounds.is_outlier(*v)
                {
                    keep[row] = false;
                }
            }
        }

        let mask = BooleanChunked::from_slice("mask".into(), &keep);
        let filtered = df.filter(&mask)?;

        let removed = df.height() - filtered.height();
        info!("Removed {} rows containing IQR outliers", removed);
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ages() -> DataFrame {
        df![
            "age" => [20i64, 21, 19, 22, 20, 21, 19, 20, 100, 20],
            "name" => ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"],
        ]
        .unwrap()
    }

    // ==================== IqrBounds tests ====================

    #[test]
    fn test_bounds_basic() {
        // Q1 = 2.0, Q3 = 4.0 with linear interpolation over 1..=5
        let bounds = IqrBounds::from_values(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(bounds.q1, 2.0);
        assert_eq!(bounds.q3, 4.0);
        assert_eq!(bounds.iqr(), 2.0);
        assert_eq!(bounds.lower, -1.0);
        assert_eq!(bounds.upper, 7.0);
        assert!(bounds.is_outlier(7.5));
        assert!(!bounds.is_outlier(7.0));
    }

    #[test]
    fn test_bounds_empty() {
        assert!(IqrBounds::from_values(&[]).is_none());
    }

    // ==================== calculate_outlier_percentage tests ====================

    #[test]
    fn test_percentage_single_outlier() {
        let df = ages();
        let pct =
            OutlierAnalyzer::calculate_outlier_percentage(df.column("age").unwrap().as_materialized_series())
                .unwrap();
        assert_eq!(pct, 10.0);
    }

    #[test]
    fn test_percentage_tight_cluster_is_zero() {
        let series = Series::new("v".into(), &[10.0, 10.1, 9.9, 10.05, 9.95, 10.0]);
        let pct = OutlierAnalyzer::calculate_outlier_percentage(&series).unwrap();
        assert_eq!(pct, 0.0);
    }

    #[test]
    fn test_percentage_in_range() {
        let series = Series::new("v".into(), &[-1000.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 1000.0]);
        let pct = OutlierAnalyzer::calculate_outlier_percentage(&series).unwrap();
        assert!((0.0..=100.0).contains(&pct));
        assert_eq!(pct, 20.0);
    }

    #[test]
    fn test_percentage_nulls_count_toward_length() {
        let series = Series::new(
            "v".into(),
            &[Some(1.0), Some(2.0), Some(2.0), Some(3.0), Some(50.0), None, None, None, None, None],
        );
        let pct = OutlierAnalyzer::calculate_outlier_percentage(&series).unwrap();
        assert_eq!(pct, 10.0);
    }

    #[test]
    fn test_percentage_empty_column() {
        let series = Series::new_empty("empty".into(), &DataType::Float64);
        let result = OutlierAnalyzer::calculate_outlier_percentage(&series);
        assert!(matches!(result, Err(PreprocessingError::EmptyColumn(ref c)) if c == "empty"));
    }

    #[test]
    fn test_percentage_all_null() {
        let series = Series::new("v".into(), &[Option::<f64>::None, None]);
        assert_eq!(OutlierAnalyzer::calculate_outlier_percentage(&series).unwrap(), 0.0);
    }

    // ==================== check_outliers tests ====================

    #[test]
    fn test_check_outliers_numeric_only() {
        let report = OutlierAnalyzer::check_outliers(&ages()).unwrap();

        assert_eq!(report.len(), 1);
        assert!(report.get("age").unwrap() > 0.0);
        assert!(report.get("name").is_none());
        assert_eq!(report.highest().unwrap().column, "age");
    }

    #[test]
    fn test_check_outliers_empty_table() {
        let df = df!["age" => Vec::<f64>::new()].unwrap();
        assert!(matches!(
            OutlierAnalyzer::check_outliers(&df),
            Err(PreprocessingError::EmptyColumn(_))
        ));
    }

    // ==================== remove_outliers_iqr tests ====================

    #[test]
    fn test_remove_iqr_drops_exactly_the_outlier_row() {
        let df = ages();
        let result = OutlierAnalyzer::remove_outliers_iqr(&df).unwrap();

        assert_eq!(result.height(), 9);
        let max = result.column("age").unwrap().i64().unwrap().max().unwrap();
        assert_eq!(max, 22);
        // The text column stays aligned: row "i" held age 100
        let names: Vec<&str> = result
            .column("name")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert!(!names.contains(&"i"));
        // Input untouched
        assert_eq!(df.height(), 10);
    }

    #[test]
    fn test_remove_iqr_any_column_drops_row() {
        let df = df![
            "a" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0],
            "b" => [500.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 55.0],
        ]
        .unwrap();

        let result = OutlierAnalyzer::remove_outliers_iqr(&df).unwrap();
        assert_eq!(result.height(), 8);
    }

    #[test]
    fn test_remove_iqr_keeps_nulls() {
        let df = df![
            "v" => [Some(1.0), Some(2.0), None, Some(2.0), Some(3.0), Some(90.0)],
        ]
        .unwrap();

        let result = OutlierAnalyzer::remove_outliers_iqr(&df).unwrap();
        assert_eq!(result.height(), 5);
        assert_eq!(result.column("v").unwrap().null_count(), 1);
    }

    #[test]
    fn test_remove_iqr_constant_column() {
        let df = df!["v" => [5.0, 5.0, 5.0, 5.0]].unwrap();
        let result = OutlierAnalyzer::remove_outliers_iqr(&df).unwrap();
        assert_eq!(result.height(), 4);
    }

    #[test]
    fn test_remove_iqr_empty_dataframe() {
        let df = DataFrame::empty();
        let result = OutlierAnalyzer::remove_outliers_iqr(&df).unwrap();
        assert_eq!(result.height(), 0);
    }
}
