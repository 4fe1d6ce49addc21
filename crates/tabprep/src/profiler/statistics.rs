//! Describe-style statistics for numeric columns.

use crate::types::NumericSummary;
use crate::utils::{coerce_numeric, mean, quantile_sorted, sorted_values};
use polars::prelude::*;

/// Summarize the present values of a numeric column.
///
/// Returns `None` when the column has no values.
pub(crate) fn numeric_summary(series: &Series) -> PolarsResult<Option<NumericSummary>> {
    let present: Vec<f64> = coerce_numeric(series)?.into_iter().flatten().collect();
    let sorted = sorted_values(&present);

    let (Some(m), Some(min), Some(max)) = (mean(&sorted), sorted.first(), sorted.last()) else {
        return Ok(None);
    };
    let (Some(q25), Some(median), Some(q75)) = (
        quantile_sorted(&sorted, 0.25),
        quantile_sorted(&sorted, 0.5),
        quantile_sorted(&sorted, 0.75),
    ) else {
        return Ok(None);
    };

    Ok(Some(NumericSummary {
        count: sorted.len(),
        mean: m,
        std: sample_std(&sorted, m),
        min: *min,
        q25,
        median,
        q75,
        max: *max,
    }))
}

/// Sample standard deviation (ddof = 1); 0 for fewer than two values.
fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}
