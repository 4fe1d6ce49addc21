use super::{CategoricalEncoder, resolve_columns};
use crate::error::{PreprocessingError, Result};
use crate::utils::{category_index, category_keys, sorted_categories};
use polars::prelude::*;
use tracing::debug;

impl CategoricalEncoder {
    /// Replace each named column by one indicator column per category.
    ///
    /// For a column `c` with `k` categories, `c_0 .. c_{k-1}` (`Float64`,
    /// 0.0 / 1.0) are appended in sorted category order and `c` is dropped.
    /// Columns are processed one at a time in the given order, so the result
    /// holds the untouched columns followed by one indicator block per
    /// encoded column. A column with missing values gets one extra, last
    /// indicator for "missing".
    ///
    /// # Errors
    ///
    /// - [`PreprocessingError::ColumnNotFound`] if any name is absent.
    /// - [`PreprocessingError::DuplicateColumn`] if an indicator name is
    ///   already taken.
    pub fn onehot_encode<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<DataFrame> {
        let columns = resolve_columns(df, columns)?;
        let mut result = df.clone();

        for name in &columns {
            let series = result.column(name)?.as_materialized_series().clone();
            let keys = category_keys(&series)?;
            let categories = sorted_categories(&keys);
            let has_missing = keys.iter().any(Option::is_none);

            // Index of the active indicator per row; the missing indicator sits last
            let active: Vec<usize> = keys
                .iter()
                .map(|key| match key {
                    Some(k) => category_index(&categories, k).unwrap_or(categories.len()),
                    None => categories.len(),
                })
                .collect();

            let width = categories.len() + usize::from(has_missing);
            result = result.drop(name)?;

            for i in 0..width {
                let indicator_name = format!("{}_{}", name, i);
                if result.get_column_index(&indicator_name).is_some() {
                    return Err(PreprocessingError::DuplicateColumn(indicator_name));
                }
                let indicator: Vec<f64> = active
                    .iter()
                    .map(|a| if *a == i { 1.0 } else { 0.0 })
                    .collect();
                result.with_column(Series::new(indicator_name.into(), indicator))?;
            }

            debug!("One-hot encoded '{}' into {} columns", name, width);
        }

        Ok(result)
    }
}
