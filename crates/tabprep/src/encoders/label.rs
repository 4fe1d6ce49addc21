use super::{CategoricalEncoder, resolve_columns};
use crate::error::Result;
use crate::utils::{category_index, category_keys, sorted_categories};
use polars::prelude::*;
use tracing::debug;

impl CategoricalEncoder {
    /// Replace each named column by integer codes `0..k-1`.
    ///
    /// Codes follow the sorted category order and are stored as `Int64` in
    /// the column's original position. Missing values stay missing.
    ///
    /// # Errors
    ///
    /// [`crate::PreprocessingError::ColumnNotFound`] if any name is absent;
    /// nothing is encoded in that case.
    pub fn label_encode<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<DataFrame> {
        let columns = resolve_columns(df, columns)?;
        let mut result = df.clone();

        for name in &columns {
            let series = df.column(name)?.as_materialized_series();
            let keys = category_keys(series)?;
            let categories = sorted_categories(&keys);

            let codes: Vec<Option<i64>> = keys
                .iter()
                .map(|key| {
                    key.as_ref()
                        .and_then(|k| category_index(&categories, k))
                        .map(|idx| idx as i64)
                })
                .collect();

            result.replace(name, Series::new(name.as_str().into(), codes))?;
            debug!("Label encoded '{}' into {} codes", name, categories.len());
        }

        Ok(result)
    }
}
