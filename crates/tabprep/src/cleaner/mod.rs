//! Table-level cleaning helpers: column removal and missing-value counts.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use tracing::debug;

/// Removes unwanted columns and reports missing values.
pub struct DataCleaner;

impl DataCleaner {
    /// Return a copy of `df` without `columns`.
    ///
    /// Every name is checked before anything is dropped, so an unknown column
    /// fails the whole call. Repeated names are dropped once.
    pub fn drop_columns<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<DataFrame> {
        ensure_columns_exist(df, columns)?;

        let mut result = df.clone();
        for name in columns {
            let name = name.as_ref();
            if result.get_column_index(name).is_some() {
                result = result.drop(name)?;
                debug!("Dropped column '{}'", name);
            }
        }
        Ok(result)
    }

    /// Missing values per column, in column order, including zero counts.
    pub fn missing_value_counts(df: &DataFrame) -> Vec<(String, usize)> {
        df.get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect()
    }

    /// Check whether any column has a missing value.
    pub fn has_missing_values(df: &DataFrame) -> bool {
        df.get_columns().iter().any(|col| col.null_count() > 0)
    }
}

/// Fail with [`PreprocessingError::ColumnNotFound`] for the first name that is
/// not a column of `df`.
pub(crate) fn ensure_columns_exist<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<()> {
    match columns
        .iter()
        .find(|name| df.get_column_index(name.as_ref()).is_none())
    {
        Some(missing) => Err(PreprocessingError::ColumnNotFound(
            missing.as_ref().to_string(),
        )),
        None => Ok(()),
    }
}
