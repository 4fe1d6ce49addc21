//! Categorical encoding.
//!
//! Both encoders order categories the same way: sorted distinct values, in
//! numeric order for numeric columns, `false < true` for booleans and
//! lexicographic order for text. Any column can be encoded; numeric values
//! are treated as categories like any other.

mod label;
mod onehot;

use crate::cleaner::ensure_columns_exist;
use crate::config::EncodingMethod;
use crate::error::Result;
use polars::prelude::DataFrame;

/// Converts categorical columns to numeric form.
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    /// Encode `columns` with the chosen method.
    pub fn encode<S: AsRef<str>>(
        df: &DataFrame,
        columns: &[S],
        method: EncodingMethod,
    ) -> Result<DataFrame> {
        match method {
            EncodingMethod::LabelEncoding => Self::label_encode(df, columns),
            EncodingMethod::OneHotEncoding => Self::onehot_encode(df, columns),
        }
    }
}

/// Requested names in order, without repeats, after checking they exist.
fn resolve_columns<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<Vec<String>> {
    ensure_columns_exist(df, columns)?;

    let mut resolved: Vec<String> = Vec::with_capacity(columns.len());
    for name in columns {
        let name = name.as_ref();
        if !resolved.iter().any(|r| r == name) {
            resolved.push(name.to_string());
        }
    }
    Ok(resolved)
}
