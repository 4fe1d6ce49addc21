//! Shared utilities for the preprocessing stages.
//!
//! Column classification, numeric coercion, and the small set of descriptive
//! statistics (mean, standard deviation, quantiles, mode) the stages share.

use polars::prelude::*;
use std::cmp::Ordering;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

/// Names of the numeric columns of a DataFrame, in column order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Names of the text-like (string/categorical) columns of a DataFrame.
pub fn categorical_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| get_dtype_category(col.dtype()) == DtypeCategory::String)
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Numeric Coercion
// =============================================================================

/// Parse a text value as a number.
///
/// Surrounding whitespace is ignored. Empty strings and NaN spellings parse
/// to `None`.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Coerce any Series to optional floats.
///
/// Numeric and boolean columns are cast; every other column is rendered as
/// text and parsed with [`parse_numeric_string`], so unparseable entries
/// become `None` instead of failing.
pub fn coerce_numeric(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let dtype = series.dtype();
    if is_numeric_dtype(dtype) || matches!(dtype, DataType::Boolean) {
        let cast = series.cast(&DataType::Float64)?;
        return Ok(cast
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect());
    }

    let text = series.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|v| v.and_then(parse_numeric_string))
        .collect())
}

/// Render any Series as optional strings.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let text = series.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

// =============================================================================
// Descriptive Statistics
// =============================================================================

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation (ddof = 0).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Sort floats ascending using a total order.
pub fn sorted_values(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile of an ascending slice with linear interpolation between the two
/// closest ranks: position `q * (n - 1)`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Median of an unsorted slice.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted_values(values), 0.5)
}

// =============================================================================
// Categories
// =============================================================================

/// A single category value, typed after its column.
///
/// All keys taken from one column share a variant, so ordering follows the
/// column type: numeric order for numbers, `false < true`, lexicographic
/// order for text.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryKey {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CategoryKey {
    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }

    /// Total order over keys.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl std::fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Read a Series as category keys, keeping nulls as `None`.
pub fn category_keys(series: &Series) -> PolarsResult<Vec<Option<CategoryKey>>> {
    let dtype = series.dtype();
    if is_numeric_dtype(dtype) {
        let cast = series.cast(&DataType::Float64)?;
        Ok(cast
            .f64()?
            .into_iter()
            // -0.0 and 0.0 are one category
            .map(|v| v.filter(|x| !x.is_nan()).map(|x| CategoryKey::Number(x + 0.0)))
            .collect())
    } else if matches!(dtype, DataType::Boolean) {
        Ok(series
            .bool()?
            .into_iter()
            .map(|v| v.map(CategoryKey::Bool))
            .collect())
    } else {
        Ok(string_values(series)?
            .into_iter()
            .map(|v| v.map(CategoryKey::Text))
            .collect())
    }
}

/// Distinct non-null keys in ascending order.
pub fn sorted_categories(keys: &[Option<CategoryKey>]) -> Vec<CategoryKey> {
    let mut categories: Vec<CategoryKey> = keys.iter().flatten().cloned().collect();
    categories.sort_by(|a, b| a.total_cmp(b));
    categories.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
    categories
}

/// Position of a key within sorted categories.
pub fn category_index(categories: &[CategoryKey], key: &CategoryKey) -> Option<usize> {
    categories.binary_search_by(|probe| probe.total_cmp(key)).ok()
}

/// Most frequent non-null key; ties resolve to the lowest key.
pub fn mode(keys: &[Option<CategoryKey>]) -> Option<CategoryKey> {
    let mut present: Vec<&CategoryKey> = keys.iter().flatten().collect();
    present.sort_by(|a, b| a.total_cmp(b));

    let mut best: Option<(&CategoryKey, usize)> = None;
    let mut i = 0;
    while i < present.len() {
        let mut j = i + 1;
        while j < present.len() && present[j].total_cmp(present[i]) == Ordering::Equal {
            j += 1;
        }
        let count = j - i;
        // strictly greater keeps the lowest key on ties
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((present[i], count));
        }
        i = j;
    }

    best.map(|(key, _)| key.clone())
}

// =============================================================================
// Tests
// =============================================================================
