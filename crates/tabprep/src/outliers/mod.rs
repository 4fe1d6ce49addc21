//! Outlier detection and handling for numeric columns.
//!
//! Two independent methods:
//! - **IQR**: per-column bounds `Q1 - 1.5 * IQR` and `Q3 + 1.5 * IQR`, used
//!   both to report outlier percentages and to drop outlier rows.
//! - **Z-score**: a single-column pass that flags `|z| > 3`.

mod iqr;
mod zscore;

pub use iqr::{IQR_MULTIPLIER, IqrBounds};
pub use zscore::ZSCORE_THRESHOLD;

/// Computes outlier statistics and applies outlier handling.
pub struct OutlierAnalyzer;
