//! Imputation module for handling missing values.
//!
//! Whole-table strategies: dropping incomplete rows, or filling with the
//! mean, median, or mode of each column.

mod statistical;

pub use statistical::MissingValueHandler;
