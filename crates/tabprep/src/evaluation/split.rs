//! Seeded train/test partitioning.

use super::Evaluator;
use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use rand::prelude::*;
use tracing::debug;

/// Train and test partitions of a table.
///
/// The target column is the last column of both partitions, so the pair can
/// be passed straight to [`Evaluator::build_model`].
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: DataFrame,
    pub test: DataFrame,
    pub target_column: String,
}

impl TrainTestSplit {
    /// Training features (every column except the target).
    pub fn x_train(&self) -> Result<DataFrame> {
        Ok(self.train.drop(&self.target_column)?)
    }

    /// Test features (every column except the target).
    pub fn x_test(&self) -> Result<DataFrame> {
        Ok(self.test.drop(&self.target_column)?)
    }

    /// Training target.
    pub fn y_train(&self) -> Result<Series> {
        Ok(self
            .train
            .column(&self.target_column)?
            .as_materialized_series()
            .clone())
    }

    /// Test target.
    pub fn y_test(&self) -> Result<Series> {
        Ok(self
            .test
            .column(&self.target_column)?
            .as_materialized_series()
            .clone())
    }

    /// Row counts as `(train, test)`.
    pub fn sizes(&self) -> (usize, usize) {
        (self.train.height(), self.test.height())
    }
}

/// Number of test rows for a fraction: `ceil(fraction * n)`.
fn test_row_count(fraction: f64, n_rows: usize) -> usize {
    ((fraction * n_rows as f64).ceil() as usize).min(n_rows)
}

impl Evaluator {
    /// Randomly partition rows into `(train, test)`.
    ///
    /// Rows are shuffled with a generator seeded from `seed`; the first
    /// `ceil(test_fraction * n)` shuffled rows form the test partition and
    /// the remainder the training partition. Equal inputs and seeds give
    /// identical partitions.
    ///
    /// # Errors
    ///
    /// [`PreprocessingError::InvalidFraction`] unless `0 <= test_fraction <= 1`.
    pub fn split_rows(
        df: &DataFrame,
        test_fraction: f64,
        seed: u64,
    ) -> Result<(DataFrame, DataFrame)> {
        if !(0.0..=1.0).contains(&test_fraction) {
            return Err(PreprocessingError::InvalidFraction(test_fraction));
        }

        let n_rows = df.height();
        let n_test = test_row_count(test_fraction, n_rows);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices: Vec<IdxSize> = (0..n_rows as IdxSize).collect();
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test);
        let test = df.take(&IdxCa::from_vec("idx".into(), test_idx.to_vec()))?;
        let train = df.take(&IdxCa::from_vec("idx".into(), train_idx.to_vec()))?;

        debug!(
            "Split {} rows into {} train / {} test (seed {})",
            n_rows,
            train.height(),
            test.height(),
            seed
        );
        Ok((train, test))
    }

    /// Partition a table for predicting `target_column`.
    ///
    /// The target is moved to the last position before splitting.
    pub fn split(
        df: &DataFrame,
        target_column: &str,
        test_fraction: f64,
        seed: u64,
    ) -> Result<TrainTestSplit> {
        let ordered = target_last(df, target_column)?;
        let (train, test) = Self::split_rows(&ordered, test_fraction, seed)?;

        Ok(TrainTestSplit {
            train,
            test,
            target_column: target_column.to_string(),
        })
    }
}

/// Reorder columns so `target_column` comes last.
fn target_last(df: &DataFrame, target_column: &str) -> Result<DataFrame> {
    if df.get_column_index(target_column).is_none() {
        return Err(PreprocessingError::ColumnNotFound(target_column.to_string()));
    }

    let mut order: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .filter(|name| name != target_column)
        .collect();
    order.push(target_column.to_string());

    Ok(df.select(order)?)
}
