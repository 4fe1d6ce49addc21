//! Train/test splitting and a baseline classifier.
//!
//! [`Evaluator::build_model`] fits a [`LogisticRegression`] on a training
//! partition and scores it on a test partition, giving a quick signal of how
//! predictive the prepared table is.

mod logistic;
mod split;

pub use logistic::LogisticRegression;
pub use split::TrainTestSplit;

use crate::error::{PreprocessingError, Result};
use crate::utils::{
    CategoryKey, category_index, category_keys, coerce_numeric, is_numeric_dtype,
    sorted_categories,
};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::{debug, info};

/// Splitting and model evaluation.
pub struct Evaluator;

impl Evaluator {
    /// Fit a logistic regression on `train` and return its accuracy on `test`.
    ///
    /// The last column of `train` is the target and every preceding column a
    /// feature. Features must be numeric or boolean and free of missing
    /// values. `test` must hold the same columns; it is read by name.
    ///
    /// # Errors
    ///
    /// - [`PreprocessingError::ColumnNotFound`] if `test` lacks a column of `train`.
    /// - [`PreprocessingError::NonNumericFeature`] for an unencoded feature.
    /// - [`PreprocessingError::MissingValues`] for nulls in features or target.
    /// - [`PreprocessingError::InsufficientClasses`] if the training target has
    ///   fewer than two classes.
    /// - [`PreprocessingError::EmptyPartition`] if `test` has no rows.
    pub fn build_model(train: &DataFrame, test: &DataFrame) -> Result<f64> {
        let names: Vec<String> = train
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let Some((target, features)) = names.split_last() else {
            return Err(PreprocessingError::EmptyPartition("train"));
        };

        for name in &names {
            if test.get_column_index(name).is_none() {
                return Err(PreprocessingError::ColumnNotFound(name.clone()));
            }
        }

        for name in features {
            let dtype = train.column(name)?.dtype();
            if !is_numeric_dtype(dtype) && !matches!(dtype, DataType::Boolean) {
                return Err(PreprocessingError::NonNumericFeature(name.clone()));
            }
        }

        let x_train = feature_matrix(train, features)?;
        let x_test = feature_matrix(test, features)?;

        let train_keys = target_keys(train, target)?;
        let test_keys = target_keys(test, target)?;
        let present: Vec<Option<CategoryKey>> = train_keys.iter().cloned().map(Some).collect();
        let classes = sorted_categories(&present);
        if classes.len() < 2 {
            return Err(PreprocessingError::InsufficientClasses(classes.len()));
        }
        if test.height() == 0 {
            return Err(PreprocessingError::EmptyPartition("test"));
        }

        // Class positions in the training order; unseen test labels map past
        // the end so they can never be predicted correctly.
        let y_train = class_positions(&train_keys, &classes);
        let y_test = class_positions(&test_keys, &classes);

        debug!(
            "Fitting logistic regression: {} rows, {} features, {} classes",
            x_train.nrows(),
            x_train.ncols(),
            classes.len()
        );

        let mut model = LogisticRegression::new();
        model.fit(&x_train, &y_train)?;
        let accuracy = model.score(&x_test, &y_test)?;

        info!(
            "Model accuracy on {} test rows: {:.4}",
            test.height(),
            accuracy
        );
        Ok(accuracy)
    }
}

/// Stack feature columns into a row-major matrix.
fn feature_matrix(df: &DataFrame, features: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let mut matrix = Array2::zeros((n_rows, features.len()));

    for (j, name) in features.iter().enumerate() {
        let values = coerce_numeric(df.column(name)?.as_materialized_series())?;
        for (i, value) in values.into_iter().enumerate() {
            let Some(v) = value else {
                return Err(PreprocessingError::MissingValues(name.clone()));
            };
            matrix[[i, j]] = v;
        }
    }

    Ok(matrix)
}

fn target_keys(df: &DataFrame, target: &str) -> Result<Vec<CategoryKey>> {
    let keys = category_keys(df.column(target)?.as_materialized_series())?;
    keys.into_iter()
        .map(|key| key.ok_or_else(|| PreprocessingError::MissingValues(target.to_string())))
        .collect()
}

fn class_positions(keys: &[CategoryKey], classes: &[CategoryKey]) -> Array1<f64> {
    keys.iter()
        .map(|key| category_index(classes, key).unwrap_or(classes.len()) as f64)
        .collect()
}
