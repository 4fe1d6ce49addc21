//! Pipeline module.
//!
//! Runs the preprocessing stages in a fixed order over a table.

mod builder;

pub use builder::{Pipeline, PipelineBuilder};
