//! Numerical utilities shared by the detectors.

pub mod ols;
pub mod stats;

pub use ols::{linear_fit, polyfit, LineFit, Polynomial};
pub use stats::{average_ranks, mean, median, percentile};
