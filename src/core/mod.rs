//! Core data structures for periodicity detection.

mod series;

pub use series::Series;
