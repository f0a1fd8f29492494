//! Univariate, evenly spaced series used as detector input.

use crate::error::{PeriodicityError, Result};

/// A validated univariate series with a fixed sampling interval.
///
/// Values are finite and the series is non-empty. The sampling interval is
/// implicit: periods are expressed in samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    values: Vec<f64>,
}

impl Series {
    /// Build a series from any sequence of values convertible to `f64`.
    ///
    /// # Errors
    /// `EmptyData` for an empty sequence, `NonFiniteValue` for NaN or infinity.
    pub fn new<I, T>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        let values: Vec<f64> = values.into_iter().map(Into::into).collect();
        Self::from_vec(values)
    }

    fn from_vec(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(PeriodicityError::EmptyData);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(PeriodicityError::NonFiniteValue { index });
        }
        Ok(Self { values })
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series holds no observations; false once constructed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the observations.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the series, returning a working buffer.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl TryFrom<Vec<f64>> for Series {
    type Error = PeriodicityError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::from_vec(values)
    }
}

impl TryFrom<&[f64]> for Series {
    type Error = PeriodicityError;

    fn try_from(values: &[f64]) -> Result<Self> {
        Self::from_vec(values.to_vec())
    }
}

impl AsRef<[f64]> for Series {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}
