//! Trend removal applied before spectral analysis.

use crate::error::{PeriodicityError, Result};
use crate::utils::stats::mean;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// User-supplied detrending transform.
pub type DetrendFn = Arc<dyn Fn(&[f64]) -> Vec<f64> + Send + Sync>;

/// Detrending strategy.
#[derive(Clone, Default)]
pub enum Detrend {
    /// Subtract the least-squares line fitted against the sample index
    #[default]
    Linear,
    /// Subtract the mean
    Constant,
    /// Apply a custom transform; it must preserve the series length
    Custom(DetrendFn),
}

impl Detrend {
    /// Wrap a closure as a custom detrending transform.
    ///
    /// # Example
    /// ```
    /// use anofox_periodicity::transform::Detrend;
    /// use anofox_periodicity::utils::median;
    ///
    /// let detrend = Detrend::custom(|x| {
    ///     let m = median(x);
    ///     x.iter().map(|v| v - m).collect()
    /// });
    /// assert_eq!(detrend.apply(&[1.0, 2.0, 9.0]).unwrap(), vec![-1.0, 0.0, 7.0]);
    /// ```
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Return the detrended copy of `series`.
    ///
    /// # Errors
    /// `InvalidParameter` when a custom transform changes the length.
    pub fn apply(&self, series: &[f64]) -> Result<Vec<f64>> {
        match self {
            Self::Linear => Ok(detrend_linear(series)),
            Self::Constant => Ok(detrend_constant(series)),
            Self::Custom(f) => {
                let out = f(series);
                if out.len() != series.len() {
                    return Err(PeriodicityError::InvalidParameter(format!(
                        "custom detrend changed series length from {} to {}",
                        series.len(),
                        out.len()
                    )));
                }
                Ok(out)
            }
        }
    }
}

impl fmt::Debug for Detrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::Constant => write!(f, "Constant"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl FromStr for Detrend {
    type Err = PeriodicityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linear" | "l" => Ok(Self::Linear),
            "constant" | "c" => Ok(Self::Constant),
            other => Err(PeriodicityError::InvalidParameter(format!(
                "unknown detrend type '{}', expected 'linear' or 'constant'",
                other
            ))),
        }
    }
}

/// Subtract the mean.
pub fn detrend_constant(series: &[f64]) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }
    let m = mean(series);
    series.iter().map(|v| v - m).collect()
}

/// Subtract the least-squares line `a + b * i`.
pub fn detrend_linear(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    if n < 2 {
        return detrend_constant(series);
    }

    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = mean(series);

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    for (i, &y) in series.iter().enumerate() {
        let dx = i as f64 - mean_x;
        ss_xx += dx * dx;
        ss_xy += dx * (y - mean_y);
    }

    let slope = ss_xy / ss_xx;
    series
        .iter()
        .enumerate()
        .map(|(i, &y)| y - mean_y - slope * (i as f64 - mean_x))
        .collect()
}
