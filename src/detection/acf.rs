//! Autocorrelation with a choice of correlation coefficient.
//!
//! The value at lag `k` is the correlation between `series[..n - k]` and
//! `series[k..]`, i.e. only the overlapping region is compared. Lags with
//! fewer than two overlapping samples, or a constant overlap, are `NaN`.

use crate::error::{PeriodicityError, Result};
use crate::utils::stats::average_ranks;
use statrs::statistics::Statistics;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Correlation coefficient used to build the ACF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Correlation {
    /// Pearson product-moment correlation
    #[default]
    Pearson,
    /// Spearman rank correlation (Pearson on average ranks)
    Spearman,
    /// Kendall's tau-b
    Kendall,
}

impl Correlation {
    /// Correlation between two equally long samples.
    pub fn coefficient(&self, x: &[f64], y: &[f64]) -> f64 {
        if x.len() != y.len() || x.len() < 2 {
            return f64::NAN;
        }
        match self {
            Self::Pearson => pearson(x, y),
            Self::Spearman => pearson(&average_ranks(x), &average_ranks(y)),
            Self::Kendall => kendall_tau_b(x, y),
        }
    }
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
            Self::Kendall => "kendall",
        };
        f.write_str(name)
    }
}

impl FromStr for Correlation {
    type Err = PeriodicityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pearson" => Ok(Self::Pearson),
            "spearman" => Ok(Self::Spearman),
            "kendall" => Ok(Self::Kendall),
            other => Err(PeriodicityError::InvalidParameter(format!(
                "unknown correlation '{}', expected one of pearson, spearman, kendall",
                other
            ))),
        }
    }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let sx = x.population_std_dev();
    let sy = y.population_std_dev();
    if !(sx > 0.0 && sy > 0.0) {
        return f64::NAN;
    }
    x.population_covariance(y) / (sx * sy)
}

fn kendall_tau_b(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    let mut score = 0i64;
    let mut ties_x = 0u64;
    let mut ties_y = 0u64;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = sign(x[i] - x[j]);
            let dy = sign(y[i] - y[j]);
            score += (dx * dy) as i64;
            ties_x += u64::from(dx == 0);
            ties_y += u64::from(dy == 0);
        }
    }
    let pairs = (n * (n - 1) / 2) as u64;
    let denom = ((pairs - ties_x) as f64 * (pairs - ties_y) as f64).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    score as f64 / denom
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Autocorrelation at lags `0..=nlags`.
///
/// # Errors
/// `InvalidParameter` when `nlags` exceeds the series length.
///
/// # Example
/// ```
/// use anofox_periodicity::detection::{acf, Correlation};
///
/// let series: Vec<f64> = (0..48).map(|i| ((i % 12) as f64 - 6.0).abs()).collect();
/// let values = acf(&series, 24, Correlation::Pearson).unwrap();
/// assert_eq!(values.len(), 25);
/// assert!((values[0] - 1.0).abs() < 1e-12);
/// assert!(values[12] > 0.99);
/// ```
pub fn acf(series: &[f64], nlags: usize, correlation: Correlation) -> Result<Vec<f64>> {
    if nlags > series.len() {
        return Err(PeriodicityError::InvalidParameter(format!(
            "nlags ({}) exceeds series length ({})",
            nlags,
            series.len()
        )));
    }
    Ok(acf_at(series, (0..=nlags).collect(), correlation))
}

/// Autocorrelation at an arbitrary set of lags, in the given order.
///
/// # Errors
/// `InvalidParameter` when a lag exceeds the series length.
pub fn acf_lags(series: &[f64], lags: &[usize], correlation: Correlation) -> Result<Vec<f64>> {
    if let Some(&lag) = lags.iter().find(|&&lag| lag > series.len()) {
        return Err(PeriodicityError::InvalidParameter(format!(
            "lag {} exceeds series length ({})",
            lag,
            series.len()
        )));
    }
    Ok(acf_at(series, lags.to_vec(), correlation))
}

fn acf_at(series: &[f64], lags: Vec<usize>, correlation: Correlation) -> Vec<f64> {
    let n = series.len();
    let at_lag = |lag: usize| correlation.coefficient(&series[..n - lag], &series[lag..]);

    #[cfg(feature = "parallel")]
    {
        lags.into_par_iter().map(at_lag).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        lags.into_iter().map(at_lag).collect()
    }
}
