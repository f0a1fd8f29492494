//! Configuration shared by the validated detectors.

use super::acf::Correlation;
use crate::error::{PeriodicityError, Result};
use crate::transform::{Detrend, Window};

/// Options for [`Autoperiod`](super::Autoperiod) and
/// [`CFDAutoperiod`](super::CFDAutoperiod).
///
/// # Example
/// ```
/// use anofox_periodicity::detection::{Correlation, DetectorConfig};
/// use anofox_periodicity::transform::{Detrend, Window};
///
/// let config = DetectorConfig::default()
///     .with_k(200)
///     .with_percentile(95.0)
///     .with_detrend(Some(Detrend::Constant))
///     .with_window(Some(Window::Blackman))
///     .with_correlation(Correlation::Spearman)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Number of permutations for the power threshold
    pub k: usize,
    /// Percentile of the permutation maxima used as threshold, in `[0, 100]`
    pub percentile: f64,
    /// Detrending applied before analysis (`None` to skip)
    pub detrend: Option<Detrend>,
    /// Window applied after detrending (`None` to skip)
    pub window: Option<Window>,
    /// Correlation coefficient for the ACF
    pub correlation: Correlation,
    /// Seed for the permutation generator
    pub seed: Option<u64>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            k: 100,
            percentile: 99.0,
            detrend: Some(Detrend::Linear),
            window: None,
            correlation: Correlation::Pearson,
            seed: None,
        }
    }
}

impl DetectorConfig {
    /// Set the number of permutations
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the threshold percentile
    pub fn with_percentile(mut self, percentile: f64) -> Self {
        self.percentile = percentile;
        self
    }

    /// Set the detrending strategy
    pub fn with_detrend(mut self, detrend: Option<Detrend>) -> Self {
        self.detrend = detrend;
        self
    }

    /// Set the window
    pub fn with_window(mut self, window: Option<Window>) -> Self {
        self.window = window;
        self
    }

    /// Set the ACF correlation coefficient
    pub fn with_correlation(mut self, correlation: Correlation) -> Self {
        self.correlation = correlation;
        self
    }

    /// Seed the permutations for reproducible results
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every option before any computation runs.
    ///
    /// # Errors
    /// `InvalidParameter` for `k == 0`, a percentile outside `[0, 100]` or an
    /// invalid window parameter.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(PeriodicityError::InvalidParameter(
                "number of permutations k must be at least 1".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.percentile) {
            return Err(PeriodicityError::InvalidParameter(format!(
                "percentile must be in [0, 100], got {}",
                self.percentile
            )));
        }
        if let Some(window) = &self.window {
            window.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.k, 100);
        assert_eq!(config.percentile, 99.0);
        assert!(matches!(config.detrend, Some(Detrend::Linear)));
        assert!(config.window.is_none());
        assert_eq!(config.correlation, Correlation::Pearson);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = DetectorConfig::default()
            .with_k(7)
            .with_percentile(50.0)
            .with_detrend(None)
            .with_window(Some(Window::Hann))
            .with_correlation(Correlation::Kendall)
            .with_seed(9);
        assert_eq!(config.k, 7);
        assert_eq!(config.percentile, 50.0);
        assert!(config.detrend.is_none());
        assert_eq!(config.window, Some(Window::Hann));
        assert_eq!(config.correlation, Correlation::Kendall);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(DetectorConfig::default().with_k(0).validate().is_err());
        assert!(DetectorConfig::default()
            .with_percentile(101.0)
            .validate()
            .is_err());
        assert!(DetectorConfig::default()
            .with_percentile(f64::NAN)
            .validate()
            .is_err());
        assert!(DetectorConfig::default()
            .with_window(Some(Window::Gaussian { std: -1.0 }))
            .validate()
            .is_err());
        assert!(DetectorConfig::default()
            .with_percentile(0.0)
            .validate()
            .is_ok());
    }
}
