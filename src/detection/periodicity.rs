//! Periodicity detection algorithms.
//!
//! This module provides the detector trait, the result types and the pieces
//! shared by the validated detectors:
//! - [`FFTPeriodicityDetector`]: ranks periods by Fourier amplitude, no validation
//! - [`Autoperiod`]: periodogram hints validated by segmented regression on the ACF
//!   (Vlachos et al. 2005)
//! - [`CFDAutoperiod`]: clustered hints validated by quadratic fits with low-pass
//!   deflation (Puech et al. 2020)

use super::acf::acf;
use super::autoperiod::Autoperiod;
use super::cfd_autoperiod::CFDAutoperiod;
use super::config::DetectorConfig;
use super::fft::{amplitude_spectrum, periodogram};
use super::hints::period_hints;
use super::threshold::power_threshold;
use crate::core::Series;
use crate::error::{PeriodicityError, Result};
use crate::transform::{apply_window, Detrend, Window};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Shortest series the validated detectors accept.
pub const MIN_SERIES_LEN: usize = 4;

/// Source of period detection (which domain)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSource {
    /// Detected in frequency domain (FFT/periodogram)
    Frequency,
    /// Hinted by the periodogram and validated on the ACF
    Hybrid,
}

/// A detected period with its score
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedPeriod {
    /// The detected period (in samples)
    pub period: usize,
    /// ACF value at the lag for validated periods, Fourier amplitude otherwise
    pub score: f64,
    /// Which domain detected this period
    pub source: PeriodSource,
}

/// Result of periodicity detection
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicityResult {
    /// Detected periods: ascending for validated detectors, by amplitude for the FFT ranker
    pub periods: Vec<DetectedPeriod>,
    /// Name of the method used
    pub method: String,
}

impl PeriodicityResult {
    /// Check if any periodicity was detected
    pub fn has_periodicity(&self) -> bool {
        !self.periods.is_empty()
    }

    /// The detected lags, in result order
    pub fn period_values(&self) -> Vec<usize> {
        self.periods.iter().map(|p| p.period).collect()
    }

    /// The period with the highest score
    pub fn strongest(&self) -> Option<&DetectedPeriod> {
        self.periods
            .iter()
            .reduce(|best, p| if p.score > best.score { p } else { best })
    }
}

/// Trait for periodicity detectors
pub trait PeriodicityDetector {
    /// Detect periodicity in the given time series
    fn detect(&self, series: &[f64]) -> Result<PeriodicityResult>;

    /// Detected periods only
    fn fit(&self, series: &[f64]) -> Result<Vec<usize>> {
        Ok(self.detect(series)?.period_values())
    }

    /// Get the name of this detection method
    fn name(&self) -> &'static str;
}

// ============================================================================
// Hint validation outcome
// ============================================================================

/// Why a hint was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The local ACF shape is not a maximum
    NotAPeak,
    /// The ACF window around the hint leaves the available lag range
    WindowOutOfBounds,
    /// A fit produced non-finite coefficients or could not be solved
    NumericallyDegenerate,
}

/// Outcome of validating one hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintVerdict {
    /// The hint sits on an ACF hill
    Accepted,
    /// The hint was dropped
    Rejected(Rejection),
}

impl HintVerdict {
    /// True for [`HintVerdict::Accepted`]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

// ============================================================================
// Shared pipeline
// ============================================================================

/// Validate the input and apply detrending then windowing.
pub(crate) fn prepare_series(
    series: &[f64],
    detrend: Option<&Detrend>,
    window: Option<&Window>,
) -> Result<Vec<f64>> {
    let series = Series::try_from(series)?;
    if series.len() < MIN_SERIES_LEN {
        return Err(PeriodicityError::InsufficientData {
            needed: MIN_SERIES_LEN,
            got: series.len(),
        });
    }

    let values = match detrend {
        Some(d) => d.apply(series.values())?,
        None => series.into_values(),
    };
    match window {
        Some(w) => apply_window(&values, w),
        None => Ok(values),
    }
}

/// Periodogram hints of the prepared series above the permutation threshold.
pub(crate) fn raw_hints(prepared: &[f64], config: &DetectorConfig) -> Result<Vec<f64>> {
    let threshold = power_threshold(prepared, config.k, config.percentile, config.seed)?;
    let hints = period_hints(&periodogram(prepared), prepared.len(), threshold);
    debug!(count = hints.len(), threshold, "period hints");
    Ok(hints)
}

/// Lags of the strict interior local maxima of `acf`.
fn acf_local_maxima(acf: &[f64]) -> Vec<usize> {
    acf.windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Snap each hint to the closest strict local maximum of `acf`.
///
/// Equidistant maxima resolve to the smaller lag. The result is deduplicated
/// and ascending; it is empty when the ACF has no interior maximum.
///
/// # Example
/// ```
/// use anofox_periodicity::detection::refine_to_acf_peaks;
///
/// let acf = [1.0, 0.2, 0.6, 0.1, 0.0, 0.5, 0.3];
/// assert_eq!(refine_to_acf_peaks(&[2.4, 3.5, 6.0], &acf), vec![2, 5]);
/// ```
pub fn refine_to_acf_peaks(hints: &[f64], acf: &[f64]) -> Vec<usize> {
    let maxima = acf_local_maxima(acf);
    hints
        .iter()
        .filter_map(|&hint| {
            maxima
                .iter()
                .copied()
                .min_by(|&a, &b| (a as f64 - hint).abs().total_cmp(&(b as f64 - hint).abs()))
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Attach ACF scores to refined lags.
pub(crate) fn scored_result(periods: Vec<usize>, acf: &[f64], method: &str) -> PeriodicityResult {
    let periods = periods
        .into_iter()
        .map(|period| DetectedPeriod {
            period,
            score: acf.get(period).copied().unwrap_or(f64::NAN),
            source: PeriodSource::Hybrid,
        })
        .collect();
    PeriodicityResult {
        periods,
        method: method.to_string(),
    }
}

/// Full ACF (lags `0..=N`) of the prepared series.
pub(crate) fn full_acf(prepared: &[f64], config: &DetectorConfig) -> Result<Vec<f64>> {
    acf(prepared, prepared.len(), config.correlation)
}

// ============================================================================
// FFT Periodicity Detector
// ============================================================================

/// FFT-based periodicity detector.
///
/// Ranks `round(N / k)` for every non-DC bin `k` by amplitude `|X_k|`, keeps
/// periods shorter than `N / 2` (integer division) and drops repeats of a period
/// already ranked higher. No statistical validation is performed.
#[derive(Debug, Clone, Default)]
pub struct FFTPeriodicityDetector {
    /// Maximum number of periods to return (`None` for all)
    pub max_period_count: Option<usize>,
    /// Window applied before the transform
    pub window: Option<Window>,
}

impl FFTPeriodicityDetector {
    /// Create a new detector
    pub fn new(max_period_count: Option<usize>, window: Option<Window>) -> Self {
        Self {
            max_period_count,
            window,
        }
    }

    /// Cap the number of returned periods
    pub fn with_max_period_count(mut self, count: usize) -> Self {
        self.max_period_count = Some(count);
        self
    }

    /// Set the window
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = Some(window);
        self
    }
}

impl PeriodicityDetector for FFTPeriodicityDetector {
    #[instrument(skip(self, series), fields(n = series.len()))]
    fn detect(&self, series: &[f64]) -> Result<PeriodicityResult> {
        let series = Series::try_from(series)?;
        let values = match &self.window {
            Some(w) => apply_window(series.values(), w)?,
            None => series.into_values(),
        };
        let n = values.len();
        let half = n / 2;

        let mut ranked: Vec<(usize, f64)> = amplitude_spectrum(&values)
            .into_iter()
            .map(|(k, amp)| ((n as f64 / k as f64).round_ties_even() as usize, amp))
            .filter(|&(period, _)| period < half)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut seen = BTreeSet::new();
        let periods: Vec<DetectedPeriod> = ranked
            .into_iter()
            .filter(|&(period, _)| seen.insert(period))
            .take(self.max_period_count.unwrap_or(usize::MAX))
            .map(|(period, amplitude)| DetectedPeriod {
                period,
                score: amplitude,
                source: PeriodSource::Frequency,
            })
            .collect();

        Ok(PeriodicityResult {
            periods,
            method: self.name().to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "FFTPeriodicityDetector"
    }
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Detect periodicity using Autoperiod with the default configuration.
///
/// # Example
/// ```
/// use anofox_periodicity::detection::detect_period;
///
/// let series: Vec<f64> = (0..240)
///     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
///     .collect();
/// let result = detect_period(&series).unwrap();
/// assert_eq!(result.period_values(), vec![12]);
/// ```
pub fn detect_period(series: &[f64]) -> Result<PeriodicityResult> {
    Autoperiod::default().detect(series)
}

/// Detect periodicity using CFD-Autoperiod with the default configuration.
pub fn detect_period_cfd(series: &[f64]) -> Result<PeriodicityResult> {
    CFDAutoperiod::default().detect(series)
}
