//! CFD-Autoperiod detector (Puech et al. 2020).
//!
//! Clustered Filtered Detrended Autoperiod improves on Autoperiod by:
//! - clustering hints that alias to the same DFT neighbourhood into one centroid
//! - validating each centroid with a concave quadratic fit of the local ACF
//! - low-pass filtering the series after every accepted centroid, so longer
//!   candidates are tested without the shorter period's energy
//!
//! Centroids are processed from shortest to longest; the filtered series is
//! threaded through the validation as the fold accumulator.
//!
//! Reference: "A fully automated periodicity detection in time series"
//! Puech, Boussard, D'Amato, Millerand (AALTD Workshop 2019)

use super::acf::acf_lags;
use super::config::DetectorConfig;
use super::hints::cluster_period_hints;
use super::periodicity::{
    full_acf, prepare_series, raw_hints, refine_to_acf_peaks, scored_result, HintVerdict,
    PeriodicityDetector, PeriodicityResult, Rejection,
};
use crate::error::Result;
use crate::transform::{lowpass_filtfilt, Detrend};
use crate::utils::ols::polyfit;
use tracing::{debug, instrument, trace};

/// CFD-Autoperiod detector.
///
/// Without a configured detrend, linear detrending is used for both the
/// series and the local ACF windows.
///
/// # Example
/// ```
/// use anofox_periodicity::detection::{CFDAutoperiod, DetectorConfig, PeriodicityDetector};
///
/// let series: Vec<f64> = (0..240)
///     .map(|i| 0.05 * i as f64 + (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
///     .collect();
/// let detector = CFDAutoperiod::new(DetectorConfig::default().with_seed(1));
/// assert_eq!(detector.fit(&series).unwrap(), vec![12]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CFDAutoperiod {
    config: DetectorConfig,
}

impl CFDAutoperiod {
    /// Create a detector with the given configuration
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// The detector configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn detrend(&self) -> Detrend {
        self.config.detrend.clone().unwrap_or_default()
    }

    /// Lags `floor(h/2) ..= ceil(h + h/2)` examined for centroid `h`.
    pub fn hint_range(hint: f64) -> (usize, usize) {
        let lo = (hint / 2.0).floor().max(0.0);
        let hi = (hint + hint / 2.0).ceil().max(0.0);
        (lo as usize, hi as usize)
    }

    /// Low-pass cutoff (relative to Nyquist) applied after accepting `hint`:
    /// `1 / (n / (n/h + 1) - 1)`.
    pub fn deflation_cutoff(n: usize, hint: f64) -> f64 {
        let n = n as f64;
        1.0 / (n / (n / hint + 1.0) - 1.0)
    }

    /// Decide whether centroid `hint` is a concave ACF lobe of `working`.
    ///
    /// # Errors
    /// Propagates a custom detrend that changes the window length.
    pub fn validate_hint(&self, working: &[f64], hint: f64) -> Result<HintVerdict> {
        let (lo, hi) = Self::hint_range(hint);
        if !hint.is_finite() || hi > working.len() || hi < lo + 2 {
            debug!(hint, lo, hi, n = working.len(), "hint range out of bounds");
            return Ok(HintVerdict::Rejected(Rejection::WindowOutOfBounds));
        }

        let lags: Vec<usize> = (lo..=hi).collect();
        let local = acf_lags(working, &lags, self.config.correlation)?;
        let local = self.detrend().apply(&local)?;
        let x: Vec<f64> = lags.iter().map(|&lag| lag as f64).collect();

        let poly = match polyfit(&x, &local, 2) {
            Ok(p) if p.is_finite() => p,
            _ => {
                debug!(hint, "degenerate quadratic fit");
                return Ok(HintVerdict::Rejected(Rejection::NumericallyDegenerate));
            }
        };

        let leading = poly.leading_coefficient();
        let vertex = poly.deriv().linear_root();
        trace!(hint, leading, ?vertex, "quadratic fit");

        let in_range = vertex
            .map(f64::trunc)
            .is_some_and(|v| v >= lo as f64 && v <= hi as f64);
        if leading < 0.0 && in_range {
            Ok(HintVerdict::Accepted)
        } else {
            Ok(HintVerdict::Rejected(Rejection::NotAPeak))
        }
    }

    /// Low-pass `working` after accepting `hint`.
    ///
    /// Cutoffs outside `(0, 1)` leave the series unchanged.
    fn deflate(&self, working: Vec<f64>, hint: f64) -> Result<Vec<f64>> {
        let cutoff = Self::deflation_cutoff(working.len(), hint);
        if !(cutoff > 0.0 && cutoff < 1.0) {
            debug!(hint, cutoff, "cutoff outside (0, 1), skipping deflation");
            return Ok(working);
        }
        debug!(hint, cutoff, "deflating series");
        lowpass_filtfilt(&working, cutoff)
    }
}

impl PeriodicityDetector for CFDAutoperiod {
    #[instrument(skip(self, series), fields(n = series.len()))]
    fn detect(&self, series: &[f64]) -> Result<PeriodicityResult> {
        self.config.validate()?;
        let detrend = self.detrend();
        let prepared = prepare_series(series, Some(&detrend), self.config.window.as_ref())?;
        let n = prepared.len();

        let hints = raw_hints(&prepared, &self.config)?;
        let centroids = cluster_period_hints(&hints, n);
        debug!(count = centroids.len(), "hint centroids");

        let last = centroids.len().saturating_sub(1);
        let (_, valid) = centroids.iter().enumerate().try_fold(
            (prepared.clone(), Vec::new()),
            |(working, mut valid), (i, &hint)| -> Result<(Vec<f64>, Vec<f64>)> {
                let verdict = self.validate_hint(&working, hint)?;
                debug!(hint, ?verdict, "centroid verdict");
                if !verdict.is_accepted() {
                    return Ok((working, valid));
                }
                valid.push(hint);
                // No centroid is validated against the series filtered after the last one
                if i == last {
                    return Ok((working, valid));
                }
                Ok((self.deflate(working, hint)?, valid))
            },
        )?;

        let acf = full_acf(&prepared, &self.config)?;
        let periods = refine_to_acf_peaks(&valid, &acf);
        debug!(?periods, "refined periods");
        Ok(scored_result(periods, &acf, self.name()))
    }

    fn name(&self) -> &'static str {
        "CFDAutoperiod"
    }
}
