//! Autoperiod detector (Vlachos et al. 2005).
//!
//! Hybrid method: periodogram peaks above a permutation threshold give
//! period hints, and each hint is kept only if the ACF around it looks like
//! a hill. The hill test fits two lines to the ACF window implied by the
//! hint's DFT bin, with the breakpoint chosen to minimize the total absolute
//! residual; a rising first line and falling second line accept the hint.
//!
//! Reference: "On Periodicity Detection and Structural Periodic Similarity"
//! Vlachos, Yu, Castelli (SDM 2005)

use super::config::DetectorConfig;
use super::periodicity::{
    full_acf, prepare_series, raw_hints, refine_to_acf_peaks, scored_result, HintVerdict,
    PeriodicityDetector, PeriodicityResult, Rejection,
};
use crate::error::Result;
use crate::utils::ols::{linear_fit, LineFit};
use tracing::{debug, instrument, trace};

/// Autoperiod detector.
///
/// # Example
/// ```
/// use anofox_periodicity::detection::{Autoperiod, DetectorConfig, PeriodicityDetector};
///
/// let series: Vec<f64> = (0..240)
///     .map(|i| 0.05 * i as f64 + (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
///     .collect();
/// let detector = Autoperiod::new(DetectorConfig::default().with_seed(1));
/// assert_eq!(detector.fit(&series).unwrap(), vec![12]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Autoperiod {
    config: DetectorConfig,
}

/// Best two-segment fit of an ACF window.
#[derive(Debug, Clone, Copy)]
struct SplitFit {
    split: usize,
    rising: LineFit,
    falling: LineFit,
    error: f64,
}

impl Autoperiod {
    /// Create a detector with the given configuration
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// The detector configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// ACF lag window `[start, end]` around hint `p` for a series of length `n`.
    ///
    /// The bounds cover the periods that fall into the same DFT bin as `p`:
    /// `start = floor((p + n/(q+1))/2 - 1)`, `end = ceil((p + n/(q-1))/2 + 1)`
    /// with `q = n/p`. `None` when a bound is not finite or is negative.
    pub fn hint_window(n: usize, hint: f64) -> Option<(usize, usize)> {
        let n = n as f64;
        let q = n / hint;
        let start = ((hint + n / (q + 1.0)) / 2.0 - 1.0).floor();
        let end = ((hint + n / (q - 1.0)) / 2.0 + 1.0).ceil();
        if !(start.is_finite() && end.is_finite()) || start < 0.0 || end < start {
            return None;
        }
        Some((start as usize, end as usize))
    }

    /// Decide whether `hint` sits on a hill of `acf` (full ACF of a series of length `n`).
    pub fn validate_hint(&self, acf: &[f64], n: usize, hint: f64) -> HintVerdict {
        let Some((start, end)) = Self::hint_window(n, hint) else {
            debug!(hint, "hint window is not finite");
            return HintVerdict::Rejected(Rejection::WindowOutOfBounds);
        };
        // Both segments need at least two points
        if end >= acf.len() || end < start + 3 {
            debug!(hint, start, end, lags = acf.len(), "hint window out of bounds");
            return HintVerdict::Rejected(Rejection::WindowOutOfBounds);
        }

        let Some(best) = best_split(acf, start, end) else {
            debug!(hint, start, end, "degenerate segment fit");
            return HintVerdict::Rejected(Rejection::NumericallyDegenerate);
        };
        trace!(
            hint,
            split = best.split,
            error = best.error,
            rising = best.rising.slope,
            falling = best.falling.slope,
            "best split"
        );

        if best.rising.slope > 0.0 && best.falling.slope < 0.0 {
            HintVerdict::Accepted
        } else {
            HintVerdict::Rejected(Rejection::NotAPeak)
        }
    }
}

/// Exhaustive search of the breakpoint `s` in `start+2..end`, fitting lines to
/// `acf[start..s]` and `acf[s..=end]`. Ties keep the earliest split.
///
/// `None` when any candidate fit is not finite.
fn best_split(acf: &[f64], start: usize, end: usize) -> Option<SplitFit> {
    let lags: Vec<f64> = (0..=end).map(|lag| lag as f64).collect();

    let mut best: Option<SplitFit> = None;
    for split in (start + 2)..end {
        let (x1, y1) = (&lags[start..split], &acf[start..split]);
        let (x2, y2) = (&lags[split..=end], &acf[split..=end]);
        let rising = linear_fit(x1, y1).ok()?;
        let falling = linear_fit(x2, y2).ok()?;
        if !(rising.is_finite() && falling.is_finite()) {
            return None;
        }

        let error = rising.abs_residual_sum(x1, y1) + falling.abs_residual_sum(x2, y2);
        if best.is_none_or(|b| error < b.error) {
            best = Some(SplitFit {
                split,
                rising,
                falling,
                error,
            });
        }
    }
    best
}

impl PeriodicityDetector for Autoperiod {
    #[instrument(skip(self, series), fields(n = series.len()))]
    fn detect(&self, series: &[f64]) -> Result<PeriodicityResult> {
        self.config.validate()?;
        let prepared = prepare_series(
            series,
            self.config.detrend.as_ref(),
            self.config.window.as_ref(),
        )?;
        let n = prepared.len();

        let hints = raw_hints(&prepared, &self.config)?;
        let acf = full_acf(&prepared, &self.config)?;

        let valid: Vec<f64> = hints
            .into_iter()
            .filter(|&hint| {
                let verdict = self.validate_hint(&acf, n, hint);
                debug!(hint, ?verdict, "hint verdict");
                verdict.is_accepted()
            })
            .collect();

        let periods = refine_to_acf_peaks(&valid, &acf);
        debug!(?periods, "refined periods");
        Ok(scored_result(periods, &acf, self.name()))
    }

    fn name(&self) -> &'static str {
        "Autoperiod"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::acf::{acf, Correlation};
    use crate::error::PeriodicityError;
    use crate::transform::Detrend;

    fn generate_sine(n: usize, period: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin())
            .collect()
    }

    #[test]
    fn hint_window_brackets_hint() {
        // p = 12, n = 240: q = 20, start = floor((12 + 240/21)/2 - 1) = 10,
        // end = ceil((12 + 240/19)/2 + 1) = 14
        assert_eq!(Autoperiod::hint_window(240, 12.0), Some((10, 14)));
    }

    #[test]
    fn hint_window_of_full_length_hint_is_unbounded() {
        assert_eq!(Autoperiod::hint_window(100, 100.0), None);
    }

    #[test]
    fn accepts_hill_and_rejects_valley() {
        let series = generate_sine(240, 12);
        let acf_arr = acf(&series, 240, Correlation::Pearson).unwrap();
        let detector = Autoperiod::default();

        assert_eq!(detector.validate_hint(&acf_arr, 240, 12.0), HintVerdict::Accepted);
        // Lag 6 is an ACF trough
        assert_eq!(
            detector.validate_hint(&acf_arr, 240, 6.0),
            HintVerdict::Rejected(Rejection::NotAPeak)
        );
    }

    #[test]
    fn window_past_acf_end_is_rejected() {
        let series = generate_sine(40, 10);
        let acf_arr = acf(&series, 40, Correlation::Pearson).unwrap();
        assert_eq!(
            Autoperiod::default().validate_hint(&acf_arr, 40, 40.0),
            HintVerdict::Rejected(Rejection::WindowOutOfBounds)
        );
        // p = 20: q = 2, end = ceil((20 + 40)/2 + 1) = 31, inside; p = 40/1.5 leaves the range
        assert_eq!(
            Autoperiod::default().validate_hint(&acf_arr, 40, 40.0 / 1.5),
            HintVerdict::Rejected(Rejection::WindowOutOfBounds)
        );
    }

    #[test]
    fn nan_acf_window_is_degenerate() {
        let mut acf_arr = vec![0.0; 41];
        for (lag, v) in acf_arr.iter_mut().enumerate() {
            *v = (lag as f64 * 0.5).cos();
        }
        acf_arr[12] = f64::NAN;
        assert_eq!(
            Autoperiod::default().validate_hint(&acf_arr, 40, 10.0),
            HintVerdict::Rejected(Rejection::NumericallyDegenerate)
        );
    }

    #[test]
    fn detects_sine_period() {
        let series = generate_sine(240, 12);
        let detector = Autoperiod::new(DetectorConfig::default().with_seed(7));
        let result = detector.detect(&series).unwrap();

        assert_eq!(result.period_values(), vec![12]);
        assert!(result.periods[0].score > 0.9);
    }

    #[test]
    fn seeded_detection_is_deterministic() {
        let series: Vec<f64> = (0..180)
            .map(|i| {
                let t = i as f64;
                0.02 * t + (2.0 * std::f64::consts::PI * t / 9.0).sin() + 0.3 * (t * 1.3).sin()
            })
            .collect();
        let detector = Autoperiod::new(DetectorConfig::default().with_seed(11));
        assert_eq!(detector.fit(&series).unwrap(), detector.fit(&series).unwrap());
    }

    #[test]
    fn invalid_config_fails_before_computation() {
        let detector = Autoperiod::new(DetectorConfig::default().with_k(0));
        assert!(matches!(
            detector.detect(&[]),
            Err(PeriodicityError::InvalidParameter(_))
        ));
    }

    #[test]
    fn short_series_is_rejected() {
        let detector = Autoperiod::default();
        assert_eq!(
            detector.detect(&[1.0, 2.0]).unwrap_err(),
            PeriodicityError::InsufficientData { needed: 4, got: 2 }
        );
    }

    #[test]
    fn custom_detrend_must_keep_length() {
        let detector = Autoperiod::new(
            DetectorConfig::default().with_detrend(Some(Detrend::custom(|x| x[1..].to_vec()))),
        );
        assert!(matches!(
            detector.detect(&generate_sine(48, 12)),
            Err(PeriodicityError::InvalidParameter(_))
        ));
    }
}
