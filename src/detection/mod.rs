//! Periodicity detection.
//!
//! This module provides:
//! - Autocorrelation with Pearson, Spearman or Kendall coefficients
//! - FFT and periodogram primitives
//! - The permutation power threshold and periodogram hints
//! - The Autoperiod and CFD-Autoperiod validated detectors
//! - A plain FFT amplitude ranker

mod acf;
mod autoperiod;
mod cfd_autoperiod;
mod config;
pub mod fft;
mod hints;
mod periodicity;
mod threshold;

pub use acf::{acf, acf_lags, Correlation};
pub use autoperiod::Autoperiod;
pub use cfd_autoperiod::CFDAutoperiod;
pub use config::DetectorConfig;
pub use fft::{amplitude_spectrum, fft_real, periodogram, Periodogram};
pub use hints::{cluster_period_hints, period_hints};
pub use periodicity::{
    detect_period, detect_period_cfd, refine_to_acf_peaks, DetectedPeriod, FFTPeriodicityDetector,
    HintVerdict, PeriodSource, PeriodicityDetector, PeriodicityResult, Rejection, MIN_SERIES_LEN,
};
pub use threshold::power_threshold;
