//! # anofox-periodicity
//!
//! Automatic period detection for univariate, evenly spaced time series.
//!
//! Provides the Autoperiod and CFD-Autoperiod detectors, which validate
//! periodogram candidates on the autocorrelation function, a plain FFT
//! amplitude ranker, and the building blocks they use: detrending,
//! tapering windows, a zero-phase Butterworth low-pass filter and
//! least-squares fits.
//!
//! # Example
//!
//! ```
//! use anofox_periodicity::prelude::*;
//!
//! let series: Vec<f64> = (0..240)
//!     .map(|i| 0.1 * i as f64 + 3.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
//!     .collect();
//!
//! let detector = Autoperiod::new(DetectorConfig::default().with_seed(42));
//! assert_eq!(detector.fit(&series).unwrap(), vec![12]);
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod detection;
pub mod error;
pub mod transform;
pub mod utils;

pub use error::{PeriodicityError, Result};

pub mod prelude {
    pub use crate::core::Series;
    pub use crate::detection::{
        detect_period, detect_period_cfd, Autoperiod, CFDAutoperiod, Correlation, DetectorConfig,
        FFTPeriodicityDetector, PeriodicityDetector, PeriodicityResult,
    };
    pub use crate::error::{PeriodicityError, Result};
    pub use crate::transform::{Detrend, Window};
}
