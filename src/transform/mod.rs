//! Series preparation transforms.
//!
//! Provides detrending, tapering windows and the low-pass filter used to
//! deflate a series between validation steps.
//!
//! # Example
//!
//! ```
//! use anofox_periodicity::transform::{apply_window, Detrend, Window};
//!
//! let series: Vec<f64> = (0..48).map(|i| i as f64 + (i % 12) as f64).collect();
//!
//! let detrended = Detrend::Linear.apply(&series).unwrap();
//! let windowed = apply_window(&detrended, &Window::Hann).unwrap();
//! assert_eq!(windowed.len(), series.len());
//! ```

pub mod detrend;
pub mod filter;
pub mod window;

pub use detrend::{detrend_constant, detrend_linear, Detrend, DetrendFn};
pub use filter::{lowpass_filtfilt, Section, SosFilter};
pub use window::{apply_window, Window};
