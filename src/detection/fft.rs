//! FFT utilities for periodicity detection.
//!
//! Provides the one-sided Fourier transform of a real signal and the
//! periodogram (power spectral density) used to generate period hints.

use rustfft::{num_complex::Complex64, FftPlanner};

/// Compute the FFT of a real-valued signal.
///
/// Returns the complex frequency domain representation.
/// Only returns the first half (positive frequencies) since
/// the input is real-valued and the spectrum is symmetric.
///
/// # Arguments
/// * `signal` - Input time series (real values)
///
/// # Returns
/// Complex frequency components for bins 0 to N/2
pub fn fft_real(signal: &[f64]) -> Vec<Complex64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    buffer.truncate(n / 2 + 1);
    buffer
}

/// One-sided power spectral density estimate.
///
/// Frequencies are in cycles per sample (`k / N` for bin `k`), powers use
/// density scaling with a unit sampling rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Periodogram {
    /// Bin frequencies, `0.0` to `0.5`
    pub frequencies: Vec<f64>,
    /// Power per bin
    pub powers: Vec<f64>,
}

impl Periodogram {
    /// Compute the periodogram of `signal` with a rectangular window.
    ///
    /// Power at bin `k` is `|X_k|^2 / N`, doubled for every bin that has a
    /// negative-frequency mirror (all but DC and, for even `N`, Nyquist).
    pub fn compute(signal: &[f64]) -> Self {
        let n = signal.len();
        if n == 0 {
            return Self {
                frequencies: Vec::new(),
                powers: Vec::new(),
            };
        }

        let spectrum = fft_real(signal);
        let n_f64 = n as f64;
        let nyquist = if n.is_multiple_of(2) { Some(n / 2) } else { None };

        let (frequencies, powers) = spectrum
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let mut power = c.norm_sqr() / n_f64;
                if k != 0 && Some(k) != nyquist {
                    power *= 2.0;
                }
                (k as f64 / n_f64, power)
            })
            .unzip();

        Self {
            frequencies,
            powers,
        }
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.powers.len()
    }

    /// True when there are no bins.
    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    /// Largest power over all bins (`NaN` for an empty periodogram).
    pub fn max_power(&self) -> f64 {
        if self.powers.is_empty() {
            return f64::NAN;
        }
        self.powers.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Iterate over `(frequency, power)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.powers.iter().copied())
    }
}

/// Compute the periodogram of a signal.
///
/// Shorthand for [`Periodogram::compute`].
pub fn periodogram(signal: &[f64]) -> Periodogram {
    Periodogram::compute(signal)
}

/// Amplitude `|X_k|` of every non-DC one-sided bin, as `(k, amplitude)`.
pub fn amplitude_spectrum(signal: &[f64]) -> Vec<(usize, f64)> {
    fft_real(signal)
        .iter()
        .enumerate()
        .skip(1)
        .map(|(k, c)| (k, c.norm()))
        .collect()
}
