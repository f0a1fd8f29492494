//! Butterworth low-pass filtering in second-order sections.
//!
//! The design follows the classic route: analog Butterworth prototype,
//! frequency pre-warping, bilinear transform, then grouping of conjugate pole
//! pairs into biquads. Zero-phase filtering runs the cascade forward and
//! backward over an odd-extended copy of the signal, starting each pass from
//! the steady-state section states.

use crate::error::{PeriodicityError, Result};
use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

/// One biquad: `b = [b0, b1, b2]`, `a = [1, a1, a2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Section {
    /// Numerator coefficients
    pub b: [f64; 3],
    /// Denominator coefficients, `a[0]` normalized to 1
    pub a: [f64; 3],
}

impl Section {
    fn is_first_order(&self) -> bool {
        self.b[2] == 0.0 && self.a[2] == 0.0
    }

    fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }

    /// Steady-state state vector for a unit step input.
    fn step_state(&self) -> [f64; 2] {
        let [b0, b1, b2] = self.b;
        let [_, a1, a2] = self.a;
        let rhs0 = b1 - a1 * b0;
        let rhs1 = b2 - a2 * b0;
        let z0 = (rhs0 + rhs1) / (1.0 + a1 + a2);
        [z0, rhs1 - a2 * z0]
    }
}

/// Cascade of second-order sections.
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<Section>,
}

impl SosFilter {
    /// Design a digital Butterworth low-pass filter.
    ///
    /// `cutoff` is normalized to the Nyquist frequency and must lie in `(0, 1)`.
    ///
    /// # Errors
    /// `InvalidParameter` for a zero order or a cutoff outside `(0, 1)`.
    pub fn butterworth_lowpass(order: usize, cutoff: f64) -> Result<Self> {
        if order == 0 {
            return Err(PeriodicityError::InvalidParameter(
                "filter order must be positive".into(),
            ));
        }
        if !(cutoff > 0.0 && cutoff < 1.0) {
            return Err(PeriodicityError::InvalidParameter(format!(
                "cutoff must be in (0, 1) relative to Nyquist, got {}",
                cutoff
            )));
        }

        // Pre-warped analog cutoff for the bilinear transform with fs = 2
        let fs2 = 4.0;
        let warped = fs2 * (PI * cutoff / 2.0).tan();

        // Analog prototype poles on the left half of the unit circle, scaled
        let analog: Vec<Complex64> = (0..order)
            .map(|k| {
                let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
                Complex64::from_polar(1.0, theta) * warped
            })
            .collect();

        // Bilinear transform: all zeros move to z = -1
        let digital: Vec<Complex64> = analog
            .iter()
            .map(|&p| (Complex64::new(fs2, 0.0) + p) / (Complex64::new(fs2, 0.0) - p))
            .collect();
        let denom: Complex64 = analog
            .iter()
            .map(|&p| Complex64::new(fs2, 0.0) - p)
            .product();
        let gain = warped.powi(order as i32) / denom.re;

        let mut sections = Vec::with_capacity(order.div_ceil(2));
        for p in digital.iter().filter(|p| p.im > 1e-12) {
            sections.push(Section {
                b: [1.0, 2.0, 1.0],
                a: [1.0, -2.0 * p.re, p.norm_sqr()],
            });
        }
        if order % 2 == 1 {
            let real = digital
                .iter()
                .min_by(|a, b| a.im.abs().total_cmp(&b.im.abs()))
                .map(|p| p.re)
                .unwrap_or(0.0);
            sections.push(Section {
                b: [1.0, 1.0, 0.0],
                a: [1.0, -real, 0.0],
            });
        }
        // Poles closest to the unit circle go last
        sections.sort_by(|x, y| x.a[2].abs().total_cmp(&y.a[2].abs()));
        if let Some(first) = sections.first_mut() {
            for b in first.b.iter_mut() {
                *b *= gain;
            }
        }

        Ok(Self { sections })
    }

    /// The filter sections.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Steady-state gain at zero frequency.
    pub fn dc_gain(&self) -> f64 {
        self.sections.iter().map(Section::dc_gain).product()
    }

    /// Padding length used by [`SosFilter::filtfilt`].
    pub fn pad_len(&self) -> usize {
        let first_order = self.sections.iter().filter(|s| s.is_first_order()).count();
        3 * (2 * self.sections.len() + 1 - first_order)
    }

    /// Initial section states for a step of unit height.
    fn step_states(&self) -> Vec<[f64; 2]> {
        let mut scale = 1.0;
        self.sections
            .iter()
            .map(|s| {
                let [z0, z1] = s.step_state();
                let state = [scale * z0, scale * z1];
                scale *= s.dc_gain();
                state
            })
            .collect()
    }

    /// Run the cascade over `x` (transposed direct form II), starting from `states`.
    fn run(&self, x: &mut [f64], mut states: Vec<[f64; 2]>) {
        for (section, z) in self.sections.iter().zip(states.iter_mut()) {
            let [b0, b1, b2] = section.b;
            let [_, a1, a2] = section.a;
            for v in x.iter_mut() {
                let input = *v;
                let output = b0 * input + z[0];
                z[0] = b1 * input - a1 * output + z[1];
                z[1] = b2 * input - a2 * output;
                *v = output;
            }
        }
    }

    /// Causal filtering from a zero state.
    pub fn filter(&self, x: &[f64]) -> Vec<f64> {
        let mut y = x.to_vec();
        self.run(&mut y, vec![[0.0; 2]; self.sections.len()]);
        y
    }

    /// Zero-phase forward-backward filtering with odd extension at both ends.
    ///
    /// # Errors
    /// `InsufficientData` when `x` is not longer than [`SosFilter::pad_len`].
    pub fn filtfilt(&self, x: &[f64]) -> Result<Vec<f64>> {
        let pad = self.pad_len();
        let n = x.len();
        if n <= pad {
            return Err(PeriodicityError::InsufficientData {
                needed: pad + 1,
                got: n,
            });
        }

        let first = x[0];
        let last = x[n - 1];
        let mut ext = Vec::with_capacity(n + 2 * pad);
        ext.extend((1..=pad).rev().map(|i| 2.0 * first - x[i]));
        ext.extend_from_slice(x);
        ext.extend((1..=pad).map(|i| 2.0 * last - x[n - 1 - i]));

        let zi = self.step_states();
        let scaled = |k: f64| zi.iter().map(|z| [z[0] * k, z[1] * k]).collect::<Vec<_>>();

        let x0 = ext[0];
        self.run(&mut ext, scaled(x0));

        ext.reverse();
        let y0 = ext[0];
        self.run(&mut ext, scaled(y0));
        ext.reverse();

        Ok(ext[pad..pad + n].to_vec())
    }
}

/// Fifth-order zero-phase Butterworth low-pass at `cutoff` (relative to Nyquist).
pub fn lowpass_filtfilt(x: &[f64], cutoff: f64) -> Result<Vec<f64>> {
    SosFilter::butterworth_lowpass(5, cutoff)?.filtfilt(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sine(n: usize, period: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * i as f64 / period).sin())
            .collect()
    }

    #[test]
    fn fifth_order_layout() {
        let filter = SosFilter::butterworth_lowpass(5, 0.2).unwrap();
        assert_eq!(filter.sections().len(), 3);
        assert_eq!(filter.pad_len(), 18);
        assert_relative_eq!(filter.dc_gain(), 1.0, epsilon = 1e-9);
        // Stable: every pole inside the unit circle
        for s in filter.sections() {
            assert!(s.a[2].abs() < 1.0);
            assert!(s.a[1].abs() < 1.0 + s.a[2]);
        }
    }

    #[test]
    fn second_order_matches_reference_coefficients() {
        // Reference: butter(2, 0.5) -> b = [0.2929, 0.5858, 0.2929], a = [1, 0, 0.1716]
        let filter = SosFilter::butterworth_lowpass(2, 0.5).unwrap();
        let s = filter.sections()[0];
        assert_relative_eq!(s.b[0], 0.29289321881345254, epsilon = 1e-10);
        assert_relative_eq!(s.b[1], 0.5857864376269051, epsilon = 1e-10);
        assert_relative_eq!(s.a[1], 0.0, epsilon = 1e-10);
        assert_relative_eq!(s.a[2], 0.17157287525381, epsilon = 1e-10);
    }

    #[test]
    fn rejects_invalid_cutoff() {
        assert!(SosFilter::butterworth_lowpass(5, 0.0).is_err());
        assert!(SosFilter::butterworth_lowpass(5, 1.0).is_err());
        assert!(SosFilter::butterworth_lowpass(5, f64::NAN).is_err());
        assert!(SosFilter::butterworth_lowpass(0, 0.5).is_err());
    }

    #[test]
    fn filtfilt_preserves_constant_signal() {
        let x = vec![3.5; 100];
        let y = lowpass_filtfilt(&x, 0.1).unwrap();
        for v in y {
            assert_relative_eq!(v, 3.5, epsilon = 1e-8);
        }
    }

    #[test]
    fn filtfilt_removes_fast_component_keeps_slow() {
        // Slow period 100 (0.02 of Nyquist), fast period 4 (0.5 of Nyquist)
        let n = 400;
        let slow = sine(n, 100.0);
        let fast = sine(n, 4.0);
        let x: Vec<f64> = slow.iter().zip(&fast).map(|(a, b)| a + b).collect();

        let y = lowpass_filtfilt(&x, 0.1).unwrap();
        assert_eq!(y.len(), n);
        // Away from the edges the output follows the slow component
        for i in 50..350 {
            assert!(
                (y[i] - slow[i]).abs() < 0.05,
                "sample {} deviates: {} vs {}",
                i,
                y[i],
                slow[i]
            );
        }
    }

    #[test]
    fn filtfilt_needs_more_samples_than_padding() {
        let err = lowpass_filtfilt(&[1.0; 18], 0.3).unwrap_err();
        assert_eq!(
            err,
            PeriodicityError::InsufficientData {
                needed: 19,
                got: 18
            }
        );
    }

    #[test]
    fn causal_filter_settles_to_dc_gain() {
        let filter = SosFilter::butterworth_lowpass(3, 0.3).unwrap();
        let y = filter.filter(&[1.0; 200]);
        assert_relative_eq!(y[199], 1.0, epsilon = 1e-8);
    }
}
