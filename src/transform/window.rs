//! Tapering window functions for spectral analysis.
//!
//! Windows are generated in periodic (DFT-even) form: a symmetric window of
//! length `n + 1` with the last sample dropped, which is the form wanted when
//! the windowed series is fed to an FFT.

use crate::error::{PeriodicityError, Result};
use std::f64::consts::PI;
use std::str::FromStr;

/// A tapering window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Window {
    /// Rectangular window (no tapering)
    Boxcar,
    /// Triangular window without zero end points
    Triang,
    /// Triangular window with zero end points
    Bartlett,
    /// Hann (raised cosine)
    Hann,
    /// Hamming
    Hamming,
    /// Three-term Blackman
    Blackman,
    /// Minimum four-term Blackman-Harris
    BlackmanHarris,
    /// Nuttall's minimum four-term Blackman-Harris variant
    Nuttall,
    /// Flat top, for amplitude accuracy
    FlatTop,
    /// Bohman
    Bohman,
    /// Simple cosine (sine) window
    Cosine,
    /// Modified Bartlett-Hann
    BartHann,
    /// Parzen (de la Vallée Poussin)
    Parzen,
    /// Tapered cosine; `alpha` is the fraction of the window inside the taper
    Tukey { alpha: f64 },
    /// Kaiser; `beta` controls the main lobe / side lobe trade-off
    Kaiser { beta: f64 },
    /// Gaussian with standard deviation `std` in samples
    Gaussian { std: f64 },
    /// Exponential (Poisson) decay with time constant `tau`, centred
    Exponential { tau: f64 },
}

impl Window {
    /// Window coefficients of length `len`.
    ///
    /// # Errors
    /// `InvalidParameter` for a non-finite or out-of-range shape parameter.
    pub fn coefficients(&self, len: usize) -> Result<Vec<f64>> {
        self.validate()?;
        match len {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![1.0]),
            _ => {}
        }
        // Periodic form: symmetric window of len + 1, last sample dropped
        let mut w = self.symmetric(len + 1);
        w.truncate(len);
        Ok(w)
    }

    /// Check the shape parameter of parameterized windows.
    ///
    /// # Errors
    /// `InvalidParameter` for a non-finite or out-of-range parameter.
    pub fn validate(&self) -> Result<()> {
        let (name, value, ok) = match *self {
            Self::Tukey { alpha } => ("tukey alpha", alpha, alpha.is_finite()),
            Self::Kaiser { beta } => ("kaiser beta", beta, beta.is_finite() && beta >= 0.0),
            Self::Gaussian { std } => ("gaussian std", std, std.is_finite() && std > 0.0),
            Self::Exponential { tau } => ("exponential tau", tau, tau.is_finite() && tau > 0.0),
            _ => return Ok(()),
        };
        if ok {
            Ok(())
        } else {
            Err(PeriodicityError::InvalidParameter(format!(
                "{} must be a valid positive number, got {}",
                name, value
            )))
        }
    }

    fn symmetric(&self, m: usize) -> Vec<f64> {
        let mf = m as f64;
        match *self {
            Self::Boxcar => vec![1.0; m],
            Self::Triang => {
                let half = m.div_ceil(2);
                let rising: Vec<f64> = (1..=half)
                    .map(|n| {
                        if m % 2 == 0 {
                            (2 * n - 1) as f64 / mf
                        } else {
                            2.0 * n as f64 / (mf + 1.0)
                        }
                    })
                    .collect();
                let skip = if m % 2 == 0 { 0 } else { 1 };
                rising
                    .iter()
                    .copied()
                    .chain(rising.iter().rev().skip(skip).copied())
                    .collect()
            }
            Self::Bartlett => (0..m)
                .map(|n| {
                    let n = n as f64;
                    if n <= (mf - 1.0) / 2.0 {
                        2.0 * n / (mf - 1.0)
                    } else {
                        2.0 - 2.0 * n / (mf - 1.0)
                    }
                })
                .collect(),
            Self::Hann => general_cosine(m, &[0.5, 0.5]),
            Self::Hamming => general_cosine(m, &[0.54, 0.46]),
            Self::Blackman => general_cosine(m, &[0.42, 0.50, 0.08]),
            Self::BlackmanHarris => general_cosine(m, &[0.35875, 0.48829, 0.14128, 0.01168]),
            Self::Nuttall => general_cosine(m, &[0.3635819, 0.4891775, 0.1365995, 0.0106411]),
            Self::FlatTop => general_cosine(
                m,
                &[
                    0.21557895,
                    0.41663158,
                    0.277263158,
                    0.083578947,
                    0.006947368,
                ],
            ),
            Self::Bohman => (0..m)
                .map(|n| {
                    if n == 0 || n == m - 1 {
                        return 0.0;
                    }
                    let fac = (-1.0 + 2.0 * n as f64 / (mf - 1.0)).abs();
                    (1.0 - fac) * (PI * fac).cos() + (PI * fac).sin() / PI
                })
                .collect(),
            Self::Cosine => (0..m).map(|n| (PI / mf * (n as f64 + 0.5)).sin()).collect(),
            Self::BartHann => (0..m)
                .map(|n| {
                    let fac = (n as f64 / (mf - 1.0) - 0.5).abs();
                    0.62 - 0.48 * fac + 0.38 * (2.0 * PI * fac).cos()
                })
                .collect(),
            Self::Parzen => (0..m)
                .map(|n| {
                    let x = (n as f64 - (mf - 1.0) / 2.0).abs();
                    let r = x / (mf / 2.0);
                    if x <= (mf - 1.0) / 4.0 {
                        1.0 - 6.0 * r.powi(2) + 6.0 * r.powi(3)
                    } else {
                        2.0 * (1.0 - r).powi(3)
                    }
                })
                .collect(),
            Self::Tukey { alpha } => tukey(m, alpha),
            Self::Kaiser { beta } => {
                let denom = bessel_i0(beta);
                (0..m)
                    .map(|n| {
                        let ratio = 2.0 * n as f64 / (mf - 1.0) - 1.0;
                        bessel_i0(beta * (1.0 - ratio * ratio).max(0.0).sqrt()) / denom
                    })
                    .collect()
            }
            Self::Gaussian { std } => (0..m)
                .map(|n| {
                    let x = n as f64 - (mf - 1.0) / 2.0;
                    (-x * x / (2.0 * std * std)).exp()
                })
                .collect(),
            Self::Exponential { tau } => {
                let center = (mf - 1.0) / 2.0;
                (0..m)
                    .map(|n| (-(n as f64 - center).abs() / tau).exp())
                    .collect()
            }
        }
    }
}

impl FromStr for Window {
    type Err = PeriodicityError;

    /// Parse a window name, optionally followed by `:parameter`
    /// (e.g. `"tukey:0.25"`, `"kaiser:8.6"`).
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        let (name, param) = match lowered.split_once(':') {
            Some((name, value)) => {
                let value: f64 = value.trim().parse().map_err(|_| {
                    PeriodicityError::InvalidParameter(format!(
                        "invalid window parameter in '{}'",
                        s
                    ))
                })?;
                (name.trim().to_string(), Some(value))
            }
            None => (lowered, None),
        };

        let requires = |what: &str| {
            PeriodicityError::InvalidParameter(format!("window '{}' requires a {}", name, what))
        };

        let window = match name.as_str() {
            "boxcar" | "box" | "ones" | "rect" | "rectangular" => Self::Boxcar,
            "triang" | "triangle" | "tri" => Self::Triang,
            "bartlett" | "bart" | "brt" => Self::Bartlett,
            "hann" | "han" => Self::Hann,
            "hamming" | "hamm" | "ham" => Self::Hamming,
            "blackman" | "black" | "blk" => Self::Blackman,
            "blackmanharris" | "blackharr" | "bkh" => Self::BlackmanHarris,
            "nuttall" | "nutl" | "nut" => Self::Nuttall,
            "flattop" | "flat" | "flt" => Self::FlatTop,
            "bohman" | "bman" | "bmn" => Self::Bohman,
            "cosine" | "halfcosine" => Self::Cosine,
            "barthann" | "brthan" | "bth" => Self::BartHann,
            "parzen" | "parz" | "par" => Self::Parzen,
            "tukey" | "tuk" => Self::Tukey {
                alpha: param.unwrap_or(0.5),
            },
            "exponential" | "poisson" => Self::Exponential {
                tau: param.unwrap_or(1.0),
            },
            "kaiser" | "ksr" => Self::Kaiser {
                beta: param.ok_or_else(|| requires("beta parameter"))?,
            },
            "gaussian" | "gauss" | "gss" => Self::Gaussian {
                std: param.ok_or_else(|| requires("std parameter"))?,
            },
            other => {
                return Err(PeriodicityError::InvalidParameter(format!(
                    "unknown window '{}'",
                    other
                )))
            }
        };
        window.validate()?;
        Ok(window)
    }
}

/// Multiply `series` element-wise by the window of matching length.
pub fn apply_window(series: &[f64], window: &Window) -> Result<Vec<f64>> {
    let w = window.coefficients(series.len())?;
    Ok(series.iter().zip(&w).map(|(x, w)| x * w).collect())
}

/// Sum of cosine terms over `[-pi, pi]` sampled at `m` points.
fn general_cosine(m: usize, a: &[f64]) -> Vec<f64> {
    let step = 2.0 * PI / (m as f64 - 1.0);
    (0..m)
        .map(|n| {
            let fac = -PI + step * n as f64;
            a.iter()
                .enumerate()
                .map(|(k, &ak)| ak * (k as f64 * fac).cos())
                .sum()
        })
        .collect()
}

fn tukey(m: usize, alpha: f64) -> Vec<f64> {
    if alpha <= 0.0 {
        return vec![1.0; m];
    }
    if alpha >= 1.0 {
        return general_cosine(m, &[0.5, 0.5]);
    }
    let span = m as f64 - 1.0;
    let width = (alpha * span / 2.0).floor() as usize;
    (0..m)
        .map(|n| {
            let nf = n as f64;
            if n <= width {
                0.5 * (1.0 + (PI * (-1.0 + 2.0 * nf / alpha / span)).cos())
            } else if n < m - width - 1 {
                1.0
            } else {
                0.5 * (1.0 + (PI * (-2.0 / alpha + 1.0 + 2.0 * nf / alpha / span)).cos())
            }
        })
        .collect()
}

/// Modified Bessel function of the first kind, order zero (power series).
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..500 {
        term *= half / k as f64;
        let contribution = term * term;
        sum += contribution;
        if contribution < sum * 1e-17 {
            break;
        }
    }
    sum
}
