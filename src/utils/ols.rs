//! Least-squares line and polynomial fits.
//!
//! Used by the hint validators to approximate local shapes of the
//! autocorrelation function.

use crate::error::{PeriodicityError, Result};

/// Least-squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// Slope of the fitted line
    pub slope: f64,
    /// Intercept of the fitted line
    pub intercept: f64,
}

impl LineFit {
    /// Evaluate the line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Sum of absolute residuals over the given points.
    pub fn abs_residual_sum(&self, x: &[f64], y: &[f64]) -> f64 {
        x.iter()
            .zip(y)
            .map(|(&xi, &yi)| (yi - self.predict(xi)).abs())
            .sum()
    }

    /// True when both coefficients are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite()
    }
}

/// Fit a least-squares line through `(x, y)`.
///
/// Non-finite `y` values propagate into non-finite coefficients; callers
/// check [`LineFit::is_finite`].
///
/// # Errors
/// `InsufficientData` for fewer than two points, `InvalidParameter` for
/// mismatched lengths, `DegenerateInput` when all `x` are equal.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LineFit> {
    if x.len() != y.len() {
        return Err(PeriodicityError::InvalidParameter(format!(
            "x and y lengths differ: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(PeriodicityError::InsufficientData { needed: 2, got: n });
    }

    let n_f = n as f64;
    let mean_x = x.iter().sum::<f64>() / n_f;
    let mean_y = y.iter().sum::<f64>() / n_f;

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        ss_xx += dx * dx;
        ss_xy += dx * (yi - mean_y);
    }

    if ss_xx <= f64::EPSILON * n_f {
        return Err(PeriodicityError::DegenerateInput(
            "all x values are identical".into(),
        ));
    }

    let slope = ss_xy / ss_xx;
    Ok(LineFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Polynomial in power form, coefficients in ascending degree.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    /// `coefficients[j]` multiplies `x^j`
    pub coefficients: Vec<f64>,
}

impl Polynomial {
    /// Degree of the polynomial (length of the coefficient vector minus one).
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Coefficient of the highest power.
    pub fn leading_coefficient(&self) -> f64 {
        self.coefficients.last().copied().unwrap_or(f64::NAN)
    }

    /// Evaluate with Horner's scheme.
    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    /// Analytic derivative.
    pub fn deriv(&self) -> Polynomial {
        let coefficients = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(j, &c)| j as f64 * c)
            .collect();
        Polynomial { coefficients }
    }

    /// Root of a linear polynomial, `None` for any other degree or a zero slope.
    pub fn linear_root(&self) -> Option<f64> {
        match self.coefficients.as_slice() {
            [c0, c1] if *c1 != 0.0 => Some(-c0 / c1),
            _ => None,
        }
    }

    /// True when every coefficient is finite.
    pub fn is_finite(&self) -> bool {
        self.coefficients.iter().all(|c| c.is_finite())
    }
}

/// Least-squares polynomial fit of the given degree.
///
/// The fit is computed on `x` mapped linearly onto `[-1, 1]` for
/// conditioning, then converted back to power form in the original `x`.
///
/// # Errors
/// `InsufficientData` when there are fewer points than coefficients,
/// `DegenerateInput` when the normal equations are singular.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Polynomial> {
    if x.len() != y.len() {
        return Err(PeriodicityError::InvalidParameter(format!(
            "x and y lengths differ: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    let num_params = degree + 1;
    if x.len() < num_params {
        return Err(PeriodicityError::InsufficientData {
            needed: num_params,
            got: x.len(),
        });
    }

    let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if x_max - x_min <= 0.0 {
        return Err(PeriodicityError::DegenerateInput(
            "all x values are identical".into(),
        ));
    }
    // t = off + scl * x maps [x_min, x_max] onto [-1, 1]
    let scl = 2.0 / (x_max - x_min);
    let off = -(x_max + x_min) / (x_max - x_min);

    let mut xtx = vec![vec![0.0; num_params]; num_params];
    let mut xty = vec![0.0; num_params];
    let mut powers = vec![0.0; 2 * degree + 1];

    for (&xi, &yi) in x.iter().zip(y) {
        let t = off + scl * xi;
        let mut p = 1.0;
        for power in powers.iter_mut() {
            *power = p;
            p *= t;
        }
        for i in 0..num_params {
            xty[i] += powers[i] * yi;
            for j in 0..num_params {
                xtx[i][j] += powers[i + j];
            }
        }
    }

    let scaled = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        PeriodicityError::DegenerateInput("polynomial normal equations are singular".into())
    })?;

    Ok(Polynomial {
        coefficients: unscale(&scaled, off, scl),
    })
}

/// Expand `sum c_j (off + scl x)^j` into power form in `x`.
fn unscale(scaled: &[f64], off: f64, scl: f64) -> Vec<f64> {
    let mut result = vec![0.0; scaled.len()];
    // (off + scl x)^j, as ascending coefficients in x
    let mut basis = vec![1.0];
    for &c in scaled {
        for (k, &b) in basis.iter().enumerate() {
            result[k] += c * b;
        }
        let mut next = vec![0.0; basis.len() + 1];
        for (k, &b) in basis.iter().enumerate() {
            next[k] += off * b;
            next[k + 1] += scl * b;
        }
        basis = next;
    }
    result
}

/// Solve symmetric positive definite system using Cholesky decomposition.
///
/// Solves A @ x = b where A is symmetric positive definite.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // Cholesky decomposition A = L @ L'
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}
