//! Permutation-based significance threshold for periodogram power.
//!
//! Shuffling a series destroys its periodic structure but keeps its marginal
//! distribution, so the maximum periodogram power of many shuffled copies
//! approximates the peaks that noise alone produces.

use super::fft::periodogram;
use crate::error::{PeriodicityError, Result};
use crate::utils::stats::percentile;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng, SeedableRng};
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Percentile of the maximum periodogram power over `k` random permutations.
///
/// Permutation `i` draws from a generator seeded with `seed + i`, so a fixed
/// seed yields the same threshold whether or not the `parallel` feature is on.
/// Without a seed a fresh one is taken from the thread RNG.
///
/// # Errors
/// - `EmptyData` for an empty series
/// - `InvalidParameter` when `k == 0` or `pct` is outside `[0, 100]`
///
/// # Example
/// ```
/// use anofox_periodicity::detection::power_threshold;
///
/// let series: Vec<f64> = (0..64).map(|i| (i as f64 * 0.7).sin()).collect();
/// let a = power_threshold(&series, 50, 99.0, Some(7)).unwrap();
/// let b = power_threshold(&series, 50, 99.0, Some(7)).unwrap();
/// assert_eq!(a, b);
/// ```
#[instrument(skip(series), fields(n = series.len()))]
pub fn power_threshold(series: &[f64], k: usize, pct: f64, seed: Option<u64>) -> Result<f64> {
    if series.is_empty() {
        return Err(PeriodicityError::EmptyData);
    }
    if k == 0 {
        return Err(PeriodicityError::InvalidParameter(
            "number of permutations k must be at least 1".into(),
        ));
    }
    if !(0.0..=100.0).contains(&pct) {
        return Err(PeriodicityError::InvalidParameter(format!(
            "percentile must be in [0, 100], got {}",
            pct
        )));
    }

    let seed = seed.unwrap_or_else(|| thread_rng().gen());
    let max_power = |i: usize| {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
        let mut shuffled = series.to_vec();
        shuffled.shuffle(&mut rng);
        periodogram(&shuffled).max_power()
    };

    #[cfg(feature = "parallel")]
    let maxima: Vec<f64> = (0..k).into_par_iter().map(max_power).collect();
    #[cfg(not(feature = "parallel"))]
    let maxima: Vec<f64> = (0..k).map(max_power).collect();

    let threshold = percentile(&maxima, pct);
    debug!(threshold, k, pct, "power threshold from permutation maxima");
    Ok(threshold)
}
