//! Candidate periods ("hints") from periodogram peaks.

use super::fft::Periodogram;
use crate::utils::stats::mean;

/// Period hints `1 / f` for every bin with `f >= 1/n` and power at or above `threshold`.
///
/// Duplicates and leakage neighbours are kept; validators resolve them.
///
/// # Example
/// ```
/// use anofox_periodicity::detection::{period_hints, Periodogram};
///
/// let series: Vec<f64> = (0..48)
///     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
///     .collect();
/// let pgram = Periodogram::compute(&series);
/// let hints = period_hints(&pgram, series.len(), 1.0);
/// assert_eq!(hints, vec![12.0]);
/// ```
pub fn period_hints(periodogram: &Periodogram, n: usize, threshold: f64) -> Vec<f64> {
    let min_freq = 1.0 / n as f64;
    periodogram
        .iter()
        .filter(|&(f, p)| f >= min_freq && p >= threshold)
        .map(|(f, _)| 1.0 / f)
        .collect()
}

/// Merge hints that alias to the same period and return one centroid per cluster.
///
/// Hints are sorted ascending. Hint `i > 0` starts a new cluster when it
/// exceeds `1 + n / (n / hint[i-1] - 1)`, the longest period whose DFT bin is
/// adjacent to that of its predecessor. Centroids are cluster means, ascending.
pub fn cluster_period_hints(hints: &[f64], n: usize) -> Vec<f64> {
    let mut sorted = hints.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = n as f64;
    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for (i, &hint) in sorted.iter().enumerate() {
        let starts_cluster = match i {
            0 => true,
            _ => hint > 1.0 + n / (n / sorted[i - 1] - 1.0),
        };
        match clusters.last_mut() {
            Some(cluster) if !starts_cluster => cluster.push(hint),
            _ => clusters.push(vec![hint]),
        }
    }

    clusters.iter().map(|c| mean(c)).collect()
}
