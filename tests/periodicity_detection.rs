//! End-to-end detection on synthetic seasonal series.
//!
//! The series mimic an atmospheric CO2 record: a baseline, a linear trend,
//! a yearly cycle with a half-year harmonic, and bounded noise from a fixed
//! xorshift generator so every run sees the same data.

use anofox_periodicity::detection::{
    acf, Autoperiod, CFDAutoperiod, Correlation, DetectorConfig, PeriodSource,
    PeriodicityDetector,
};
use anofox_periodicity::transform::{Detrend, Window};
use anofox_periodicity::utils::median;
use anofox_periodicity::PeriodicityError;
use std::f64::consts::PI;
use tracing_subscriber::EnvFilter;

const MONTHLY_SEED: u64 = 0x9E37_79B9_7F4A_7C15;
const WEEKLY_SEED: u64 = 0x2545_F491_4F6C_DD1D;
const DAILY_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Uniform noise in `[-0.5, 0.5)` from xorshift64.
fn xorshift_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
        })
        .collect()
}

fn seasonal_series(n: usize, period: f64, slope: f64, amplitude: f64, seed: u64) -> Vec<f64> {
    let noise = xorshift_noise(n, seed);
    (0..n)
        .map(|i| {
            let t = i as f64;
            315.0
                + slope * t
                + amplitude * (2.0 * PI * t / period).sin()
                + 0.8 * (4.0 * PI * t / period + 0.5).sin()
                + noise[i]
        })
        .collect()
}

/// 44 years of monthly values with a trend strong enough to mask the cycle
/// unless it is removed.
fn monthly() -> Vec<f64> {
    seasonal_series(528, 12.0, 0.1, 4.0, MONTHLY_SEED)
}

/// Monthly values with a gentle trend.
fn monthly_mild_trend() -> Vec<f64> {
    seasonal_series(528, 12.0, 0.03, 3.0, MONTHLY_SEED)
}

/// 10 years of weekly values.
fn weekly() -> Vec<f64> {
    seasonal_series(520, 52.0, 0.025, 4.0, WEEKLY_SEED)
}

/// Weekly values whose trend outweighs the yearly cycle.
fn weekly_strong_trend() -> Vec<f64> {
    seasonal_series(520, 52.0, 0.1, 4.0, WEEKLY_SEED)
}

/// 8 years of daily values on a 364-day year.
fn daily() -> Vec<f64> {
    seasonal_series(364 * 8, 364.0, 0.004, 4.0, DAILY_SEED)
}

/// Route detector logs to the test output; `RUST_LOG=debug` shows hint verdicts.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn median_detrend() -> Detrend {
    Detrend::custom(|x| {
        let m = median(x);
        x.iter().map(|v| v - m).collect()
    })
}

// =============================================================================
// Canonical cases
// =============================================================================

#[test]
fn autoperiod_monthly_default() {
    init_tracing();
    let detector = Autoperiod::new(DetectorConfig::default().with_seed(42));
    let result = detector.detect(&monthly()).unwrap();

    assert_eq!(result.period_values(), vec![12]);
    assert_eq!(result.periods[0].source, PeriodSource::Hybrid);
    assert!(result.periods[0].score > 0.5, "score = {}", result.periods[0].score);
}

#[test]
fn autoperiod_weekly_default() {
    let detector = Autoperiod::new(DetectorConfig::default().with_seed(42));
    assert_eq!(detector.fit(&weekly()).unwrap(), vec![52]);
}

#[test]
fn cfd_autoperiod_monthly_default() {
    init_tracing();
    let detector = CFDAutoperiod::new(DetectorConfig::default().with_seed(42));
    assert_eq!(detector.fit(&monthly()).unwrap(), vec![12]);
}

#[test]
fn cfd_autoperiod_weekly_default() {
    let detector = CFDAutoperiod::new(DetectorConfig::default().with_seed(42));
    assert_eq!(detector.fit(&weekly()).unwrap(), vec![52]);
}

#[test]
fn autoperiod_daily_default() {
    let detector = Autoperiod::new(DetectorConfig::default().with_seed(42));
    assert_eq!(detector.fit(&daily()).unwrap(), vec![364]);
}

#[test]
fn cfd_autoperiod_daily_default() {
    let detector = CFDAutoperiod::new(DetectorConfig::default().with_seed(42));
    assert_eq!(detector.fit(&daily()).unwrap(), vec![364]);
}

#[test]
fn cfd_autoperiod_finds_nested_periods() {
    init_tracing();
    let series: Vec<f64> = (0..960)
        .map(|i| {
            let t = i as f64;
            (2.0 * PI * t / 12.0).sin() + (2.0 * PI * t / 96.0).sin()
        })
        .collect();
    let detector = CFDAutoperiod::new(DetectorConfig::default().with_seed(42));
    assert_eq!(detector.fit(&series).unwrap(), vec![12, 96]);
}

#[test]
fn unseeded_detection_is_stable() {
    let series = monthly();
    for _ in 0..3 {
        assert_eq!(Autoperiod::default().fit(&series).unwrap(), vec![12]);
    }
}

// =============================================================================
// Detrend and window interaction
// =============================================================================

#[test]
fn constant_detrend_masks_the_cycle() {
    init_tracing();
    let detector = Autoperiod::new(
        DetectorConfig::default()
            .with_seed(42)
            .with_detrend(Some(Detrend::Constant)),
    );
    let periods = detector.fit(&monthly()).unwrap();
    assert!(periods.is_empty(), "expected no periods, got {:?}", periods);
}

#[test]
fn constant_detrend_masks_the_weekly_cycle() {
    let detector = Autoperiod::new(
        DetectorConfig::default()
            .with_seed(42)
            .with_detrend(Some(Detrend::Constant)),
    );
    let periods = detector.fit(&weekly_strong_trend()).unwrap();
    assert!(periods.is_empty(), "expected no periods, got {:?}", periods);
}

#[test]
fn blackman_window_restores_detection_with_constant_detrend() {
    let detector = Autoperiod::new(
        DetectorConfig::default()
            .with_seed(42)
            .with_detrend(Some(Detrend::Constant))
            .with_window(Some(Window::Blackman)),
    );
    assert_eq!(detector.fit(&monthly()).unwrap(), vec![12]);
}

#[test]
fn median_detrend_with_blackmanharris() {
    let detector = Autoperiod::new(
        DetectorConfig::default()
            .with_seed(42)
            .with_detrend(Some(median_detrend()))
            .with_window(Some(Window::BlackmanHarris)),
    );
    assert_eq!(detector.fit(&monthly_mild_trend()).unwrap(), vec![12]);
}

#[test]
fn median_detrend_with_blackmanharris_weekly() {
    let detector = Autoperiod::new(
        DetectorConfig::default()
            .with_seed(42)
            .with_detrend(Some(median_detrend()))
            .with_window(Some(Window::BlackmanHarris)),
    );
    assert_eq!(detector.fit(&weekly()).unwrap(), vec![52]);
}

#[test]
fn window_names_parse_into_config() {
    let window: Window = "blackman".parse().unwrap();
    let detrend: Detrend = "constant".parse().unwrap();
    let detector = Autoperiod::new(
        DetectorConfig::default()
            .with_seed(42)
            .with_detrend(Some(detrend))
            .with_window(Some(window)),
    );
    assert_eq!(detector.fit(&monthly()).unwrap(), vec![12]);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn same_seed_same_periods() {
    let series = weekly();
    let config = DetectorConfig::default().with_seed(7).with_k(50);
    let a = CFDAutoperiod::new(config.clone()).fit(&series).unwrap();
    let b = CFDAutoperiod::new(config).fit(&series).unwrap();
    assert_eq!(a, b);
}

#[test]
fn outputs_are_local_maxima_of_full_acf() {
    let series = monthly();
    let prepared = Detrend::Linear.apply(&series).unwrap();
    let acf_arr = acf(&prepared, prepared.len(), Correlation::Pearson).unwrap();

    let config = DetectorConfig::default().with_seed(5);
    let mut periods = Autoperiod::new(config.clone()).fit(&series).unwrap();
    periods.extend(CFDAutoperiod::new(config).fit(&series).unwrap());
    assert!(!periods.is_empty());

    for p in periods {
        assert!(
            acf_arr[p] >= acf_arr[p - 1] && acf_arr[p] >= acf_arr[p + 1],
            "period {} is not an ACF peak",
            p
        );
    }
}

#[test]
fn scores_are_acf_values() {
    let series = monthly();
    let prepared = Detrend::Linear.apply(&series).unwrap();
    let acf_arr = acf(&prepared, prepared.len(), Correlation::Pearson).unwrap();

    let result = Autoperiod::new(DetectorConfig::default().with_seed(1))
        .detect(&series)
        .unwrap();
    for p in &result.periods {
        assert!((p.score - acf_arr[p.period]).abs() < 1e-12);
    }
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn invalid_configuration_is_reported_first() {
    let bad = DetectorConfig::default().with_percentile(150.0);
    assert!(matches!(
        Autoperiod::new(bad.clone()).detect(&monthly()),
        Err(PeriodicityError::InvalidParameter(_))
    ));
    assert!(matches!(
        CFDAutoperiod::new(bad).detect(&[]),
        Err(PeriodicityError::InvalidParameter(_))
    ));
}

#[test]
fn non_finite_input_is_rejected() {
    let mut series = monthly();
    series[100] = f64::INFINITY;
    assert_eq!(
        Autoperiod::default().detect(&series).unwrap_err(),
        PeriodicityError::NonFiniteValue { index: 100 }
    );
}
