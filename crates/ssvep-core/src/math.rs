//! Math utilities for SSVEP evaluation (`no_std` compatible)
//!
//! This module provides:
//! - Sample/second conversions
//! - Score ranking (winner and runner-up)
//! - Information transfer rate (Wolpaw) and the utility metric

use crate::error::{MetricError, MetricResult};

// ============================================================================
// Constants
// ============================================================================

/// Protocol and reporting constants
pub mod constants {
    /// Sampling rate of the reference amplifier in Hz
    pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 600.0;

    /// Slide between consecutive sliding windows in seconds
    pub const DEFAULT_WINDOW_STEP_S: f64 = 1.0;

    /// Number of selectable targets assumed by the utility metric
    pub const DEFAULT_UTILITY_CLASSES: u32 = 6;

    /// Seconds per minute, for bits/min reporting
    pub const SECONDS_PER_MINUTE: f64 = 60.0;
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert a duration in seconds to a whole number of samples (rounded).
#[inline]
#[must_use]
pub fn seconds_to_samples(seconds: f64, sample_rate_hz: f64) -> usize {
    let n = libm::round(seconds * sample_rate_hz);
    if n <= 0.0 {
        0
    } else {
        n as usize
    }
}

/// Convert a sample count to seconds.
#[inline]
#[must_use]
pub fn samples_to_seconds(samples: usize, sample_rate_hz: f64) -> f64 {
    samples as f64 / sample_rate_hz
}

// ============================================================================
// Ranking
// ============================================================================

/// Winner of a score vector together with the runner-up score.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ranking {
    /// Index of the highest score
    pub best: usize,
    /// Highest score
    pub best_score: f64,
    /// Second highest score (negative infinity with a single entry)
    pub runner_up_score: f64,
}

impl Ranking {
    /// Difference between the winner and the runner-up
    #[inline]
    #[must_use]
    pub fn margin(&self) -> f64 {
        self.best_score - self.runner_up_score
    }
}

/// Rank scores; ties resolve to the lowest index. NaN scores never win.
#[must_use]
pub fn rank_scores(scores: &[f64]) -> Option<Ranking> {
    let mut best: Option<(usize, f64)> = None;
    let mut runner_up = f64::NEG_INFINITY;

    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            continue;
        }
        match best {
            None => best = Some((i, s)),
            Some((_, b)) if s > b => {
                runner_up = b;
                best = Some((i, s));
            }
            Some(_) => {
                if s > runner_up {
                    runner_up = s;
                }
            }
        }
    }

    best.map(|(best, best_score)| Ranking { best, best_score, runner_up_score: runner_up })
}

// ============================================================================
// Information Transfer Rate / Utility
// ============================================================================

fn check_inputs(classes: u32, accuracy: f64) -> MetricResult<()> {
    if classes < 2 {
        return Err(MetricError::TooFewClasses { classes });
    }
    if !(0.0..=1.0).contains(&accuracy) {
        return Err(MetricError::InvalidAccuracy { accuracy });
    }
    Ok(())
}

fn check_time(seconds: f64) -> MetricResult<()> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(MetricError::InvalidTrialTime { seconds });
    }
    Ok(())
}

/// Bits conveyed by one selection (Wolpaw).
///
/// `B = log2 N + P log2 P + (1 - P) log2((1 - P) / (N - 1))`
///
/// Accuracy at or below chance level yields 0 bits.
pub fn itr_bits_per_trial(classes: u32, accuracy: f64) -> MetricResult<f64> {
    check_inputs(classes, accuracy)?;

    let n = f64::from(classes);
    let p = accuracy;

    if p <= 1.0 / n {
        return Ok(0.0);
    }

    let mut bits = libm::log2(n);
    if p > 0.0 {
        bits += p * libm::log2(p);
    }
    if p < 1.0 {
        bits += (1.0 - p) * libm::log2((1.0 - p) / (n - 1.0));
    }

    Ok(bits.max(0.0))
}

/// Information transfer rate in bits per second for a given selection time.
pub fn itr_bits_per_second(classes: u32, accuracy: f64, trial_s: f64) -> MetricResult<f64> {
    check_time(trial_s)?;
    Ok(itr_bits_per_trial(classes, accuracy)? / trial_s)
}

/// Utility metric in bits per second.
///
/// `U = (2P - 1) log2(N - 1) / T` for `P > 0.5`, zero otherwise.
pub fn utility_bits_per_second(classes: u32, accuracy: f64, trial_s: f64) -> MetricResult<f64> {
    check_inputs(classes, accuracy)?;
    check_time(trial_s)?;

    if accuracy <= 0.5 {
        return Ok(0.0);
    }

    let n = f64::from(classes);
    Ok((2.0 * accuracy - 1.0) * libm::log2(n - 1.0) / trial_s)
}

// ============================================================================
// Tests
// ============================================================================
