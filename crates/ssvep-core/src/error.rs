//! Error types for the SSVEP evaluation core
//!
//! These errors work in `no_std` environments and carry only plain numeric
//! context so they never allocate. Callers on the host side wrap them with
//! richer context (file names, subject identifiers).

use core::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Protocol / Windowing Errors
// ============================================================================

/// Errors raised while describing the experimental protocol or planning
/// analysis windows over it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProtocolError {
    /// Segmenting mode string was not recognised
    UnknownSegmenting,
    /// Classification criterion string was not recognised
    UnknownCriterion,
    /// Classifier method string was not recognised
    UnknownMethod,
    /// Stimulus set contains no frequencies
    EmptyStimulusSet,
    /// A stimulation frequency is not a positive finite number
    InvalidFrequency {
        /// Offending frequency in Hz
        frequency_hz: f64,
    },
    /// Analysis window length is zero or negative
    NonPositiveWindow {
        /// Requested window length in seconds
        window_s: f64,
    },
    /// Sliding step is zero or negative
    NonPositiveStep {
        /// Requested step in seconds
        step_s: f64,
    },
    /// Sample rate is zero or negative
    InvalidSampleRate {
        /// Requested sample rate in Hz
        sample_rate_hz: f64,
    },
    /// Window does not fit into one stimulation period
    WindowLongerThanPeriod {
        /// Window length in seconds
        window_s: f64,
        /// Stimulation period in seconds
        period_s: f64,
    },
    /// Stage ends before it starts
    InvalidStageBounds {
        /// Stage start in seconds
        start_s: f64,
        /// Stage end in seconds
        end_s: f64,
    },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSegmenting => {
                write!(f, "Unknown segmenting mode (expected 'sliding' or 'nooverlap')")
            }
            Self::UnknownCriterion => {
                write!(f, "Unknown criterion (expected 'offline' or 'pseudoon')")
            }
            Self::UnknownMethod => write!(f, "Unknown method (expected 'cca' or 'psda')"),
            Self::EmptyStimulusSet => write!(f, "Stimulus set has no frequencies"),
            Self::InvalidFrequency { frequency_hz } => {
                write!(f, "Invalid stimulation frequency: {frequency_hz} Hz")
            }
            Self::NonPositiveWindow { window_s } => {
                write!(f, "Window length must be positive, got {window_s} s")
            }
            Self::NonPositiveStep { step_s } => {
                write!(f, "Window step must be positive, got {step_s} s")
            }
            Self::InvalidSampleRate { sample_rate_hz } => {
                write!(f, "Invalid sample rate: {sample_rate_hz} Hz")
            }
            Self::WindowLongerThanPeriod { window_s, period_s } => {
                write!(f, "Window of {window_s} s does not fit a {period_s} s stimulation period")
            }
            Self::InvalidStageBounds { start_s, end_s } => {
                write!(f, "Stage ends ({end_s} s) before it starts ({start_s} s)")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}

// ============================================================================
// Metric Errors
// ============================================================================

/// Errors from the performance metrics (ITR, utility).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MetricError {
    /// Metric needs at least two classes
    TooFewClasses {
        /// Number of classes given
        classes: u32,
    },
    /// Accuracy outside `[0, 1]`
    InvalidAccuracy {
        /// Accuracy given
        accuracy: f64,
    },
    /// Trial duration is zero, negative or not finite
    InvalidTrialTime {
        /// Trial duration in seconds
        seconds: f64,
    },
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewClasses { classes } => {
                write!(f, "Metric requires at least 2 classes, got {classes}")
            }
            Self::InvalidAccuracy { accuracy } => {
                write!(f, "Accuracy {accuracy} outside [0, 1]")
            }
            Self::InvalidTrialTime { seconds } => {
                write!(f, "Invalid trial duration: {seconds} s")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MetricError {}

// ============================================================================
// Result Type Aliases
// ============================================================================

/// Result type for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Result type for metric computations
pub type MetricResult<T> = Result<T, MetricError>;
