//! Error types for host-side processing
//!
//! Error types for loading, filtering, classification, evaluation and
//! reporting using `thiserror`.

use std::path::PathBuf;

use ssvep_core::{MetricError, ProtocolError};
use thiserror::Error;

/// Recording loader errors
#[derive(Error, Debug)]
pub enum RecordingError {
    /// Underlying I/O failure
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Source error
        #[source]
        source: std::io::Error,
    },

    /// File extension is not a supported recording format
    #[error("Unsupported recording format: {path} (expected .mat or .csv)")]
    UnsupportedFormat {
        /// Offending path
        path: PathBuf,
    },

    /// MAT file could not be parsed
    #[error("Failed to parse MAT file {path}: {reason}")]
    MatParse {
        /// File being parsed
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Requested variable is not in the MAT file
    #[error("Variable '{name}' not found in {path}")]
    MissingVariable {
        /// Variable name
        name: String,
        /// File searched
        path: PathBuf,
    },

    /// Variable exists but is not a real numeric 2-D array
    #[error("Variable '{name}' is not a real 2-D numeric array")]
    NotNumeric {
        /// Variable name
        name: String,
    },

    /// CSV parsing failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// CSV cell is not a number
    #[error("Invalid value '{value}' at row {row}, column {column}")]
    InvalidValue {
        /// Offending cell content
        value: String,
        /// 1-based data row
        row: usize,
        /// 1-based column
        column: usize,
    },

    /// Channel count does not match the montage
    #[error("Montage mismatch: montage has {expected} channels, recording has {got}")]
    MontageMismatch {
        /// Channels in the montage
        expected: usize,
        /// Channels in the data
        got: usize,
    },

    /// Requested channel is not part of the montage
    #[error("Channel '{name}' is not in the montage")]
    UnknownChannel {
        /// Channel name
        name: String,
    },

    /// Not enough samples for the requested operation
    #[error("Insufficient data: got {got} samples, need {need}")]
    InsufficientData {
        /// Samples available
        got: usize,
        /// Samples needed
        need: usize,
    },

    /// Sample rate is not positive
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),
}

/// FIR design and filtering errors
#[derive(Error, Debug)]
pub enum FilterError {
    /// Least-squares design needs an odd tap count
    #[error("FIR tap count must be odd and >= 3, got {numtaps}")]
    InvalidTapCount {
        /// Requested tap count
        numtaps: usize,
    },

    /// Band edges or gains are malformed
    #[error("Invalid band specification: {reason}")]
    InvalidBands {
        /// What is wrong
        reason: String,
    },

    /// Normal equations could not be solved
    #[error("Least-squares FIR system is singular")]
    SingularSystem,

    /// Signal shorter than the filter
    #[error("Signal too short for valid filtering: {samples} samples, filter has {numtaps} taps")]
    SignalTooShort {
        /// Signal length
        samples: usize,
        /// Filter length
        numtaps: usize,
    },

    /// Spatial filter rows do not match the signal channels
    #[error("Spatial filter has {rows} rows, signal has {channels} channels")]
    SpatialFilterShape {
        /// Signal channel count
        channels: usize,
        /// Filter row count
        rows: usize,
    },
}

/// Classifier errors
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Window length differs from what the classifier was built for
    #[error("Window shape mismatch: expected {expected} samples, got {got}")]
    WindowShape {
        /// Expected samples
        expected: usize,
        /// Samples received
        got: usize,
    },

    /// Window has no channels
    #[error("Window has no channels")]
    NoChannels,

    /// Invalid classifier parameter
    #[error("Invalid classifier parameter {parameter}: {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: &'static str,
        /// Reason
        reason: String,
    },

    /// Scores could not be ranked (empty or all NaN)
    #[error("No valid scores for window")]
    NoScores,
}

/// Report writing errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// Could not create the output directory or file
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Output path
        path: PathBuf,
        /// Source error
        #[source]
        source: std::io::Error,
    },

    /// CSV writer failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Pipeline errors
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// Recording could not be loaded or sliced
    #[error("Recording error: {0}")]
    Recording(#[from] RecordingError),

    /// Filtering failed
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// Classification failed
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Protocol or windowing misconfiguration
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Metric computation failed
    #[error("Metric error: {0}")]
    Metric(#[from] MetricError),

    /// Report could not be written
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Configuration file could not be read or parsed
    #[error("Config error in {path}: {reason}")]
    Config {
        /// Config path
        path: PathBuf,
        /// Reason
        reason: String,
    },

    /// Failure attached to a specific subject
    #[error("Subject {subject}: {source}")]
    Subject {
        /// Subject identifier
        subject: String,
        /// Underlying failure
        #[source]
        source: Box<EvaluationError>,
    },
}

impl EvaluationError {
    /// Attach a subject identifier to an error.
    #[must_use]
    pub fn for_subject(self, subject: &str) -> Self {
        Self::Subject { subject: subject.to_string(), source: Box::new(self) }
    }
}

/// Result type for recording operations
pub type RecordingResult<T> = Result<T, RecordingError>;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Result type for classifier operations
pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for pipeline operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;
