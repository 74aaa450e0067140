//! Evaluation configuration
//!
//! Every constant of an evaluation run lives here. Defaults reproduce the
//! protocol-7 study; a JSON file may override any subset of fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ssvep_core::math::constants;
use ssvep_core::{Criterion, Method, Protocol, ProtocolError, Segmenting, StimulusSet};

use crate::error::{EvaluationError, EvaluationResult};
use crate::ml::cca::DEFAULT_HARMONICS;
use crate::ml::ConfidenceCriterion;
use crate::processing::filters::FirDesign;

/// Placeholder substituted with the subject identifier in [`EvaluationConfig::file_pattern`]
pub const SUBJECT_PLACEHOLDER: &str = "{subject}";

/// Sensor layout of the 16-channel amplifier used for `.mat` recordings
pub const DEFAULT_MONTAGE: [&str; 16] = [
    "Fp1", "Fp2", "F3", "Fz", "F4", "C3", "Cz", "C4", "P3", "Pz", "P4", "PO7", "PO8", "O1", "Oz",
    "O2",
];

/// Complete configuration of an evaluation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Directory holding the recordings
    pub data_dir: PathBuf,
    /// Recording path relative to `data_dir`, with a `{subject}` placeholder
    pub file_pattern: String,
    /// Name of the signal variable inside `.mat` files
    pub mat_variable: String,
    /// Subject identifiers, in report order
    pub subjects: Vec<String>,
    /// Channel names of the recording columns
    pub montage: Vec<String>,
    /// Sample rate in Hz
    pub sample_rate_hz: f64,
    /// Stimulation frequencies in label order
    pub frequencies: StimulusSet,
    /// Channels kept for classification
    pub channels: Vec<String>,
    /// Classification method
    pub method: Method,
    /// Harmonics used by the classifier
    pub harmonics: usize,
    /// Band-pass pre-filter
    pub filter: FirDesign,
    /// Recording protocol
    pub protocol: Protocol,
    /// Window segmenting mode
    pub segmenting: Segmenting,
    /// Decision criterion
    pub criterion: Criterion,
    /// Slide between sliding windows in seconds
    pub window_step_s: f64,
    /// Pause after a pseudo-online selection in seconds
    pub pause_s: f64,
    /// Pseudo-online confidence thresholds
    pub confidence: ConfidenceCriterion,
    /// Class count for ITR; defaults to the number of frequencies
    pub itr_classes: Option<u32>,
    /// Class count for the utility metric
    pub utility_classes: u32,
    /// Window lengths to evaluate, in seconds
    pub window_lengths_s: Vec<f64>,
    /// Directory receiving the reports
    pub output_dir: PathBuf,
    /// Prefix of report file names
    pub dataset: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            file_pattern: "protocolo 7/{subject}_prot7_config1.mat".to_string(),
            mat_variable: "data".to_string(),
            subjects: Vec::new(),
            montage: DEFAULT_MONTAGE.iter().map(|s| (*s).to_string()).collect(),
            sample_rate_hz: constants::DEFAULT_SAMPLE_RATE_HZ,
            frequencies: StimulusSet::default(),
            channels: ["Oz", "O2", "O1"].iter().map(|s| (*s).to_string()).collect(),
            method: Method::default(),
            harmonics: DEFAULT_HARMONICS,
            filter: FirDesign::default(),
            protocol: Protocol::default(),
            segmenting: Segmenting::default(),
            criterion: Criterion::default(),
            window_step_s: constants::DEFAULT_WINDOW_STEP_S,
            pause_s: 0.0,
            confidence: ConfidenceCriterion::default(),
            itr_classes: None,
            utility_classes: constants::DEFAULT_UTILITY_CLASSES,
            window_lengths_s: vec![2.0, 3.0, 4.0, 5.0],
            output_dir: PathBuf::from("."),
            dataset: "sandra".to_string(),
        }
    }
}

impl EvaluationConfig {
    /// Read a JSON configuration; missing fields keep their defaults.
    pub fn load(path: &Path) -> EvaluationResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EvaluationError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| EvaluationError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> EvaluationResult<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(ProtocolError::InvalidSampleRate { sample_rate_hz: self.sample_rate_hz }
                .into());
        }
        if let Some(&window_s) = self.window_lengths_s.iter().find(|w| !(w.is_finite() && **w > 0.0))
        {
            return Err(ProtocolError::NonPositiveWindow { window_s }.into());
        }
        if self.channels.is_empty() {
            return Err(invalid("at least one channel must be selected"));
        }
        if self.harmonics == 0 {
            return Err(invalid("harmonics must be at least 1"));
        }
        Ok(())
    }

    /// Path of a subject's recording
    #[must_use]
    pub fn recording_path(&self, subject: &str) -> PathBuf {
        self.data_dir.join(self.file_pattern.replace(SUBJECT_PLACEHOLDER, subject))
    }

    /// Number of stimulation classes
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.frequencies.len()
    }

    /// Class count used for ITR
    #[must_use]
    pub fn itr_class_count(&self) -> u32 {
        self.itr_classes.unwrap_or(self.frequencies.len() as u32)
    }
}

fn invalid(reason: &str) -> EvaluationError {
    EvaluationError::Config { path: PathBuf::from("<config>"), reason: reason.to_string() }
}
