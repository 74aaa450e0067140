//! Core types for SSVEP evaluation
//!
//! This module provides the small vocabulary shared by every tier:
//! - The stimulus set (stimulation frequencies, indexed by class label)
//! - Per-window classifier decisions
//! - Segmenting and classification-criterion modes
//! - Classifier method selection

use alloc::vec::Vec;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

// ============================================================================
// Stimulus Set
// ============================================================================

/// Ordered set of stimulation frequencies in Hz.
///
/// The position of a frequency is its class label, so label `0` is the first
/// flicker presented in every protocol cycle.
///
/// # Example
///
/// ```
/// use ssvep_core::types::StimulusSet;
///
/// let set = StimulusSet::new(vec![5.6, 6.4, 6.9, 8.0]).unwrap();
/// assert_eq!(set.len(), 4);
/// assert_eq!(set.frequency(3), Some(8.0));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct StimulusSet {
    frequencies: Vec<f64>,
}

impl StimulusSet {
    /// Build a stimulus set, rejecting empty sets and non-positive frequencies.
    pub fn new(frequencies: Vec<f64>) -> ProtocolResult<Self> {
        if frequencies.is_empty() {
            return Err(ProtocolError::EmptyStimulusSet);
        }
        if let Some(&bad) = frequencies.iter().find(|f| !f.is_finite() || **f <= 0.0) {
            return Err(ProtocolError::InvalidFrequency { frequency_hz: bad });
        }
        Ok(Self { frequencies })
    }

    /// Number of classes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Always false for a constructed set; provided for API symmetry
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequency for a class label
    #[inline]
    #[must_use]
    pub fn frequency(&self, label: usize) -> Option<f64> {
        self.frequencies.get(label).copied()
    }

    /// All frequencies in label order
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.frequencies
    }
}

impl Default for StimulusSet {
    fn default() -> Self {
        Self { frequencies: alloc::vec![5.6, 6.4, 6.9, 8.0] }
    }
}

impl TryFrom<Vec<f64>> for StimulusSet {
    type Error = ProtocolError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StimulusSet> for Vec<f64> {
    fn from(value: StimulusSet) -> Self {
        value.frequencies
    }
}

// ============================================================================
// Decisions
// ============================================================================

/// Output of a classifier for one analysis window.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// Window was assigned to a class label
    Class(usize),
    /// Confidence criterion was not met, no selection made
    Undefined,
}

impl Decision {
    /// Class label, if a selection was made
    #[inline]
    #[must_use]
    pub const fn class(self) -> Option<usize> {
        match self {
            Self::Class(c) => Some(c),
            Self::Undefined => None,
        }
    }

    /// True when a selection was made
    #[inline]
    #[must_use]
    pub const fn is_defined(self) -> bool {
        matches!(self, Self::Class(_))
    }
}

// ============================================================================
// Modes
// ============================================================================

/// How stimulation segments are cut into analysis windows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Segmenting {
    /// Overlapping windows advancing by a fixed step (1 s by default)
    #[default]
    #[serde(rename = "sliding")]
    Sliding,
    /// Back-to-back windows from the segment start; at most the first two
    #[serde(rename = "nooverlap")]
    NoOverlap,
}

impl Segmenting {
    /// Maximum number of non-overlapping windows taken per segment
    pub const MAX_NOOVERLAP_WINDOWS: usize = 2;

    /// Short name as used in configuration files
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sliding => "sliding",
            Self::NoOverlap => "nooverlap",
        }
    }
}

impl FromStr for Segmenting {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("sliding") {
            Ok(Self::Sliding)
        } else if s.eq_ignore_ascii_case("nooverlap") || s.eq_ignore_ascii_case("no-overlap") {
            Ok(Self::NoOverlap)
        } else {
            Err(ProtocolError::UnknownSegmenting)
        }
    }
}

/// How window scores are turned into selections.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Criterion {
    /// Plain maximum: every window produces exactly one selection
    #[serde(rename = "offline")]
    Offline,
    /// Confidence-gated: every window produces zero or one selection
    #[default]
    #[serde(rename = "pseudoon", alias = "pseudo-online")]
    PseudoOnline,
}

impl Criterion {
    /// Short name as used in configuration files
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::PseudoOnline => "pseudoon",
        }
    }
}

impl FromStr for Criterion {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("offline") {
            Ok(Self::Offline)
        } else if s.eq_ignore_ascii_case("pseudoon") || s.eq_ignore_ascii_case("pseudo-online") {
            Ok(Self::PseudoOnline)
        } else {
            Err(ProtocolError::UnknownCriterion)
        }
    }
}

/// Feature-extraction method used to score windows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Method {
    /// Canonical correlation analysis against sine/cosine references
    #[default]
    #[serde(rename = "cca", alias = "CCA")]
    Cca,
    /// Power spectral density analysis (spectral SNR at each flicker)
    #[serde(rename = "psda", alias = "PSDA")]
    Psda,
}

impl Method {
    /// Upper-case label used in report file names
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cca => "CCA",
            Self::Psda => "PSDA",
        }
    }
}

impl FromStr for Method {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("cca") {
            Ok(Self::Cca)
        } else if s.eq_ignore_ascii_case("psda") {
            Ok(Self::Psda)
        } else {
            Err(ProtocolError::UnknownMethod)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
