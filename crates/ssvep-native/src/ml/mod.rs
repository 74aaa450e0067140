//! SSVEP frequency recognition
//!
//! Classifiers score a `samples × channels` window against every
//! stimulation frequency; the highest score wins.
//!
//! - [`cca`]: canonical correlation analysis
//! - [`psda`]: power spectral density analysis
//! - [`classify`]: offline and pseudo-online decision rules

pub mod cca;
pub mod classify;
pub mod psda;

use nalgebra::DMatrix;
use ssvep_core::{rank_scores, Method};

use crate::error::{ClassifierError, ClassifierResult};

pub use cca::CcaClassifier;
pub use classify::{offline_classify, pseudo_online_classify, ClassifiedStage, ConfidenceCriterion};
pub use psda::PsdaClassifier;

/// Frequency-recognition method for one window length.
pub trait SsvepClassifier {
    /// Short method name used in reports
    fn name(&self) -> &'static str;

    /// Stimulation frequencies, indexed by class label
    fn frequencies(&self) -> &[f64];

    /// One score per frequency; higher means more likely.
    fn scores(&self, window: &DMatrix<f64>) -> ClassifierResult<Vec<f64>>;

    /// Label of the best-scoring frequency.
    fn classify(&self, window: &DMatrix<f64>) -> ClassifierResult<usize> {
        let scores = self.scores(window)?;
        rank_scores(&scores).map(|r| r.best).ok_or(ClassifierError::NoScores)
    }
}

/// Build the classifier selected by `method` for windows of `window_samples`.
pub fn build_classifier(
    method: Method,
    frequencies: &[f64],
    window_samples: usize,
    sample_rate_hz: f64,
    harmonics: usize,
) -> ClassifierResult<Box<dyn SsvepClassifier>> {
    Ok(match method {
        Method::Cca => Box::new(CcaClassifier::new(
            frequencies,
            window_samples,
            sample_rate_hz,
            harmonics,
        )?),
        Method::Psda => Box::new(PsdaClassifier::new(
            frequencies,
            window_samples,
            sample_rate_hz,
            harmonics,
        )?),
    })
}
