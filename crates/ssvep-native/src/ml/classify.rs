//! Decision rules turning window scores into selections
//!
//! - **Offline**: every window yields the best-scoring class.
//! - **Pseudo-online**: windows are walked in time order and a class is only
//!   emitted when the scores are confident enough. After a selection the
//!   following windows are skipped until the selection's end plus a pause,
//!   mimicking a user who starts a new attempt after each command.

use serde::{Deserialize, Serialize};
use ssvep_core::math::{samples_to_seconds, seconds_to_samples};
use ssvep_core::{rank_scores, Decision, Ranking};
use tracing::{debug, warn};

use super::SsvepClassifier;
use crate::error::{ClassifierError, ClassifierResult};
use crate::processing::segment::Window;

/// Minimum confidence for a pseudo-online selection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceCriterion {
    /// Lowest accepted winning score
    pub min_score: f64,
    /// Lowest accepted gap between the winner and the runner-up
    pub min_margin: f64,
}

impl Default for ConfidenceCriterion {
    fn default() -> Self {
        Self { min_score: 0.0, min_margin: 0.05 }
    }
}

impl ConfidenceCriterion {
    /// Whether a ranking is confident enough to select its winner
    #[must_use]
    pub fn accepts(&self, ranking: &Ranking) -> bool {
        ranking.best_score >= self.min_score && ranking.margin() >= self.min_margin
    }
}

/// Outcome of classifying one stage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassifiedStage {
    /// Ground truth of every evaluated window
    pub labels: Vec<usize>,
    /// Decision for every evaluated window, aligned with `labels`
    pub decisions: Vec<Decision>,
    /// Mean time needed to produce a selection, in seconds
    pub avg_time_s: f64,
}

impl ClassifiedStage {
    /// Number of defined selections
    #[must_use]
    pub fn selections(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_defined()).count()
    }
}

/// One decision per window, the arg-max of the scores.
///
/// The selection time of an offline decision is the window length.
pub fn offline_classify(
    windows: &[Window],
    classifier: &dyn SsvepClassifier,
    window_s: f64,
) -> ClassifierResult<ClassifiedStage> {
    let mut stage = ClassifiedStage { avg_time_s: window_s, ..ClassifiedStage::default() };

    for window in windows {
        let label = classifier.classify(&window.data)?;
        stage.labels.push(window.label);
        stage.decisions.push(Decision::Class(label));
    }

    Ok(stage)
}

/// Confidence-gated classification.
///
/// An attempt starts at its segment's start, or at the end of the previous
/// selection plus `pause_s`, whichever is later. Windows starting before the
/// current attempt are not evaluated. An evaluated window selects its best
/// class when `criterion` accepts the ranking and is `Undefined` otherwise.
///
/// The selection time is the end of the selecting window minus the attempt
/// start. With no selection at all the mean time is `period_s`.
pub fn pseudo_online_classify(
    windows: &[Window],
    classifier: &dyn SsvepClassifier,
    criterion: &ConfidenceCriterion,
    pause_s: f64,
    period_s: f64,
    sample_rate_hz: f64,
) -> ClassifierResult<ClassifiedStage> {
    let period = seconds_to_samples(period_s, sample_rate_hz);
    let pause = seconds_to_samples(pause_s.max(0.0), sample_rate_hz);

    let mut stage = ClassifiedStage::default();
    let mut times = Vec::new();
    let mut segment = None;
    let mut attempt_start = 0usize;
    let mut resume_at = 0usize;

    for window in windows {
        if segment != Some(window.segment) {
            segment = Some(window.segment);
            attempt_start = (window.segment * period).max(resume_at);
        }
        if window.start < attempt_start {
            continue;
        }

        let scores = classifier.scores(&window.data)?;
        let ranking = rank_scores(&scores).ok_or(ClassifierError::NoScores)?;

        let decision = if criterion.accepts(&ranking) {
            let elapsed = window.end() - attempt_start;
            times.push(samples_to_seconds(elapsed, sample_rate_hz));
            resume_at = window.end() + pause;
            attempt_start = resume_at;
            Decision::Class(ranking.best)
        } else {
            Decision::Undefined
        };

        stage.labels.push(window.label);
        stage.decisions.push(decision);
    }

    stage.avg_time_s = if times.is_empty() {
        warn!(windows = windows.len(), "No confident selection in stage");
        period_s
    } else {
        times.iter().sum::<f64>() / times.len() as f64
    };
    debug!(
        evaluated = stage.decisions.len(),
        selections = times.len(),
        avg_time_s = stage.avg_time_s,
        "Pseudo-online classification"
    );

    Ok(stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    /// Scores are read straight from the window: row 0 holds one score per
    /// frequency.
    struct ScriptedClassifier {
        frequencies: Vec<f64>,
    }

    impl SsvepClassifier for ScriptedClassifier {
        fn name(&self) -> &'static str {
            "SCRIPTED"
        }

        fn frequencies(&self) -> &[f64] {
            &self.frequencies
        }

        fn scores(&self, window: &DMatrix<f64>) -> ClassifierResult<Vec<f64>> {
            Ok(window.row(0).iter().copied().collect())
        }
    }

    fn scripted() -> ScriptedClassifier {
        ScriptedClassifier { frequencies: vec![5.6, 6.4, 6.9, 8.0] }
    }

    /// Window of `len` samples at `start`, scoring `scores`.
    fn window(start: usize, len: usize, segment: usize, scores: [f64; 4]) -> Window {
        let mut data = DMatrix::zeros(len, 4);
        for (c, s) in scores.iter().enumerate() {
            data[(0, c)] = *s;
        }
        Window { data, label: segment % 4, segment, start }
    }

    const CONFIDENT_0: [f64; 4] = [0.9, 0.2, 0.1, 0.1];
    const CONFIDENT_1: [f64; 4] = [0.2, 0.9, 0.1, 0.1];
    const UNSURE: [f64; 4] = [0.50, 0.48, 0.1, 0.1];

    #[test]
    fn test_offline_one_decision_per_window() {
        let windows = vec![
            window(0, 20, 0, CONFIDENT_0),
            window(10, 20, 0, UNSURE),
            window(100, 20, 1, CONFIDENT_1),
        ];
        let out = offline_classify(&windows, &scripted(), 2.0).unwrap();

        assert_eq!(out.decisions, vec![Decision::Class(0), Decision::Class(0), Decision::Class(1)]);
        assert_eq!(out.labels, vec![0, 0, 1]);
        assert!((out.avg_time_s - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pseudo_online_skips_after_selection() {
        // fs = 10 Hz, period 10 s = 100 samples, 2 s windows sliding by 1 s
        let windows = vec![
            window(0, 20, 0, UNSURE),
            window(10, 20, 0, CONFIDENT_0),
            window(20, 20, 0, CONFIDENT_0), // starts before 30: skipped
            window(30, 20, 0, CONFIDENT_0),
            window(100, 20, 1, CONFIDENT_1),
        ];
        let out = pseudo_online_classify(
            &windows,
            &scripted(),
            &ConfidenceCriterion::default(),
            0.0,
            10.0,
            10.0,
        )
        .unwrap();

        assert_eq!(
            out.decisions,
            vec![Decision::Undefined, Decision::Class(0), Decision::Class(0), Decision::Class(1)]
        );
        assert_eq!(out.labels, vec![0, 0, 0, 1]);
        assert_eq!(out.selections(), 3);
        // Attempts: [0, 30) -> 3 s, [30, 50) -> 2 s, [100, 120) -> 2 s
        assert!((out.avg_time_s - 7.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_pseudo_online_pause_delays_next_attempt() {
        let windows = vec![
            window(0, 20, 0, CONFIDENT_0),
            window(10, 20, 0, CONFIDENT_0),
            window(20, 20, 0, CONFIDENT_0),
            window(30, 20, 0, CONFIDENT_0),
        ];
        // Pause of 1 s: next attempt starts at sample 30
        let out = pseudo_online_classify(
            &windows,
            &scripted(),
            &ConfidenceCriterion::default(),
            1.0,
            10.0,
            10.0,
        )
        .unwrap();

        assert_eq!(out.decisions, vec![Decision::Class(0), Decision::Class(0)]);
        assert!((out.avg_time_s - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pseudo_online_without_selection_uses_period() {
        let windows = vec![window(0, 20, 0, UNSURE), window(10, 20, 0, UNSURE)];
        let out = pseudo_online_classify(
            &windows,
            &scripted(),
            &ConfidenceCriterion::default(),
            0.0,
            5.0,
            10.0,
        )
        .unwrap();

        assert_eq!(out.selections(), 0);
        assert_eq!(out.decisions.len(), 2);
        assert!((out.avg_time_s - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_thresholds() {
        let strict = ConfidenceCriterion { min_score: 0.95, min_margin: 0.0 };
        let ranking = rank_scores(&CONFIDENT_0).unwrap();
        assert!(!strict.accepts(&ranking));
        assert!(ConfidenceCriterion::default().accepts(&ranking));
        assert!(!ConfidenceCriterion::default().accepts(&rank_scores(&UNSURE).unwrap()));
    }
}
