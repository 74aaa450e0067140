//! Offline evaluation pipeline
//!
//! ```text
//! load → FIR (valid) → mean removal → CAR → channel selection
//!      → stage slicing → windowing → classification → confusion matrix
//!      → accuracy / time / ITR / utility → report
//! ```
//!
//! Each subject's recording is loaded and preprocessed once, then evaluated
//! for every configured window length. One report is written per window
//! length.

use std::path::PathBuf;

use ssvep_core::math::constants::SECONDS_PER_MINUTE;
use ssvep_core::math::seconds_to_samples;
use ssvep_core::{itr_bits_per_second, utility_bits_per_second, Criterion, ProtocolStage, WindowPlanner};
use tracing::{debug, info, warn};

use crate::config::EvaluationConfig;
use crate::error::{EvaluationError, EvaluationResult};
use crate::ml::{build_classifier, offline_classify, pseudo_online_classify, SsvepClassifier};
use crate::performance::ConfusionMatrix;
use crate::processing::reference::{common_average_reference, remove_channel_mean};
use crate::processing::segment::extract_windows;
use crate::recording::Recording;
use crate::report::{report_filename, write_report};

/// One report row: the scores of a scored stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageResult {
    /// Stimulation period of the stage in seconds
    pub period_s: f64,
    /// Accuracy in percent
    pub accuracy_pct: f64,
    /// Mean selection time in seconds
    pub avg_time_s: f64,
    /// Information transfer rate in bits/min
    pub itr_bits_per_min: f64,
    /// Utility in bits/min
    pub utility_bits_per_min: f64,
}

impl StageResult {
    /// Columns in report order
    #[must_use]
    pub fn to_row(&self) -> [f64; 5] {
        [
            self.period_s,
            self.accuracy_pct,
            self.avg_time_s,
            self.itr_bits_per_min,
            self.utility_bits_per_min,
        ]
    }
}

/// Classification outcome of one stage.
#[derive(Clone, Debug)]
pub struct StageOutcome {
    /// Accuracy over defined selections, in `[0, 1]`
    pub accuracy: f64,
    /// Mean selection time in seconds
    pub avg_time_s: f64,
    /// Full confusion matrix
    pub confusion: ConfusionMatrix,
}

/// Filter, re-reference and reduce a raw recording to the selected channels.
///
/// Mean removal and CAR use every montage channel; selection comes last.
/// The output is shorter than the input by `numtaps - 1` samples.
pub fn preprocess(recording: &Recording, config: &EvaluationConfig) -> EvaluationResult<Recording> {
    let fs = recording.sample_rate_hz();
    let filter = config.filter.build(fs)?;

    let mut signal = filter.apply_valid(recording.data())?;
    remove_channel_mean(&mut signal);
    let signal = common_average_reference(&signal);

    let processed = Recording::new(signal, fs, recording.channels().to_vec())?;
    Ok(processed.select_channels(&config.channels)?)
}

/// Window, classify and score one stage signal.
///
/// Window lengths and pauses are converted at the signal's own sample rate.
pub fn apply_method(
    stage_signal: &Recording,
    stage: &ProtocolStage,
    window_s: f64,
    config: &EvaluationConfig,
    classifier: &dyn SsvepClassifier,
) -> EvaluationResult<StageOutcome> {
    let n_classes = config.n_classes();
    let fs = stage_signal.sample_rate_hz();

    let plan = WindowPlanner::new(window_s, fs, config.segmenting)
        .with_step(config.window_step_s)
        .plan(stage, n_classes, stage_signal.samples())?;
    if plan.dropped > 0 {
        warn!(
            dropped = plan.dropped,
            kept = plan.len(),
            period_s = stage.period_s,
            "Windows past the end of the data were dropped"
        );
    }

    let windows = extract_windows(stage_signal.data(), &plan);
    let classified = match config.criterion {
        Criterion::Offline => offline_classify(&windows, classifier, window_s)?,
        Criterion::PseudoOnline => pseudo_online_classify(
            &windows,
            classifier,
            &config.confidence,
            config.pause_s,
            stage.period_s,
            fs,
        )?,
    };

    let confusion = ConfusionMatrix::from_decisions(&classified.labels, &classified.decisions, n_classes);
    debug!(
        kappa = confusion.cohen_kappa(),
        undefined_rate = confusion.undefined_rate(),
        "Confusion matrix (period {} s):\n{}",
        stage.period_s,
        confusion
    );

    Ok(StageOutcome { accuracy: confusion.accuracy(), avg_time_s: classified.avg_time_s, confusion })
}

/// Turn accuracy and selection time into a report row.
pub fn score_stage(
    period_s: f64,
    accuracy: f64,
    avg_time_s: f64,
    config: &EvaluationConfig,
) -> EvaluationResult<StageResult> {
    let itr = itr_bits_per_second(config.itr_class_count(), accuracy, avg_time_s)?;
    let utility = utility_bits_per_second(config.utility_classes, accuracy, avg_time_s)?;

    Ok(StageResult {
        period_s,
        accuracy_pct: 100.0 * accuracy,
        avg_time_s,
        itr_bits_per_min: itr * SECONDS_PER_MINUTE,
        utility_bits_per_min: utility * SECONDS_PER_MINUTE,
    })
}

/// Score every scored stage of an already preprocessed recording.
///
/// Stage boundaries index the preprocessed (filtered) signal.
pub fn evaluate_preprocessed(
    processed: &Recording,
    config: &EvaluationConfig,
    window_s: f64,
) -> EvaluationResult<Vec<StageResult>> {
    let fs = processed.sample_rate_hz();
    let classifier = build_classifier(
        config.method,
        config.frequencies.as_slice(),
        seconds_to_samples(window_s, fs),
        fs,
        config.harmonics,
    )?;

    let mut rows = Vec::with_capacity(config.protocol.scored_count());
    for stage in config.protocol.scored_stages() {
        let (start, end) = stage.sample_range(fs, processed.samples())?;
        let stage_signal = processed.slice_samples(start, end)?;

        let outcome = apply_method(&stage_signal, stage, window_s, config, classifier.as_ref())?;
        let row = score_stage(stage.period_s, outcome.accuracy, outcome.avg_time_s, config)?;
        debug!(
            period_s = row.period_s,
            accuracy_pct = row.accuracy_pct,
            avg_time_s = row.avg_time_s,
            itr = row.itr_bits_per_min,
            "Stage scored"
        );
        rows.push(row);
    }
    Ok(rows)
}

/// Preprocess a raw recording and score it for one window length.
pub fn evaluate_subject(
    recording: &Recording,
    config: &EvaluationConfig,
    window_s: f64,
) -> EvaluationResult<Vec<StageResult>> {
    let processed = preprocess(recording, config)?;
    evaluate_preprocessed(&processed, config, window_s)
}

/// Rows collected for one window length, and where they were written.
#[derive(Clone, Debug)]
pub struct WindowReport {
    /// Window length in seconds
    pub window_s: f64,
    /// Report file
    pub path: PathBuf,
    /// Rows, subjects × scored stages
    pub rows: Vec<StageResult>,
}

/// Batch evaluation over all configured subjects and window lengths.
pub struct Evaluation {
    config: EvaluationConfig,
}

impl Evaluation {
    /// Create an evaluation, validating the configuration.
    pub fn new(config: EvaluationConfig) -> EvaluationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Load every subject once, score all window lengths and write reports.
    pub fn run(&self) -> EvaluationResult<Vec<WindowReport>> {
        let config = &self.config;
        let mut tables: Vec<Vec<StageResult>> = vec![Vec::new(); config.window_lengths_s.len()];

        if config.subjects.is_empty() {
            warn!("No subjects configured; reports will be empty");
        }

        for subject in &config.subjects {
            let path = config.recording_path(subject);
            info!("Subject {}: loading {}", subject, path.display());

            let processed = Recording::load(
                &path,
                config.sample_rate_hz,
                &config.montage,
                &config.mat_variable,
            )
            .map_err(EvaluationError::from)
            .and_then(|raw| preprocess(&raw, config))
            .map_err(|e| e.for_subject(subject))?;

            for (table, &window_s) in tables.iter_mut().zip(&config.window_lengths_s) {
                info!("Subject {}: window {} s ({})", subject, window_s, config.method.label());
                let rows = evaluate_preprocessed(&processed, config, window_s)
                    .map_err(|e| e.for_subject(subject))?;
                table.extend(rows);
            }
        }

        let mut reports = Vec::with_capacity(tables.len());
        for (rows, &window_s) in tables.into_iter().zip(&config.window_lengths_s) {
            let name = report_filename(&config.dataset, config.method, &config.channels, window_s);
            let path = config.output_dir.join(name);
            write_report(&path, &rows)?;
            info!("Wrote {} ({} rows)", path.display(), rows.len());
            reports.push(WindowReport { window_s, path, rows });
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::filters::FirDesign;
    use crate::simulation::SyntheticRecording;
    use ssvep_core::{Protocol, Segmenting};

    /// Small protocol: one scored stage of 2 iterations × 5 s, no training.
    fn short_config() -> EvaluationConfig {
        EvaluationConfig {
            montage: ["O1", "Oz", "O2", "Cz"].iter().map(|s| (*s).to_string()).collect(),
            protocol: Protocol { stages: vec![ProtocolStage::new(0.0, None, 2, 5.0)] },
            window_lengths_s: vec![2.0],
            ..EvaluationConfig::default()
        }
    }

    #[test]
    fn test_preprocess_shape_and_order() {
        let config = short_config();
        let raw = SyntheticRecording::new(&config, 1.0, 0.2).generate().unwrap();
        let processed = preprocess(&raw, &config).unwrap();

        assert_eq!(processed.samples(), raw.samples() - config.filter.numtaps + 1);
        // Montage order, not selection order
        assert_eq!(processed.channels(), &["O1", "Oz", "O2"]);
    }

    #[test]
    fn test_offline_time_is_window_length() {
        let config = EvaluationConfig { criterion: Criterion::Offline, ..short_config() };
        let raw = SyntheticRecording::new(&config, 1.0, 0.2).generate().unwrap();
        let rows = evaluate_subject(&raw, &config, 2.0).unwrap();

        assert_eq!(rows.len(), 1);
        assert!((rows[0].period_s - 5.0).abs() < 1e-12);
        assert!((rows[0].avg_time_s - 2.0).abs() < 1e-12);
        assert!(rows[0].accuracy_pct > 90.0);
        assert!(rows[0].itr_bits_per_min.is_finite());
    }

    #[test]
    fn test_apply_method_nooverlap() {
        let config = EvaluationConfig {
            criterion: Criterion::Offline,
            segmenting: Segmenting::NoOverlap,
            ..short_config()
        };
        let raw = SyntheticRecording::new(&config, 1.0, 0.2).generate().unwrap();
        let processed = preprocess(&raw, &config).unwrap();
        let stage = config.protocol.stages[0];
        let classifier = build_classifier(config.method, config.frequencies.as_slice(), 1200, 600.0, 2).unwrap();

        let outcome = apply_method(&processed, &stage, 2.0, &config, classifier.as_ref()).unwrap();
        // 8 segments × 2 windows, minus those cut by the filter delay
        assert!(outcome.confusion.total() <= 16);
        assert!(outcome.confusion.total() >= 14);
        assert!(outcome.accuracy > 0.9);
    }

    #[test]
    fn test_recording_rate_drives_windowing() {
        // Recorded at 300 Hz while the configuration still says 600 Hz
        let filter = FirDesign {
            bands_hz: vec![0.0, 4.0, 5.0, 49.0, 50.0, 150.0],
            numtaps: 425,
            ..FirDesign::default()
        };
        let recorded = EvaluationConfig {
            sample_rate_hz: 300.0,
            criterion: Criterion::Offline,
            filter,
            ..short_config()
        };
        let config = EvaluationConfig { sample_rate_hz: 600.0, ..recorded.clone() };
        let raw = SyntheticRecording::new(&recorded, 1.0, 0.2).generate().unwrap();
        assert!((raw.sample_rate_hz() - 300.0).abs() < 1e-12);

        let rows = evaluate_subject(&raw, &config, 2.0).unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].avg_time_s - 2.0).abs() < 1e-12);
        assert!(rows[0].accuracy_pct > 80.0, "accuracy {}", rows[0].accuracy_pct);

        let processed = preprocess(&raw, &config).unwrap();
        let classifier =
            build_classifier(config.method, config.frequencies.as_slice(), 600, 300.0, 2).unwrap();
        let outcome =
            apply_method(&processed, &config.protocol.stages[0], 2.0, &config, classifier.as_ref())
                .unwrap();
        assert!(outcome.confusion.total() >= 28);
    }

    #[test]
    fn test_score_stage_per_minute() {
        let config = EvaluationConfig::default();
        let row = score_stage(10.0, 1.0, 2.0, &config).unwrap();
        // log2(4) bits every 2 s
        assert!((row.itr_bits_per_min - 60.0).abs() < 1e-9);
        // log2(5) bits every 2 s
        assert!((row.utility_bits_per_min - 30.0 * 5.0_f64.log2()).abs() < 1e-9);
        assert_eq!(row.to_row()[1], 100.0);
    }

    #[test]
    fn test_missing_channel_fails() {
        let config = EvaluationConfig {
            channels: vec!["POz".to_string()],
            ..short_config()
        };
        let raw = SyntheticRecording::new(&short_config(), 1.0, 0.2).generate().unwrap();
        assert!(matches!(preprocess(&raw, &config), Err(EvaluationError::Recording(_))));
    }
}
