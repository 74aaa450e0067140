//! Synthetic SSVEP recordings
//!
//! Generates a recording that follows the configured protocol so the whole
//! pipeline can run without the study data. Each stimulation segment carries
//! a flicker response at its frequency plus the second harmonic, strongest
//! over occipital sites. Background activity is deterministic: slow drift,
//! alpha, line noise and a broadband term.
//!
//! The signal is padded by half the FIR length on both sides so that, after
//! valid-mode filtering, protocol time zero falls on the first output sample.

use std::f64::consts::PI;

use nalgebra::DMatrix;

use crate::config::EvaluationConfig;
use crate::error::RecordingResult;
use crate::recording::Recording;

/// Relative amplitude of the second harmonic
const SECOND_HARMONIC_GAIN: f64 = 0.4;

/// Gain of non-occipital channels relative to occipital ones
const REMOTE_GAIN: f64 = 0.1;

/// Protocol-following synthetic recording generator.
#[derive(Clone, Debug)]
pub struct SyntheticRecording {
    montage: Vec<String>,
    sample_rate_hz: f64,
    frequencies: Vec<f64>,
    /// `(start_s, end_s, period_s, segments)` of every stage
    stages: Vec<(f64, f64, f64, usize)>,
    pad: usize,
    amplitude: f64,
    noise: f64,
}

impl SyntheticRecording {
    /// Generator for the montage, protocol and filter of `config`.
    #[must_use]
    pub fn new(config: &EvaluationConfig, amplitude: f64, noise: f64) -> Self {
        let n_classes = config.n_classes();
        let stages = config
            .protocol
            .stages
            .iter()
            .map(|s| {
                let end = s.end_s.unwrap_or(s.start_s + s.nominal_duration_s(n_classes));
                (s.start_s, end, s.period_s, s.segment_count(n_classes))
            })
            .collect();

        Self {
            montage: config.montage.clone(),
            sample_rate_hz: config.sample_rate_hz,
            frequencies: config.frequencies.as_slice().to_vec(),
            stages,
            pad: config.filter.numtaps.saturating_sub(1) / 2,
            amplitude,
            noise,
        }
    }

    /// Protocol duration in seconds (end of the last stage)
    #[must_use]
    pub fn duration_s(&self) -> f64 {
        self.stages.iter().fold(0.0_f64, |m, s| m.max(s.1))
    }

    /// Stimulation frequency shown at protocol time `t`, if any.
    #[must_use]
    pub fn frequency_at(&self, t: f64) -> Option<f64> {
        let &(start, _, period, segments) =
            self.stages.iter().find(|(start, end, _, _)| t >= *start && t < *end)?;
        let segment = ((t - start) / period) as usize;
        if segment >= segments || self.frequencies.is_empty() {
            return None;
        }
        Some(self.frequencies[segment % self.frequencies.len()])
    }

    /// Build the recording.
    pub fn generate(&self) -> RecordingResult<Recording> {
        let fs = self.sample_rate_hz;
        let core = ssvep_core::math::seconds_to_samples(self.duration_s(), fs);
        let samples = core + 2 * self.pad;

        let gains: Vec<f64> = self
            .montage
            .iter()
            .enumerate()
            .map(|(c, name)| {
                if is_occipital(name) {
                    1.0 + 0.15 * c as f64 / self.montage.len().max(1) as f64
                } else {
                    REMOTE_GAIN
                }
            })
            .collect();

        let data = DMatrix::from_fn(samples, self.montage.len(), |i, c| {
            let t = (i as f64 - self.pad as f64) / fs;
            let phase = 0.6 * c as f64;

            let evoked = self.frequency_at(t).map_or(0.0, |f| {
                let w = 2.0 * PI * f * t;
                (w + phase).sin() + SECOND_HARMONIC_GAIN * (2.0 * w + phase).sin()
            });

            self.amplitude * gains[c] * evoked + self.noise * background(i, t, c)
        });

        Recording::new(data, fs, self.montage.clone())
    }
}

fn is_occipital(name: &str) -> bool {
    name.starts_with('O') || name.starts_with("PO")
}

/// Deterministic background activity for sample `i` of channel `c`.
fn background(i: usize, t: f64, c: usize) -> f64 {
    let c = c as f64;
    let x = i as f64;
    2.0 * (2.0 * PI * 0.7 * t + c).sin()
        + 0.6 * (2.0 * PI * 10.3 * t + 1.3 * c).sin()
        + 0.3 * (2.0 * PI * 50.0 * t).sin()
        + 0.5 * (x * 0.9 + 1.7 * c).sin() * (x * 0.31).cos()
}
