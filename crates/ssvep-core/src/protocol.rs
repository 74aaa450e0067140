//! Experimental protocol and analysis-window planning
//!
//! A session is split into stages. Inside a stage every stimulation frequency
//! is shown for `period_s` seconds, in label order, and the whole sequence is
//! repeated `iterations` times:
//!
//! ```text
//! | f0 | f1 | f2 | f3 | f0 | f1 | f2 | f3 | ...
//!  <-->
//!  period_s
//! ```
//!
//! Segment `k` of a stage therefore carries label `k % n_classes`.
//!
//! Windows are planned as sample offsets relative to the stage start, so the
//! planner never touches signal data and can run on embedded targets.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};
use crate::math::{constants, seconds_to_samples};
use crate::types::Segmenting;

// ============================================================================
// Stages
// ============================================================================

/// One contiguous block of the recording session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolStage {
    /// Stage start, seconds from the beginning of the (filtered) signal
    pub start_s: f64,
    /// Stage end in seconds; `None` runs to the end of the data
    #[serde(default)]
    pub end_s: Option<f64>,
    /// Number of repetitions of the full frequency sequence
    pub iterations: u32,
    /// Presentation time of each frequency in seconds
    pub period_s: f64,
    /// Whether the stage is scored and reported
    #[serde(default = "default_true")]
    pub evaluate: bool,
}

fn default_true() -> bool {
    true
}

impl ProtocolStage {
    /// Create a scored stage.
    #[must_use]
    pub const fn new(start_s: f64, end_s: Option<f64>, iterations: u32, period_s: f64) -> Self {
        Self { start_s, end_s, iterations, period_s, evaluate: true }
    }

    /// Mark the stage as not scored (e.g. a training block).
    #[must_use]
    pub const fn unscored(mut self) -> Self {
        self.evaluate = false;
        self
    }

    /// Number of stimulation segments in the stage
    #[inline]
    #[must_use]
    pub fn segment_count(&self, n_classes: usize) -> usize {
        self.iterations as usize * n_classes
    }

    /// Nominal stage duration implied by iterations and period
    #[inline]
    #[must_use]
    pub fn nominal_duration_s(&self, n_classes: usize) -> f64 {
        self.segment_count(n_classes) as f64 * self.period_s
    }

    /// Resolve the stage to a sample range `[start, end)` of a signal with
    /// `total_samples` rows. The range is clamped to the data.
    pub fn sample_range(
        &self,
        sample_rate_hz: f64,
        total_samples: usize,
    ) -> ProtocolResult<(usize, usize)> {
        if let Some(end_s) = self.end_s {
            if end_s < self.start_s {
                return Err(ProtocolError::InvalidStageBounds { start_s: self.start_s, end_s });
            }
        }
        let start = seconds_to_samples(self.start_s, sample_rate_hz).min(total_samples);
        let end = self
            .end_s
            .map_or(total_samples, |e| seconds_to_samples(e, sample_rate_hz))
            .min(total_samples);
        Ok((start, end))
    }
}

/// The full recording protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    /// Stages in recording order
    pub stages: Vec<ProtocolStage>,
}

impl Protocol {
    /// Stages that are scored
    pub fn scored_stages(&self) -> impl Iterator<Item = &ProtocolStage> {
        self.stages.iter().filter(|s| s.evaluate)
    }

    /// Number of scored stages
    #[must_use]
    pub fn scored_count(&self) -> usize {
        self.scored_stages().count()
    }
}

impl Default for Protocol {
    /// Protocol 7: 2×20 s (unscored), 4×10 s, then 5×5 s until the end.
    fn default() -> Self {
        Self {
            stages: alloc::vec![
                ProtocolStage::new(0.0, Some(160.0), 2, 20.0).unscored(),
                ProtocolStage::new(160.0, Some(320.0), 4, 10.0),
                ProtocolStage::new(320.0, None, 5, 5.0),
            ],
        }
    }
}

// ============================================================================
// Window Planning
// ============================================================================

/// Location and label of one analysis window, relative to the stage start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// First sample of the window
    pub start: usize,
    /// Window length in samples
    pub len: usize,
    /// Class label of the stimulation segment
    pub label: usize,
    /// Index of the stimulation segment inside the stage
    pub segment: usize,
}

impl WindowSpec {
    /// One past the last sample of the window
    #[inline]
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Result of planning: the windows that fit, and how many did not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowPlan {
    /// Windows in time order
    pub windows: Vec<WindowSpec>,
    /// Windows dropped because they ran past the available data
    pub dropped: usize,
}

impl WindowPlan {
    /// Class labels in window order
    #[must_use]
    pub fn labels(&self) -> Vec<usize> {
        make_labels(&self.windows)
    }

    /// Number of planned windows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// True when no window fits
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Planner turning a stage description into analysis windows.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowPlanner {
    /// Window length in seconds
    pub window_s: f64,
    /// Slide between sliding windows in seconds
    pub step_s: f64,
    /// Sample rate in Hz
    pub sample_rate_hz: f64,
    /// Segmenting mode
    pub segmenting: Segmenting,
}

impl WindowPlanner {
    /// Create a planner with the default 1 s slide.
    #[must_use]
    pub const fn new(window_s: f64, sample_rate_hz: f64, segmenting: Segmenting) -> Self {
        Self {
            window_s,
            step_s: constants::DEFAULT_WINDOW_STEP_S,
            sample_rate_hz,
            segmenting,
        }
    }

    /// Override the sliding step.
    #[must_use]
    pub const fn with_step(mut self, step_s: f64) -> Self {
        self.step_s = step_s;
        self
    }

    fn validate(&self, stage: &ProtocolStage) -> ProtocolResult<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(ProtocolError::InvalidSampleRate { sample_rate_hz: self.sample_rate_hz });
        }
        if !(self.window_s.is_finite() && self.window_s > 0.0) {
            return Err(ProtocolError::NonPositiveWindow { window_s: self.window_s });
        }
        if self.segmenting == Segmenting::Sliding && !(self.step_s.is_finite() && self.step_s > 0.0)
        {
            return Err(ProtocolError::NonPositiveStep { step_s: self.step_s });
        }
        if self.window_s > stage.period_s {
            return Err(ProtocolError::WindowLongerThanPeriod {
                window_s: self.window_s,
                period_s: stage.period_s,
            });
        }
        Ok(())
    }

    /// Plan the windows of `stage` over a stage signal of `available` samples.
    ///
    /// Windows and labels are produced together; a window that runs past the
    /// available data is dropped along with its label.
    pub fn plan(
        &self,
        stage: &ProtocolStage,
        n_classes: usize,
        available: usize,
    ) -> ProtocolResult<WindowPlan> {
        self.validate(stage)?;

        let fs = self.sample_rate_hz;
        let period = seconds_to_samples(stage.period_s, fs);
        let len = seconds_to_samples(self.window_s, fs).max(1);
        if len > period {
            return Err(ProtocolError::WindowLongerThanPeriod {
                window_s: self.window_s,
                period_s: stage.period_s,
            });
        }

        let (step, per_segment) = match self.segmenting {
            Segmenting::Sliding => {
                let step = seconds_to_samples(self.step_s, fs).max(1);
                (step, (period - len) / step + 1)
            }
            Segmenting::NoOverlap => {
                (len, (period / len).min(Segmenting::MAX_NOOVERLAP_WINDOWS))
            }
        };

        let mut plan = WindowPlan::default();
        for segment in 0..stage.segment_count(n_classes) {
            let seg_start = segment * period;
            let label = segment % n_classes;
            for j in 0..per_segment {
                let spec = WindowSpec { start: seg_start + j * step, len, label, segment };
                if spec.end() <= available {
                    plan.windows.push(spec);
                } else {
                    plan.dropped += 1;
                }
            }
        }

        Ok(plan)
    }
}

/// Plan the windows of one stage in a single call.
///
/// Shorthand for building a [`WindowPlanner`] with an explicit step.
#[allow(clippy::too_many_arguments)]
pub fn plan_windows(
    stage: &ProtocolStage,
    n_classes: usize,
    window_s: f64,
    step_s: f64,
    sample_rate_hz: f64,
    available: usize,
    segmenting: Segmenting,
) -> ProtocolResult<WindowPlan> {
    WindowPlanner::new(window_s, sample_rate_hz, segmenting)
        .with_step(step_s)
        .plan(stage, n_classes, available)
}

/// Class labels of a window sequence, in order.
#[must_use]
pub fn make_labels(windows: &[WindowSpec]) -> Vec<usize> {
    windows.iter().map(|w| w.label).collect()
}

// ============================================================================
// Tests
// ============================================================================
