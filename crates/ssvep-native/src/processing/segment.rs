//! Window extraction
//!
//! Cuts a stage signal into the analysis windows planned by
//! [`ssvep_core::protocol::WindowPlanner`].

use nalgebra::DMatrix;
use ssvep_core::protocol::{WindowPlan, WindowSpec};

/// One analysis window with its ground truth.
#[derive(Clone, Debug)]
pub struct Window {
    /// Signal, `samples × channels`
    pub data: DMatrix<f64>,
    /// Class label of the stimulation segment
    pub label: usize,
    /// Segment index inside the stage
    pub segment: usize,
    /// Window start relative to the stage, in samples
    pub start: usize,
}

impl Window {
    /// One past the last sample, relative to the stage
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.data.nrows()
    }
}

/// Copy out every planned window.
///
/// The plan must have been made for a signal at least as long as `signal`;
/// specs reaching past the end are skipped.
pub fn extract_windows(signal: &DMatrix<f64>, plan: &WindowPlan) -> Vec<Window> {
    plan.windows
        .iter()
        .filter(|spec| spec.end() <= signal.nrows())
        .map(|spec| extract(signal, spec))
        .collect()
}

fn extract(signal: &DMatrix<f64>, spec: &WindowSpec) -> Window {
    Window {
        data: signal.rows(spec.start, spec.len).into_owned(),
        label: spec.label,
        segment: spec.segment,
        start: spec.start,
    }
}
