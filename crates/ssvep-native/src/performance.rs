//! Classification scoring
//!
//! A confusion matrix with one extra column for undefined outputs. Rows are
//! the true class, columns the selected class.

use std::fmt;

use ssvep_core::Decision;

/// `N × (N + 1)` confusion matrix; column `N` counts undefined outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfusionMatrix {
    n_classes: usize,
    counts: Vec<u64>,
}

impl ConfusionMatrix {
    /// Empty matrix for `n_classes` classes
    #[must_use]
    pub fn new(n_classes: usize) -> Self {
        Self { n_classes, counts: vec![0; n_classes * (n_classes + 1)] }
    }

    /// Tally aligned labels and decisions.
    ///
    /// Pairs whose label or selected class is out of range are ignored.
    #[must_use]
    pub fn from_decisions(labels: &[usize], decisions: &[Decision], n_classes: usize) -> Self {
        let mut cm = Self::new(n_classes);
        for (&label, decision) in labels.iter().zip(decisions) {
            cm.record(label, *decision);
        }
        cm
    }

    /// Add one outcome.
    pub fn record(&mut self, label: usize, decision: Decision) {
        if label >= self.n_classes {
            return;
        }
        let column = match decision {
            Decision::Class(c) if c < self.n_classes => c,
            Decision::Class(_) => return,
            Decision::Undefined => self.n_classes,
        };
        self.counts[label * (self.n_classes + 1) + column] += 1;
    }

    /// Number of classes
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Count at (`label`, `column`); `column == n_classes` is the undefined column.
    #[must_use]
    pub fn count(&self, label: usize, column: usize) -> u64 {
        if label >= self.n_classes || column > self.n_classes {
            return 0;
        }
        self.counts[label * (self.n_classes + 1) + column]
    }

    /// All outcomes
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Outcomes that selected a class
    #[must_use]
    pub fn defined(&self) -> u64 {
        self.total() - self.undefined()
    }

    /// Outcomes without a selection
    #[must_use]
    pub fn undefined(&self) -> u64 {
        (0..self.n_classes).map(|r| self.count(r, self.n_classes)).sum()
    }

    /// Correct selections
    #[must_use]
    pub fn correct(&self) -> u64 {
        (0..self.n_classes).map(|r| self.count(r, r)).sum()
    }

    /// Correct selections over defined selections; 0 when nothing was selected.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let defined = self.defined();
        if defined == 0 {
            return 0.0;
        }
        self.correct() as f64 / defined as f64
    }

    /// Fraction of outcomes without a selection
    #[must_use]
    pub fn undefined_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.undefined() as f64 / total as f64
    }

    /// Cohen's kappa over the defined selections.
    ///
    /// `κ = (p_o − p_e) / (1 − p_e)`. Returns 0 when nothing was selected or
    /// chance agreement is already perfect.
    #[must_use]
    pub fn cohen_kappa(&self) -> f64 {
        let defined = self.defined() as f64;
        if defined == 0.0 {
            return 0.0;
        }

        let p_o = self.correct() as f64 / defined;
        let p_e = (0..self.n_classes)
            .map(|k| {
                let row: u64 = (0..self.n_classes).map(|c| self.count(k, c)).sum();
                let col: u64 = (0..self.n_classes).map(|r| self.count(r, k)).sum();
                (row as f64 / defined) * (col as f64 / defined)
            })
            .sum::<f64>();

        if (1.0 - p_e).abs() < f64::EPSILON {
            return 0.0;
        }
        (p_o - p_e) / (1.0 - p_e)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.n_classes {
            let row: Vec<String> =
                (0..=self.n_classes).map(|c| self.count(r, c).to_string()).collect();
            writeln!(f, "[{}]", row.join(" "))?;
        }
        Ok(())
    }
}
