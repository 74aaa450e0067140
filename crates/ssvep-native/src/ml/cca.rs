//! Canonical correlation analysis classifier
//!
//! Each stimulation frequency gets a reference set of sine/cosine pairs at the
//! fundamental and its harmonics. A window's score for that frequency is the
//! largest canonical correlation between the (centred) multichannel window and
//! the (centred) references:
//!
//! ```text
//! X = QxRx,  Y = QyRy  (thin QR)
//! ρ = σ_max(Qxᵀ Qy)
//! ```

use nalgebra::DMatrix;

use super::SsvepClassifier;
use crate::error::{ClassifierError, ClassifierResult};

/// Default number of harmonics in the reference set
pub const DEFAULT_HARMONICS: usize = 2;

/// CCA classifier with precomputed orthonormal reference bases.
#[derive(Clone, Debug)]
pub struct CcaClassifier {
    frequencies: Vec<f64>,
    window_samples: usize,
    /// Orthonormal basis of each centred reference set
    reference_bases: Vec<DMatrix<f64>>,
}

impl CcaClassifier {
    /// Build references for windows of `window_samples` samples.
    pub fn new(
        frequencies: &[f64],
        window_samples: usize,
        sample_rate_hz: f64,
        harmonics: usize,
    ) -> ClassifierResult<Self> {
        if frequencies.is_empty() {
            return Err(ClassifierError::InvalidParameter {
                parameter: "frequencies",
                reason: "at least one frequency is required".into(),
            });
        }
        if harmonics == 0 {
            return Err(ClassifierError::InvalidParameter {
                parameter: "harmonics",
                reason: "must be at least 1".into(),
            });
        }
        if window_samples <= 2 * harmonics {
            return Err(ClassifierError::InvalidParameter {
                parameter: "window_samples",
                reason: format!("{window_samples} samples cannot support {harmonics} harmonics"),
            });
        }

        let reference_bases = frequencies
            .iter()
            .map(|&f| {
                let mut refs = reference_signals(f, window_samples, sample_rate_hz, harmonics);
                center_columns(&mut refs);
                refs.qr().q()
            })
            .collect();

        Ok(Self { frequencies: frequencies.to_vec(), window_samples, reference_bases })
    }

    /// Window length the references were built for
    #[inline]
    pub fn window_samples(&self) -> usize {
        self.window_samples
    }

    /// Largest canonical correlation between a window and one reference set.
    fn max_correlation(qx: &DMatrix<f64>, qy: &DMatrix<f64>) -> f64 {
        let cross = qx.transpose() * qy;
        cross
            .singular_values()
            .iter()
            .fold(0.0_f64, |m, &s| m.max(s))
            .min(1.0)
    }
}

impl SsvepClassifier for CcaClassifier {
    fn name(&self) -> &'static str {
        "CCA"
    }

    fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    fn scores(&self, window: &DMatrix<f64>) -> ClassifierResult<Vec<f64>> {
        if window.nrows() != self.window_samples {
            return Err(ClassifierError::WindowShape {
                expected: self.window_samples,
                got: window.nrows(),
            });
        }
        if window.ncols() == 0 {
            return Err(ClassifierError::NoChannels);
        }

        let mut x = window.clone();
        center_columns(&mut x);
        let qx = x.qr().q();

        Ok(self
            .reference_bases
            .iter()
            .map(|qy| Self::max_correlation(&qx, qy))
            .collect())
    }
}

/// Sine/cosine references: columns `sin(2πkft)`, `cos(2πkft)` for
/// `k = 1..=harmonics`.
#[must_use]
pub fn reference_signals(
    freq_hz: f64,
    samples: usize,
    sample_rate_hz: f64,
    harmonics: usize,
) -> DMatrix<f64> {
    DMatrix::from_fn(samples, 2 * harmonics, |i, c| {
        let k = (c / 2 + 1) as f64;
        let phase = 2.0 * std::f64::consts::PI * k * freq_hz * i as f64 / sample_rate_hz;
        if c % 2 == 0 {
            phase.sin()
        } else {
            phase.cos()
        }
    })
}

fn center_columns(m: &mut DMatrix<f64>) {
    let rows = m.nrows() as f64;
    for mut col in m.column_iter_mut() {
        let mean = col.sum() / rows;
        col.add_scalar_mut(-mean);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 600.0;
    const FREQS: [f64; 4] = [5.6, 6.4, 6.9, 8.0];

    /// Three channels of a flicker at `freq` with per-channel phase, gain and
    /// deterministic pseudo-noise.
    fn ssvep_window(freq: f64, samples: usize, noise: f64) -> DMatrix<f64> {
        DMatrix::from_fn(samples, 3, |i, ch| {
            let t = i as f64 / FS;
            let phase = ch as f64 * 0.7;
            let gain = 1.0 + ch as f64 * 0.3;
            let w = 2.0 * std::f64::consts::PI * freq;
            gain * (w * t + phase).sin()
                + 0.4 * gain * (2.0 * w * t + phase).sin()
                + noise * ((i as f64 * 0.9 + ch as f64 * 1.7).sin() * (i as f64 * 0.31).cos())
        })
    }

    #[test]
    fn test_reference_layout() {
        let r = reference_signals(10.0, 60, 600.0, 2);
        assert_eq!(r.ncols(), 4);
        // cos(0) = 1, sin(0) = 0
        assert!(r[(0, 0)].abs() < 1e-12);
        assert!((r[(0, 1)] - 1.0).abs() < 1e-12);
        assert!((r[(0, 3)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pure_flicker_correlates_fully() {
        let cca = CcaClassifier::new(&FREQS, 1200, FS, 2).unwrap();
        let scores = cca.scores(&ssvep_window(6.9, 1200, 0.0)).unwrap();

        assert!((scores[2] - 1.0).abs() < 1e-6);
        assert!(scores[0] < 0.9);
        assert!(scores[3] < 0.9);
    }

    #[test]
    fn test_classifies_each_frequency() {
        let cca = CcaClassifier::new(&FREQS, 1800, FS, DEFAULT_HARMONICS).unwrap();
        for (label, &f) in FREQS.iter().enumerate() {
            let window = ssvep_window(f, 1800, 1.0);
            assert_eq!(cca.classify(&window).unwrap(), label, "frequency {f}");
        }
    }

    #[test]
    fn test_window_shape_checked() {
        let cca = CcaClassifier::new(&FREQS, 1200, FS, 2).unwrap();
        let err = cca.scores(&DMatrix::zeros(600, 3));
        assert!(matches!(err, Err(ClassifierError::WindowShape { expected: 1200, got: 600 })));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(CcaClassifier::new(&[], 1200, FS, 2).is_err());
        assert!(CcaClassifier::new(&FREQS, 1200, FS, 0).is_err());
        assert!(CcaClassifier::new(&FREQS, 3, FS, 2).is_err());
    }
}
