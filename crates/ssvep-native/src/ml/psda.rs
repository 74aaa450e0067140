//! Power spectral density analysis classifier
//!
//! Scores each frequency by the narrow-band SNR of its fundamental and
//! harmonics, summed over channels.

use std::cell::RefCell;

use nalgebra::DMatrix;

use super::SsvepClassifier;
use crate::error::{ClassifierError, ClassifierResult};
use crate::processing::fft::SpectralAnalyzer;

/// Smallest FFT used for scoring; short windows are zero-padded up to it.
const MIN_FFT_SIZE: usize = 4096;

/// Noise ring width past the guard band, in Hz
const NOISE_BAND_HZ: f64 = 1.0;

/// PSDA classifier.
pub struct PsdaClassifier {
    frequencies: Vec<f64>,
    window_samples: usize,
    sample_rate_hz: f64,
    harmonics: usize,
    guard_hz: f64,
    analyzer: RefCell<SpectralAnalyzer>,
}

impl PsdaClassifier {
    /// Create a classifier for windows of `window_samples` samples.
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
        if window_samples < 2 {
            return Err(ClassifierError::InvalidParameter {
                parameter: "window_samples",
                reason: format!("{window_samples} samples is too short for a spectrum"),
            });
        }

        let fft_size = window_samples.max(MIN_FFT_SIZE).next_power_of_two();
        // Hann main lobe half-width
        let guard_hz = 2.0 * sample_rate_hz / window_samples as f64;

        Ok(Self {
            frequencies: frequencies.to_vec(),
            window_samples,
            sample_rate_hz,
            harmonics,
            guard_hz,
            analyzer: RefCell::new(SpectralAnalyzer::new(fft_size, sample_rate_hz)),
        })
    }

    /// Window length the classifier expects
    #[inline]
    pub fn window_samples(&self) -> usize {
        self.window_samples
    }
}

impl SsvepClassifier for PsdaClassifier {
    fn name(&self) -> &'static str {
        "PSDA"
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

        let nyquist = self.sample_rate_hz / 2.0;
        let mut analyzer = self.analyzer.borrow_mut();
        let mut scores = vec![0.0; self.frequencies.len()];

        for column in window.column_iter() {
            let samples: Vec<f64> = column.iter().copied().collect();
            let psd = analyzer.compute_psd(&samples);

            for (score, &f) in scores.iter_mut().zip(&self.frequencies) {
                for h in 1..=self.harmonics {
                    let target = f * h as f64;
                    if target >= nyquist {
                        break;
                    }
                    *score += analyzer.narrowband_snr(
                        &psd,
                        target,
                        self.guard_hz,
                        self.guard_hz + NOISE_BAND_HZ,
                    );
                }
            }
        }

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 600.0;
    const FREQS: [f64; 4] = [5.6, 6.4, 6.9, 8.0];

    fn flicker(freq: f64, samples: usize) -> DMatrix<f64> {
        DMatrix::from_fn(samples, 3, |i, ch| {
            let t = i as f64 / FS;
            let w = 2.0 * std::f64::consts::PI * freq;
            (w * t + ch as f64).sin()
                + 0.3 * (2.0 * w * t).sin()
                + 0.5 * (i as f64 * 0.9 + ch as f64).sin()
        })
    }

    #[test]
    fn test_classifies_each_frequency() {
        let psda = PsdaClassifier::new(&FREQS, 1800, FS, 2).unwrap();
        for (label, &f) in FREQS.iter().enumerate() {
            assert_eq!(psda.classify(&flicker(f, 1800)).unwrap(), label, "frequency {f}");
        }
    }

    #[test]
    fn test_scores_favour_stimulus() {
        let psda = PsdaClassifier::new(&FREQS, 1800, FS, 1).unwrap();
        let scores = psda.scores(&flicker(8.0, 1800)).unwrap();
        assert!(scores[3] > 3.0 * scores[0]);
    }

    #[test]
    fn test_noise_ring_for_two_second_windows() {
        let psda = PsdaClassifier::new(&FREQS, 1200, FS, 2).unwrap();
        // Hann main lobe of a 2 s window is 1 Hz wide on each side
        assert!((psda.guard_hz - 1.0).abs() < 1e-12);

        let analyzer = psda.analyzer.borrow();
        let res = analyzer.frequency_resolution();
        let centre = analyzer.bin_for(8.0);
        let bins = analyzer.noise_bins(2049, 8.0, psda.guard_hz, psda.guard_hz + NOISE_BAND_HZ);

        // 1 Hz to 2 Hz away on each side, at 600/4096 Hz per bin
        assert_eq!(bins.len(), 2 * (14 - 7 + 1));
        assert!(bins.iter().all(|&b| {
            let offset_hz = b.abs_diff(centre) as f64 * res;
            offset_hz > 0.95 && offset_hz < 2.1
        }));
        assert!(!bins.contains(&centre));
    }

    #[test]
    fn test_window_shape_checked() {
        let psda = PsdaClassifier::new(&FREQS, 1200, FS, 2).unwrap();
        assert!(matches!(
            psda.scores(&DMatrix::zeros(1000, 3)),
            Err(ClassifierError::WindowShape { expected: 1200, got: 1000 })
        ));
        assert!(matches!(psda.scores(&DMatrix::zeros(1200, 0)), Err(ClassifierError::NoChannels)));
    }
}
