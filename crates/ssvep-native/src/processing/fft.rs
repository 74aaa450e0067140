//! FFT-based spectral analysis
//!
//! Provides periodogram and Welch power spectra plus the narrow-band SNR
//! used to detect SSVEP peaks.

use rustfft::{num_complex::Complex, FftPlanner};

/// FFT-based spectral analyzer
pub struct SpectralAnalyzer {
    fft_size: usize,
    sample_rate: f64,
    planner: FftPlanner<f64>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl SpectralAnalyzer {
    /// Create a new spectral analyzer
    ///
    /// # Arguments
    ///
    /// * `fft_size` - FFT size (zero-padding length; a power of 2 is fastest)
    /// * `sample_rate` - Sample rate in Hz
    #[must_use]
    pub fn new(fft_size: usize, sample_rate: f64) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Self {
            fft_size,
            sample_rate,
            planner,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()],
        }
    }

    /// FFT size in bins
    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Frequency resolution (Hz per bin)
    #[must_use]
    pub fn frequency_resolution(&self) -> f64 {
        self.sample_rate / self.fft_size as f64
    }

    /// Index of the bin closest to a frequency
    #[must_use]
    pub fn bin_for(&self, freq_hz: f64) -> usize {
        let bin = (freq_hz / self.frequency_resolution()).round();
        if bin <= 0.0 {
            0
        } else {
            (bin as usize).min(self.fft_size / 2)
        }
    }

    /// Compute power spectrum from time-domain samples
    ///
    /// The input is Hann-windowed over its own length, then zero-padded (or
    /// truncated) to the FFT size. Returns `fft_size / 2 + 1` power values.
    pub fn compute_psd(&mut self, samples: &[f64]) -> Vec<f64> {
        let len = samples.len().min(self.fft_size);
        let window = hann_window(len);

        self.buffer.fill(Complex::new(0.0, 0.0));
        for (i, (&s, &w)) in samples.iter().zip(window.iter()).enumerate() {
            self.buffer[i] = Complex::new(s * w, 0.0);
        }

        let fft = self.planner.plan_fft_forward(self.fft_size);
        fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        // Positive frequencies only
        let n_freqs = self.fft_size / 2 + 1;
        let norm = 1.0 / (len.max(1) as f64).powi(2);

        self.buffer[..n_freqs]
            .iter()
            .map(|c| (c.re * c.re + c.im * c.im) * norm)
            .collect()
    }

    /// Welch estimate: average of 50%-overlapping periodograms.
    ///
    /// Falls back to a single periodogram when the input is shorter than one
    /// segment.
    pub fn welch_psd(&mut self, samples: &[f64], segment_len: usize) -> Vec<f64> {
        let segment_len = segment_len.clamp(1, self.fft_size);
        if samples.len() <= segment_len {
            return self.compute_psd(samples);
        }

        let hop = (segment_len / 2).max(1);
        let mut acc = vec![0.0; self.fft_size / 2 + 1];
        let mut count = 0usize;

        let mut start = 0;
        while start + segment_len <= samples.len() {
            let psd = self.compute_psd(&samples[start..start + segment_len]);
            for (a, p) in acc.iter_mut().zip(psd) {
                *a += p;
            }
            count += 1;
            start += hop;
        }

        acc.iter_mut().for_each(|a| *a /= count as f64);
        acc
    }

    /// Bins used as the noise floor around `freq_hz` in a spectrum of
    /// `n_bins` values.
    ///
    /// These are the bins at least `guard_hz` and at most `half_width_hz`
    /// away from the centre bin, on both sides. The guard is at least one
    /// bin, so the centre never counts as noise, and the ring reaches at
    /// least one bin past the guard.
    #[must_use]
    pub fn noise_bins(
        &self,
        n_bins: usize,
        freq_hz: f64,
        guard_hz: f64,
        half_width_hz: f64,
    ) -> Vec<usize> {
        if n_bins == 0 {
            return Vec::new();
        }
        let res = self.frequency_resolution();
        let centre = self.bin_for(freq_hz).min(n_bins - 1);
        let guard = ((guard_hz / res).round() as usize).max(1);
        let span = ((half_width_hz / res).round() as usize).max(guard + 1);

        let lo = centre.saturating_sub(span);
        let hi = (centre + span).min(n_bins - 1);
        (lo..=hi).filter(|&b| b.abs_diff(centre) >= guard).collect()
    }

    /// Ratio of the power at `freq_hz` to the mean power of its
    /// [`noise_bins`](Self::noise_bins).
    ///
    /// The guard keeps the window's main lobe out of the noise estimate.
    #[must_use]
    pub fn narrowband_snr(&self, psd: &[f64], freq_hz: f64, guard_hz: f64, half_width_hz: f64) -> f64 {
        let noise = self.noise_bins(psd.len(), freq_hz, guard_hz, half_width_hz);
        let sum: f64 = noise.iter().map(|&b| psd[b]).sum();
        if noise.is_empty() || sum <= 0.0 {
            return 0.0;
        }
        let centre = self.bin_for(freq_hz).min(psd.len() - 1);
        psd[centre] / (sum / noise.len() as f64)
    }
}

/// Generate Hann window coefficients
fn hann_window(size: usize) -> Vec<f64> {
    if size < 2 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (size - 1) as f64).cos())
        })
        .collect()
}
