//! Digital filters for SSVEP preprocessing
//!
//! Provides a linear-phase least-squares FIR design and "valid"-mode FFT
//! convolution over multichannel signals.

use nalgebra::{DMatrix, DVector};
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FilterError, FilterResult};

/// Band edges, desired gains and length of an FIR pre-filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FirDesign {
    /// Band edges in Hz, in pairs `[lo0, hi0, lo1, hi1, ...]`
    pub bands_hz: Vec<f64>,
    /// Desired gain at each band edge
    pub desired: Vec<f64>,
    /// Number of taps (odd)
    pub numtaps: usize,
}

impl Default for FirDesign {
    /// 5–49 Hz pass-band, stop below 4 Hz and above 50 Hz, 851 taps.
    fn default() -> Self {
        Self {
            bands_hz: vec![0.0, 4.0, 5.0, 49.0, 50.0, 300.0],
            desired: vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0],
            numtaps: 851,
        }
    }
}

impl FirDesign {
    /// Design the filter for a sample rate.
    pub fn build(&self, sample_rate_hz: f64) -> FilterResult<FirFilter> {
        FirFilter::least_squares(&self.bands_hz, &self.desired, sample_rate_hz, self.numtaps)
    }
}

/// Normalised sinc, `sin(πx) / (πx)`.
#[inline]
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = std::f64::consts::PI * x;
        px.sin() / px
    }
}

/// Symmetric (type I) FIR filter.
#[derive(Clone, Debug)]
pub struct FirFilter {
    taps: Vec<f64>,
}

impl FirFilter {
    /// Wrap existing coefficients.
    pub fn from_taps(taps: Vec<f64>) -> FilterResult<Self> {
        if taps.is_empty() {
            return Err(FilterError::InvalidTapCount { numtaps: 0 });
        }
        Ok(Self { taps })
    }

    /// Least-squares linear-phase design with unit band weights.
    ///
    /// `bands_hz` holds band edges in pairs and `desired` the gain at each
    /// edge; the desired response is linear inside each band and the gaps
    /// between bands are "don't care" transition regions.
    ///
    /// # Errors
    ///
    /// Fails on an even tap count, malformed bands or a singular system.
    pub fn least_squares(
        bands_hz: &[f64],
        desired: &[f64],
        sample_rate_hz: f64,
        numtaps: usize,
    ) -> FilterResult<Self> {
        if numtaps < 3 || numtaps % 2 == 0 {
            return Err(FilterError::InvalidTapCount { numtaps });
        }
        if bands_hz.is_empty() || bands_hz.len() % 2 != 0 {
            return Err(FilterError::InvalidBands {
                reason: format!("expected an even number of band edges, got {}", bands_hz.len()),
            });
        }
        if desired.len() != bands_hz.len() {
            return Err(FilterError::InvalidBands {
                reason: format!("{} band edges but {} gains", bands_hz.len(), desired.len()),
            });
        }

        let nyquist = sample_rate_hz / 2.0;
        if bands_hz.windows(2).any(|w| w[1] < w[0]) {
            return Err(FilterError::InvalidBands { reason: "band edges must be non-decreasing".into() });
        }
        if bands_hz.iter().any(|&f| !(0.0..=nyquist).contains(&f)) {
            return Err(FilterError::InvalidBands {
                reason: format!("band edges must lie within [0, {nyquist}] Hz"),
            });
        }

        // Normalised to Nyquist = 1
        let bands: Vec<(f64, f64)> = bands_hz
            .chunks_exact(2)
            .map(|p| (p[0] / nyquist, p[1] / nyquist))
            .collect();
        if bands.iter().any(|&(lo, hi)| hi <= lo) {
            return Err(FilterError::InvalidBands { reason: "empty band".into() });
        }
        let gains: Vec<(f64, f64)> = desired.chunks_exact(2).map(|p| (p[0], p[1])).collect();

        let m = (numtaps - 1) / 2;

        // q[k] = Σ ∫ cos(kπf) df over the bands
        let q: Vec<f64> = (0..numtaps)
            .map(|k| {
                let k = k as f64;
                bands.iter().map(|&(lo, hi)| hi * sinc(hi * k) - lo * sinc(lo * k)).sum()
            })
            .collect();

        // Toeplitz + Hankel normal matrix
        let qm = DMatrix::from_fn(m + 1, m + 1, |i, j| q[i.abs_diff(j)] + q[i + j]);

        // b[n] = Σ ∫ D(f) cos(nπf) df with D linear inside each band
        let pi = std::f64::consts::PI;
        let b = DVector::from_fn(m + 1, |n, _| {
            let nf = n as f64;
            bands
                .iter()
                .zip(&gains)
                .map(|(&(lo, hi), &(d_lo, d_hi))| {
                    let slope = (d_hi - d_lo) / (hi - lo);
                    let icept = d_lo - lo * slope;
                    let term = |f: f64| {
                        let mut v = f * (slope * f + icept) * sinc(f * nf);
                        if n == 0 {
                            v -= slope * f * f / 2.0;
                        } else {
                            v += slope * (nf * pi * f).cos() / (pi * nf).powi(2);
                        }
                        v
                    };
                    term(hi) - term(lo)
                })
                .sum()
        });

        let a = qm.lu().solve(&b).ok_or(FilterError::SingularSystem)?;
        if a.iter().any(|v| !v.is_finite()) {
            return Err(FilterError::SingularSystem);
        }

        let mut taps = Vec::with_capacity(numtaps);
        taps.extend((1..=m).rev().map(|i| a[i]));
        taps.push(2.0 * a[0]);
        taps.extend((1..=m).map(|i| a[i]));

        debug!("Designed {}-tap least-squares FIR at {} Hz", numtaps, sample_rate_hz);
        Ok(Self { taps })
    }

    /// Filter coefficients
    #[inline]
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Number of taps
    #[inline]
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// Always false for a constructed filter
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Magnitude response at a frequency.
    #[must_use]
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate_hz: f64) -> f64 {
        let w = 2.0 * std::f64::consts::PI * freq_hz / sample_rate_hz;
        let (re, im) = self
            .taps
            .iter()
            .enumerate()
            .fold((0.0_f64, 0.0_f64), |(re, im), (k, &h)| {
                let phase = w * k as f64;
                (re + h * phase.cos(), im - h * phase.sin())
            });
        re.hypot(im)
    }

    /// Filter every column and keep only the fully overlapped part.
    ///
    /// Output row `i` is `Σ_k h[k] · x[i + L - 1 - k]`, so the result has
    /// `samples - L + 1` rows.
    pub fn apply_valid(&self, signal: &DMatrix<f64>) -> FilterResult<DMatrix<f64>> {
        let n = signal.nrows();
        let m = self.taps.len();
        if n < m {
            return Err(FilterError::SignalTooShort { samples: n, numtaps: m });
        }

        let out_len = n - m + 1;
        let fft_len = (n + m - 1).next_power_of_two();

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(fft_len);
        let inverse = planner.plan_fft_inverse(fft_len);

        let zero = Complex::new(0.0, 0.0);
        let mut kernel = vec![zero; fft_len];
        for (k, &h) in kernel.iter_mut().zip(&self.taps) {
            *k = Complex::new(h, 0.0);
        }
        forward.process(&mut kernel);

        let scale = 1.0 / fft_len as f64;
        let mut out = Vec::with_capacity(out_len * signal.ncols());
        let mut buffer = vec![zero; fft_len];

        for column in signal.column_iter() {
            buffer.fill(zero);
            for (b, &x) in buffer.iter_mut().zip(column.iter()) {
                *b = Complex::new(x, 0.0);
            }

            forward.process(&mut buffer);
            for (b, k) in buffer.iter_mut().zip(&kernel) {
                *b = *b * *k;
            }
            inverse.process(&mut buffer);

            out.extend(buffer[m - 1..n].iter().map(|c| c.re * scale));
        }

        Ok(DMatrix::from_vec(out_len, signal.ncols(), out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(n: usize, freq: f64, fs: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_design_is_symmetric() {
        let fir = FirFilter::least_squares(&[0.0, 10.0, 20.0, 125.0], &[1.0, 1.0, 0.0, 0.0], 250.0, 101)
            .unwrap();
        let taps = fir.taps();
        assert_eq!(taps.len(), 101);
        for i in 0..50 {
            assert!((taps[i] - taps[100 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bandpass_response() {
        let fir = FirFilter::least_squares(
            &[0.0, 3.0, 6.0, 30.0, 40.0, 125.0],
            &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0],
            250.0,
            201,
        )
        .unwrap();

        assert!((fir.magnitude_at(15.0, 250.0) - 1.0).abs() < 0.05);
        assert!(fir.magnitude_at(0.5, 250.0) < 0.05);
        assert!(fir.magnitude_at(80.0, 250.0) < 0.05);
    }

    #[test]
    fn test_invalid_designs() {
        assert!(matches!(
            FirFilter::least_squares(&[0.0, 10.0], &[1.0, 1.0], 250.0, 100),
            Err(FilterError::InvalidTapCount { numtaps: 100 })
        ));
        assert!(matches!(
            FirFilter::least_squares(&[0.0, 10.0, 20.0], &[1.0, 1.0, 0.0], 250.0, 51),
            Err(FilterError::InvalidBands { .. })
        ));
        assert!(matches!(
            FirFilter::least_squares(&[0.0, 10.0, 20.0, 200.0], &[1.0, 1.0, 0.0, 0.0], 250.0, 51),
            Err(FilterError::InvalidBands { .. })
        ));
        assert!(matches!(
            FirFilter::least_squares(&[10.0, 0.0], &[1.0, 1.0], 250.0, 51),
            Err(FilterError::InvalidBands { .. })
        ));
    }

    #[test]
    fn test_valid_convolution_matches_direct() {
        let fir = FirFilter::from_taps(vec![0.25, 0.5, 0.25]).unwrap();
        let x = DMatrix::from_column_slice(6, 2, &[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, // ch 0
            0.0, 1.0, 0.0, -1.0, 0.0, 1.0, // ch 1
        ]);
        let y = fir.apply_valid(&x).unwrap();

        assert_eq!(y.nrows(), 4);
        assert_eq!(y.ncols(), 2);
        for i in 0..4 {
            let direct0 = 0.25 * x[(i, 0)] + 0.5 * x[(i + 1, 0)] + 0.25 * x[(i + 2, 0)];
            let direct1 = 0.25 * x[(i, 1)] + 0.5 * x[(i + 1, 1)] + 0.25 * x[(i + 2, 1)];
            assert!((y[(i, 0)] - direct0).abs() < 1e-9);
            assert!((y[(i, 1)] - direct1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_default_prefilter_passes_ssvep_band() {
        let fs = 600.0;
        let fir = FirDesign::default().build(fs).unwrap();
        assert_eq!(fir.len(), 851);

        let n = 6000;
        let inband = DMatrix::from_column_slice(n, 1, &sine(n, 8.0, fs));
        let mains = DMatrix::from_column_slice(n, 1, &sine(n, 60.0, fs));

        let rms = |m: &DMatrix<f64>| (m.iter().map(|v| v * v).sum::<f64>() / m.len() as f64).sqrt();

        let pass = fir.apply_valid(&inband).unwrap();
        let stop = fir.apply_valid(&mains).unwrap();
        assert_eq!(pass.nrows(), n - 850);

        // Unit sine has RMS 1/√2
        assert!((rms(&pass) - std::f64::consts::FRAC_1_SQRT_2).abs() < 0.05);
        assert!(rms(&stop) < 0.05);
    }

    #[test]
    fn test_signal_too_short() {
        let fir = FirFilter::from_taps(vec![1.0; 5]).unwrap();
        let x = DMatrix::<f64>::zeros(3, 1);
        assert!(matches!(fir.apply_valid(&x), Err(FilterError::SignalTooShort { .. })));
    }
}
