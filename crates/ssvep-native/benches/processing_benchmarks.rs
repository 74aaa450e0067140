//! Benchmarks for signal processing and classification

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::DMatrix;

use ssvep_native::ml::{CcaClassifier, PsdaClassifier, SsvepClassifier};
use ssvep_native::processing::{fft::SpectralAnalyzer, filters::FirDesign};

const FS: f64 = 600.0;
const FREQUENCIES: [f64; 4] = [5.6, 6.4, 6.9, 8.0];

/// Generate a synthetic SSVEP window (flicker with pseudo-noise)
fn generate_window(samples: usize, channels: usize, freq_hz: f64) -> DMatrix<f64> {
    use std::f64::consts::PI;

    DMatrix::from_fn(samples, channels, |i, c| {
        let t = i as f64 / FS;
        let signal = (2.0 * PI * freq_hz * t + c as f64 * 0.5).sin();
        let noise = (i as f64 * 0.123 + c as f64).sin() * 0.3; // Pseudo-noise
        (signal + noise) * 20.0
    })
}

fn bench_fir_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("fir_filter");
    group.sample_size(10);

    let filter = FirDesign::default().build(FS).expect("default design");

    for seconds in [10usize, 60].iter() {
        let signal = generate_window(seconds * 600, 16, 6.9);

        group.bench_with_input(BenchmarkId::from_parameter(seconds), seconds, |b, _| {
            b.iter(|| black_box(filter.apply_valid(black_box(&signal))));
        });
    }

    group.finish();
}

fn bench_fir_design(c: &mut Criterion) {
    c.bench_function("fir_design_851", |b| {
        b.iter(|| black_box(FirDesign::default().build(black_box(FS))));
    });
}

fn bench_cca_scores(c: &mut Criterion) {
    let mut group = c.benchmark_group("cca_scores");

    for window_s in [2usize, 5].iter() {
        let samples = window_s * 600;
        let cca = CcaClassifier::new(&FREQUENCIES, samples, FS, 2).expect("classifier");
        let window = generate_window(samples, 3, 6.9);

        group.bench_with_input(BenchmarkId::from_parameter(window_s), window_s, |b, _| {
            b.iter(|| black_box(cca.scores(black_box(&window))));
        });
    }

    group.finish();
}

fn bench_psda_scores(c: &mut Criterion) {
    let samples = 1200;
    let psda = PsdaClassifier::new(&FREQUENCIES, samples, FS, 2).expect("classifier");
    let window = generate_window(samples, 3, 8.0);

    c.bench_function("psda_scores_2s", |b| {
        b.iter(|| black_box(psda.scores(black_box(&window))));
    });
}

fn bench_fft_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft_analysis");

    for size in [1024, 4096].iter() {
        let window = generate_window(1200, 1, 6.4);
        let samples: Vec<f64> = window.column(0).iter().copied().collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut analyzer = SpectralAnalyzer::new(size, FS);
            b.iter(|| black_box(analyzer.compute_psd(black_box(&samples))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fir_filter,
    bench_fir_design,
    bench_cca_scores,
    bench_psda_scores,
    bench_fft_analysis,
);

criterion_main!(benches);
