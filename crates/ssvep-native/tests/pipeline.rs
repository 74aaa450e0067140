//! End-to-end evaluation on synthetic recordings

use std::path::{Path, PathBuf};

use ssvep_core::{Criterion, Method, Protocol, ProtocolStage};
use ssvep_native::{Evaluation, EvaluationConfig, Recording, SyntheticRecording};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ssvep-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// A shortened protocol-7 layout: 1 unscored iteration of 10 s, then
/// 2 × 10 s and 2 × 5 s scored stages.
fn config(dir: &Path) -> EvaluationConfig {
    EvaluationConfig {
        data_dir: dir.to_path_buf(),
        file_pattern: "{subject}.csv".to_string(),
        subjects: vec!["S01".to_string(), "S02".to_string()],
        montage: ["Cz", "Pz", "O1", "Oz", "O2"].iter().map(|s| (*s).to_string()).collect(),
        protocol: Protocol {
            stages: vec![
                ProtocolStage::new(0.0, Some(40.0), 1, 10.0).unscored(),
                ProtocolStage::new(40.0, Some(120.0), 2, 10.0),
                ProtocolStage::new(120.0, None, 2, 5.0),
            ],
        },
        window_lengths_s: vec![2.0, 3.0],
        output_dir: dir.join("out"),
        ..EvaluationConfig::default()
    }
}

fn write_subjects(config: &EvaluationConfig) {
    for (k, subject) in config.subjects.iter().enumerate() {
        let recording = SyntheticRecording::new(config, 1.0, 0.2 + 0.1 * k as f64)
            .generate()
            .unwrap();
        recording.write_csv(&config.recording_path(subject)).unwrap();
    }
}

#[test]
fn test_offline_pipeline_writes_reports() {
    let dir = scratch_dir("offline");
    let config = EvaluationConfig { criterion: Criterion::Offline, ..config(&dir) };
    write_subjects(&config);

    let reports = Evaluation::new(config.clone()).unwrap().run().unwrap();
    assert_eq!(reports.len(), 2);

    for report in &reports {
        // 2 subjects × 2 scored stages
        assert_eq!(report.rows.len(), 4);
        assert!(report.path.exists());
        for row in &report.rows {
            assert!(row.accuracy_pct > 90.0, "accuracy {}", row.accuracy_pct);
            assert!((row.avg_time_s - report.window_s).abs() < 1e-12);
            assert!(row.itr_bits_per_min > 0.0);
        }
        assert!((report.rows[0].period_s - 10.0).abs() < 1e-12);
        assert!((report.rows[1].period_s - 5.0).abs() < 1e-12);
    }

    let name = reports[0].path.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(name, "sandra_CCA_Oz-O2-O1_2.txt");

    let text = std::fs::read_to_string(&reports[1].path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("10.00,"));
    assert_eq!(lines[0].split(',').count(), 5);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_pseudo_online_pipeline() {
    let dir = scratch_dir("pseudoon");
    let config = EvaluationConfig { window_lengths_s: vec![2.0], ..config(&dir) };
    write_subjects(&config);

    let reports = Evaluation::new(config).unwrap().run().unwrap();
    let rows = &reports[0].rows;
    assert_eq!(rows.len(), 4);

    for row in rows {
        // A selection needs at least one window and never more than a period
        assert!(row.avg_time_s >= 2.0 - 1e-9);
        assert!(row.avg_time_s <= row.period_s + 1e-9);
        assert!(row.accuracy_pct > 80.0, "accuracy {}", row.accuracy_pct);
    }

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_psda_method_in_report_name() {
    let dir = scratch_dir("psda");
    let config = EvaluationConfig {
        method: Method::Psda,
        criterion: Criterion::Offline,
        subjects: vec!["S01".to_string()],
        window_lengths_s: vec![3.0],
        ..config(&dir)
    };
    write_subjects(&config);

    let reports = Evaluation::new(config).unwrap().run().unwrap();
    assert!(reports[0].path.ends_with("sandra_PSDA_Oz-O2-O1_3.txt"));
    assert!(reports[0].rows.iter().all(|r| r.accuracy_pct > 75.0));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_missing_recording_names_subject() {
    let dir = scratch_dir("missing");
    let config = config(&dir);

    let err = Evaluation::new(config).unwrap().run().unwrap_err();
    assert!(err.to_string().contains("S01"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_csv_round_trip_preserves_montage() {
    let dir = scratch_dir("roundtrip");
    let config = config(&dir);
    let path = dir.join("roundtrip.csv");

    let original = SyntheticRecording::new(&config, 1.0, 0.1).generate().unwrap();
    original.write_csv(&path).unwrap();
    let loaded = Recording::load(&path, 600.0, &[], "data").unwrap();

    assert_eq!(loaded.channels(), original.channels());
    assert_eq!(loaded.samples(), original.samples());

    let _ = std::fs::remove_dir_all(dir);
}
