//! Result reports
//!
//! One comma-separated text file per window length, one row per subject and
//! scored stage, values printed with two decimals and no header.

use std::fs;
use std::path::Path;

use ssvep_core::Method;

use crate::error::{ReportError, ReportResult};
use crate::evaluation::StageResult;

/// Report file name: `{dataset}_{METHOD}_{Ch1-Ch2-...}_{window}.txt`.
///
/// Whole window lengths are written without a fractional part.
#[must_use]
pub fn report_filename(dataset: &str, method: Method, channels: &[String], window_s: f64) -> String {
    format!("{}_{}_{}_{}.txt", dataset, method.label(), channels.join("-"), format_window(window_s))
}

fn format_window(window_s: f64) -> String {
    if window_s.fract() == 0.0 {
        format!("{window_s:.0}")
    } else {
        window_s.to_string()
    }
}

/// Write rows as `%.2f` comma-separated values, creating parent directories.
pub fn write_report(path: &Path, rows: &[StageResult]) -> ReportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| ReportError::Io { path: parent.to_path_buf(), source })?;
    }

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    for row in rows {
        writer.write_record(row.to_row().iter().map(|v| format!("{v:.2}")))?;
    }
    writer.flush().map_err(|source| ReportError::Io { path: path.to_path_buf(), source })?;
    Ok(())
}
