//! Recorded EEG sessions
//!
//! A [`Recording`] is a `samples × channels` matrix together with its sample
//! rate and the ordered channel names of the montage. Two on-disk formats are
//! supported:
//!
//! - MATLAB v5 `.mat` files holding one `samples × channels` variable
//!   (usually `data`); channel names come from the configured montage.
//! - `.csv` files with a header row of channel names followed by one row per
//!   sample.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::DMatrix;
use tracing::debug;

use crate::error::{RecordingError, RecordingResult};

/// One multichannel EEG session held in memory.
#[derive(Clone, Debug)]
pub struct Recording {
    data: DMatrix<f64>,
    sample_rate_hz: f64,
    channels: Vec<String>,
}

impl Recording {
    /// Wrap a matrix, checking it against the channel list.
    pub fn new(
        data: DMatrix<f64>,
        sample_rate_hz: f64,
        channels: Vec<String>,
    ) -> RecordingResult<Self> {
        if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
            return Err(RecordingError::InvalidSampleRate(sample_rate_hz));
        }
        if data.ncols() != channels.len() {
            return Err(RecordingError::MontageMismatch {
                expected: channels.len(),
                got: data.ncols(),
            });
        }
        Ok(Self { data, sample_rate_hz, channels })
    }

    /// Load a recording, choosing the reader from the file extension.
    ///
    /// `montage` names the columns of `.mat` data; `.csv` files carry their
    /// own header and ignore it.
    pub fn load(
        path: &Path,
        sample_rate_hz: f64,
        montage: &[String],
        variable: &str,
    ) -> RecordingResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("mat") => Self::from_mat(path, sample_rate_hz, montage, variable),
            Some("csv") => Self::from_csv(path, sample_rate_hz),
            _ => Err(RecordingError::UnsupportedFormat { path: path.to_path_buf() }),
        }
    }

    /// Read one variable of a MATLAB v5 file.
    pub fn from_mat(
        path: &Path,
        sample_rate_hz: f64,
        montage: &[String],
        variable: &str,
    ) -> RecordingResult<Self> {
        let file = File::open(path)
            .map_err(|source| RecordingError::Io { path: path.to_path_buf(), source })?;

        let mat = matfile::MatFile::parse(BufReader::new(file)).map_err(|e| {
            RecordingError::MatParse { path: path.to_path_buf(), reason: format!("{e:?}") }
        })?;

        let array = mat.find_by_name(variable).ok_or_else(|| RecordingError::MissingVariable {
            name: variable.to_string(),
            path: path.to_path_buf(),
        })?;

        let size = array.size();
        if size.len() != 2 {
            return Err(RecordingError::NotNumeric { name: variable.to_string() });
        }
        let (rows, cols) = (size[0], size[1]);

        // MAT arrays are stored column-major, like nalgebra
        let data = match array.data() {
            matfile::NumericData::Double { real, .. } => {
                DMatrix::from_column_slice(rows, cols, real)
            }
            matfile::NumericData::Single { real, .. } => {
                DMatrix::from_iterator(rows, cols, real.iter().map(|&v| f64::from(v)))
            }
            _ => return Err(RecordingError::NotNumeric { name: variable.to_string() }),
        };

        debug!("Loaded {} ({} samples x {} channels)", path.display(), rows, cols);
        Self::new(data, sample_rate_hz, montage.to_vec())
    }

    /// Read a CSV file with a channel-name header.
    pub fn from_csv(path: &Path, sample_rate_hz: f64) -> RecordingResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let channels: Vec<String> = reader.headers()?.iter().map(String::from).collect();

        let mut values = Vec::new();
        let mut rows = 0;
        for (r, record) in reader.records().enumerate() {
            let record = record?;
            for (c, field) in record.iter().enumerate() {
                let v: f64 = field.parse().map_err(|_| RecordingError::InvalidValue {
                    value: field.to_string(),
                    row: r + 1,
                    column: c + 1,
                })?;
                values.push(v);
            }
            rows += 1;
        }

        let data = DMatrix::from_row_slice(rows, channels.len(), &values);
        debug!("Loaded {} ({} samples x {} channels)", path.display(), rows, channels.len());
        Self::new(data, sample_rate_hz, channels)
    }

    /// Write the recording as CSV with a channel-name header.
    pub fn write_csv(&self, path: &Path) -> RecordingResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.channels)?;
        for row in self.data.row_iter() {
            writer.write_record(row.iter().map(|v| format!("{v:.6}")))?;
        }
        writer.flush().map_err(|source| RecordingError::Io { path: path.to_path_buf(), source })?;
        Ok(())
    }

    /// Signal matrix, `samples × channels`
    #[inline]
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    /// Channel names in column order
    #[inline]
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Number of samples (rows)
    #[inline]
    pub fn samples(&self) -> usize {
        self.data.nrows()
    }

    /// Number of channels (columns)
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.data.ncols()
    }

    /// Duration in seconds
    #[inline]
    pub fn duration_s(&self) -> f64 {
        self.samples() as f64 / self.sample_rate_hz
    }

    /// Keep the channels named in `names`, in montage order.
    ///
    /// The order of `names` does not matter; the result keeps the column
    /// order of the recording.
    pub fn select_channels(&self, names: &[String]) -> RecordingResult<Self> {
        if let Some(missing) = names.iter().find(|n| !self.channels.contains(n)) {
            return Err(RecordingError::UnknownChannel { name: missing.clone() });
        }

        let indices: Vec<usize> = self
            .channels
            .iter()
            .enumerate()
            .filter(|(_, ch)| names.contains(ch))
            .map(|(i, _)| i)
            .collect();

        let data = self.data.select_columns(&indices);
        let channels = indices.iter().map(|&i| self.channels[i].clone()).collect();
        Self::new(data, self.sample_rate_hz, channels)
    }

    /// Rows `[start, end)`, with `end` clamped to the data.
    pub fn slice_samples(&self, start: usize, end: usize) -> RecordingResult<Self> {
        let end = end.min(self.samples());
        if start >= end {
            return Err(RecordingError::InsufficientData { got: self.samples(), need: start + 1 });
        }
        let data = self.data.rows(start, end - start).into_owned();
        Self::new(data, self.sample_rate_hz, self.channels.clone())
    }

    /// Rows between two times in seconds; `None` runs to the end.
    pub fn slice_seconds(&self, start_s: f64, end_s: Option<f64>) -> RecordingResult<Self> {
        let start = ssvep_core::math::seconds_to_samples(start_s, self.sample_rate_hz);
        let end = end_s.map_or(self.samples(), |e| {
            ssvep_core::math::seconds_to_samples(e, self.sample_rate_hz)
        });
        self.slice_samples(start, end)
    }
}
