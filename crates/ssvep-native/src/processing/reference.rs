//! Re-referencing and spatial filters
//!
//! Signals are `samples × channels`; a spatial filter is a
//! `channels × channels` matrix applied on the right.

use nalgebra::DMatrix;

use crate::error::{FilterError, FilterResult};

/// Subtract each channel's mean in place.
pub fn remove_channel_mean(signal: &mut DMatrix<f64>) {
    let rows = signal.nrows();
    if rows == 0 {
        return;
    }
    for mut column in signal.column_iter_mut() {
        let mean = column.sum() / rows as f64;
        column.add_scalar_mut(-mean);
    }
}

/// Common-average-reference spatial filter `I - 1/n`.
#[must_use]
pub fn car_matrix(channels: usize) -> DMatrix<f64> {
    let n = channels as f64;
    DMatrix::from_fn(channels, channels, |i, j| if i == j { 1.0 - 1.0 / n } else { -1.0 / n })
}

/// Apply a spatial filter: `signal · filter`.
///
/// `filter` must be `channels × k`; the result is `samples × k`.
pub fn apply_spatial_filter(
    signal: &DMatrix<f64>,
    filter: &DMatrix<f64>,
) -> FilterResult<DMatrix<f64>> {
    if signal.ncols() != filter.nrows() {
        return Err(FilterError::SpatialFilterShape {
            channels: signal.ncols(),
            rows: filter.nrows(),
        });
    }
    Ok(signal * filter)
}

/// Re-reference every sample to the average of all channels.
#[must_use]
pub fn common_average_reference(signal: &DMatrix<f64>) -> DMatrix<f64> {
    signal * car_matrix(signal.ncols())
}
