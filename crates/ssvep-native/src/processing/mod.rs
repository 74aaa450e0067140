//! Signal processing pipelines
//!
//! This module provides signal processing for SSVEP data:
//! - [`filters`]: Least-squares FIR design and valid-mode filtering
//! - [`reference`]: Mean removal and common average reference
//! - [`fft`]: Spectral analysis and narrow-band SNR
//! - [`segment`]: Analysis-window extraction

pub mod fft;
pub mod filters;
pub mod reference;
pub mod segment;
