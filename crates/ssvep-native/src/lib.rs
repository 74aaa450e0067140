//! SSVEP Native - Host-side preprocessing, classification and evaluation
//!
//! This crate runs the offline SSVEP evaluation on recorded sessions:
//! - Recording loaders (MATLAB v5 and CSV)
//! - Least-squares FIR pre-filter and common average reference
//! - Frequency recognition (CCA, PSDA) with offline and pseudo-online rules
//! - Confusion-matrix scoring, ITR and utility
//! - Per-window-length result reports
//!
//! # Modules
//!
//! - [`recording`]: In-memory sessions and file loaders
//! - [`processing`]: Signal processing pipelines
//! - [`ml`]: Frequency recognition
//! - [`evaluation`]: The batch pipeline
//!
//! # Example
//!
//! ```no_run
//! use ssvep_native::{Evaluation, EvaluationConfig};
//!
//! let config = EvaluationConfig {
//!     subjects: vec!["S01".into()],
//!     ..EvaluationConfig::default()
//! };
//! let reports = Evaluation::new(config)?.run()?;
//! for report in reports {
//!     println!("{} s -> {}", report.window_s, report.path.display());
//! }
//! # Ok::<(), ssvep_native::error::EvaluationError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod error;
pub mod evaluation;
pub mod ml;
pub mod performance;
pub mod processing;
pub mod recording;
pub mod report;
pub mod simulation;

// Re-export key types
pub use config::EvaluationConfig;
pub use evaluation::{Evaluation, StageResult, WindowReport};
pub use ml::{CcaClassifier, PsdaClassifier, SsvepClassifier};
pub use performance::ConfusionMatrix;
pub use recording::Recording;
pub use simulation::SyntheticRecording;
