//! SSVEP Core - `no_std` compatible types and utilities
//!
//! This crate provides the foundational types for evaluating steady-state
//! visually evoked potential (SSVEP) classifiers: the stimulus set, the
//! experimental protocol with its window planner, and the information
//! transfer rate / utility metrics. It only needs `alloc`, so the same
//! planning and scoring code can run next to an online decoder.
//!
//! # Modules
//!
//! - [`types`]: Stimulus set, decisions, segmenting/criterion/method modes
//! - [`protocol`]: Protocol stages and analysis-window planning
//! - [`math`]: Sample conversions, score ranking, ITR and utility
//! - [`error`]: Error types for protocol and metric operations
//!
//! # Features
//!
//! - `std`: Implement `std::error::Error` for the error types
//!
//! # Example
//!
//! ```rust
//! use ssvep_core::protocol::{ProtocolStage, WindowPlanner};
//! use ssvep_core::types::Segmenting;
//!
//! // 4 frequencies × 4 iterations × 10 s, analysed with 2 s sliding windows
//! let stage = ProtocolStage::new(160.0, Some(320.0), 4, 10.0);
//! let planner = WindowPlanner::new(2.0, 600.0, Segmenting::Sliding);
//! let plan = planner.plan(&stage, 4, 160 * 600).unwrap();
//!
//! assert_eq!(plan.len(), 16 * 9);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod math;
pub mod protocol;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{MetricError, ProtocolError};
pub use math::{itr_bits_per_second, rank_scores, utility_bits_per_second, Ranking};
pub use protocol::{plan_windows, Protocol, ProtocolStage, WindowPlan, WindowPlanner, WindowSpec};
pub use types::{Criterion, Decision, Method, Segmenting, StimulusSet};
