//! Kairos Runner - Repeated Allocation Experiments
//!
//! Drives the engine the way an experimenter would:
//!
//! - **Config**: experiment description loaded from JSON or a built-in preset
//! - **Experiment**: independent trials with derived seeds
//! - **Report**: per-trial total utility with mean, median and a histogram
//!
//! ```text
//!   Scenario / JSON ──► ExperimentConfig ──► Experiment::run
//!                                               │
//!                          trial 0..n ──► Mechanism::run_all_sessions
//!                                               │
//!                                               ▼
//!                                      ExperimentReport
//! ```

pub mod config;
pub mod error;
pub mod experiment;
pub mod report;

pub use config::{ConfigError, ExperimentConfig, Scenario};
pub use error::{ExperimentError, ExperimentResult};
pub use experiment::{Experiment, TrialOutcome, TrialSeeds};
pub use report::{ExperimentReport, Histogram, UtilitySummary};
