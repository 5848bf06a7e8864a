//! Kairos Core Domain
//!
//! Pure domain types for the Kairos office-hours allocation simulator.
//! This crate contains no randomness, no I/O, and is 100% unit testable.

pub mod currency_rule;
pub mod session;
pub mod student;
pub mod utility;

// Re-export commonly used types at crate root
pub use currency_rule::CurrencyRule;
pub use session::{Allocation, Outcome, SessionLedger, SessionReport};
pub use student::{Receipt, Student, StudentId};
pub use utility::{DENSITY_EPSILON, SessionDemand, UtilityCurve, UtilityParams, utility_density};
