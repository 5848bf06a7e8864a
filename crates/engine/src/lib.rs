//! Kairos Engine - Multi-Session Allocation Simulation
//!
//! Owns the roster of students and drives an allocation policy through every
//! session of the period:
//!
//! ```text
//!   DemandSampler ──► generate_students ──► roster (Vec<Student>)
//!                                              │
//!                         ┌────────────────────┘
//!                         ▼
//!   run_all_sessions ──► run_one_session ──► AllocationPolicy
//!                         │    ▲                  │
//!                         │    └── SessionLedger ◄┘
//!                         ▼
//!                  reshuffle order, keep SessionReport
//! ```

pub mod config;
pub mod mechanism;

pub use config::MechanismConfig;
pub use mechanism::Mechanism;
