use kairos_core::StudentId;
use thiserror::Error;

/// Errors raised while running a mechanism
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MechanismError {
    #[error("{policy} schedule has {len} entries but session {session} was requested")]
    ScheduleExhausted {
        policy: String,
        session: usize,
        len: usize,
    },

    #[error("non-finite utility {value} for {student} in session {session}")]
    NonFiniteUtility {
        student: StudentId,
        session: usize,
        value: f64,
    },

    #[error("session {session} updated {recorded} of {expected} students")]
    IncompleteSession {
        session: usize,
        expected: usize,
        recorded: usize,
    },

    #[error("all {0} sessions have already run")]
    SessionsExhausted(usize),

    #[error("session {0} failed partway; no further sessions can run")]
    SessionAborted(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type MechanismResult<T> = std::result::Result<T, MechanismError>;
