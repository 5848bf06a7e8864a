//! Shared allocation bookkeeping
//!
//! The rationing pass hands leftover time, for free, to students who were
//! not admitted (or, for the greedy benchmark, to everyone in density order).

use kairos_core::{SessionLedger, Student};
use kairos_ports::{MechanismError, MechanismResult};

/// A student waiting for leftover time
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Deferred {
    /// Index into the roster
    pub slot: usize,
    /// Time quoted when the student was first processed
    pub quoted: f64,
}

/// Reject NaN and infinite utilities coming out of a malformed curve
pub(crate) fn finite(value: f64, student: &Student, session: usize) -> MechanismResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MechanismError::NonFiniteUtility {
            student: student.id,
            session,
            value,
        })
    }
}

/// Serve queued students for free while budget remains, shut out the rest
///
/// A student is served `min(quoted, remaining)` minutes and earns
/// `value_at(student, served)`, so the budget never goes below zero.
/// The last student served may get less than their quote: the budget is a
/// hard cap even for leftover time.
pub(crate) fn ration<F>(
    ledger: &mut SessionLedger,
    students: &mut [Student],
    queue: &[Deferred],
    value_at: F,
) -> MechanismResult<()>
where
    F: Fn(&Student, f64) -> f64,
{
    for entry in queue {
        let student = &mut students[entry.slot];

        if ledger.is_exhausted() {
            ledger.shut_out(student);
            continue;
        }

        let time = entry.quoted.min(ledger.remaining());
        let utility = finite(value_at(student, time), student, ledger.session())?;
        ledger.grant(student, time, utility);
    }
    Ok(())
}
