use kairos_core::{SessionLedger, Student};
use kairos_ports::{AllocationPolicy, MechanismResult};
use log::debug;

use crate::rationing::finite;

/// The status quo: no price, first come first served
///
/// Each student in order gets `min(remaining, max_allocation, desired)`.
/// Whoever is late in the order when the budget runs out gets nothing; the
/// only fairness is the reshuffle between sessions.
#[derive(Debug, Default)]
pub struct CurrentPolicy;

impl CurrentPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl AllocationPolicy for CurrentPolicy {
    fn name(&self) -> &str {
        "Current"
    }

    fn run_session(
        &mut self,
        ledger: &mut SessionLedger,
        students: &mut [Student],
        order: &[usize],
    ) -> MechanismResult<()> {
        for &slot in order {
            let student = &mut students[slot];

            if ledger.is_exhausted() {
                ledger.shut_out(student);
                continue;
            }

            let time = ledger.quote(student);
            let utility = finite(student.utility_at(time), student, ledger.session())?;
            ledger.grant(student, time, utility);
        }

        debug!(
            "current session {}: {:.2} of {:.2} minutes left",
            ledger.session(),
            ledger.remaining(),
            ledger.budget()
        );
        Ok(())
    }
}
