use kairos_core::{SessionLedger, Student};

use crate::error::MechanismResult;

/// Port for session allocation policies
///
/// Different implementations divide a session's budget differently:
/// - First come, first served (no price)
/// - Posted price with free rationing of the leftovers
/// - Pay per minute
/// - Greedy by utility density (efficiency benchmark)
pub trait AllocationPolicy: Send {
    /// Allocate one session
    ///
    /// `order` is the processing order as indices into `students`. Every
    /// student must go through the ledger exactly once (charged, granted or
    /// shut out) before this returns.
    fn run_session(
        &mut self,
        ledger: &mut SessionLedger,
        students: &mut [Student],
        order: &[usize],
    ) -> MechanismResult<()>;

    /// Whether the processing order is reshuffled after each session
    fn reshuffles(&self) -> bool {
        true
    }

    /// Check the policy can serve `num_sessions` sessions
    fn validate(&self, _num_sessions: usize) -> MechanismResult<()> {
        Ok(())
    }

    /// Get the name of the policy
    fn name(&self) -> &str;
}
