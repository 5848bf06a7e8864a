//! Session bookkeeping
//!
//! [`SessionLedger`] is the single place where a session's remaining budget is
//! consumed and where students are updated. Every policy goes through it, so
//! the budget accounting and the per-session report are shared.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::student::{Student, StudentId};

/// How a student left the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Passed admission and paid
    Paid,
    /// Served without payment
    Free,
    /// Budget was gone: no time, no utility
    ShutOut,
}

/// One student's allocation in a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub student: StudentId,
    /// Minutes actually served
    pub time: f64,
    pub payment: f64,
    pub utility: f64,
    pub outcome: Outcome,
}

/// Record of a completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Session index
    pub session: usize,
    /// Minutes available at the start of the session
    pub budget: f64,
    /// Minutes left at the end
    pub remaining: f64,
    /// Allocations in processing order
    pub allocations: Vec<Allocation>,
}

impl SessionReport {
    /// Total minutes served
    pub fn served_time(&self) -> f64 {
        self.allocations.iter().map(|a| a.time).sum()
    }

    pub fn total_utility(&self) -> f64 {
        self.allocations.iter().map(|a| a.utility).sum()
    }

    pub fn total_payment(&self) -> f64 {
        self.allocations.iter().map(|a| a.payment).sum()
    }

    /// Number of allocations with the given outcome
    pub fn count(&self, outcome: Outcome) -> usize {
        self.allocations
            .iter()
            .filter(|a| a.outcome == outcome)
            .count()
    }

    /// Allocation for one student, if they were processed
    pub fn allocation_for(&self, student: StudentId) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.student == student)
    }
}

/// Budget accounting for one session
#[derive(Debug, Clone)]
pub struct SessionLedger {
    session: usize,
    budget: f64,
    remaining: f64,
    max_allocation: f64,
    allocations: Vec<Allocation>,
}

impl SessionLedger {
    /// Open a session with the full budget available
    pub fn open(session: usize, budget: f64, max_allocation: f64) -> Self {
        Self {
            session,
            budget,
            remaining: budget,
            max_allocation,
            allocations: Vec::new(),
        }
    }

    pub fn session(&self) -> usize {
        self.session
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn max_allocation(&self) -> f64 {
        self.max_allocation
    }

    /// No time left to hand out
    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Students processed so far
    pub fn processed(&self) -> usize {
        self.allocations.len()
    }

    /// Time the student would get if served now:
    /// `min(remaining, max_allocation, desired_time)`
    pub fn quote(&self, student: &Student) -> f64 {
        self.remaining
            .min(self.max_allocation)
            .min(student.desired_time())
            .max(0.0)
    }

    /// Serve an admitted student who pays `payment`
    pub fn charge(&mut self, student: &mut Student, time: f64, payment: f64, utility: f64) {
        debug_assert!(
            student.currency() >= payment,
            "{} charged {} with balance {}",
            student.id,
            payment,
            student.currency()
        );
        self.serve(student, time, payment, utility, Outcome::Paid);
    }

    /// Serve a student for free
    pub fn grant(&mut self, student: &mut Student, time: f64, utility: f64) {
        self.serve(student, time, 0.0, utility, Outcome::Free);
    }

    /// Turn a student away: no payment, no utility
    pub fn shut_out(&mut self, student: &mut Student) {
        student.update(0.0, 0.0);
        self.record(student.id, 0.0, 0.0, 0.0, Outcome::ShutOut);
    }

    fn serve(
        &mut self,
        student: &mut Student,
        time: f64,
        payment: f64,
        utility: f64,
        outcome: Outcome,
    ) {
        debug_assert!(
            time <= self.remaining.max(0.0) + 1e-9,
            "session {} oversold: {} > {}",
            self.session,
            time,
            self.remaining
        );
        student.update(payment, utility);
        self.remaining -= time;
        self.record(student.id, time, payment, utility, outcome);
    }

    fn record(
        &mut self,
        student: StudentId,
        time: f64,
        payment: f64,
        utility: f64,
        outcome: Outcome,
    ) {
        trace!(
            "session {}: {} {:?} time={:.2} paid={:.2} utility={:.2} remaining={:.2}",
            self.session, student, outcome, time, payment, utility, self.remaining
        );
        self.allocations.push(Allocation {
            student,
            time,
            payment,
            utility,
            outcome,
        });
    }

    /// Close the session and produce its report
    pub fn close(self) -> SessionReport {
        SessionReport {
            session: self.session,
            budget: self.budget,
            remaining: self.remaining,
            allocations: self.allocations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency_rule::CurrencyRule;
    use crate::utility::{SessionDemand, UtilityParams};
    use approx::assert_relative_eq;

    fn student(id: usize, desired: f64) -> Student {
        let params = UtilityParams {
            session_offset: 0,
            service_time: desired,
            scale: 10.0,
        };
        Student::new(
            StudentId(id),
            5.0,
            vec![SessionDemand::active(desired, params)],
            CurrencyRule::Always,
        )
    }

    #[test]
    fn test_quote_takes_smallest_limit() {
        let ledger = SessionLedger::open(0, 10.0, 6.0);

        assert_eq!(ledger.quote(&student(0, 4.0)), 4.0);
        assert_eq!(ledger.quote(&student(1, 9.0)), 6.0);

        let mut tight = SessionLedger::open(0, 10.0, 6.0);
        tight.grant(&mut student(2, 8.0), 6.0, 1.0);
        assert_eq!(tight.quote(&student(3, 9.0)), 4.0);
    }

    #[test]
    fn test_charge_updates_student_and_budget() {
        let mut ledger = SessionLedger::open(0, 10.0, 10.0);
        let mut s = student(0, 4.0);

        ledger.charge(&mut s, 4.0, 2.0, 6.5);

        assert_relative_eq!(ledger.remaining(), 6.0);
        assert_relative_eq!(s.currency(), 3.0);
        assert_relative_eq!(s.cumulative_utility(), 6.5);
        assert_eq!(ledger.processed(), 1);
    }

    #[test]
    fn test_shut_out_is_zero_update() {
        let mut ledger = SessionLedger::open(0, 0.0, 10.0);
        let mut s = student(0, 4.0);

        assert!(ledger.is_exhausted());
        ledger.shut_out(&mut s);

        assert_eq!(s.receipts()[0].payment, 0.0);
        assert_eq!(s.receipts()[0].utility, 0.0);
        let report = ledger.close();
        assert_eq!(report.count(Outcome::ShutOut), 1);
        assert_eq!(report.served_time(), 0.0);
    }

    #[test]
    fn test_report_totals() {
        let mut ledger = SessionLedger::open(2, 10.0, 10.0);
        let mut a = student(0, 4.0);
        let mut b = student(1, 4.0);

        ledger.charge(&mut a, 4.0, 1.0, 3.0);
        ledger.grant(&mut b, 4.0, 2.0);
        let report = ledger.close();

        assert_eq!(report.session, 2);
        assert_relative_eq!(report.served_time(), 8.0);
        assert_relative_eq!(report.total_utility(), 5.0);
        assert_relative_eq!(report.total_payment(), 1.0);
        assert_relative_eq!(report.remaining, 2.0);
        assert_eq!(
            report.allocation_for(StudentId(1)).map(|a| a.outcome),
            Some(Outcome::Free)
        );
    }
}
