//! Student (agent) state
//!
//! A student carries a private trajectory of per-session demands, a currency
//! balance and a running utility total. The only mutation is [`Student::update`],
//! which applies one session's outcome and moves on to the next session.

use serde::{Deserialize, Serialize};

use crate::currency_rule::CurrencyRule;
use crate::utility::{SessionDemand, UtilityCurve};

/// Stable identifier for a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub usize);

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "student-{}", self.0)
    }
}

/// Outcome applied by one call to [`Student::update`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Currency paid
    pub payment: f64,
    /// Utility earned
    pub utility: f64,
}

/// A student competing for office-hours time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Identity for diagnostics
    pub id: StudentId,

    /// Remaining currency (never clamped)
    currency: f64,

    /// Demand per session, one row per session of the period
    schedule: Vec<SessionDemand>,

    /// Index of today's row; equals `schedule.len()` once exhausted
    cursor: usize,

    /// Utility earned so far
    cumulative_utility: f64,

    /// Willingness-to-pay test used by priced mechanisms
    currency_rule: CurrencyRule,

    /// Outcomes applied so far, one per session
    receipts: Vec<Receipt>,
}

impl Student {
    /// Create a student at the first session of their schedule
    pub fn new(
        id: StudentId,
        currency: f64,
        schedule: Vec<SessionDemand>,
        currency_rule: CurrencyRule,
    ) -> Self {
        let receipts = Vec::with_capacity(schedule.len());
        Self {
            id,
            currency,
            schedule,
            cursor: 0,
            cumulative_utility: 0.0,
            currency_rule,
            receipts,
        }
    }

    pub fn currency(&self) -> f64 {
        self.currency
    }

    pub fn cumulative_utility(&self) -> f64 {
        self.cumulative_utility
    }

    pub fn schedule(&self) -> &[SessionDemand] {
        &self.schedule
    }

    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    /// Index of today's session in the schedule
    pub fn session_cursor(&self) -> usize {
        self.cursor
    }

    /// Today's demand, or `None` once every session has been applied
    pub fn today(&self) -> Option<&SessionDemand> {
        self.schedule.get(self.cursor)
    }

    /// Minutes wanted today (zero once the schedule is exhausted)
    pub fn desired_time(&self) -> f64 {
        self.today().map_or(0.0, |demand| demand.desired_time)
    }

    /// Today's utility curve
    pub fn utility_curve(&self) -> UtilityCurve {
        self.today()
            .map_or(UtilityCurve::Dormant, |demand| demand.curve)
    }

    /// Utility of being allocated `time` minutes today
    pub fn utility_at(&self, time: f64) -> f64 {
        self.utility_curve().evaluate(time)
    }

    /// Whether the student's rule accepts paying `price` for `value`
    pub fn willing_to_pay(&self, value: f64, price: f64) -> bool {
        self.currency_rule.accepts(value, price)
    }

    /// Apply one session's outcome and advance to the next session
    ///
    /// The payment is deducted unconditionally: callers check affordability
    /// before charging.
    pub fn update(&mut self, payment: f64, utility: f64) {
        self.currency -= payment;
        self.cumulative_utility += utility;
        self.receipts.push(Receipt { payment, utility });
        self.cursor = (self.cursor + 1).min(self.schedule.len());
    }
}
