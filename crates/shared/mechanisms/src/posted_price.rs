use kairos_core::{SessionLedger, Student};
use kairos_ports::{AllocationPolicy, MechanismError, MechanismResult};
use log::debug;

use crate::rationing::{Deferred, finite, ration};

/// Posted price: one fixed price per session
///
/// A student is admitted when they can afford the price and their currency
/// rule accepts paying it for the utility they would get. Admitted students
/// pay and are served in order. Everyone else waits for the rationing pass
/// and is served for free only if time is left.
#[derive(Debug, Clone)]
pub struct PostedPricePolicy {
    prices: Vec<f64>,
    counter: usize,
}

impl PostedPricePolicy {
    pub fn new(prices: Vec<f64>) -> Self {
        Self { prices, counter: 0 }
    }

    /// Price for the next session to run
    pub fn current_price(&self) -> MechanismResult<f64> {
        self.prices
            .get(self.counter)
            .copied()
            .ok_or_else(|| MechanismError::ScheduleExhausted {
                policy: self.name().to_string(),
                session: self.counter,
                len: self.prices.len(),
            })
    }

    /// Sessions run so far
    pub fn sessions_run(&self) -> usize {
        self.counter
    }
}

impl AllocationPolicy for PostedPricePolicy {
    fn name(&self) -> &str {
        "Posted Price"
    }

    fn validate(&self, num_sessions: usize) -> MechanismResult<()> {
        if self.prices.len() < num_sessions {
            return Err(MechanismError::ScheduleExhausted {
                policy: self.name().to_string(),
                session: self.prices.len(),
                len: self.prices.len(),
            });
        }
        Ok(())
    }

    fn run_session(
        &mut self,
        ledger: &mut SessionLedger,
        students: &mut [Student],
        order: &[usize],
    ) -> MechanismResult<()> {
        let price = self.current_price()?;
        let mut deferred = Vec::new();

        for &slot in order {
            let student = &mut students[slot];
            let time = ledger.quote(student);
            let utility = finite(student.utility_at(time), student, ledger.session())?;

            if student.currency() >= price && student.willing_to_pay(utility, price) {
                ledger.charge(student, time, price, utility);
            } else {
                deferred.push(Deferred { slot, quoted: time });
            }
        }

        let admitted = order.len() - deferred.len();
        ration(ledger, students, &deferred, |student, time| {
            student.utility_at(time)
        })?;

        debug!(
            "posted price session {}: price={:.2} admitted={} rationed={} remaining={:.2}",
            ledger.session(),
            price,
            admitted,
            deferred.len(),
            ledger.remaining()
        );

        self.counter += 1;
        Ok(())
    }
}
