use kairos_core::{SessionLedger, Student, utility_density};
use kairos_ports::{AllocationPolicy, MechanismError, MechanismResult};
use log::debug;

use crate::rationing::{Deferred, finite, ration};

/// Pay per minute: one per-minute rate per session
///
/// The currency rule compares utility density (utility per minute) with the
/// rate, and the student must afford `time * rate`. Students who are not
/// admitted go through the same free rationing pass as the posted price.
///
/// Unlike the other policies the processing order is never reshuffled, so
/// the queue position a student draws at the start is kept for the whole
/// period.
#[derive(Debug, Clone)]
pub struct PayPerMinutePolicy {
    rates: Vec<f64>,
    counter: usize,
}

impl PayPerMinutePolicy {
    pub fn new(rates: Vec<f64>) -> Self {
        Self { rates, counter: 0 }
    }

    /// Rate for the next session to run
    pub fn current_rate(&self) -> MechanismResult<f64> {
        self.rates
            .get(self.counter)
            .copied()
            .ok_or_else(|| MechanismError::ScheduleExhausted {
                policy: self.name().to_string(),
                session: self.counter,
                len: self.rates.len(),
            })
    }
}

/// Utility earned for `time` minutes, computed through the density
fn density_value(student: &Student, time: f64) -> f64 {
    utility_density(student.utility_at(time), time) * time
}

impl AllocationPolicy for PayPerMinutePolicy {
    fn name(&self) -> &str {
        "Pay Per Minute"
    }

    fn reshuffles(&self) -> bool {
        false
    }

    fn validate(&self, num_sessions: usize) -> MechanismResult<()> {
        if self.rates.len() < num_sessions {
            return Err(MechanismError::ScheduleExhausted {
                policy: self.name().to_string(),
                session: self.rates.len(),
                len: self.rates.len(),
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
        let rate = self.current_rate()?;
        let mut deferred = Vec::new();

        for &slot in order {
            let student = &mut students[slot];
            let time = ledger.quote(student);
            let utility = finite(student.utility_at(time), student, ledger.session())?;
            let density = utility_density(utility, time);
            let cost = time * rate;

            if student.willing_to_pay(density, rate) && student.currency() >= cost {
                ledger.charge(student, time, cost, density * time);
            } else {
                deferred.push(Deferred { slot, quoted: time });
            }
        }

        let admitted = order.len() - deferred.len();
        ration(ledger, students, &deferred, density_value)?;

        debug!(
            "pay per minute session {}: rate={:.3} admitted={} rationed={} remaining={:.2}",
            ledger.session(),
            rate,
            admitted,
            deferred.len(),
            ledger.remaining()
        );

        self.counter += 1;
        Ok(())
    }
}
