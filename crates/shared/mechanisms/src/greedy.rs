use kairos_core::{SessionLedger, Student, StudentId, utility_density};
use kairos_ports::{AllocationPolicy, MechanismResult};
use log::debug;

use crate::rationing::{Deferred, finite, ration};

/// A student's place in the greedy ranking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedStudent {
    pub student: StudentId,
    /// Index into the roster
    pub slot: usize,
    /// Time quoted against the full session budget
    pub quoted: f64,
    /// Utility per minute at the quoted time
    pub density: f64,
}

/// Greedy benchmark: serve by descending utility density
///
/// Currency plays no part. Every student is quoted against the full budget,
/// ranked by utility per minute (ties keep their processing order) and served
/// in that order until the budget runs out, earning the full utility of the
/// time served. This is the efficiency upper bound the priced policies are
/// compared against.
#[derive(Debug, Default)]
pub struct GreedyDensityPolicy;

impl GreedyDensityPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Rank students by density, highest first
    ///
    /// The sort is stable, so equal densities keep the order given in `order`.
    pub fn rank(
        ledger: &SessionLedger,
        students: &[Student],
        order: &[usize],
    ) -> MechanismResult<Vec<RankedStudent>> {
        let mut ranked = order
            .iter()
            .map(|&slot| {
                let student = &students[slot];
                let quoted = ledger.quote(student);
                let utility = finite(student.utility_at(quoted), student, ledger.session())?;
                Ok(RankedStudent {
                    student: student.id,
                    slot,
                    quoted,
                    density: utility_density(utility, quoted),
                })
            })
            .collect::<MechanismResult<Vec<_>>>()?;

        ranked.sort_by(|a, b| b.density.total_cmp(&a.density));
        Ok(ranked)
    }
}

impl AllocationPolicy for GreedyDensityPolicy {
    fn name(&self) -> &str {
        "Optimal Greedy"
    }

    fn run_session(
        &mut self,
        ledger: &mut SessionLedger,
        students: &mut [Student],
        order: &[usize],
    ) -> MechanismResult<()> {
        let ranked = Self::rank(ledger, students, order)?;
        let queue: Vec<Deferred> = ranked
            .iter()
            .map(|r| Deferred {
                slot: r.slot,
                quoted: r.quoted,
            })
            .collect();

        ration(ledger, students, &queue, |student, time| {
            student.utility_at(time)
        })?;

        debug!(
            "greedy session {}: top density={:.3} remaining={:.2}",
            ledger.session(),
            ranked.first().map_or(0.0, |r| r.density),
            ledger.remaining()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kairos_core::{CurrencyRule, Outcome, SessionDemand, UtilityParams};

    fn create_student(id: usize, desired: f64, scale: f64) -> Student {
        let params = UtilityParams {
            session_offset: 0,
            service_time: desired,
            scale,
        };
        Student::new(
            StudentId(id),
            0.0,
            vec![SessionDemand::active(desired, params)],
            CurrencyRule::Always,
        )
    }

    #[test]
    fn test_serves_highest_density_first() {
        let mut students = vec![
            create_student(0, 4.0, 5.0),
            create_student(1, 4.0, 50.0),
            create_student(2, 4.0, 20.0),
        ];
        let mut ledger = SessionLedger::open(0, 8.0, 10.0);

        GreedyDensityPolicy::new()
            .run_session(&mut ledger, &mut students, &[0, 1, 2])
            .unwrap();
        let report = ledger.close();

        let order: Vec<(usize, Outcome)> = report
            .allocations
            .iter()
            .map(|a| (a.student.0, a.outcome))
            .collect();
        assert_eq!(
            order,
            vec![(1, Outcome::Free), (2, Outcome::Free), (0, Outcome::ShutOut)]
        );
        assert_eq!(students[0].receipts()[0].utility, 0.0);
    }

    #[test]
    fn test_ties_keep_processing_order() {
        let students: Vec<Student> = (0..4).map(|i| create_student(i, 4.0, 10.0)).collect();
        let ledger = SessionLedger::open(0, 100.0, 10.0);

        let ranked = GreedyDensityPolicy::rank(&ledger, &students, &[3, 1, 0, 2]).unwrap();
        let slots: Vec<usize> = ranked.iter().map(|r| r.slot).collect();
        assert_eq!(slots, vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_ignores_currency() {
        let mut students = vec![create_student(0, 4.0, 10.0)];
        let mut ledger = SessionLedger::open(0, 10.0, 10.0);

        GreedyDensityPolicy::new()
            .run_session(&mut ledger, &mut students, &[0])
            .unwrap();

        assert_eq!(students[0].currency(), 0.0);
        assert!(students[0].cumulative_utility() > 0.0);
    }
}
