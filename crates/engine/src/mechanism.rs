//! Mechanism - roster ownership and the session loop

use kairos_core::{
    CurrencyRule, SessionDemand, SessionLedger, SessionReport, Student, StudentId, UtilityParams,
};
use kairos_mechanisms::{PolicyConfig, create_policy};
use kairos_ports::{AllocationPolicy, DemandSampler, MechanismError, MechanismResult};
use log::{debug, info};
use rand::prelude::*;

use crate::config::MechanismConfig;

/// One simulated period under one allocation policy
///
/// The roster keeps its insertion order for the whole run; the processing
/// order is a separate permutation of roster indices, reshuffled between
/// sessions when the policy asks for it.
pub struct Mechanism {
    config: MechanismConfig,
    policy: Box<dyn AllocationPolicy>,
    students: Vec<Student>,
    order: Vec<usize>,
    session: usize,
    remaining_budget: f64,
    rng: StdRng,
    reports: Vec<SessionReport>,
    /// Session whose policy failed partway; no further session may run
    aborted: Option<usize>,
}

impl Mechanism {
    /// Create an empty mechanism
    ///
    /// `seed` drives the reshuffles; `None` seeds from system entropy.
    pub fn new(
        config: MechanismConfig,
        policy: Box<dyn AllocationPolicy>,
        seed: Option<u64>,
    ) -> MechanismResult<Self> {
        config.validate()?;
        policy.validate(config.num_sessions)?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let remaining_budget = config.session_budget;

        Ok(Self {
            config,
            policy,
            students: Vec::new(),
            order: Vec::new(),
            session: 0,
            remaining_budget,
            rng,
            reports: Vec::new(),
            aborted: None,
        })
    }

    /// Create a mechanism from a serializable policy choice
    pub fn from_policy_config(
        config: MechanismConfig,
        policy: &PolicyConfig,
        seed: Option<u64>,
    ) -> MechanismResult<Self> {
        Self::new(config, create_policy(policy), seed)
    }

    /// Create a mechanism with a pre-built roster
    pub fn with_students(
        config: MechanismConfig,
        policy: Box<dyn AllocationPolicy>,
        students: Vec<Student>,
        seed: Option<u64>,
    ) -> MechanismResult<Self> {
        let mut mechanism = Self::new(config, policy, seed)?;
        for student in students {
            mechanism.add_student(student)?;
        }
        Ok(mechanism)
    }

    /// Build one student from the sampler
    ///
    /// Sessions before the sampled start session are dormant: no desired time
    /// and zero utility. From the start onward every session draws its own
    /// service time and utility scale.
    pub fn generate_student(
        &self,
        id: StudentId,
        currency: f64,
        sampler: &mut dyn DemandSampler,
        currency_rule: CurrencyRule,
    ) -> Student {
        let num_sessions = self.config.num_sessions;
        let start = sampler.start_session(num_sessions).min(num_sessions);

        let mut schedule = Vec::with_capacity(num_sessions);
        schedule.extend((0..start).map(|_| SessionDemand::dormant()));
        for session_offset in start..num_sessions {
            let service_time = sampler.service_time();
            let scale = sampler.utility_scale(session_offset);
            schedule.push(SessionDemand::active(
                service_time,
                UtilityParams {
                    session_offset,
                    service_time,
                    scale,
                },
            ));
        }

        Student::new(id, currency, schedule, currency_rule)
    }

    /// Generate `count` students and append them to the roster
    ///
    /// Identifiers continue from the current roster size.
    pub fn generate_students(
        &mut self,
        count: usize,
        currency: f64,
        sampler: &mut dyn DemandSampler,
        currency_rule: CurrencyRule,
    ) {
        let first = self.students.len();
        for index in first..first + count {
            let student =
                self.generate_student(StudentId(index), currency, sampler, currency_rule);
            self.push_student(student);
        }
        debug!(
            "generated {} students ({} in roster)",
            count,
            self.students.len()
        );
    }

    /// Append a student at the back of the processing order
    ///
    /// The student's schedule must have exactly one row per session.
    pub fn add_student(&mut self, student: Student) -> MechanismResult<()> {
        let rows = student.schedule().len();
        if rows != self.config.num_sessions {
            return Err(MechanismError::InvalidConfig(format!(
                "{} has {} schedule rows for {} sessions",
                student.id, rows, self.config.num_sessions
            )));
        }
        self.push_student(student);
        Ok(())
    }

    fn push_student(&mut self, student: Student) {
        self.order.push(self.students.len());
        self.students.push(student);
    }

    /// Run every session of the period
    pub fn run_all_sessions(&mut self) -> MechanismResult<()> {
        for _ in 0..self.config.num_sessions {
            self.run_one_session()?;
        }

        info!(
            "{}: {} sessions, {} students, total utility {:.2}",
            self.policy.name(),
            self.session,
            self.students.len(),
            self.total_utility()
        );
        Ok(())
    }

    /// Run the next session and return its report
    ///
    /// A policy error can leave the session half applied, so after any error
    /// from the session itself every later call fails with `SessionAborted`.
    pub fn run_one_session(&mut self) -> MechanismResult<&SessionReport> {
        if let Some(session) = self.aborted {
            return Err(MechanismError::SessionAborted(session));
        }
        if self.session >= self.config.num_sessions {
            return Err(MechanismError::SessionsExhausted(self.config.num_sessions));
        }

        let mut ledger = SessionLedger::open(
            self.session,
            self.config.session_budget,
            self.config.max_allocation,
        );
        if let Err(e) = self
            .policy
            .run_session(&mut ledger, &mut self.students, &self.order)
        {
            self.aborted = Some(self.session);
            return Err(e);
        }

        if ledger.processed() != self.students.len() {
            self.aborted = Some(self.session);
            return Err(MechanismError::IncompleteSession {
                session: self.session,
                expected: self.students.len(),
                recorded: ledger.processed(),
            });
        }

        let report = ledger.close();
        debug!(
            "{} session {}: served {:.2}/{:.2} minutes, utility {:.2}, paid {:.2}",
            self.policy.name(),
            report.session,
            report.served_time(),
            report.budget,
            report.total_utility(),
            report.total_payment()
        );

        if self.policy.reshuffles() {
            self.order.shuffle(&mut self.rng);
        }
        self.remaining_budget = report.remaining;
        self.session += 1;
        self.reports.push(report);

        self.reports
            .last()
            .ok_or(MechanismError::SessionsExhausted(self.config.num_sessions))
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Roster in insertion order
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Processing order for the next session
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Sessions run so far
    pub fn sessions_run(&self) -> usize {
        self.session
    }

    /// Budget left at the end of the last session
    pub fn remaining_budget(&self) -> f64 {
        self.remaining_budget
    }

    pub fn reports(&self) -> &[SessionReport] {
        &self.reports
    }

    /// Cumulative utility per student, in roster order
    pub fn final_utilities(&self) -> Vec<f64> {
        self.students
            .iter()
            .map(|s| s.cumulative_utility())
            .collect()
    }

    /// Sum of every student's cumulative utility
    pub fn total_utility(&self) -> f64 {
        self.students.iter().map(|s| s.cumulative_utility()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kairos_core::UtilityCurve;
    use kairos_mechanisms::CurrentPolicy;
    use std::collections::VecDeque;

    /// Sampler returning scripted values
    struct ScriptedSampler {
        start: usize,
        service_times: VecDeque<f64>,
        scale: f64,
    }

    impl ScriptedSampler {
        fn new(start: usize, service_times: &[f64], scale: f64) -> Self {
            Self {
                start,
                service_times: service_times.iter().copied().collect(),
                scale,
            }
        }
    }

    impl DemandSampler for ScriptedSampler {
        fn start_session(&mut self, _num_sessions: usize) -> usize {
            self.start
        }

        fn service_time(&mut self) -> f64 {
            self.service_times.pop_front().unwrap_or(4.0)
        }

        fn utility_scale(&mut self, session_offset: usize) -> f64 {
            self.scale + session_offset as f64
        }
    }

    fn current(num_sessions: usize) -> Mechanism {
        Mechanism::new(
            MechanismConfig::new(num_sessions, 10.0, 10.0),
            Box::new(CurrentPolicy::new()),
            Some(42),
        )
        .unwrap()
    }

    #[test]
    fn test_sessions_before_start_are_dormant() {
        let mechanism = current(5);
        let mut sampler = ScriptedSampler::new(2, &[3.0, 5.0, 7.0], 10.0);

        let student =
            mechanism.generate_student(StudentId(0), 0.0, &mut sampler, CurrencyRule::Always);
        let schedule = student.schedule();

        assert_eq!(schedule.len(), 5);
        assert_eq!(schedule[0], SessionDemand::dormant());
        assert_eq!(schedule[1], SessionDemand::dormant());
        let desired: Vec<f64> = schedule.iter().map(|d| d.desired_time).collect();
        assert_eq!(desired, vec![0.0, 0.0, 3.0, 5.0, 7.0]);

        match schedule[4].curve {
            UtilityCurve::Active(params) => {
                assert_eq!(params.session_offset, 4);
                assert_eq!(params.service_time, 7.0);
                assert_eq!(params.scale, 14.0);
            }
            UtilityCurve::Dormant => panic!("session 4 should be active"),
        }
    }

    #[test]
    fn test_start_past_the_period_is_all_dormant() {
        let mechanism = current(3);
        let mut sampler = ScriptedSampler::new(10, &[], 10.0);

        let student =
            mechanism.generate_student(StudentId(0), 0.0, &mut sampler, CurrencyRule::Always);
        assert_eq!(student.schedule().len(), 3);
        assert!(student.schedule().iter().all(|d| !d.curve.is_active()));
    }

    #[test]
    fn test_generate_students_continues_ids() {
        let mut mechanism = current(2);
        let mut sampler = ScriptedSampler::new(0, &[], 10.0);

        mechanism.generate_students(3, 5.0, &mut sampler, CurrencyRule::Always);
        mechanism.generate_students(2, 5.0, &mut sampler, CurrencyRule::Always);

        let ids: Vec<usize> = mechanism.students().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(mechanism.order(), &[0, 1, 2, 3, 4]);
        assert!(mechanism.students().iter().all(|s| s.currency() == 5.0));
    }

    #[test]
    fn test_run_all_sessions_runs_each_session_once() {
        let mut mechanism = current(4);
        let mut sampler = ScriptedSampler::new(0, &[], 10.0);
        mechanism.generate_students(5, 0.0, &mut sampler, CurrencyRule::Always);

        mechanism.run_all_sessions().unwrap();

        assert_eq!(mechanism.sessions_run(), 4);
        assert_eq!(mechanism.reports().len(), 4);
        assert!(
            mechanism
                .students()
                .iter()
                .all(|s| s.receipts().len() == 4 && s.today().is_none())
        );
        assert!(matches!(
            mechanism.run_one_session(),
            Err(MechanismError::SessionsExhausted(4))
        ));
    }

    #[test]
    fn test_short_price_schedule_fails_at_construction() {
        let result = Mechanism::from_policy_config(
            MechanismConfig::new(3, 10.0, 10.0),
            &PolicyConfig::flat_price(1.0, 2),
            Some(1),
        );
        assert!(matches!(
            result,
            Err(MechanismError::ScheduleExhausted { .. })
        ));
    }

    #[test]
    fn test_pay_per_minute_keeps_order() {
        let mut mechanism = Mechanism::from_policy_config(
            MechanismConfig::new(6, 10.0, 10.0),
            &PolicyConfig::rising_rates(6, 10.0, 7.8),
            Some(5),
        )
        .unwrap();
        let mut sampler = ScriptedSampler::new(0, &[], 10.0);
        mechanism.generate_students(8, 50.0, &mut sampler, CurrencyRule::ExceedsPrice);

        mechanism.run_all_sessions().unwrap();
        assert_eq!(mechanism.order(), &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_current_reshuffles_order() {
        let mut mechanism = current(6);
        let mut sampler = ScriptedSampler::new(0, &[], 10.0);
        mechanism.generate_students(20, 0.0, &mut sampler, CurrencyRule::Always);

        mechanism.run_all_sessions().unwrap();

        let mut sorted = mechanism.order().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
        assert_ne!(mechanism.order(), (0..20).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn test_rejects_schedule_of_wrong_length() {
        let short = Student::new(
            StudentId(0),
            0.0,
            vec![SessionDemand::active(
                4.0,
                UtilityParams {
                    session_offset: 0,
                    service_time: 4.0,
                    scale: 10.0,
                },
            )],
            CurrencyRule::Always,
        );

        let result = Mechanism::with_students(
            MechanismConfig::new(3, 10.0, 10.0),
            Box::new(CurrentPolicy::new()),
            vec![short.clone()],
            Some(1),
        );
        assert!(matches!(result, Err(MechanismError::InvalidConfig(_))));

        let mut mechanism = current(1);
        assert!(mechanism.add_student(short).is_ok());
        assert_eq!(mechanism.students().len(), 1);
    }

    #[test]
    fn test_failed_session_blocks_further_sessions() {
        let student = |id: usize, scale: f64| {
            let params = UtilityParams {
                session_offset: 0,
                service_time: 4.0,
                scale,
            };
            Student::new(
                StudentId(id),
                0.0,
                vec![SessionDemand::active(4.0, params); 2],
                CurrencyRule::Always,
            )
        };
        let mut mechanism = Mechanism::with_students(
            MechanismConfig::new(2, 10.0, 20.0),
            Box::new(CurrentPolicy::new()),
            vec![student(0, 10.0), student(1, f64::NAN)],
            Some(1),
        )
        .unwrap();

        assert!(matches!(
            mechanism.run_one_session(),
            Err(MechanismError::NonFiniteUtility { session: 0, .. })
        ));
        assert!(matches!(
            mechanism.run_one_session(),
            Err(MechanismError::SessionAborted(0))
        ));
        assert!(mechanism.run_all_sessions().is_err());

        // the student served before the failure was updated exactly once
        assert_eq!(mechanism.students()[0].receipts().len(), 1);
        assert_eq!(mechanism.sessions_run(), 0);
    }

    #[test]
    fn test_remaining_budget_tracks_last_session() {
        let mut mechanism = current(1);
        let mut sampler = ScriptedSampler::new(0, &[3.0], 10.0);
        mechanism.generate_students(1, 0.0, &mut sampler, CurrencyRule::Always);

        mechanism.run_all_sessions().unwrap();
        assert_eq!(mechanism.remaining_budget(), 7.0);
        assert_eq!(mechanism.final_utilities().len(), 1);
        assert!(mechanism.total_utility() > 0.0);
    }
}
