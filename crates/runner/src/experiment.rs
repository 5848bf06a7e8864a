//! Repeated trials of one experiment
//!
//! Each trial builds a fresh [`Mechanism`], generates a fresh population and
//! runs the whole period. Trials share nothing: both random streams of a trial
//! are derived from `base_seed + trial`, so any single trial can be replayed
//! on its own.

use kairos_core::Outcome;
use kairos_engine::Mechanism;
use kairos_sampling::SeededDemandSampler;
use log::{debug, info};
use rand::prelude::*;

use crate::config::ExperimentConfig;
use crate::error::{ExperimentError, ExperimentResult};
use crate::report::{ExperimentReport, UtilitySummary};

/// Seeds for the two random streams of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialSeeds {
    /// Demand generation
    pub sampler: u64,
    /// Processing-order reshuffles
    pub shuffle: u64,
}

/// Result of one trial
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub trial: usize,
    pub seeds: TrialSeeds,
    /// Sum of every student's cumulative utility
    pub total_utility: f64,
    /// Currency spent by all students
    pub total_payment: f64,
    /// Student-sessions turned away with nothing
    pub shut_outs: usize,
    /// Cumulative utility per student, in roster order
    pub final_utilities: Vec<f64>,
}

/// A validated experiment ready to run
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
    base_seed: u64,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> ExperimentResult<Self> {
        config.validate()?;
        let base_seed = config
            .seed
            .unwrap_or_else(|| StdRng::from_entropy().r#gen());

        Ok(Self { config, base_seed })
    }

    /// Seed the trials are derived from
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Seeds used by trial `trial`
    pub fn trial_seeds(&self, trial: usize) -> TrialSeeds {
        let mut seeder = StdRng::seed_from_u64(self.base_seed.wrapping_add(trial as u64));
        TrialSeeds {
            sampler: seeder.r#gen(),
            shuffle: seeder.r#gen(),
        }
    }

    /// Run a single trial
    pub fn run_trial(&self, trial: usize) -> ExperimentResult<TrialOutcome> {
        let config = &self.config;
        let seeds = self.trial_seeds(trial);
        let in_trial = |source| ExperimentError::Mechanism { trial, source };

        let mut sampler = SeededDemandSampler::new(&config.demand, seeds.sampler)?;
        let mut mechanism = Mechanism::from_policy_config(
            config.mechanism.clone(),
            &config.policy,
            Some(seeds.shuffle),
        )
        .map_err(in_trial)?;

        mechanism.generate_students(
            config.num_students,
            config.endowment,
            &mut sampler,
            config.currency_rule,
        );
        mechanism.run_all_sessions().map_err(in_trial)?;

        let reports = mechanism.reports();
        let outcome = TrialOutcome {
            trial,
            seeds,
            total_utility: mechanism.total_utility(),
            total_payment: reports.iter().map(|r| r.total_payment()).sum(),
            shut_outs: reports.iter().map(|r| r.count(Outcome::ShutOut)).sum(),
            final_utilities: mechanism.final_utilities(),
        };

        debug!(
            "trial {} ({}): utility={:.2} paid={:.2} shut_outs={}",
            trial,
            mechanism.policy_name(),
            outcome.total_utility,
            outcome.total_payment,
            outcome.shut_outs
        );
        Ok(outcome)
    }

    /// Run every trial and summarize
    pub fn run(&self) -> ExperimentResult<ExperimentReport> {
        let config = &self.config;
        info!(
            "Running '{}': {} trials, {} students, {} sessions, seed {}",
            config.name,
            config.trials,
            config.num_students,
            config.mechanism.num_sessions,
            self.base_seed
        );

        let outcomes = (0..config.trials)
            .map(|trial| self.run_trial(trial))
            .collect::<ExperimentResult<Vec<_>>>()?;

        let utilities: Vec<f64> = outcomes.iter().map(|o| o.total_utility).collect();
        let payments: Vec<f64> = outcomes.iter().map(|o| o.total_payment).collect();
        let summary = UtilitySummary::from_values(&utilities);

        info!(
            "'{}' done: mean={:.2} median={:.2}",
            config.name, summary.mean, summary.median
        );

        Ok(ExperimentReport {
            scenario: config.name.clone(),
            policy: policy_name(config),
            trials: config.trials,
            num_students: config.num_students,
            num_sessions: config.mechanism.num_sessions,
            seed: self.base_seed,
            utilities,
            payments,
            summary,
        })
    }
}

fn policy_name(config: &ExperimentConfig) -> String {
    kairos_mechanisms::create_policy(&config.policy)
        .name()
        .to_string()
}
