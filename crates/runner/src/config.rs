//! Experiment configuration
//!
//! An experiment is one policy run over many independent trials. It can be
//! loaded from JSON, where every field is optional:
//!
//! ```json
//! {
//!   "name": "posted-price",
//!   "num_students": 200,
//!   "mechanism": { "num_sessions": 14, "max_allocation": 10.0, "session_budget": 120.0 },
//!   "trials": 10,
//!   "seed": 7,
//!   "endowment": 50.0,
//!   "currency_rule": { "rule": "surplus_at_least", "margin": 15.0 },
//!   "policy": { "policy": "posted_price", "prices": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13] }
//! }
//! ```
//!
//! or built from one of the [`Scenario`] presets.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use kairos_core::CurrencyRule;
use kairos_engine::MechanismConfig;
use kairos_mechanisms::PolicyConfig;
use kairos_sampling::DemandModel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or checking an experiment configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("unknown scenario '{0}' (expected one of: current, posted-price, fast-pass, pay-per-minute, optimal)")]
    UnknownScenario(String),

    #[error("invalid experiment config: {0}")]
    Invalid(String),
}

/// Built-in experiments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// First come, first served; no currency
    Current,
    /// Price rises by one each session, 50 currency, pays when utility beats price by 15
    PostedPrice,
    /// Flat price of 1, 2 currency, pays when utility reaches 20
    FastPass,
    /// Rate `(10 + i) / 7.8` per minute, 50 currency, pays when density beats the rate
    PayPerMinute,
    /// Greedy density benchmark
    Optimal,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Current,
        Scenario::PostedPrice,
        Scenario::FastPass,
        Scenario::PayPerMinute,
        Scenario::Optimal,
    ];

    /// Name accepted by `--scenario`
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Current => "current",
            Scenario::PostedPrice => "posted-price",
            Scenario::FastPass => "fast-pass",
            Scenario::PayPerMinute => "pay-per-minute",
            Scenario::Optimal => "optimal",
        }
    }

    /// Full experiment configuration for this preset
    pub fn config(&self) -> ExperimentConfig {
        let mechanism = MechanismConfig::default();
        let num_sessions = mechanism.num_sessions;

        let (endowment, currency_rule, policy) = match self {
            Scenario::Current => (0.0, CurrencyRule::Always, PolicyConfig::Current),
            Scenario::PostedPrice => (
                50.0,
                CurrencyRule::SurplusAtLeast { margin: 15.0 },
                PolicyConfig::rising_prices(num_sessions),
            ),
            Scenario::FastPass => (
                2.0,
                CurrencyRule::UtilityAtLeast { threshold: 20.0 },
                PolicyConfig::flat_price(1.0, num_sessions),
            ),
            Scenario::PayPerMinute => (
                50.0,
                CurrencyRule::ExceedsPrice,
                PolicyConfig::rising_rates(num_sessions, 10.0, 7.8),
            ),
            Scenario::Optimal => (0.0, CurrencyRule::Always, PolicyConfig::OptimalGreedy),
        };

        ExperimentConfig {
            name: self.name().to_string(),
            mechanism,
            endowment,
            currency_rule,
            policy,
            ..Default::default()
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownScenario(s.to_string()))
    }
}

/// Root configuration for an experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Label used in reports
    #[serde(default = "default_name")]
    pub name: String,

    /// Students generated per trial
    #[serde(default = "default_num_students")]
    pub num_students: usize,

    /// Sessions, per-student cap and per-session budget
    #[serde(default)]
    pub mechanism: MechanismConfig,

    /// Independent trials to run
    #[serde(default = "default_trials")]
    pub trials: usize,

    /// Base seed; drawn from entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Currency every student starts with
    #[serde(default)]
    pub endowment: f64,

    /// Willingness-to-pay test shared by the whole population
    #[serde(default)]
    pub currency_rule: CurrencyRule,

    /// Demand distributions
    #[serde(default)]
    pub demand: DemandModel,

    /// Allocation policy under test
    #[serde(default)]
    pub policy: PolicyConfig,
}

fn default_name() -> String {
    "custom".to_string()
}

fn default_num_students() -> usize {
    200
}

fn default_trials() -> usize {
    10
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            num_students: default_num_students(),
            mechanism: MechanismConfig::default(),
            trials: default_trials(),
            seed: None,
            endowment: 0.0,
            currency_rule: CurrencyRule::default(),
            demand: DemandModel::default(),
            policy: PolicyConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize back to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check the fields the engine does not validate itself
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::Invalid("trials must be at least 1".to_string()));
        }
        if !(self.endowment.is_finite() && self.endowment >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "endowment must be finite and non-negative, got {}",
                self.endowment
            )));
        }
        Ok(())
    }
}
