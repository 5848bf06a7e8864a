//! Mechanism hyperparameters

use kairos_ports::{MechanismError, MechanismResult};
use serde::{Deserialize, Serialize};

/// Shape of the simulated period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanismConfig {
    /// Number of office-hours sessions held
    pub num_sessions: usize,
    /// Most minutes a single student can get in one session
    pub max_allocation: f64,
    /// Minutes available in each session
    pub session_budget: f64,
}

impl Default for MechanismConfig {
    fn default() -> Self {
        Self {
            num_sessions: 14,
            max_allocation: 10.0,
            session_budget: 120.0,
        }
    }
}

impl MechanismConfig {
    pub fn new(num_sessions: usize, max_allocation: f64, session_budget: f64) -> Self {
        Self {
            num_sessions,
            max_allocation,
            session_budget,
        }
    }

    /// Check the budget and cap are usable
    pub fn validate(&self) -> MechanismResult<()> {
        if !(self.session_budget.is_finite() && self.session_budget >= 0.0) {
            return Err(MechanismError::InvalidConfig(format!(
                "session_budget must be finite and non-negative, got {}",
                self.session_budget
            )));
        }
        if !(self.max_allocation.is_finite() && self.max_allocation >= 0.0) {
            return Err(MechanismError::InvalidConfig(format!(
                "max_allocation must be finite and non-negative, got {}",
                self.max_allocation
            )));
        }
        Ok(())
    }
}
