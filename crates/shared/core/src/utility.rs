//! Utility curves
//!
//! A student's private value for being served in one session. Curves are
//! stored as plain parameters and evaluated by one shared pure function.

use serde::{Deserialize, Serialize};

/// Offset added to allocated time before dividing, so density is finite at zero time
pub const DENSITY_EPSILON: f64 = 0.01;

/// The curve midpoint sits this many minutes before the sampled service time
pub const MIDPOINT_LEAD: f64 = 2.0;

/// Denominator constant of the saturating curve `2^x / (2^x + HALF_SATURATION)`
pub const HALF_SATURATION: f64 = 0.5;

/// Parameters of one active session's utility curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilityParams {
    /// Session index within the simulated period
    pub session_offset: usize,
    /// Sampled time the student needs to be fully helped (minutes)
    pub service_time: f64,
    /// Amplitude of the curve, sampled once per session
    pub scale: f64,
}

impl UtilityParams {
    /// Point where the curve reaches two thirds of its scale
    pub fn midpoint(&self) -> f64 {
        self.service_time - MIDPOINT_LEAD
    }
}

/// Utility curve for one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UtilityCurve {
    /// Student has not started the assignment yet: always zero
    Dormant,
    /// Student is working and values help along a saturating curve
    Active(UtilityParams),
}

impl UtilityCurve {
    /// Evaluate the utility of `allocated_time` minutes
    ///
    /// Zero allocation is exactly zero utility for every curve; any positive
    /// allocation is positive and saturates towards `scale`.
    pub fn evaluate(&self, allocated_time: f64) -> f64 {
        match self {
            UtilityCurve::Dormant => 0.0,
            UtilityCurve::Active(params) => {
                // f64::signum maps +0.0 to 1.0, so zero is handled explicitly
                let sign = if allocated_time == 0.0 {
                    0.0
                } else {
                    allocated_time.signum()
                };
                sign * saturating(params.scale, allocated_time, params.midpoint())
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, UtilityCurve::Active(_))
    }
}

/// Logistic-like curve in base 2 centred on `midpoint`
fn saturating(scale: f64, time: f64, midpoint: f64) -> f64 {
    let growth = 2f64.powf(time - midpoint);
    scale * growth / (growth + HALF_SATURATION)
}

/// One row of a student's trajectory: what they want today and what it is worth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionDemand {
    /// Minutes the student would like to be seen for
    pub desired_time: f64,
    /// Value of being seen
    pub curve: UtilityCurve,
}

impl SessionDemand {
    /// Demand for a session before the student's start session
    pub fn dormant() -> Self {
        Self {
            desired_time: 0.0,
            curve: UtilityCurve::Dormant,
        }
    }

    pub fn active(desired_time: f64, params: UtilityParams) -> Self {
        Self {
            desired_time,
            curve: UtilityCurve::Active(params),
        }
    }
}

/// Utility per unit of allocated time
pub fn utility_density(utility: f64, allocated_time: f64) -> f64 {
    utility / (allocated_time + DENSITY_EPSILON)
}
