//! Currency rules
//!
//! A currency rule is a student's willingness-to-pay test: given the value
//! they would realize (utility, or utility density for per-minute pricing)
//! and the price being asked, does the student pay?

use serde::{Deserialize, Serialize};

/// Admission predicate `(value, price) -> bool`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum CurrencyRule {
    /// Always willing to pay
    #[default]
    Always,
    /// Pays when the value reaches a fixed threshold, whatever the price
    UtilityAtLeast { threshold: f64 },
    /// Pays when the value clears the price by at least `margin`
    SurplusAtLeast { margin: f64 },
    /// Pays when the value is strictly above the price
    ExceedsPrice,
}

impl CurrencyRule {
    /// Evaluate the rule
    pub fn accepts(&self, value: f64, price: f64) -> bool {
        match *self {
            CurrencyRule::Always => true,
            CurrencyRule::UtilityAtLeast { threshold } => value >= threshold,
            CurrencyRule::SurplusAtLeast { margin } => value >= price + margin,
            CurrencyRule::ExceedsPrice => value > price,
        }
    }
}
