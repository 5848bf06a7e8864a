use serde::{Deserialize, Serialize};

/// Serializable choice of allocation policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PolicyConfig {
    /// No price, serve in order, reshuffle between sessions
    #[default]
    Current,
    /// One posted price per session
    PostedPrice { prices: Vec<f64> },
    /// One per-minute rate per session
    PayPerMinute { rates: Vec<f64> },
    /// Serve by descending utility density, ignoring currency
    OptimalGreedy,
}

impl PolicyConfig {
    /// Same price in every session
    pub fn flat_price(price: f64, num_sessions: usize) -> Self {
        Self::PostedPrice {
            prices: vec![price; num_sessions],
        }
    }

    /// Prices `0, 1, 2, ...`, rising by one each session
    pub fn rising_prices(num_sessions: usize) -> Self {
        Self::PostedPrice {
            prices: (0..num_sessions).map(|i| i as f64).collect(),
        }
    }

    /// Rates `(base + i) / divisor` for session `i`
    pub fn rising_rates(num_sessions: usize, base: f64, divisor: f64) -> Self {
        Self::PayPerMinute {
            rates: (0..num_sessions)
                .map(|i| (base + i as f64) / divisor)
                .collect(),
        }
    }

    /// Short name used on the command line and in reports
    pub fn label(&self) -> &'static str {
        match self {
            PolicyConfig::Current => "current",
            PolicyConfig::PostedPrice { .. } => "posted_price",
            PolicyConfig::PayPerMinute { .. } => "pay_per_minute",
            PolicyConfig::OptimalGreedy => "optimal_greedy",
        }
    }
}
