//! Kairos Allocation Policies
//!
//! Implementations of the session allocation policies compared by the
//! simulator. Each one is an [`AllocationPolicy`]; [`create_policy`] builds
//! one from its serializable [`PolicyConfig`].

mod config;
mod current;
mod greedy;
mod pay_per_minute;
mod posted_price;
mod rationing;

pub use config::PolicyConfig;
pub use current::CurrentPolicy;
pub use greedy::{GreedyDensityPolicy, RankedStudent};
pub use pay_per_minute::PayPerMinutePolicy;
pub use posted_price::PostedPricePolicy;

// Re-export the trait from ports for convenience
pub use kairos_ports::{AllocationPolicy, MechanismError, MechanismResult};

/// Factory function to create an allocation policy from its configuration
pub fn create_policy(config: &PolicyConfig) -> Box<dyn AllocationPolicy> {
    match config {
        PolicyConfig::Current => Box::new(CurrentPolicy::new()),
        PolicyConfig::PostedPrice { prices } => Box::new(PostedPricePolicy::new(prices.clone())),
        PolicyConfig::PayPerMinute { rates } => Box::new(PayPerMinutePolicy::new(rates.clone())),
        PolicyConfig::OptimalGreedy => Box::new(GreedyDensityPolicy::new()),
    }
}
