//! Kairos Ports
//!
//! Port definitions (traits) for the Kairos allocation simulator.
//! These define the boundaries between the session engine, the allocation
//! policies and the random sampling layer.

mod error;
mod policy;
mod sampler;

pub use error::{MechanismError, MechanismResult};
pub use policy::AllocationPolicy;
pub use sampler::DemandSampler;
