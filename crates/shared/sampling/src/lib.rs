//! Kairos Demand Sampling
//!
//! Seeded random samplers for student demand: when a student starts working,
//! how long each session's question takes, and how much being helped is
//! worth. The default model has demand that grows toward the end of the term.

mod error;
mod model;
mod sampler;

pub use error::{SamplingError, SamplingResult};
pub use model::{DemandModel, ServiceTimeModel, StartModel, UtilityScaleModel};
pub use sampler::SeededDemandSampler;
