//! Seeded sampler built from a [`DemandModel`]

use kairos_ports::DemandSampler;
use rand::prelude::*;
use rand_distr::{Gamma, StandardNormal};

use crate::error::{SamplingError, SamplingResult};
use crate::model::{DemandModel, ServiceTimeModel, StartModel, UtilityScaleModel};

enum ServiceTime {
    Gamma(Gamma<f64>),
    Fixed(f64),
}

enum UtilityScale {
    FoldedNormal {
        base_mean: f64,
        growth_per_session: f64,
        std_dev: f64,
    },
    Fixed(f64),
}

/// Demand sampler with its own seeded random stream
///
/// Distribution parameters are validated once at construction, so drawing
/// never fails.
pub struct SeededDemandSampler {
    start: StartModel,
    service_time: ServiceTime,
    utility_scale: UtilityScale,
    rng: StdRng,
}

impl SeededDemandSampler {
    /// Create a sampler with the given model and seed
    pub fn new(model: &DemandModel, seed: u64) -> SamplingResult<Self> {
        Self::with_rng(model, StdRng::seed_from_u64(seed))
    }

    fn with_rng(model: &DemandModel, rng: StdRng) -> SamplingResult<Self> {
        let service_time = match model.service_time {
            ServiceTimeModel::Gamma { shape, scale } => {
                let gamma = Gamma::new(shape, scale).map_err(|e| {
                    SamplingError::InvalidParameters {
                        distribution: "gamma",
                        reason: e.to_string(),
                    }
                })?;
                ServiceTime::Gamma(gamma)
            }
            ServiceTimeModel::Fixed { minutes } => {
                if !(minutes.is_finite() && minutes >= 0.0) {
                    return Err(SamplingError::InvalidParameters {
                        distribution: "fixed service time",
                        reason: format!("minutes must be finite and non-negative, got {minutes}"),
                    });
                }
                ServiceTime::Fixed(minutes)
            }
        };

        let utility_scale = match model.utility_scale {
            UtilityScaleModel::FoldedNormal {
                base_mean,
                growth_per_session,
                std_dev,
            } => {
                if !(std_dev.is_finite() && std_dev >= 0.0) {
                    return Err(SamplingError::InvalidParameters {
                        distribution: "folded normal",
                        reason: format!("std_dev must be finite and non-negative, got {std_dev}"),
                    });
                }
                UtilityScale::FoldedNormal {
                    base_mean,
                    growth_per_session,
                    std_dev,
                }
            }
            UtilityScaleModel::Fixed { scale } => UtilityScale::Fixed(scale),
        };

        Ok(Self {
            start: model.start.clone(),
            service_time,
            utility_scale,
            rng,
        })
    }
}

impl DemandSampler for SeededDemandSampler {
    fn start_session(&mut self, num_sessions: usize) -> usize {
        match self.start {
            StartModel::Uniform if num_sessions == 0 => 0,
            StartModel::Uniform => self.rng.gen_range(0..num_sessions),
            StartModel::Fixed { session } => session,
        }
    }

    fn service_time(&mut self) -> f64 {
        match &self.service_time {
            ServiceTime::Gamma(gamma) => gamma.sample(&mut self.rng),
            ServiceTime::Fixed(minutes) => *minutes,
        }
    }

    fn utility_scale(&mut self, session_offset: usize) -> f64 {
        match self.utility_scale {
            UtilityScale::FoldedNormal {
                base_mean,
                growth_per_session,
                std_dev,
            } => {
                let mean = base_mean + growth_per_session * session_offset as f64;
                let z: f64 = self.rng.sample(StandardNormal);
                (mean + std_dev * z).abs()
            }
            UtilityScale::Fixed(scale) => scale,
        }
    }
}
