//! Serializable description of the demand distributions

use serde::{Deserialize, Serialize};

/// Distribution of the session in which a student starts working
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StartModel {
    /// Uniform over every session of the period
    Uniform,
    /// Everyone starts in the same session
    Fixed { session: usize },
}

/// Distribution of minutes needed per session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceTimeModel {
    /// Gamma(shape, scale)
    Gamma { shape: f64, scale: f64 },
    Fixed { minutes: f64 },
}

/// Distribution of the utility curve amplitude
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UtilityScaleModel {
    /// `|N(base_mean + growth_per_session * session, std_dev)|`
    ///
    /// The mean grows over the period: help is worth more as the deadline
    /// approaches.
    FoldedNormal {
        base_mean: f64,
        growth_per_session: f64,
        std_dev: f64,
    },
    Fixed { scale: f64 },
}

/// Full demand model for one population of students
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandModel {
    #[serde(default = "default_start")]
    pub start: StartModel,
    #[serde(default = "default_service_time")]
    pub service_time: ServiceTimeModel,
    #[serde(default = "default_utility_scale")]
    pub utility_scale: UtilityScaleModel,
}

fn default_start() -> StartModel {
    StartModel::Uniform
}

fn default_service_time() -> ServiceTimeModel {
    ServiceTimeModel::Gamma {
        shape: 8.0,
        scale: 1.0,
    }
}

fn default_utility_scale() -> UtilityScaleModel {
    UtilityScaleModel::FoldedNormal {
        base_mean: 10.0,
        growth_per_session: 1.0,
        std_dev: 5.0,
    }
}

impl Default for DemandModel {
    fn default() -> Self {
        Self {
            start: default_start(),
            service_time: default_service_time(),
            utility_scale: default_utility_scale(),
        }
    }
}

impl DemandModel {
    /// Deterministic model: everyone starts at `session`, needs `minutes`
    /// and values help at `scale`
    pub fn fixed(session: usize, minutes: f64, scale: f64) -> Self {
        Self {
            start: StartModel::Fixed { session },
            service_time: ServiceTimeModel::Fixed { minutes },
            utility_scale: UtilityScaleModel::Fixed { scale },
        }
    }
}
