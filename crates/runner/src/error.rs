use kairos_ports::MechanismError;
use kairos_sampling::SamplingError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that stop an experiment
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("trial {trial}: {source}")]
    Mechanism {
        trial: usize,
        #[source]
        source: MechanismError,
    },

    #[error(transparent)]
    Sampling(#[from] SamplingError),

    #[error("failed to encode report: {0}")]
    Encode(String),
}

pub type ExperimentResult<T> = Result<T, ExperimentError>;
