use thiserror::Error;

/// Errors raised while building samplers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplingError {
    #[error("Invalid {distribution} parameters: {reason}")]
    InvalidParameters {
        distribution: &'static str,
        reason: String,
    },
}

pub type SamplingResult<T> = std::result::Result<T, SamplingError>;
