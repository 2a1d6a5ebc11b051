use polars::prelude::PolarsError;
use thiserror::Error;

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("number of runs must be at least 1, got {0}")]
    InvalidRunCount(usize),
    #[error("number of steps must be at least 1, got {0}")]
    InvalidStepCount(usize),
    #[error("at least one arm is required")]
    NoArms,
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },
    #[error("expected {expected} arm values, got {got}")]
    ArmCountMismatch { expected: usize, got: usize },
    #[error("I/O error while writing statistics: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to build statistics dataframe: {0}")]
    DataFrame(#[from] PolarsError),
}

impl SimulationError {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            message: message.into(),
        }
    }
}
