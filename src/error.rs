use std::time::Duration;

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum CoreError {
    #[error("Invalid sensor range: min {min} is greater than max {max}")]
    InvalidRange { min: i32, max: i32 },

    #[error("Sensor start value {start} is outside [{min}, {max}]")]
    StartOutOfRange { start: i32, min: i32, max: i32 },

    #[error("Sensor step bound must not be negative: {0}")]
    InvalidStepBound(i32),

    #[error("Sensor interval must be non-zero: {0:?}")]
    InvalidInterval(Duration),

    #[error("No async runtime available to drive the sensor timer")]
    TimerUnavailable,

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
