//! Errors raised while building, loading or saving distance fields.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode header: {0}")]
    Decode(#[from] bincode::Error),

    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("distance data has {actual} samples, expected {expected}")]
    DataLength { expected: usize, actual: i64 },

    #[error("grain must be positive and finite, got {0}")]
    InvalidGrain(f32),

    #[error("scale must be positive and finite, got {0}")]
    InvalidScale(f32),

    #[error("malformed obstacle name: {0}")]
    InvalidString(String),

    #[error("obstacle count {0} is negative")]
    ObstacleCount(i16),
}

pub type SdfResult<T> = Result<T, SdfError>;
