//! Error types for the stretch-channel crate.

use thiserror::Error;

/// Errors raised while building or reconfiguring channel state.
///
/// Every variant is a caller contract violation; none of them describes an
/// expected runtime condition.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Block size must be non-zero.
    #[error("invalid block size: {0}")]
    InvalidBlockSize(usize),
    /// Output buffer size must be non-zero.
    #[error("invalid output buffer size: {0}")]
    InvalidOutbufSize(usize),
    /// Multi-size construction was given an initial size outside its set.
    #[error("initial block size {initial} is not one of the candidate sizes {sizes:?}")]
    InitialSizeNotInSet { initial: usize, sizes: Vec<usize> },
    /// Pitch scale must be positive and finite.
    #[error("invalid pitch scale: {0}")]
    InvalidPitchScale(f64),
    /// Configuration could not be parsed, serialized or validated.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// I/O error while reading or writing a config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChannelError>;
