//! Looper setup error types
//!
//! Only the setup path reports errors. Everything that runs inside the audio
//! callback degrades to a safe default instead.

use thiserror::Error;

/// Errors that can occur while preparing the looper
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LooperError {
    /// Sample rate is zero, negative, or not finite
    #[error("Invalid sample rate: {0}Hz")]
    InvalidSampleRate(f64),

    /// Maximum block size is zero
    #[error("Maximum block size must be greater than zero")]
    InvalidBlockSize,

    /// Channel count is zero
    #[error("Channel count must be greater than zero")]
    InvalidChannelCount,

    /// Maximum loop duration is not positive and finite, or needs more storage
    /// than `MAX_STORAGE_SAMPLES`
    #[error("Invalid maximum loop length: {0}s")]
    InvalidMaxLoopLength(f64),
}

/// Result type for looper setup operations
pub type LooperResult<T> = Result<T, LooperError>;
