//! Error taxonomy for the pipeline core.
//!
//! One variant per failure mode named in the error handling design: transient
//! producer/consumer failure, allocation failure, GPU error, configuration
//! error, and fatal resource exhaustion. Transient failures are normally
//! absorbed by the component that sees them (a layer repeats its last frame,
//! the output reinitializes a consumer) rather than bubbling up as `Err`;
//! `CoreError` exists for the cases that do cross a component boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("producer on layer {layer} failed to deliver a frame: {reason}")]
    TransientProducerFailure { layer: i32, reason: String },

    #[error("consumer {index} failed in send(): {reason}")]
    TransientConsumerFailure { index: i32, reason: String },

    #[error("frame allocation failed for tag {tag:?}, size {size}")]
    AllocationFailure { tag: usize, size: usize },

    #[error("GPU error during tick: {reason}")]
    GpuError { reason: String },

    #[error("configuration error: {reason}")]
    ConfigurationError { reason: String },

    #[error("fatal resource exhaustion: {reason}")]
    FatalResourceExhaustion { reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
