//! A real-time video production core: per-channel `stage → mixer → output`
//! pipelines over a GPU frame abstraction, built on a cooperative
//! actor/executor concurrency substrate.
//!
//! A channel continuously composes layered producers into a deterministic
//! stream of read-frames and fans them to registered consumers at a
//! broadcast cadence. See [`channel::Channel`] for the entry point that
//! wires a stage, mixer, and output together; [`registry::ModuleRegistry`]
//! for how concrete producers/consumers are resolved from opaque
//! parameters.

pub mod channel;
pub mod concurrency;
pub mod config;
pub mod consumer;
pub mod destroyer;
pub mod error;
pub mod format;
pub mod frame;
pub mod gpu;
pub mod layer;
pub mod mixer;
pub mod output;
pub mod producer;
pub mod registry;
pub mod stage;

pub use channel::Channel;
pub use config::PipelineConfig;
pub use error::{CoreError, CoreResult};
