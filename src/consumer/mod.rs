//! The consumer contract: receives one read-frame per tick, optionally
//! paces the channel via its own hardware clock.

pub mod cadence_guard;
pub mod destroy_proxy;
pub mod empty;
pub mod synchronizing;

pub use cadence_guard::CadenceGuard;
pub use destroy_proxy::DestroyConsumerProxy;
pub use empty::EmptyConsumer;
pub use synchronizing::SynchronizingConsumer;

use crate::concurrency::Awaitable;
use crate::format::VideoFormatDesc;
use crate::frame::ReadFrame;

/// A consumer's handle to drive or observe one registered output slot.
pub trait Consumer: Send {
    /// Called once at registration and again whenever the channel's format
    /// changes; must reset internal buffering.
    fn initialize(&mut self, format: &VideoFormatDesc, channel_index: usize);

    /// The frame is valid until the returned future resolves; the consumer
    /// must not retain it past that point. `Ok(true)` = accepted,
    /// `Ok(false)` = the consumer wants to be removed.
    fn send(&mut self, frame: ReadFrame) -> Awaitable<bool>;

    fn has_synchronization_clock(&self) -> bool {
        false
    }

    fn buffer_depth(&self) -> usize {
        0
    }

    fn key_only(&self) -> bool {
        false
    }

    fn index(&self) -> usize;

    fn name(&self) -> &str {
        "consumer"
    }
}
