//! The producer contract: one draw-frame per `receive()`, plus the
//! asynchronous-destruction decorator every registered producer is wrapped
//! in before it reaches a layer.

pub mod destroy_proxy;
pub mod empty;

pub use destroy_proxy::DestroyProducerProxy;
pub use empty::EmptyProducer;

use crate::concurrency::Awaitable;
use crate::frame::DrawFrame;

/// What the requester wants computed this tick. A producer that only has
/// video for a layer muted at the mixer level can skip audio work when
/// `audio` is false, and vice versa.
#[derive(Debug, Clone, Copy)]
pub struct ReceiveFlags {
    pub video: bool,
    pub audio: bool,
}

impl Default for ReceiveFlags {
    fn default() -> Self {
        Self { video: true, audio: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NbFrames {
    Known(u64),
    Unknown,
}

/// One producer instance backing one layer slot (foreground or background).
///
/// A single producer is only ever called from one thread at a time — the
/// stage's fork-join worker pool serializes calls per layer — so
/// `receive`/`call` take `&mut self` rather than requiring interior
/// mutability.
pub trait Producer: Send {
    fn receive(&mut self, flags: ReceiveFlags) -> DrawFrame;

    /// Idempotent; the frame last emitted by `receive`, or `Empty` before
    /// the first call.
    fn last_frame(&self) -> DrawFrame;

    fn nb_frames(&self) -> NbFrames {
        NbFrames::Unknown
    }

    fn frame_number(&self) -> u64 {
        0
    }

    fn set_paused(&mut self, _paused: bool) {}

    /// Chains this producer behind `other`: used when a transition producer
    /// needs to late-bind its upstream once it becomes available.
    fn leading_producer(&mut self, _other: Box<dyn Producer>) {}

    /// Opaque imperative control channel (play/stop/seek/set-parameter);
    /// the core does not interpret `params`.
    fn call(&mut self, _params: Vec<String>) -> Awaitable<String> {
        Awaitable::ready(String::new())
    }

    fn name(&self) -> &str {
        "producer"
    }
}
