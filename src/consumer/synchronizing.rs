//! Marks a wrapped consumer as the channel's pacing clock regardless of
//! what the consumer itself reports.
//!
//! The design notes name `synchronizing_consumer` alongside
//! `destroy_producer_proxy`/`cadence_guard` as one more single-purpose
//! decorator rather than a built-in flag on every consumer; the originating
//! file wasn't available to port directly, so this is a minimal decorator
//! in the same shape as the others, overriding only
//! `has_synchronization_clock`.

use crate::concurrency::Awaitable;
use crate::consumer::Consumer;
use crate::format::VideoFormatDesc;
use crate::frame::ReadFrame;

pub struct SynchronizingConsumer {
    inner: Box<dyn Consumer>,
}

impl SynchronizingConsumer {
    pub fn new(inner: Box<dyn Consumer>) -> Self {
        Self { inner }
    }
}

impl Consumer for SynchronizingConsumer {
    fn initialize(&mut self, format: &VideoFormatDesc, channel_index: usize) {
        self.inner.initialize(format, channel_index);
    }

    fn send(&mut self, frame: ReadFrame) -> Awaitable<bool> {
        self.inner.send(frame)
    }

    fn has_synchronization_clock(&self) -> bool {
        true
    }

    fn buffer_depth(&self) -> usize {
        self.inner.buffer_depth()
    }

    fn key_only(&self) -> bool {
        self.inner.key_only()
    }

    fn index(&self) -> usize {
        self.inner.index()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
