//! Buffer-depth decorator: delays frames handed to a consumer that declares
//! a positive `buffer_depth`, so late-binding hardware (e.g. a card that
//! needs N ticks of lookahead) sees a frame that is `N` ticks old relative
//! to the fresh frame every other consumer gets that tick.
//!
//! Works as a small ring that is pushed once per tick and, once full, pops
//! the oldest entry to forward downstream. Implemented as a consumer
//! decorator rather than centralized bookkeeping in `Output`, keeping
//! `Output`'s fanout loop ignorant of per-consumer depth.

use std::collections::VecDeque;

use crate::concurrency::Awaitable;
use crate::consumer::Consumer;
use crate::format::VideoFormatDesc;
use crate::frame::ReadFrame;

pub struct CadenceGuard {
    inner: Box<dyn Consumer>,
    depth: usize,
    ring: VecDeque<ReadFrame>,
}

impl CadenceGuard {
    pub fn new(inner: Box<dyn Consumer>) -> Self {
        let depth = inner.buffer_depth();
        Self {
            inner,
            depth,
            ring: VecDeque::with_capacity(depth + 1),
        }
    }
}

impl Consumer for CadenceGuard {
    fn initialize(&mut self, format: &VideoFormatDesc, channel_index: usize) {
        self.ring.clear();
        self.inner.initialize(format, channel_index);
    }

    fn send(&mut self, frame: ReadFrame) -> Awaitable<bool> {
        if self.depth == 0 {
            return self.inner.send(frame);
        }

        self.ring.push_back(frame);
        if self.ring.len() <= self.depth {
            // Not primed yet: the ring hasn't accumulated enough lookahead,
            // so this tick contributes no send and reports accepted.
            return Awaitable::ready(true);
        }
        let delayed = self.ring.pop_front().expect("just checked len > depth");
        self.inner.send(delayed)
    }

    fn has_synchronization_clock(&self) -> bool {
        self.inner.has_synchronization_clock()
    }

    /// The guard absorbs the depth internally; it reports zero so `Output`
    /// does not additionally delay frames before they ever reach here.
    fn buffer_depth(&self) -> usize {
        0
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
