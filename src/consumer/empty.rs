//! The empty consumer: accepts every frame and discards it, for registry
//! slots with nothing attached.

use crate::concurrency::Awaitable;
use crate::consumer::Consumer;
use crate::format::VideoFormatDesc;
use crate::frame::ReadFrame;

pub struct EmptyConsumer {
    index: usize,
}

impl EmptyConsumer {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Consumer for EmptyConsumer {
    fn initialize(&mut self, _format: &VideoFormatDesc, _channel_index: usize) {}

    fn send(&mut self, _frame: ReadFrame) -> Awaitable<bool> {
        Awaitable::ready(true)
    }

    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        "empty-consumer"
    }
}
