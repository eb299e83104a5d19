//! Asynchronous-teardown decorator for consumers, mirroring
//! `crate::producer::DestroyProducerProxy` on the output side.
//!
//! A consumer's destructor may block on a driver callback (e.g. waiting for
//! an SDI card to release a buffer), so `Output::remove_consumer` must never
//! run it inline on the output executor.

use std::sync::Arc;

use crate::concurrency::Awaitable;
use crate::consumer::Consumer;
use crate::destroyer::Destroyer;
use crate::format::VideoFormatDesc;
use crate::frame::ReadFrame;

pub struct DestroyConsumerProxy {
    inner: Option<Box<dyn Consumer>>,
    destroyer: Arc<Destroyer>,
    label: String,
}

impl DestroyConsumerProxy {
    pub fn new(inner: Box<dyn Consumer>, destroyer: Arc<Destroyer>) -> Self {
        let label = inner.name().to_string();
        Self {
            inner: Some(inner),
            destroyer,
            label,
        }
    }

    fn inner(&self) -> &dyn Consumer {
        self.inner.as_deref().expect("consumer used after being torn down")
    }

    fn inner_mut(&mut self) -> &mut (dyn Consumer + 'static) {
        self.inner.as_deref_mut().expect("consumer used after being torn down")
    }
}

impl Consumer for DestroyConsumerProxy {
    fn initialize(&mut self, format: &VideoFormatDesc, channel_index: usize) {
        self.inner_mut().initialize(format, channel_index);
    }

    fn send(&mut self, frame: ReadFrame) -> Awaitable<bool> {
        self.inner_mut().send(frame)
    }

    fn has_synchronization_clock(&self) -> bool {
        self.inner().has_synchronization_clock()
    }

    fn buffer_depth(&self) -> usize {
        self.inner().buffer_depth()
    }

    fn key_only(&self) -> bool {
        self.inner().key_only()
    }

    fn index(&self) -> usize {
        self.inner().index()
    }

    fn name(&self) -> &str {
        &self.label
    }
}

impl Drop for DestroyConsumerProxy {
    fn drop(&mut self) {
        if let Some(consumer) = self.inner.take() {
            self.destroyer.schedule(self.label.clone(), move || drop(consumer));
        }
    }
}
