//! Wraps a producer so that dropping the wrapper never runs the producer's
//! own (possibly blocking) destructor on the caller's thread.
//!
//! Every producer a layer owns is wrapped in this proxy before being stored,
//! so that `layer::stop()` or an A/B swap can drop the old foreground without
//! stalling on a decoder teardown.

use std::sync::Arc;

use crate::concurrency::Awaitable;
use crate::destroyer::Destroyer;
use crate::frame::DrawFrame;
use crate::producer::{NbFrames, Producer, ReceiveFlags};

pub struct DestroyProducerProxy {
    inner: Option<Box<dyn Producer>>,
    destroyer: Arc<Destroyer>,
    label: String,
}

impl DestroyProducerProxy {
    pub fn new(inner: Box<dyn Producer>, destroyer: Arc<Destroyer>) -> Self {
        let label = inner.name().to_string();
        Self {
            inner: Some(inner),
            destroyer,
            label,
        }
    }

    fn inner(&self) -> &dyn Producer {
        self.inner.as_deref().expect("producer used after being torn down")
    }

    fn inner_mut(&mut self) -> &mut (dyn Producer + 'static) {
        self.inner.as_deref_mut().expect("producer used after being torn down")
    }
}

impl Producer for DestroyProducerProxy {
    fn receive(&mut self, flags: ReceiveFlags) -> DrawFrame {
        self.inner_mut().receive(flags)
    }

    fn last_frame(&self) -> DrawFrame {
        self.inner().last_frame()
    }

    fn nb_frames(&self) -> NbFrames {
        self.inner().nb_frames()
    }

    fn frame_number(&self) -> u64 {
        self.inner().frame_number()
    }

    fn set_paused(&mut self, paused: bool) {
        self.inner_mut().set_paused(paused);
    }

    fn leading_producer(&mut self, other: Box<dyn Producer>) {
        self.inner_mut().leading_producer(other);
    }

    fn call(&mut self, params: Vec<String>) -> Awaitable<String> {
        self.inner_mut().call(params)
    }

    fn name(&self) -> &str {
        &self.label
    }
}

impl Drop for DestroyProducerProxy {
    fn drop(&mut self) {
        if let Some(producer) = self.inner.take() {
            self.destroyer.schedule(self.label.clone(), move || drop(producer));
        }
    }
}
