//! Module registry: ordered-trial producer/consumer factory resolution.
//! Factories are tried in registration order until one claims the
//! parameters; injected once at channel construction and never mutated
//! afterward.

use std::sync::Arc;

use crate::format::VideoFormatDesc;
use crate::frame::FrameFactory;
use crate::producer::{EmptyProducer, Producer};
use crate::consumer::{Consumer, EmptyConsumer};

pub trait ProducerFactory: Send + Sync {
    /// Returns `None` to let the registry try the next factory; `params`
    /// are opaque strings the core never interprets.
    fn create(&self, frame_factory: &Arc<FrameFactory>, format: &VideoFormatDesc, params: &[String]) -> Option<Box<dyn Producer>>;
}

pub trait ConsumerFactory: Send + Sync {
    fn create(&self, params: &[String]) -> Option<Box<dyn Consumer>>;
}

#[derive(Default)]
pub struct ModuleRegistry {
    producer_factories: Vec<Box<dyn ProducerFactory>>,
    consumer_factories: Vec<Box<dyn ConsumerFactory>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_producer_factory(&mut self, factory: Box<dyn ProducerFactory>) {
        self.producer_factories.push(factory);
    }

    pub fn register_consumer_factory(&mut self, factory: Box<dyn ConsumerFactory>) {
        self.consumer_factories.push(factory);
    }

    /// Tries every registered producer factory in registration order;
    /// falls back to the empty producer rather than an error.
    pub fn create_producer(&self, frame_factory: &Arc<FrameFactory>, format: &VideoFormatDesc, params: &[String]) -> Box<dyn Producer> {
        for factory in &self.producer_factories {
            if let Some(producer) = factory.create(frame_factory, format, params) {
                return producer;
            }
        }
        Box::new(EmptyProducer)
    }

    pub fn create_consumer(&self, params: &[String]) -> Box<dyn Consumer> {
        for factory in &self.consumer_factories {
            if let Some(consumer) = factory.create(params) {
                return consumer;
            }
        }
        Box::new(EmptyConsumer::new(0))
    }
}
