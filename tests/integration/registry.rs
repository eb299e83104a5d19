//! `ModuleRegistry` resolving a real producer/consumer pair built from the
//! shared test harness rather than throwaway stubs.

use std::sync::Arc;

use caspar_core::format::VideoFormatDesc;
use caspar_core::frame::FrameFactory;
use caspar_core::producer::Producer;
use caspar_core::registry::{ConsumerFactory, ModuleRegistry, ProducerFactory};

use crate::common::{RecordingConsumer, WatermarkProducer};

struct WatermarkFactory;

impl ProducerFactory for WatermarkFactory {
    fn create(&self, _frame_factory: &Arc<FrameFactory>, _format: &VideoFormatDesc, params: &[String]) -> Option<Box<dyn Producer>> {
        if params.first().map(String::as_str) == Some("watermark") {
            Some(Box::new(WatermarkProducer::new(5)))
        } else {
            None
        }
    }
}

struct RecordingFactory;

impl ConsumerFactory for RecordingFactory {
    fn create(&self, params: &[String]) -> Option<Box<dyn caspar_core::consumer::Consumer>> {
        if params.first().map(String::as_str) == Some("recorder") {
            Some(Box::new(RecordingConsumer::new(0)))
        } else {
            None
        }
    }
}

#[test]
fn registry_resolves_registered_producers_and_falls_back_for_unknown_params() {
    let mut registry = ModuleRegistry::new();
    registry.register_producer_factory(Box::new(WatermarkFactory));

    let frame_factory = Arc::new(FrameFactory::new(4, None));
    let format = VideoFormatDesc::hd1080p25();

    let producer = registry.create_producer(&frame_factory, &format, &["watermark".to_string()]);
    assert_eq!(producer.name(), "test-watermark-producer");

    let fallback = registry.create_producer(&frame_factory, &format, &["unknown".to_string()]);
    assert_eq!(fallback.name(), "empty-producer");
}

#[test]
fn registry_resolves_registered_consumers_and_falls_back_for_unknown_params() {
    let mut registry = ModuleRegistry::new();
    registry.register_consumer_factory(Box::new(RecordingFactory));

    let consumer = registry.create_consumer(&["recorder".to_string()]);
    assert_eq!(consumer.name(), "test-recording-consumer");

    let fallback = registry.create_consumer(&["unknown".to_string()]);
    assert_eq!(fallback.name(), "empty-consumer");
}
