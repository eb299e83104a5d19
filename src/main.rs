//! Smoke-test binary: wires up one channel with a solid-color producer and
//! a logging consumer, then drives a handful of ticks by hand. Exists for
//! manual verification during development, not as a deployable server — a
//! control-protocol front-end that drives ticks on a real schedule would
//! live in a separate crate.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use caspar_core::concurrency::Awaitable;
use caspar_core::config::PipelineConfig;
use caspar_core::consumer::Consumer;
use caspar_core::format::{PixelFormatDesc, VideoFormatDesc};
use caspar_core::frame::{DrawFrame, FrameFactory, ReadFrame};
use caspar_core::producer::{Producer, ReceiveFlags};
use caspar_core::Channel;

#[derive(Parser)]
#[command(about = "Drives a single demo channel for a fixed number of ticks")]
struct Cli {
    /// Number of stage ticks to run before exiting.
    #[arg(long, default_value_t = 50)]
    ticks: u32,

    /// Stage-to-mixer in-flight ticket limit.
    #[arg(long, default_value_t = 3)]
    ticket_limit: usize,
}

struct ColorProducer {
    factory: Arc<FrameFactory>,
    desc: PixelFormatDesc,
    bgra: [u8; 4],
    samples_per_frame: usize,
    frame_number: u64,
}

impl Producer for ColorProducer {
    fn receive(&mut self, _flags: ReceiveFlags) -> DrawFrame {
        let mut frame = match self.factory.create_frame(1, &self.desc) {
            Ok(frame) => frame,
            Err(_) => return DrawFrame::Late,
        };
        for pixel in frame.planes_mut().chunks_exact_mut(4) {
            pixel.copy_from_slice(&self.bgra);
        }
        let audio = vec![0i16; self.samples_per_frame];
        self.frame_number += 1;
        DrawFrame::Writable(Arc::new(frame.commit(audio)))
    }

    fn last_frame(&self) -> DrawFrame {
        DrawFrame::Empty
    }

    fn frame_number(&self) -> u64 {
        self.frame_number
    }

    fn name(&self) -> &str {
        "color-producer"
    }
}

struct LoggingConsumer {
    index: usize,
}

impl Consumer for LoggingConsumer {
    fn initialize(&mut self, format: &VideoFormatDesc, channel_index: usize) {
        tracing::info!(channel = channel_index, format = %format.name, "consumer initialized");
    }

    fn send(&mut self, frame: ReadFrame) -> Awaitable<bool> {
        tracing::info!(
            width = frame.width,
            height = frame.height,
            samples = frame.audio.len(),
            "frame received"
        );
        Awaitable::ready(true)
    }

    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        "logging-consumer"
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::default();
    config.ticket_limit = cli.ticket_limit;

    let format = VideoFormatDesc::hd1080p25();
    let channel = Channel::new(1, format.clone(), &config)?;

    let frame_factory = Arc::new(FrameFactory::new(config.buffer_pool_soft_cap, None));
    let producer = ColorProducer {
        factory: frame_factory,
        desc: PixelFormatDesc::bgra(format.width, format.height),
        bgra: [0x00, 0x80, 0xFF, 0xFF],
        samples_per_frame: format.cadence.current() as usize,
        frame_number: 0,
    };

    channel.load(0, Box::new(producer), false, None);
    channel.play(0);
    channel.add_consumer(0, Box::new(LoggingConsumer { index: 0 }));

    for _ in 0..cli.ticks {
        channel.tick(ReceiveFlags::default());
    }

    std::thread::sleep(std::time::Duration::from_millis(200));
    Ok(())
}
