//! Channel: owns one stage, mixer, and output, and the two plumbing
//! threads that carry ticks stage → mixer → output.
//!
//! Exclusively owns its stage/mixer/output triple and drives them from its
//! own thread set.
//!
//! **Missing functionality**: the plumbing threads spawned here are not
//! joined on `Drop` — dropping a `Channel` drops its `Stage`, which closes
//! the stage→mixer mailbox and lets both forwarding threads exit on their
//! own, but nothing blocks `Channel::drop` waiting for that to happen. A
//! production shutdown path would want to join them with a bounded grace
//! window, the way `Executor::stop` does for a single actor.

use std::sync::{Arc, Mutex};
use std::thread;

use crate::config::PipelineConfig;
use crate::consumer::Consumer;
use crate::destroyer::Destroyer;
use crate::error::{CoreError, CoreResult};
use crate::format::VideoFormatDesc;
use crate::layer::LayerState;
use crate::mixer::Mixer;
use crate::output::Output;
use crate::producer::{Producer, ReceiveFlags};
use crate::stage::Stage;

pub struct Channel {
    index: usize,
    stage: Arc<Stage>,
    output: Arc<Output>,
    mixer_format: Arc<Mutex<Option<VideoFormatDesc>>>,
    _mixer_forward: thread::JoinHandle<()>,
    _output_forward: thread::JoinHandle<()>,
}

impl Channel {
    pub fn new(index: usize, format: VideoFormatDesc, config: &PipelineConfig) -> CoreResult<Self> {
        let destroyer = Destroyer::new();
        let (stage, from_stage) = Stage::new(index, config, Arc::clone(&destroyer));
        let stage = Arc::new(stage);

        let (mixer, from_mixer, mixer_format) = Mixer::new(format.clone(), config);
        let output = Arc::new(Output::new(index, format, destroyer));

        let mixer_forward = thread::Builder::new()
            .name(format!("mixer-forward-{index}"))
            .spawn(move || {
                let mut mixer = mixer;
                for tick in from_stage.iter() {
                    mixer.process(tick);
                }
            })
            .map_err(|err| CoreError::FatalResourceExhaustion {
                reason: format!("failed to spawn mixer-forward thread for channel {index}: {err}"),
            })?;

        let output_forward = {
            let output = Arc::clone(&output);
            thread::Builder::new()
                .name(format!("output-forward-{index}"))
                .spawn(move || {
                    for tick in from_mixer.iter() {
                        output.process(tick);
                    }
                })
                .map_err(|err| CoreError::FatalResourceExhaustion {
                    reason: format!("failed to spawn output-forward thread for channel {index}: {err}"),
                })?
        };

        Ok(Self {
            index,
            stage,
            output,
            mixer_format,
            _mixer_forward: mixer_forward,
            _output_forward: output_forward,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Runs one stage tick, fanning out through the mixer and output
    /// threads asynchronously. Intended to be called at the channel's
    /// nominal frame rate by the embedding application; this core is not
    /// self-clocking.
    pub fn tick(&self, flags: ReceiveFlags) {
        self.stage.tick(flags);
    }

    pub fn load(&self, layer: usize, producer: Box<dyn Producer>, preview: bool, auto_play_delta: Option<u64>) {
        self.stage.load(layer, producer, preview, auto_play_delta);
    }

    pub fn play(&self, layer: usize) {
        self.stage.play(layer);
    }

    pub fn pause(&self, layer: usize) {
        self.stage.pause(layer);
    }

    pub fn stop(&self, layer: usize) {
        self.stage.stop(layer);
    }

    pub fn clear(&self, layer: usize) {
        self.stage.clear(layer);
    }

    pub fn clear_all(&self) {
        self.stage.clear_all();
    }

    pub fn status(&self, layer: usize) -> LayerState {
        self.stage.status(layer)
    }

    pub fn foreground(&self, layer: usize) -> String {
        self.stage.foreground_name(layer)
    }

    pub fn background(&self, layer: usize) -> Option<String> {
        self.stage.background_name(layer)
    }

    pub fn swap_layer(&self, a: usize, b: usize) {
        self.stage.swap_layer(a, b);
    }

    pub fn swap_layer_cross_channel(a: usize, channel_a: &Channel, b: usize, channel_b: &Channel) {
        Stage::swap_layer_cross_channel(a, &channel_a.stage, b, &channel_b.stage);
    }

    pub fn add_consumer(&self, index: usize, consumer: Box<dyn Consumer>) {
        self.output.add_consumer(index, consumer);
    }

    pub fn remove_consumer(&self, index: usize) {
        self.output.remove_consumer(index);
    }

    /// Changes the channel's video format. Only valid while the channel is
    /// quiescent (no layer `Playing`); propagates the new format to both the
    /// output's consumers and the mixer's render target so the two stay in
    /// step.
    pub fn set_video_format_desc(&self, format: VideoFormatDesc) -> CoreResult<()> {
        if !self.stage.is_quiescent() {
            return Err(CoreError::ConfigurationError {
                reason: format!("channel {} has a playing layer; cannot change video format while live", self.index),
            });
        }
        *self.mixer_format.lock().unwrap() = Some(format.clone());
        self.output.set_video_format_desc(format);
        Ok(())
    }
}
