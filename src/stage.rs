//! Stage: collects one draw-frame per populated layer per tick and hands
//! the map to the mixer.
//!
//! A dedicated executor serializes layer mutation (`load`/`play`/`stop`/
//! `swap_layer`); each tick's `receive()` fans out across layers in
//! parallel since producers are independent, then merges back onto the
//! stage thread before handing off to the mixer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::concurrency::{mailbox, Executor, Governor, MailboxReceiver, MailboxSender, Ticket};
use crate::config::PipelineConfig;
use crate::destroyer::Destroyer;
use crate::frame::DrawFrame;
use crate::layer::{self, Layer, LayerState};
use crate::producer::{Producer, ReceiveFlags};

/// One tick's worth of layer output, still carrying the ticket that caps
/// how many ticks may be in flight between the stage and the output.
pub struct StageTick {
    pub frames: HashMap<usize, DrawFrame>,
    pub ticket: Ticket,
}

pub struct Stage {
    executor: Executor,
    layers: Arc<Mutex<HashMap<usize, Layer>>>,
    channel_index: usize,
    governor: Governor,
    to_mixer: MailboxSender<StageTick>,
    destroyer: Arc<Destroyer>,
}

impl Stage {
    pub fn new(channel_index: usize, config: &PipelineConfig, destroyer: Arc<Destroyer>) -> (Self, MailboxReceiver<StageTick>) {
        let (to_mixer, from_stage) = mailbox(config.stage_mailbox_capacity);
        let stage = Self {
            executor: Executor::start(format!("stage-{channel_index}"), 64),
            layers: Arc::new(Mutex::new(HashMap::new())),
            channel_index,
            governor: Governor::new(config.ticket_limit),
            to_mixer,
            destroyer,
        };
        (stage, from_stage)
    }

    pub fn channel_index(&self) -> usize {
        self.channel_index
    }

    fn with_layer<R: Send + 'static>(&self, index: usize, f: impl FnOnce(&mut Layer) -> R + Send + 'static) -> R
    where
        R: Send + 'static,
    {
        let layers = Arc::clone(&self.layers);
        let destroyer = Arc::clone(&self.destroyer);
        self.executor.invoke(move || {
            let mut layers = layers.lock().unwrap();
            let layer = layers.entry(index).or_insert_with(|| Layer::new(Arc::clone(&destroyer)));
            f(layer)
        })
    }

    pub fn load(&self, index: usize, producer: Box<dyn Producer>, preview: bool, auto_play_delta: Option<u64>) {
        self.with_layer(index, move |layer| layer.load(producer, preview, auto_play_delta));
    }

    pub fn play(&self, index: usize) {
        self.with_layer(index, |layer| layer.play());
    }

    pub fn pause(&self, index: usize) {
        self.with_layer(index, |layer| layer.pause());
    }

    pub fn stop(&self, index: usize) {
        self.with_layer(index, |layer| layer.stop());
    }

    /// Removes a layer slot entirely, as opposed to `stop` which leaves an
    /// empty-producer layer installed in the slot.
    pub fn clear(&self, index: usize) {
        let layers = Arc::clone(&self.layers);
        self.executor.invoke(move || {
            layers.lock().unwrap().remove(&index);
        });
    }

    pub fn clear_all(&self) {
        let layers = Arc::clone(&self.layers);
        self.executor.invoke(move || {
            layers.lock().unwrap().clear();
        });
    }

    pub fn status(&self, index: usize) -> LayerState {
        self.with_layer(index, |layer| layer.state())
    }

    pub fn foreground_name(&self, index: usize) -> String {
        self.with_layer(index, |layer| layer.foreground_name().to_string())
    }

    pub fn background_name(&self, index: usize) -> Option<String> {
        self.with_layer(index, |layer| layer.background_name().map(str::to_string))
    }

    /// True if no layer is currently `Playing` — the precondition for
    /// reconfiguring the channel's video format.
    pub fn is_quiescent(&self) -> bool {
        let layers = Arc::clone(&self.layers);
        self.executor.invoke(move || {
            layers.lock().unwrap().values().all(|layer| layer.state() != LayerState::Playing)
        })
    }

    /// Atomically exchanges layer `a` and `b` within this stage.
    pub fn swap_layer(&self, a: usize, b: usize) {
        let layers = Arc::clone(&self.layers);
        let destroyer = Arc::clone(&self.destroyer);
        self.executor.invoke(move || {
            let mut layers = layers.lock().unwrap();
            let mut layer_a = layers.remove(&a).unwrap_or_else(|| Layer::new(Arc::clone(&destroyer)));
            let mut layer_b = layers.remove(&b).unwrap_or_else(|| Layer::new(Arc::clone(&destroyer)));
            layer::swap(&mut layer_a, &mut layer_b);
            layers.insert(a, layer_a);
            layers.insert(b, layer_b);
        });
    }

    /// Cross-channel swap. Per the resolved open question on lock order
    /// (see DESIGN.md), the two stages' executors are always entered in
    /// ascending `channel_index` order so that a concurrent swap initiated
    /// from the other side takes the same order and cannot deadlock.
    pub fn swap_layer_cross_channel(a_index: usize, stage_a: &Arc<Stage>, b_index: usize, stage_b: &Arc<Stage>) {
        let (outer, outer_index, inner, inner_index) = if stage_a.channel_index <= stage_b.channel_index {
            (Arc::clone(stage_a), a_index, Arc::clone(stage_b), b_index)
        } else {
            (Arc::clone(stage_b), b_index, Arc::clone(stage_a), a_index)
        };

        let outer_layers = Arc::clone(&outer.layers);
        let inner_layers = Arc::clone(&inner.layers);
        let outer_destroyer = Arc::clone(&outer.destroyer);
        let inner_destroyer = Arc::clone(&inner.destroyer);
        let inner_executor_owner = Arc::clone(&inner);

        outer.executor.invoke(move || {
            inner_executor_owner.executor.invoke(move || {
                let mut outer_map = outer_layers.lock().unwrap();
                let mut inner_map = inner_layers.lock().unwrap();
                let mut outer_layer = outer_map
                    .remove(&outer_index)
                    .unwrap_or_else(|| Layer::new(Arc::clone(&outer_destroyer)));
                let mut inner_layer = inner_map
                    .remove(&inner_index)
                    .unwrap_or_else(|| Layer::new(Arc::clone(&inner_destroyer)));
                layer::swap(&mut outer_layer, &mut inner_layer);
                outer_map.insert(outer_index, outer_layer);
                inner_map.insert(inner_index, inner_layer);
            });
        });
    }

    /// Runs one tick: fork-join `receive()` over every populated layer,
    /// acquires an in-flight ticket, and blocks pushing into the mixer
    /// mailbox if it is full — the pipeline's main backpressure point.
    pub fn tick(&self, flags: ReceiveFlags) {
        let layers = Arc::clone(&self.layers);
        let frames = self.executor.invoke(move || {
            let mut layers = layers.lock().unwrap();
            let mut frames = HashMap::with_capacity(layers.len());
            std::thread::scope(|scope| {
                let mut handles = Vec::with_capacity(layers.len());
                for (&id, layer) in layers.iter_mut() {
                    handles.push((id, scope.spawn(move || layer.receive(flags))));
                }
                for (id, handle) in handles {
                    let frame = handle.join().expect("layer receive panicked");
                    frames.insert(id, frame);
                }
            });
            frames
        });

        let ticket = self.governor.acquire();
        if self.to_mixer.send(StageTick { frames, ticket }).is_err() {
            debug!(channel = self.channel_index, "mixer mailbox closed, dropping tick");
        }
    }
}
