//! Output: fans out one read-frame per tick to every registered consumer,
//! paces ticks against either a consumer's hardware clock or the host
//! clock, and hides consumer failures from the rest of the pipeline.
//!
//! Consumers live in a registry keyed by an integer slot. Each tick is
//! fanned out to every consumer in parallel; a consumer whose `send` panics
//! is reinitialized and retried once before being dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::concurrency::Executor;
use crate::consumer::{CadenceGuard, Consumer, DestroyConsumerProxy};
use crate::destroyer::Destroyer;
use crate::format::VideoFormatDesc;
use crate::mixer::MixerTick;

pub struct Output {
    executor: Executor,
    consumers: Arc<Mutex<HashMap<usize, Box<dyn Consumer>>>>,
    destroyer: Arc<Destroyer>,
    format: Mutex<VideoFormatDesc>,
    channel_index: usize,
    next_deadline: Arc<Mutex<Option<Instant>>>,
}

impl Output {
    pub fn new(channel_index: usize, format: VideoFormatDesc, destroyer: Arc<Destroyer>) -> Self {
        Self {
            executor: Executor::start(format!("output-{channel_index}"), 64),
            consumers: Arc::new(Mutex::new(HashMap::new())),
            destroyer,
            format: Mutex::new(format),
            channel_index,
            next_deadline: Arc::new(Mutex::new(None)),
        }
    }

    /// Registers a consumer at `index`, wrapping it in the asynchronous
    /// destruction proxy and the buffer-depth cadence guard before storing
    /// it, and initializes it with the channel's current format.
    pub fn add_consumer(&self, index: usize, mut consumer: Box<dyn Consumer>) {
        let consumers = Arc::clone(&self.consumers);
        let destroyer = Arc::clone(&self.destroyer);
        let format = self.format.lock().unwrap().clone();
        let channel_index = self.channel_index;
        self.executor.invoke(move || {
            consumer.initialize(&format, channel_index);
            let proxied: Box<dyn Consumer> = Box::new(DestroyConsumerProxy::new(consumer, destroyer));
            let guarded: Box<dyn Consumer> = Box::new(CadenceGuard::new(proxied));
            consumers.lock().unwrap().insert(index, guarded);
        });
    }

    /// Drops the consumer from the registry; the boxed value's own `Drop`
    /// (via `DestroyConsumerProxy`) schedules teardown on the destroyer.
    pub fn remove_consumer(&self, index: usize) {
        let consumers = Arc::clone(&self.consumers);
        self.executor.invoke(move || {
            consumers.lock().unwrap().remove(&index);
        });
    }

    /// Re-initializes every live consumer with the new format. Callers must
    /// ensure the channel is quiescent before calling this — see
    /// `Channel::set_video_format_desc`, which enforces it.
    pub fn set_video_format_desc(&self, format: VideoFormatDesc) {
        *self.format.lock().unwrap() = format.clone();
        let consumers = Arc::clone(&self.consumers);
        let channel_index = self.channel_index;
        self.executor.invoke(move || {
            for consumer in consumers.lock().unwrap().values_mut() {
                consumer.initialize(&format, channel_index);
            }
        });
    }

    pub fn consumer_count(&self) -> usize {
        let consumers = Arc::clone(&self.consumers);
        self.executor.invoke(move || consumers.lock().unwrap().len())
    }

    /// Fans `tick`'s frame out to every registered consumer. The ticket
    /// riding along with `tick` is dropped at the end of this call,
    /// releasing the stage/mixer/output in-flight slot.
    pub fn process(&self, tick: MixerTick) {
        let consumers = Arc::clone(&self.consumers);
        let next_deadline = Arc::clone(&self.next_deadline);
        let format = self.format.lock().unwrap().clone();
        let channel_index = self.channel_index;
        let frame = tick.frame;

        self.executor.invoke(move || {
            let mut consumers_guard = consumers.lock().unwrap();

            let has_clock = consumers_guard.values().any(|c| c.has_synchronization_clock());
            if !has_clock {
                pace_host_clock(&next_deadline, &format);
            }

            let needs_key_only = consumers_guard.values().any(|c| c.key_only());
            let key_only_frame = if needs_key_only { Some(frame.key_only_variant()) } else { None };

            let mut retry_needed = Vec::new();
            let mut drop_immediately = Vec::new();

            std::thread::scope(|scope| {
                let mut handles = Vec::new();
                for (&index, consumer) in consumers_guard.iter_mut() {
                    let use_key_only = consumer.key_only();
                    let payload = if use_key_only {
                        key_only_frame.clone().unwrap_or_else(|| frame.clone())
                    } else {
                        frame.clone()
                    };
                    handles.push((index, scope.spawn(move || consumer.send(payload).wait())));
                }
                for (index, handle) in handles {
                    match handle.join() {
                        Ok(true) => {}
                        Ok(false) => drop_immediately.push(index),
                        Err(_) => retry_needed.push(index),
                    }
                }
            });

            for index in retry_needed {
                warn!(channel = channel_index, index, "consumer send panicked, reinitializing and retrying once");
                let retried_ok = consumers_guard.get_mut(&index).map(|consumer| {
                    consumer.initialize(&format, channel_index);
                    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        consumer.send(frame.clone()).wait()
                    }))
                    .unwrap_or(false)
                });
                if retried_ok != Some(true) {
                    drop_immediately.push(index);
                }
            }

            for index in drop_immediately {
                consumers_guard.remove(&index);
            }
        });
    }
}

fn pace_host_clock(next_deadline: &Arc<Mutex<Option<Instant>>>, format: &VideoFormatDesc) {
    let tick_duration = Duration::from_secs_f64(format.fps_den as f64 / format.fps_num as f64);
    let mut next = next_deadline.lock().unwrap();
    let now = Instant::now();
    let deadline = next.unwrap_or(now);
    if deadline > now {
        std::thread::sleep(deadline - now);
    }
    *next = Some(Instant::now() + tick_duration);
}
