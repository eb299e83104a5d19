//! Shared test producers and consumers so the suite can exercise the
//! pipeline deterministically without a real decoder or driver behind it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use caspar_core::concurrency::Awaitable;
use caspar_core::format::{PixelFormatDesc, VideoFormatDesc};
use caspar_core::frame::{DrawFrame, FrameFactory, ReadFrame};
use caspar_core::producer::{NbFrames, Producer, ReceiveFlags};
use caspar_core::consumer::Consumer;

/// Emits solid-color frames of a fixed BGRA value, per scenario S1.
pub struct ColorProducer {
    factory: Arc<FrameFactory>,
    desc: PixelFormatDesc,
    bgra: [u8; 4],
    samples_per_frame: usize,
    frame_number: u64,
}

impl ColorProducer {
    pub fn new(format: &VideoFormatDesc, bgra: [u8; 4]) -> Self {
        Self {
            factory: Arc::new(FrameFactory::new(8, None)),
            desc: PixelFormatDesc::bgra(format.width, format.height),
            bgra,
            samples_per_frame: format.cadence.current() as usize,
            frame_number: 0,
        }
    }
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
        "test-color-producer"
    }
}

/// Emits a fixed number of frames, each carrying a strictly increasing
/// watermark encoded into the first audio sample, then reports `eof`.
/// Used for property 3 (order preservation) and S3 (transition).
pub struct WatermarkProducer {
    total: u64,
    current: u64,
    name: &'static str,
}

impl WatermarkProducer {
    pub fn new(total: u64) -> Self {
        Self { total, current: 0, name: "test-watermark-producer" }
    }

    /// Same behavior, distinguishable `name()` — for tests that need to
    /// tell which producer instance a layer is currently running (S6).
    pub fn named(total: u64, name: &'static str) -> Self {
        Self { total, current: 0, name }
    }
}

impl Producer for WatermarkProducer {
    fn receive(&mut self, _flags: ReceiveFlags) -> DrawFrame {
        if self.current >= self.total {
            return DrawFrame::Eof;
        }
        let watermark = self.current as i16;
        self.current += 1;
        let desc = PixelFormatDesc::bgra(1, 1);
        let data = caspar_core::frame::FrameData {
            image: Arc::new(caspar_core::frame::HostBuffer::new(desc.total_size())),
            audio: vec![watermark],
            desc,
        };
        DrawFrame::Writable(Arc::new(data))
    }

    fn last_frame(&self) -> DrawFrame {
        DrawFrame::Empty
    }

    fn nb_frames(&self) -> NbFrames {
        NbFrames::Known(self.total)
    }

    fn frame_number(&self) -> u64 {
        self.current
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Wraps any producer and flags when the wrapper itself is dropped, so a
/// test can observe asynchronous teardown without caring which concrete
/// producer is underneath.
pub struct DropTracking<P> {
    inner: P,
    dropped: Arc<AtomicBool>,
}

impl<P> DropTracking<P> {
    pub fn new(inner: P) -> (Self, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        (Self { inner, dropped: Arc::clone(&dropped) }, dropped)
    }
}

impl<P: Producer> Producer for DropTracking<P> {
    fn receive(&mut self, flags: ReceiveFlags) -> DrawFrame {
        self.inner.receive(flags)
    }

    fn last_frame(&self) -> DrawFrame {
        self.inner.last_frame()
    }

    fn nb_frames(&self) -> NbFrames {
        self.inner.nb_frames()
    }

    fn frame_number(&self) -> u64 {
        self.inner.frame_number()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<P> Drop for DropTracking<P> {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

/// Captures every read-frame handed to `send`, in arrival order, for
/// assertions after the tick loop runs.
#[derive(Clone)]
pub struct RecordingConsumer {
    index: usize,
    received: Arc<Mutex<Vec<ReadFrame>>>,
}

impl RecordingConsumer {
    pub fn new(index: usize) -> Self {
        Self { index, received: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn received(&self) -> Vec<ReadFrame> {
        self.received.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl Consumer for RecordingConsumer {
    fn initialize(&mut self, _format: &VideoFormatDesc, _channel_index: usize) {}

    fn send(&mut self, frame: ReadFrame) -> Awaitable<bool> {
        self.received.lock().unwrap().push(frame);
        Awaitable::ready(true)
    }

    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        "test-recording-consumer"
    }
}

/// Stalls every `send` until `release()` is called, for backpressure tests
/// (property 9). Each call blocks on a shared condvar-backed gate, then
/// records the frame's leading audio sample so callers can check ordering.
pub struct StallingConsumer {
    index: usize,
    gate: Arc<(Mutex<bool>, std::sync::Condvar)>,
    watermarks: Arc<Mutex<Vec<i16>>>,
}

impl StallingConsumer {
    pub fn new(index: usize) -> (Self, Arc<(Mutex<bool>, std::sync::Condvar)>, Arc<Mutex<Vec<i16>>>) {
        let gate = Arc::new((Mutex::new(false), std::sync::Condvar::new()));
        let watermarks = Arc::new(Mutex::new(Vec::new()));
        (
            Self { index, gate: Arc::clone(&gate), watermarks: Arc::clone(&watermarks) },
            gate,
            watermarks,
        )
    }
}

impl Consumer for StallingConsumer {
    fn initialize(&mut self, _format: &VideoFormatDesc, _channel_index: usize) {}

    fn send(&mut self, frame: ReadFrame) -> Awaitable<bool> {
        let (lock, condvar) = &*self.gate;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = condvar.wait(open).unwrap();
        }
        self.watermarks.lock().unwrap().push(frame.audio.first().copied().unwrap_or(-1));
        Awaitable::ready(true)
    }

    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        "test-stalling-consumer"
    }
}

pub fn open_gate(gate: &Arc<(Mutex<bool>, std::sync::Condvar)>) {
    let (lock, condvar) = &**gate;
    *lock.lock().unwrap() = true;
    condvar.notify_all();
}

/// Always fails `send`, for property 8 / scenario S5.
pub struct FailingConsumer {
    index: usize,
    dropped: Arc<AtomicBool>,
}

impl FailingConsumer {
    pub fn new(index: usize) -> (Self, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        (Self { index, dropped: Arc::clone(&dropped) }, dropped)
    }
}

impl Consumer for FailingConsumer {
    fn initialize(&mut self, _format: &VideoFormatDesc, _channel_index: usize) {}

    fn send(&mut self, _frame: ReadFrame) -> Awaitable<bool> {
        panic!("test-failing-consumer always fails");
    }

    fn index(&self) -> usize {
        self.index
    }

    fn name(&self) -> &str {
        "test-failing-consumer"
    }
}

impl Drop for FailingConsumer {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

/// Polls `cond` every 5ms until it returns `true` or `timeout` elapses.
/// Returns whether it resolved — the pipeline's plumbing is asynchronous
/// (stage/mixer/output each run on their own thread), so tests observe
/// state through polling rather than a single synchronous call.
pub fn wait_until<F: FnMut() -> bool>(timeout: Duration, mut cond: F) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}
