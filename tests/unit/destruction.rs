//! Layer teardown runs through the asynchronous destruction domain rather
//! than on the caller's thread: a dropped producer is torn down off-thread
//! within a bounded time, never stalling whoever triggered the drop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use caspar_core::destroyer::Destroyer;
use caspar_core::frame::DrawFrame;
use caspar_core::layer::{Layer, LayerState};
use caspar_core::producer::{Producer, ReceiveFlags};

use crate::common::wait_until;

struct DropFlagProducer {
    dropped: Arc<AtomicBool>,
}

impl Producer for DropFlagProducer {
    fn receive(&mut self, _flags: ReceiveFlags) -> DrawFrame {
        DrawFrame::Empty
    }

    fn last_frame(&self) -> DrawFrame {
        DrawFrame::Empty
    }

    fn name(&self) -> &str {
        "drop-flag-producer"
    }
}

impl Drop for DropFlagProducer {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

#[test]
fn stopping_a_layer_destroys_its_foreground_off_the_caller_thread() {
    let dropped = Arc::new(AtomicBool::new(false));
    let mut layer = Layer::new(Destroyer::new());
    layer.load(Box::new(DropFlagProducer { dropped: Arc::clone(&dropped) }), true, None);
    assert_eq!(layer.state(), LayerState::Paused);

    layer.stop();
    assert_eq!(layer.state(), LayerState::Stopped);
    // stop() replaces the foreground synchronously, but the drop of the
    // replaced producer runs on the destroyer's own thread.
    assert!(wait_until(Duration::from_millis(500), || dropped.load(Ordering::SeqCst)));
}

#[test]
fn replacing_a_playing_foreground_via_play_destroys_the_old_one() {
    let first_dropped = Arc::new(AtomicBool::new(false));
    let mut layer = Layer::new(Destroyer::new());
    layer.load(Box::new(DropFlagProducer { dropped: Arc::clone(&first_dropped) }), false, None);
    layer.play();
    assert!(!first_dropped.load(Ordering::SeqCst));

    let second_dropped = Arc::new(AtomicBool::new(false));
    layer.load(Box::new(DropFlagProducer { dropped: Arc::clone(&second_dropped) }), false, None);
    layer.play();

    assert!(wait_until(Duration::from_millis(500), || first_dropped.load(Ordering::SeqCst)));
    assert!(!second_dropped.load(Ordering::SeqCst), "the newly promoted foreground must survive");
}
