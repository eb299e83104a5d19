//! Full-pipeline scenarios driven through the public `Channel` API, the
//! way an embedding application would. `Channel` fans a tick out across
//! three background threads (stage, mixer, output), so assertions poll
//! with [`wait_until`] rather than relying on `tick()` itself blocking
//! until delivery completes.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use caspar_core::config::PipelineConfig;
use caspar_core::format::VideoFormatDesc;
use caspar_core::layer::LayerState;
use caspar_core::producer::ReceiveFlags;
use caspar_core::Channel;

use crate::common::{
    open_gate, wait_until, ColorProducer, DropTracking, FailingConsumer, RecordingConsumer, StallingConsumer,
    WatermarkProducer,
};

/// S1: static color fill at 1920x1080p25.
#[test]
fn static_color_fill_produces_stride_correct_frames_with_cadence_matched_audio() {
    let format = VideoFormatDesc::hd1080p25();
    let channel = Channel::new(1, format.clone(), &PipelineConfig::default()).unwrap();
    let consumer = RecordingConsumer::new(0);
    channel.add_consumer(0, Box::new(consumer.clone()));

    channel.load(0, Box::new(ColorProducer::new(&format, [0x00, 0x80, 0xFF, 0xFF])), false, None);
    channel.play(0);

    for _ in 0..50 {
        channel.tick(ReceiveFlags::default());
    }

    assert!(wait_until(Duration::from_secs(5), || consumer.count() >= 50));
    let last = consumer.received().pop().unwrap();
    let bytes = last.image.map_for_read();
    assert!(bytes.chunks_exact(4).all(|p| p == [0x00, 0x80, 0xFF, 0xFF]));
    assert_eq!(last.audio.len(), 1920);
}

/// Property 3: order preservation for a strictly increasing watermark.
#[test]
fn watermark_sequence_arrives_strictly_increasing_with_no_reordering() {
    let format = VideoFormatDesc::hd1080p25();
    let channel = Channel::new(1, format, &PipelineConfig::default()).unwrap();
    let consumer = RecordingConsumer::new(0);
    channel.add_consumer(0, Box::new(consumer.clone()));

    channel.load(0, Box::new(WatermarkProducer::new(20)), false, None);
    channel.play(0);

    for _ in 0..20 {
        channel.tick(ReceiveFlags::default());
    }

    assert!(wait_until(Duration::from_secs(5), || consumer.count() >= 20));
    let watermarks: Vec<i16> = consumer.received().iter().map(|f| f.audio[0]).collect();
    let expected: Vec<i16> = (0..20).collect();
    assert_eq!(watermarks, expected);
}

/// S3: foreground exhausts after a fixed run, background promotes exactly
/// at the auto-play-delta tick, and the old foreground is torn down
/// asynchronously rather than on the stage's own thread.
#[test]
fn transition_promotes_background_at_the_auto_play_tick_and_destroys_the_old_foreground() {
    let format = VideoFormatDesc::hd1080p25();
    let channel = Channel::new(1, format, &PipelineConfig::default()).unwrap();
    let consumer = RecordingConsumer::new(0);
    channel.add_consumer(0, Box::new(consumer.clone()));

    let (tracked_foreground, foreground_dropped) = DropTracking::new(WatermarkProducer::new(5));
    channel.load(0, Box::new(tracked_foreground), false, None);
    channel.play(0);
    channel.load(0, Box::new(WatermarkProducer::new(5)), false, Some(0));

    for _ in 0..6 {
        channel.tick(ReceiveFlags::default());
    }

    assert!(wait_until(Duration::from_secs(5), || consumer.count() >= 6));
    let watermarks: Vec<i16> = consumer.received().iter().map(|f| f.audio[0]).collect();
    assert_eq!(&watermarks[0..5], &[0, 1, 2, 3, 4], "first five ticks come from the foreground");
    assert_eq!(watermarks[5], 0, "tick 5 is the background's first frame");

    assert!(wait_until(Duration::from_millis(500), || foreground_dropped.load(Ordering::SeqCst)));
}

/// S5 / property 8: a consumer whose `send` always panics is removed
/// within two ticks, without affecting a healthy sibling consumer.
#[test]
fn a_consumer_that_always_fails_is_dropped_without_disrupting_a_healthy_one() {
    let format = VideoFormatDesc::hd1080p25();
    let channel = Channel::new(1, format.clone(), &PipelineConfig::default()).unwrap();

    let healthy = RecordingConsumer::new(0);
    channel.add_consumer(0, Box::new(healthy.clone()));
    let (failing, failing_dropped) = FailingConsumer::new(1);
    channel.add_consumer(1, Box::new(failing));

    channel.load(0, Box::new(ColorProducer::new(&format, [1, 2, 3, 4])), false, None);
    channel.play(0);

    channel.tick(ReceiveFlags::default());
    channel.tick(ReceiveFlags::default());

    assert!(wait_until(Duration::from_secs(5), || failing_dropped.load(Ordering::SeqCst)));
    assert!(wait_until(Duration::from_secs(5), || healthy.count() >= 2));
}

/// S6: a concurrent cross-channel swap exchanges layer state atomically —
/// after it resolves each channel runs the other's former producer, and
/// no producer instance is ever observed bound to both channels.
#[test]
fn cross_channel_swap_exchanges_producers_atomically_under_concurrent_ticks() {
    let config = PipelineConfig::default();
    let channel_x = Channel::new(1, VideoFormatDesc::hd1080p25(), &config).unwrap();
    let channel_y = Channel::new(2, VideoFormatDesc::hd1080p25(), &config).unwrap();

    channel_x.load(1, Box::new(WatermarkProducer::named(100, "producer-p")), false, None);
    channel_x.play(1);
    channel_y.load(1, Box::new(WatermarkProducer::named(100, "producer-q")), false, None);
    channel_y.play(1);

    assert_eq!(channel_x.foreground(1), "producer-p");
    assert_eq!(channel_y.foreground(1), "producer-q");

    let x = Arc::new(channel_x);
    let y = Arc::new(channel_y);

    let ticking_x = {
        let x = Arc::clone(&x);
        std::thread::spawn(move || {
            for _ in 0..20 {
                x.tick(ReceiveFlags::default());
            }
        })
    };
    let ticking_y = {
        let y = Arc::clone(&y);
        std::thread::spawn(move || {
            for _ in 0..20 {
                y.tick(ReceiveFlags::default());
            }
        })
    };

    Channel::swap_layer_cross_channel(1, &x, 1, &y);

    ticking_x.join().unwrap();
    ticking_y.join().unwrap();

    assert_eq!(x.foreground(1), "producer-q");
    assert_eq!(y.foreground(1), "producer-p");
}

/// Property 9: a stalled consumer bounds in-flight frames to the ticket
/// limit instead of letting the stage run unboundedly ahead, and every
/// stalled frame is delivered in order once the consumer resumes.
#[test]
fn a_stalled_consumer_applies_backpressure_and_delivers_everything_in_order_on_resume() {
    let mut config = PipelineConfig::default();
    config.ticket_limit = 2;
    config.stage_mailbox_capacity = 1;
    let format = VideoFormatDesc::hd1080p25();
    let channel = Channel::new(1, format, &config).unwrap();

    let (stalling, gate, watermarks) = StallingConsumer::new(0);
    channel.add_consumer(0, Box::new(stalling));
    channel.load(0, Box::new(WatermarkProducer::new(20)), false, None);
    channel.play(0);

    let total_ticks = 8;
    let ticking = {
        let channel = Arc::new(channel);
        let handle_channel = Arc::clone(&channel);
        let handle = std::thread::spawn(move || {
            for _ in 0..total_ticks {
                handle_channel.tick(ReceiveFlags::default());
            }
        });
        (channel, handle)
    };
    let (channel, handle) = ticking;

    // With the consumer gated shut, the producing side can only run a
    // bounded number of ticks ahead (ticket limit + mailbox capacities)
    // before `Stage::tick` blocks acquiring a governor ticket.
    std::thread::sleep(Duration::from_millis(200));
    assert!(!handle.is_finished(), "tick loop should stall while the consumer is gated");

    open_gate(&gate);
    handle.join().unwrap();

    assert!(wait_until(Duration::from_secs(5), || watermarks.lock().unwrap().len() >= total_ticks));
    let seen = watermarks.lock().unwrap().clone();
    let expected: Vec<i16> = (0..total_ticks as i16).collect();
    assert_eq!(seen, expected, "stalled frames must be delivered in order once released");

    assert_eq!(channel.status(0), LayerState::Playing);
}
