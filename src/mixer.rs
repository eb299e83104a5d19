//! Mixer: walks each layer's draw-frame tree into one composited BGRA
//! render target and accumulates cadence-sized audio.
//!
//! Each tick walks every layer's tree, applying the cumulative image/audio
//! transform down each branch and dispatching a blend per leaf, then
//! accumulates PCM samples into a buffer sized to the current cadence slot.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tracing::error;

use crate::concurrency::{mailbox, MailboxReceiver, MailboxSender, Ticket};
use crate::config::PipelineConfig;
use crate::format::VideoFormatDesc;
use crate::frame::{DrawFrame, HostBuffer, ImageTransform, AudioTransform, InterlaceMode, ReadFrame};
use crate::gpu::Device;
use crate::stage::StageTick;

pub struct MixerTick {
    pub frame: ReadFrame,
    pub ticket: Ticket,
}

pub struct Mixer {
    device: Device,
    format: VideoFormatDesc,
    pending_format: Arc<Mutex<Option<VideoFormatDesc>>>,
    to_output: MailboxSender<MixerTick>,
    consecutive_gpu_failures: u32,
    max_consecutive_gpu_failures: u32,
    last_read_frame: ReadFrame,
    degraded: bool,
}

impl Mixer {
    /// Returns the mixer, the receiving end of its output mailbox, and a
    /// shared slot a caller can use to push a new `VideoFormatDesc` onto the
    /// mixer from another thread — picked up at the start of the mixer's
    /// next `process()` call. Used by `Channel::set_video_format_desc` to
    /// keep the mixer's render target in step with the output's consumers.
    pub fn new(format: VideoFormatDesc, config: &PipelineConfig) -> (Self, MailboxReceiver<MixerTick>, Arc<Mutex<Option<VideoFormatDesc>>>) {
        let (to_output, from_mixer) = mailbox(config.stage_mailbox_capacity);
        let pending_format = Arc::new(Mutex::new(None));
        let mixer = Self {
            device: Device::new(),
            format,
            pending_format: Arc::clone(&pending_format),
            to_output,
            consecutive_gpu_failures: 0,
            max_consecutive_gpu_failures: config.max_consecutive_gpu_failures,
            last_read_frame: ReadFrame::empty(),
            degraded: false,
        };
        (mixer, from_mixer, pending_format)
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Renders one tick's layer map, falling back to the previous read-frame
    /// on a render failure: a transient error aborts the current tick's
    /// readback and the mixer re-emits the last good frame instead.
    pub fn process(&mut self, mut tick: StageTick) {
        if let Some(new_format) = self.pending_format.lock().unwrap().take() {
            self.format = new_format;
        }
        let width = self.format.width;
        let height = self.format.height;
        let cadence_len = self.format.cadence.current() as usize;
        self.format.cadence.advance();

        let device = &self.device;
        let frames = std::mem::take(&mut tick.frames);

        let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
            render_tick(device, &frames, width, height, cadence_len)
        }));

        let frame = match rendered {
            Ok(frame) => {
                self.consecutive_gpu_failures = 0;
                self.degraded = false;
                frame
            }
            Err(_) => {
                self.consecutive_gpu_failures += 1;
                error!(
                    consecutive_failures = self.consecutive_gpu_failures,
                    "mixer render failed, re-emitting previous read-frame"
                );
                if self.consecutive_gpu_failures >= self.max_consecutive_gpu_failures {
                    self.degraded = true;
                }
                self.last_read_frame.clone()
            }
        };

        self.last_read_frame = frame.clone();
        let _ = self.to_output.send(MixerTick { frame, ticket: tick.ticket });
    }
}

fn render_tick(
    device: &Device,
    frames: &HashMap<usize, DrawFrame>,
    width: usize,
    height: usize,
    cadence_len: usize,
) -> ReadFrame {
    let mut target = vec![0u8; width * height * 4];
    let mut audio_acc = vec![0.0f32; cadence_len];

    let mut ids: Vec<&usize> = frames.keys().collect();
    ids.sort_unstable();
    for id in ids {
        let node = &frames[id];
        target = render_node(
            device,
            node,
            ImageTransform::default(),
            AudioTransform::default(),
            target,
            width,
            height,
            &mut audio_acc,
        );
    }

    let audio: Vec<i16> = audio_acc
        .iter()
        .map(|v| v.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect();

    let buffer = device.readback(target);
    ReadFrame {
        image: Arc::new(buffer),
        width,
        height,
        audio: Arc::new(audio),
    }
}

#[allow(clippy::too_many_arguments)]
fn render_node(
    device: &Device,
    node: &DrawFrame,
    image_xform: ImageTransform,
    audio_xform: AudioTransform,
    target: Vec<u8>,
    target_w: usize,
    target_h: usize,
    audio_acc: &mut Vec<f32>,
) -> Vec<u8> {
    match node {
        DrawFrame::Writable(data) => {
            if audio_xform.has_audio {
                accumulate_audio(audio_acc, &data.audio, audio_xform.volume);
            }
            let bytes = data.image.map_for_read().to_vec();
            let converted = device.upload_and_convert(bytes, data.desc.clone());
            let plane = &data.desc.planes[0];
            device.blend_onto(target, target_w, target_h, converted, plane.width, plane.height, image_xform)
        }
        DrawFrame::Composite { children, interlace: None } => {
            let mut target = target;
            for child in children {
                target = render_node(device, child, image_xform, audio_xform, target, target_w, target_h, audio_acc);
            }
            target
        }
        DrawFrame::Composite { children, interlace: Some(mode) } => {
            let blank = || vec![0u8; target_w * target_h * 4];
            let field_a = render_node(device, &children[0], image_xform, audio_xform, blank(), target_w, target_h, audio_acc);
            let field_b = render_node(device, &children[1], image_xform, audio_xform, blank(), target_w, target_h, audio_acc);
            let interleaved = interlace_rows(&field_a, &field_b, target_w, target_h, *mode);
            device.blend_onto(target, target_w, target_h, interleaved, target_w, target_h, ImageTransform::default())
        }
        DrawFrame::Transform { child, image, audio } => {
            let child_image = image.compose(&image_xform);
            let child_audio = audio.compose(&audio_xform);
            render_node(device, child, child_image, child_audio, target, target_w, target_h, audio_acc)
        }
        DrawFrame::Empty | DrawFrame::Eof | DrawFrame::Late => target,
    }
}

fn accumulate_audio(acc: &mut [f32], samples: &[i16], volume: f32) {
    for (slot, &sample) in acc.iter_mut().zip(samples.iter()) {
        *slot += sample as f32 * volume;
    }
}

/// Interleaves two fully rendered fields row-by-row: `Upper` takes `field_a`
/// on even scanlines and `field_b` on odd, matching the stipple convention
/// a consumer expects from `composite.interlace(a, b, upper)`.
fn interlace_rows(field_a: &[u8], field_b: &[u8], width: usize, height: usize, mode: InterlaceMode) -> Vec<u8> {
    let mut out = vec![0u8; width * height * 4];
    let stride = width * 4;
    for y in 0..height {
        let use_a = match mode {
            InterlaceMode::Upper => y % 2 == 0,
            InterlaceMode::Lower => y % 2 == 1,
        };
        let row = y * stride..(y + 1) * stride;
        let src = if use_a { field_a } else { field_b };
        out[row.clone()].copy_from_slice(&src[row]);
    }
    out
}
