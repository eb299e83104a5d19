//! The device actor: the single point through which every pixel format
//! conversion and composite blit happens.
//!
//! There is no real GPU context to own here — every method hands owned
//! buffers across the executor boundary rather than letting a caller reach
//! into device state, which keeps all pixel work serialized through one
//! thread the way a GL context would require, without actually owning one.
//!
//! **Missing functionality**: `blend_onto` only implements `BlendMode::Normal`
//! (straight alpha-over); `Add`/`Multiply`/`Screen` fall back to the same
//! path rather than their distinct arithmetic, since no consumer in this
//! build exercises them yet. `ImageTransform::field_mode_override` is
//! likewise declared but not read here — nothing in this build renders a
//! single field of a layer independently of the channel's own interlace mode.

use crate::concurrency::Executor;
use crate::format::PixelFormatDesc;
use crate::frame::{HostBuffer, ImageTransform};
use crate::gpu::kernel::Kernel;

pub struct Device {
    executor: Executor,
}

impl Device {
    pub fn new() -> Self {
        Self {
            executor: Executor::start("gpu-device", 64),
        }
    }

    /// Converts a source buffer (in its own pixel format) to a freshly
    /// allocated BGRA8 buffer, dispatched on the device thread the way the
    /// original dispatches a shader pass through its single GL executor.
    pub fn upload_and_convert(&self, src: Vec<u8>, desc: PixelFormatDesc) -> Vec<u8> {
        self.executor
            .invoke(move || Kernel::for_format(desc.format).convert_to_bgra(&src, &desc))
    }

    /// Blits `src` (already BGRA8, `src_w`x`src_h`) onto `target`
    /// (BGRA8, `target_w`x`target_h`) under `xform`, returning the mutated
    /// target. Nearest-neighbor scale, clamped translate, straight alpha-over.
    pub fn blend_onto(
        &self,
        mut target: Vec<u8>,
        target_w: usize,
        target_h: usize,
        src: Vec<u8>,
        src_w: usize,
        src_h: usize,
        xform: ImageTransform,
    ) -> Vec<u8> {
        self.executor.invoke(move || {
            blend(&mut target, target_w, target_h, &src, src_w, src_h, &xform);
            target
        })
    }

    /// Hands a finished render target back as a committed, read-mapped
    /// `HostBuffer`, standing in for the original's readback future.
    pub fn readback(&self, target: Vec<u8>) -> HostBuffer {
        self.executor.invoke(move || {
            let mut buffer = HostBuffer::new(target.len());
            buffer.map_for_write().copy_from_slice(&target);
            buffer.commit_write();
            buffer
        })
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}

fn blend(
    target: &mut [u8],
    target_w: usize,
    target_h: usize,
    src: &[u8],
    src_w: usize,
    src_h: usize,
    xform: &ImageTransform,
) {
    if src_w == 0 || src_h == 0 || target_w == 0 || target_h == 0 {
        return;
    }
    let alpha_mult = xform.alpha().clamp(0.0, 1.0);
    if alpha_mult <= 0.0 {
        return;
    }

    let crop_w = xform.crop.w.max(0.0);
    let crop_h = xform.crop.h.max(0.0);
    if crop_w <= 0.0 || crop_h <= 0.0 {
        return;
    }

    let dest_w = ((target_w as f32) * xform.scale_x).round().max(1.0) as usize;
    let dest_h = ((target_h as f32) * xform.scale_y).round().max(1.0) as usize;
    let dest_x0 = (xform.translate_x * target_w as f32).round() as isize;
    let dest_y0 = (xform.translate_y * target_h as f32).round() as isize;

    for dy in 0..dest_h {
        let ty = dest_y0 + dy as isize;
        if ty < 0 || ty as usize >= target_h {
            continue;
        }
        let sy_f = (xform.crop.y + (dy as f32 / dest_h as f32) * crop_h) * src_h as f32;
        let sy = (sy_f.max(0.0) as usize).min(src_h - 1);
        for dx in 0..dest_w {
            let tx = dest_x0 + dx as isize;
            if tx < 0 || tx as usize >= target_w {
                continue;
            }
            let sx_f = (xform.crop.x + (dx as f32 / dest_w as f32) * crop_w) * src_w as f32;
            let sx = (sx_f.max(0.0) as usize).min(src_w - 1);

            let s = &src[(sy * src_w + sx) * 4..(sy * src_w + sx) * 4 + 4];
            let src_a = (s[3] as f32 / 255.0) * alpha_mult;
            if src_a <= 0.0 {
                continue;
            }
            let src_rgb = xform.apply_color_ops([s[0] as f32 / 255.0, s[1] as f32 / 255.0, s[2] as f32 / 255.0]);
            let t_idx = (ty as usize * target_w + tx as usize) * 4;
            for c in 0..3 {
                let s_c = src_rgb[c] * 255.0;
                let t_c = target[t_idx + c] as f32;
                target[t_idx + c] = (s_c * src_a + t_c * (1.0 - src_a)).round().clamp(0.0, 255.0) as u8;
            }
            let t_a = target[t_idx + 3] as f32 / 255.0;
            let out_a = src_a + t_a * (1.0 - src_a);
            target[t_idx + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
}
