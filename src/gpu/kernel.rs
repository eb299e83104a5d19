//! Per-pixel-format conversion kernels: one kernel per {BGRA, RGBA, ARGB,
//! ABGR, YCbCr, YCbCrA}, each converting its source layout to the render
//! target's BGRA8.
//!
//! **Missing functionality**: the YCbCr/YCbCrA kernels assume three (or
//! four) same-resolution planes (4:4:4) rather than handling 4:2:2/4:2:0
//! chroma subsampling explicitly; a real implementation would read the
//! subsampling ratio out of each plane's declared width/height instead of
//! assuming it matches the luma plane.

use crate::format::{PixelFormat, PixelFormatDesc};

#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    format: PixelFormat,
}

impl Kernel {
    pub fn for_format(format: PixelFormat) -> Self {
        Self { format }
    }

    /// Converts `src` (laid out per `desc`) into a freshly allocated BGRA8
    /// buffer of the same pixel dimensions.
    pub fn convert_to_bgra(&self, src: &[u8], desc: &PixelFormatDesc) -> Vec<u8> {
        let plane = &desc.planes[0];
        let pixel_count = plane.width * plane.height;
        let mut out = vec![0u8; pixel_count * 4];

        match self.format {
            PixelFormat::Bgra => {
                let len = out.len();
                out.copy_from_slice(&src[..len]);
            }
            PixelFormat::Rgba => {
                for (s, d) in src.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
                    d[0] = s[2];
                    d[1] = s[1];
                    d[2] = s[0];
                    d[3] = s[3];
                }
            }
            PixelFormat::Argb => {
                for (s, d) in src.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
                    d[0] = s[3];
                    d[1] = s[2];
                    d[2] = s[1];
                    d[3] = s[0];
                }
            }
            PixelFormat::Abgr => {
                for (s, d) in src.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
                    d[0] = s[1];
                    d[1] = s[2];
                    d[2] = s[3];
                    d[3] = s[0];
                }
            }
            PixelFormat::YCbCr | PixelFormat::YCbCrA => {
                let y_plane = &desc.planes[0];
                let y = &src[..y_plane.size];
                let cb = &src[y_plane.size..y_plane.size + desc.planes[1].size];
                let cr = &src[y_plane.size + desc.planes[1].size..y_plane.size + 2 * desc.planes[1].size];
                let alpha_plane = if self.format == PixelFormat::YCbCrA {
                    let base = y_plane.size + 2 * desc.planes[1].size;
                    Some(&src[base..base + desc.planes[3].size])
                } else {
                    None
                };
                for i in 0..pixel_count {
                    let (r, g, b) = ycbcr_to_rgb(y[i], cb[i], cr[i]);
                    let a = alpha_plane.map(|p| p[i]).unwrap_or(255);
                    let d = &mut out[i * 4..i * 4 + 4];
                    d[0] = b;
                    d[1] = g;
                    d[2] = r;
                    d[3] = a;
                }
            }
        }
        out
    }
}

/// BT.601 full-range YCbCr to RGB, clamped rather than wrapped.
fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let cb = cb as f32 - 128.0;
    let cr = cr as f32 - 128.0;
    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;
    (clamp_u8(r), clamp_u8(g), clamp_u8(b))
}

fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
