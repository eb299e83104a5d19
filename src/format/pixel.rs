//! Pixel format descriptor: a tagged pixel layout with one plane descriptor
//! per channel-plane, used both to size host buffers and as the host-buffer
//! pool's lookup key. Derives `Hash`/`Eq` so it can be used directly as a
//! `HashMap` key.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Bgra,
    Rgba,
    Argb,
    Abgr,
    YCbCr,
    YCbCrA,
}

impl PixelFormat {
    pub fn channel_count(self) -> usize {
        match self {
            PixelFormat::Bgra | PixelFormat::Rgba | PixelFormat::Argb | PixelFormat::Abgr => 4,
            PixelFormat::YCbCr => 3,
            PixelFormat::YCbCrA => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelFormat::Bgra | PixelFormat::Rgba | PixelFormat::Argb | PixelFormat::Abgr | PixelFormat::YCbCrA
        )
    }
}

/// One plane of a (possibly multi-plane) pixel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Plane {
    pub linesize: usize,
    pub width: usize,
    pub height: usize,
    pub size: usize,
    pub channels: usize,
}

impl Plane {
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        let linesize = width * channels;
        Self {
            linesize,
            width,
            height,
            size: linesize * height,
            channels,
        }
    }
}

/// Full pixel layout of a frame: format tag plus one or more planes.
///
/// Equality (and therefore hashing, since it derives both) is by semantic
/// content, not identity — two descriptors describing the same layout are
/// the same pool key regardless of where they were constructed, per the
/// data model's "equality is by semantic content (used as a pool key)".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixelFormatDesc {
    pub format: PixelFormat,
    pub planes: Vec<Plane>,
}

impl PixelFormatDesc {
    /// Single-plane BGRA descriptor, the common case for composed output and
    /// for most producers that don't decode planar formats themselves.
    pub fn bgra(width: usize, height: usize) -> Self {
        Self {
            format: PixelFormat::Bgra,
            planes: vec![Plane::new(width, height, 4)],
        }
    }

    pub fn total_size(&self) -> usize {
        self.planes.iter().map(|p| p.size).sum()
    }
}
