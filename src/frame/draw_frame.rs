//! The draw-frame tagged union: a tree of composited/transformed layer
//! output, plus the `eof`/`empty`/`late` sentinels a producer can return
//! instead of a real frame.

use std::sync::Arc;

use crate::format::PixelFormatDesc;
use crate::frame::host_buffer::HostBuffer;
use crate::frame::transform::{AudioTransform, ImageTransform};

/// A committed frame of pixels plus its audio chunk, shared (cheaply
/// cloneable) once wrapped in a `DrawFrame::Writable`.
#[derive(Debug)]
pub struct FrameData {
    pub desc: PixelFormatDesc,
    pub image: Arc<HostBuffer>,
    pub audio: Vec<i16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterlaceMode {
    Upper,
    Lower,
}

#[derive(Debug, Clone)]
pub enum DrawFrame {
    Writable(Arc<FrameData>),
    /// Stable paint order: children are painted in list order. `interlace`
    /// is `Some(mode)` only for a two-child field composite built by
    /// `composite_interlace`; `None` for ordinary flat compositing.
    Composite {
        children: Vec<DrawFrame>,
        interlace: Option<InterlaceMode>,
    },
    Transform {
        child: Box<DrawFrame>,
        image: ImageTransform,
        audio: AudioTransform,
    },
    Empty,
    Eof,
    /// The producer missed this tick; the layer substitutes its own
    /// `last_frame()` before this ever reaches the stage map, so `Late`
    /// should not normally survive into the mixer, but the variant exists
    /// because `Producer::receive` can return it directly.
    Late,
}

impl DrawFrame {
    pub fn composite(children: Vec<DrawFrame>) -> Self {
        DrawFrame::Composite { children, interlace: None }
    }

    pub fn composite_interlace(f1: DrawFrame, f2: DrawFrame, mode: InterlaceMode) -> Self {
        DrawFrame::Composite {
            children: vec![f1, f2],
            interlace: Some(mode),
        }
    }

    pub fn transform(self, image: ImageTransform, audio: AudioTransform) -> Self {
        DrawFrame::Transform {
            child: Box::new(self),
            image,
            audio,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, DrawFrame::Eof)
    }

    pub fn is_empty_variant(&self) -> bool {
        matches!(self, DrawFrame::Empty)
    }

    pub fn is_late(&self) -> bool {
        matches!(self, DrawFrame::Late)
    }
}
