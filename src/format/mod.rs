//! Pixel and video format descriptors shared by every component in a channel.

pub mod pixel;
pub mod video;

pub use pixel::{PixelFormat, PixelFormatDesc, Plane};
pub use video::{Cadence, FieldMode, VideoFormatDesc};
