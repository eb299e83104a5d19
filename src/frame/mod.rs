//! GPU frame abstraction: host buffers, the buffer pool, the draw-frame
//! tagged union, per-layer transforms, read-frames, and the frame factory.

pub mod buffer_pool;
pub mod draw_frame;
pub mod factory;
pub mod host_buffer;
pub mod read_frame;
pub mod transform;

pub use buffer_pool::BufferPool;
pub use draw_frame::{DrawFrame, FrameData, InterlaceMode};
pub use factory::{FrameFactory, WritableFrame};
pub use host_buffer::HostBuffer;
pub use read_frame::ReadFrame;
pub use transform::{AudioTransform, BlendMode, ImageTransform, Rect};
