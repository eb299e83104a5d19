//! Read-frame: the mixer's per-tick output, shared immutably across every
//! consumer that receives it that tick. The mixer finishes the readback
//! before constructing one, so `ReadFrame` itself stays a simple immutable
//! value rather than wrapping a future.

use std::sync::Arc;

use crate::frame::host_buffer::HostBuffer;

#[derive(Debug, Clone)]
pub struct ReadFrame {
    pub image: Arc<HostBuffer>,
    pub width: usize,
    pub height: usize,
    pub audio: Arc<Vec<i16>>,
}

impl ReadFrame {
    pub fn empty() -> Self {
        Self {
            image: Arc::new(HostBuffer::new(0)),
            width: 0,
            height: 0,
            audio: Arc::new(Vec::new()),
        }
    }

    /// Derives the key-only (alpha-replicated) variant: a fresh BGRA buffer
    /// where every pixel's RGB is replaced by its own alpha byte. Pure CPU
    /// transform, no GPU involvement, so it can run on any worker thread
    /// before fanout.
    pub fn key_only_variant(&self) -> ReadFrame {
        let src = self.image.map_for_read();
        let mut key_buffer = HostBuffer::new(src.len());
        {
            let dst = key_buffer.map_for_write();
            for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
                let a = s[3];
                d[0] = a;
                d[1] = a;
                d[2] = a;
                d[3] = a;
            }
        }
        key_buffer.commit_write();
        ReadFrame {
            image: Arc::new(key_buffer),
            width: self.width,
            height: self.height,
            audio: Arc::clone(&self.audio),
        }
    }
}
