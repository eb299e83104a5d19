//! Frame factory: hands out writable frames backed by the pool, recycles
//! released buffers without blocking the caller.
//!
//! `create_frame` is synchronous: the fast path is a direct pool pop, which
//! is already non-blocking. A miss still goes through the factory's own
//! executor (`invoke`), which is where a real implementation would do
//! driver-level allocation.

use std::sync::Arc;

use crate::concurrency::Executor;
use crate::error::{CoreError, CoreResult};
use crate::format::PixelFormatDesc;
use crate::frame::buffer_pool::BufferPool;
use crate::frame::draw_frame::FrameData;
use crate::frame::host_buffer::HostBuffer;

/// A frame a producer is actively writing into. Its planes are mapped for
/// write; `commit()` unmaps and freezes it into an immutable, shareable
/// `FrameData` ready to be wrapped in `DrawFrame::Writable`.
pub struct WritableFrame {
    tag: usize,
    desc: PixelFormatDesc,
    buffer: HostBuffer,
}

impl WritableFrame {
    pub fn planes_mut(&mut self) -> &mut [u8] {
        self.buffer.map_for_write()
    }

    pub fn desc(&self) -> &PixelFormatDesc {
        &self.desc
    }

    /// Unmaps the buffer and hands back an immutable `FrameData`, transferring
    /// ownership to the GPU upload path — callers should not mutate through
    /// `planes_mut` again after this.
    pub fn commit(mut self, audio: Vec<i16>) -> FrameData {
        self.buffer.commit_write();
        FrameData {
            desc: self.desc,
            image: Arc::new(self.buffer),
            audio,
        }
    }
}

pub struct FrameFactory {
    pool: Arc<BufferPool>,
    executor: Executor,
    max_allocation_bytes: Option<usize>,
}

impl FrameFactory {
    pub fn new(soft_cap: usize, max_allocation_bytes: Option<usize>) -> Self {
        Self {
            pool: Arc::new(BufferPool::new(soft_cap)),
            executor: Executor::start("frame-factory", 64),
            max_allocation_bytes,
        }
    }

    /// `tag` identifies the producer as an opaque integer, scoping the pool
    /// slot a writable frame is drawn from and later returned to.
    pub fn create_frame(&self, tag: usize, desc: &PixelFormatDesc) -> CoreResult<WritableFrame> {
        if let Some(limit) = self.max_allocation_bytes {
            if desc.total_size() > limit {
                return Err(CoreError::AllocationFailure {
                    tag,
                    size: desc.total_size(),
                });
            }
        }

        let pool = Arc::clone(&self.pool);
        let tag_copy = tag;
        let desc_copy = desc.clone();
        // A pool hit inside acquire_for_write never allocates, so this is
        // non-blocking in practice; routing it through invoke() still keeps
        // the miss path's allocation on the factory executor rather than
        // the caller's own thread.
        let buffer = self
            .executor
            .invoke(move || pool.acquire_for_write(tag_copy, &desc_copy));

        Ok(WritableFrame {
            tag,
            desc: desc.clone(),
            buffer,
        })
    }

    /// Returns a committed frame's buffer to the pool once the mixer is
    /// done with it. Dispatched onto the factory executor so the caller
    /// (the mixer's render thread) never blocks on pool bookkeeping; the
    /// unmap itself also happens here, on the factory executor, after the
    /// hand-off.
    pub fn release(&self, frame: FrameData) {
        let pool = Arc::clone(&self.pool);
        let FrameData { desc, image, .. } = frame;
        match Arc::try_unwrap(image) {
            Ok(mut buffer) => {
                // Once a writable frame is committed and consumed it is,
                // for pool purposes, a read-frame buffer: it returns to the
                // untagged per-size read pool rather than its producer's
                // tag-scoped write pool.
                let _ = self.executor.begin_invoke(move || {
                    buffer.unmap();
                    pool.release_read_buffer(&desc, buffer);
                });
            }
            Err(_) => {
                // Still referenced elsewhere (e.g. a composite tree reused
                // the same leaf); nothing to recycle yet.
            }
        }
    }

    pub fn resident_count(&self) -> usize {
        self.pool.resident_count()
    }
}
