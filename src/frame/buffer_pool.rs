//! Host-buffer pool keyed by pixel layout, split into two pools:
//!
//! - a **write pool**, keyed by `(tag, pixel_format_desc)`, that producers
//!   draw fresh writable frames from — scoped per tag so one producer
//!   churning through frames can't starve another's pool of recycled
//!   buffers;
//! - a **read pool**, keyed by `pixel_format_desc` alone, that recycled
//!   read-frame buffers return to once the mixer's output is done with
//!   them — shared across tags, since by the time a read-frame's last
//!   reference drops there is no single "owning producer" left to scope it
//!   to.
//!
//! Both pools are soft-capped per key: pushing past the cap just drops the
//! buffer instead of growing the pool unboundedly, which is what keeps
//! resident memory at `O(peak_concurrent_frames)` rather than growing with
//! total frames ever allocated (testable property 6).

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::format::PixelFormatDesc;
use crate::frame::host_buffer::HostBuffer;

type Tag = usize;

#[derive(Default)]
struct PoolState {
    write_pools: HashMap<(Tag, PixelFormatDesc), VecDeque<HostBuffer>>,
    read_pool: HashMap<PixelFormatDesc, VecDeque<HostBuffer>>,
}

pub struct BufferPool {
    state: Mutex<PoolState>,
    soft_cap: usize,
}

impl BufferPool {
    pub fn new(soft_cap: usize) -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            soft_cap,
        }
    }

    /// Pulls a buffer sized for `desc` out of the `tag`'s write pool, or
    /// allocates a fresh one on a miss. The fast path (pool hit) never
    /// allocates, so it never blocks the producer on allocator contention.
    pub fn acquire_for_write(&self, tag: Tag, desc: &PixelFormatDesc) -> HostBuffer {
        let mut state = self.state.lock().unwrap();
        let key = (tag, desc.clone());
        if let Some(buf) = state.write_pools.get_mut(&key).and_then(VecDeque::pop_front) {
            debug_assert!(buf.is_unmapped());
            return buf;
        }
        HostBuffer::new(desc.total_size())
    }

    /// Returns a writable-frame buffer to its tag-scoped pool. Caller must
    /// have already unmapped it — mapped buffers are never returned to a
    /// pool.
    pub fn release_write_buffer(&self, tag: Tag, desc: &PixelFormatDesc, buffer: HostBuffer) {
        assert!(buffer.is_unmapped(), "returning a mapped buffer to the pool");
        let mut state = self.state.lock().unwrap();
        let key = (tag, desc.clone());
        let queue = state.write_pools.entry(key).or_default();
        if queue.len() < self.soft_cap {
            queue.push_back(buffer);
        }
        // else: over the cap for this (tag, size) — drop it, freeing the memory.
    }

    /// Returns a composed read-frame's buffer to the untagged read pool,
    /// keyed purely by layout so any producer's next request for the same
    /// layout can reuse it.
    pub fn release_read_buffer(&self, desc: &PixelFormatDesc, buffer: HostBuffer) {
        assert!(buffer.is_unmapped(), "returning a mapped buffer to the pool");
        let mut state = self.state.lock().unwrap();
        let queue = state.read_pool.entry(desc.clone()).or_default();
        if queue.len() < self.soft_cap {
            queue.push_back(buffer);
        }
    }

    pub fn acquire_for_read(&self, desc: &PixelFormatDesc) -> HostBuffer {
        let mut state = self.state.lock().unwrap();
        if let Some(buf) = state.read_pool.get_mut(desc).and_then(VecDeque::pop_front) {
            return buf;
        }
        HostBuffer::new(desc.total_size())
    }

    /// Total buffers currently resident across both pools, for tests and
    /// diagnostics — this is the quantity property 6 bounds.
    pub fn resident_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.write_pools.values().map(VecDeque::len).sum::<usize>()
            + state.read_pool.values().map(VecDeque::len).sum::<usize>()
    }
}
