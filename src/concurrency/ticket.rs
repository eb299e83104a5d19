//! Ticket / governor: a counting semaphore capping in-flight frames.
//!
//! A `Governor` hands out `Ticket`s up to its limit; a `Ticket` releases its
//! slot back to the governor on drop, so the stage never has to remember to
//! release explicitly — the ticket riding along with a frame through the
//! mixer and output mailboxes is enough.

use std::sync::{Arc, Condvar, Mutex};

struct Inner {
    available: Mutex<usize>,
    condvar: Condvar,
}

#[derive(Clone)]
pub struct Governor {
    inner: Arc<Inner>,
}

impl Governor {
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                available: Mutex::new(limit),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Blocks until a slot is free, then returns a ticket holding it. This
    /// is the stage's backpressure point: `acquire()` is called before a
    /// frame map is pushed into the mixer mailbox, so at most `limit`
    /// frames are ever in flight between stage and output.
    pub fn acquire(&self) -> Ticket {
        let mut available = self.inner.available.lock().unwrap();
        while *available == 0 {
            available = self.inner.condvar.wait(available).unwrap();
        }
        *available -= 1;
        Ticket {
            inner: Arc::clone(&self.inner),
        }
    }
}

pub struct Ticket {
    inner: Arc<Inner>,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let mut available = self.inner.available.lock().unwrap();
        *available += 1;
        self.inner.condvar.notify_one();
    }
}
