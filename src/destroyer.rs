//! The destruction domain: a single dedicated thread that runs every
//! producer/consumer teardown so a blocking destructor never stalls the
//! pipeline.
//!
//! One executor, a backlog counter, and a warning logged when the backlog
//! crosses a threshold, because a growing queue here almost always means
//! some destructor upstream is blocked on a driver callback that will never
//! return.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{error, warn};

use crate::concurrency::Executor;

/// Logged as a warning, not treated as fatal: a deep backlog is a signal to
/// operators, not a reason to refuse more work.
const BACKLOG_WARN_THRESHOLD: usize = 4;

pub struct Destroyer {
    executor: Executor,
    pending: AtomicUsize,
}

impl Destroyer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            executor: Executor::start("destroyer", 256),
            pending: AtomicUsize::new(0),
        })
    }

    /// Schedules `f` for asynchronous execution on the destroyer thread.
    /// Panics inside `f` are caught and logged, never propagated — a
    /// misbehaving destructor must not take down the destroyer thread.
    pub fn schedule(self: &Arc<Self>, label: impl Into<String>, f: impl FnOnce() + Send + 'static) {
        let label = label.into();
        let backlog = self.pending.fetch_add(1, Ordering::SeqCst) + 1;
        if backlog > BACKLOG_WARN_THRESHOLD {
            warn!(backlog, %label, "destroyer backlog exceeds threshold, possible stuck destructor upstream");
        }

        let this = Arc::clone(self);
        let _ = self.executor.begin_invoke(move || {
            if let Err(_) = panic::catch_unwind(AssertUnwindSafe(f)) {
                error!(%label, "destructor panicked; swallowed to keep the destroyer alive");
            }
            this.pending.fetch_sub(1, Ordering::SeqCst);
        });
    }

    pub fn backlog(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}
