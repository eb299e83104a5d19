//! Single-threaded FIFO executor with self-call-detecting `invoke`.
//!
//! A bounded task queue drained by one dedicated OS thread. `begin_invoke`
//! posts a task and hands back a handle the caller can block on later;
//! `invoke` does the same but blocks immediately, with one exception: if the
//! caller is already running on the executor's own thread, it runs the
//! closure inline instead of posting, which is what makes it safe for a
//! component to call its own `invoke` reentrantly without deadlocking on
//! itself.

use std::sync::{Arc, Mutex};
use std::sync::mpsc;
use std::thread::{self, JoinHandle, ThreadId};

use tracing::warn;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A pending result from `begin_invoke`. Blocking-only by design: the
/// executors in this crate are plain OS threads, not async tasks, so there
/// is no executor to poll this against other than "the caller's own thread".
pub struct Awaitable<R> {
    rx: mpsc::Receiver<R>,
}

impl<R> Awaitable<R> {
    pub fn wait(self) -> R {
        self.rx
            .recv()
            .expect("executor dropped the task before completing it")
    }

    /// An already-resolved future, for call sites that have a value on hand
    /// and no executor dispatch to perform (e.g. a no-op default `call()`).
    pub fn ready(value: R) -> Self
    where
        R: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(value);
        Awaitable { rx }
    }
}

pub struct Executor {
    sender: Mutex<Option<crossbeam_channel::Sender<Job>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_id: Arc<Mutex<Option<ThreadId>>>,
    name: String,
}

impl Executor {
    /// `queue_capacity` bounds the number of pending tasks; `begin_invoke`
    /// blocks the caller (not the executor thread) once the queue is full,
    /// which is the mechanism the mailbox-based backpressure in the stage
    /// and destroyer builds on.
    pub fn start(name: impl Into<String>, queue_capacity: usize) -> Self {
        let name = name.into();
        let (sender, receiver) = crossbeam_channel::bounded::<Job>(queue_capacity.max(1));
        let thread_id = Arc::new(Mutex::new(None));
        let thread_id_for_thread = Arc::clone(&thread_id);
        let thread_name = name.clone();

        let handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                *thread_id_for_thread.lock().unwrap() = Some(thread::current().id());
                for job in receiver.iter() {
                    job();
                }
            })
            .expect("failed to spawn executor thread");

        // Block until the spawned thread has recorded its id, so invoke()
        // called immediately after start() can already detect self-calls.
        loop {
            if thread_id.lock().unwrap().is_some() {
                break;
            }
            thread::yield_now();
        }

        Self {
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
            thread_id,
            name: thread_name,
        }
    }

    fn is_current_thread(&self) -> bool {
        *self.thread_id.lock().unwrap() == Some(thread::current().id())
    }

    pub fn begin_invoke<F, R>(&self, f: F) -> Awaitable<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let job: Job = Box::new(move || {
            let result = f();
            let _ = tx.send(result);
        });
        let posted = match self.sender.lock().unwrap().as_ref() {
            Some(sender) => sender.send(job).is_ok(),
            None => false,
        };
        if !posted {
            warn!(executor = %self.name, "posted a task to a stopped executor");
        }
        Awaitable { rx }
    }

    /// Blocks until `f` completes. If called from the executor's own thread
    /// (a component invoking itself reentrantly), runs `f` inline rather
    /// than posting and waiting on itself, which would deadlock.
    pub fn invoke<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_current_thread() {
            f()
        } else {
            self.begin_invoke(f).wait()
        }
    }

    /// Closes the task queue (letting the executor thread drain whatever was
    /// already posted) then joins it. Nothing posted after `stop()` returns
    /// will run; `Drop` calls this too, so explicit calls are only needed
    /// when the caller wants to block on shutdown completing at a known point.
    pub fn stop(&self) {
        self.sender.lock().unwrap().take();
        if let Some(handle) = self.handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        self.stop();
    }
}
