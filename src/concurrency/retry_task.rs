//! `RetryTask`: a promise holding a supplier that may not have an answer yet.
//!
//! A producer that can only fulfill a frame request asynchronously (e.g. a
//! decoder waiting on a hardware callback) hands back a `RetryTask` instead
//! of blocking. The owner calls `try_complete()` at safe points (typically
//! "a decode callback just fired") until the supplier returns `Some`, or
//! calls `try_or_fail` to force the attempt to give up with an error.
//!
//! Meant to be constructed fresh per outstanding request; reuse across
//! requests is left to the caller (e.g. a producer keeping a
//! `Vec<RetryTask<DrawFrame>>` of in-flight requests).

use std::sync::Mutex;

use crate::error::CoreError;

enum State<R> {
    Pending(Box<dyn FnMut() -> Option<R> + Send>),
    Done,
}

pub struct RetryTask<R> {
    state: Mutex<State<R>>,
}

impl<R> RetryTask<R> {
    pub fn new<F>(supplier: F) -> Self
    where
        F: FnMut() -> Option<R> + Send + 'static,
    {
        Self {
            state: Mutex::new(State::Pending(Box::new(supplier))),
        }
    }

    /// Calls the supplier once. Returns `Some(result)` and marks the task
    /// done the first time the supplier yields a value; returns `None` if
    /// the task is still pending or was already completed.
    pub fn try_complete(&self) -> Option<R> {
        let mut guard = self.state.lock().unwrap();
        match &mut *guard {
            State::Pending(supplier) => {
                let outcome = supplier();
                if outcome.is_some() {
                    *guard = State::Done;
                }
                outcome
            }
            State::Done => None,
        }
    }

    /// Forces the task to stop retrying, for use at a point where the
    /// caller has decided the supplier will never succeed (e.g. the
    /// producer that owned it was destroyed).
    pub fn try_or_fail(&self, _reason: CoreError) {
        let mut guard = self.state.lock().unwrap();
        *guard = State::Done;
    }

    pub fn is_done(&self) -> bool {
        matches!(*self.state.lock().unwrap(), State::Done)
    }
}
