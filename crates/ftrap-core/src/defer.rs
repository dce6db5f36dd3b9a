#![forbid(unsafe_code)]

//! Deferred task queue.
//!
//! A single-threaded FIFO of one-shot tasks, standing in for the host's
//! microtask queue. The host drains it after each synchronous turn (and
//! after any pending state flush), which gives deferred actions the
//! ordering guarantee they need: after the current update settles, before
//! the next user interaction. Ordering relative to timers is *not*
//! guaranteed and not needed.
//!
//! There is no cancellation: a scheduled task always runs against whatever
//! it closed over at schedule time.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

/// Shared single-threaded task queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
    inner: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a task to run on the next drain.
    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        self.inner.borrow_mut().push_back(Box::new(task));
        tracing::trace!(target: "ftrap.defer", depth = self.len(), "task scheduled");
    }

    /// Run queued tasks in FIFO order until the queue is empty.
    ///
    /// Tasks scheduled while draining run in the same drain, after the
    /// tasks already queued.
    pub fn drain(&self) {
        loop {
            // Release the borrow before running the task; tasks may schedule.
            let task = self.inner.borrow_mut().pop_front();
            let Some(task) = task else {
                break;
            };
            task();
        }
    }

    /// Whether any tasks are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }
}

// =========================================================================
// Tests
// =========================================================================
