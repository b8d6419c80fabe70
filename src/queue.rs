//! The bounded FIFO admission queue (spec.md §4.2).

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Instant;
#[cfg(test)]
use std::time::Duration as StdDuration;

use crate::error::Error;
use crate::wire::Request;

/// Server-internal wrapper around a [`Request`], carrying the timestamps
/// spec.md §3 defines. Never transmitted on the wire.
#[derive(Debug, Clone, Copy)]
pub struct RequestMeta {
    pub request: Request,
    pub receipt: Instant,
    pub start: Option<Instant>,
    pub completion: Option<Instant>,
}

impl RequestMeta {
    pub fn new(request: Request, receipt: Instant) -> Self {
        Self {
            request,
            receipt,
            start: None,
            completion: None,
        }
    }
}

struct Inner {
    items: VecDeque<RequestMeta>,
    capacity: usize,
    /// Set by the Coordinator once the connection is tearing down; lets a
    /// blocked `dequeue` wake up with no item to return instead of waiting
    /// forever.
    shutdown: bool,
}

/// A fixed-capacity FIFO queue of [`RequestMeta`], shared between exactly
/// one producer and one consumer.
///
/// Guarded by a single [`Mutex`] plus a [`Condvar`] — the "single lock plus
/// a condition variable" alternative spec.md §9 calls out as equivalent to
/// the source's pair of semaphores.
pub struct Queue {
    inner: Mutex<Inner>,
    not_empty: Condvar,
}

impl Queue {
    /// Constructs an empty queue of fixed `capacity`. Returns
    /// `Err(Error::ZeroCapacity)` for `capacity == 0`, which callers should
    /// treat as fatal per spec.md §7's `InvariantViolation` handling.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                capacity,
                shutdown: false,
            }),
            not_empty: Condvar::new(),
        })
    }

    /// Non-blocking enqueue. Wakes at most one blocked dequeuer on success.
    pub fn try_enqueue(&self, item: RequestMeta) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        if inner.items.len() >= inner.capacity {
            return Err(Error::QueueFull);
        }
        inner.items.push_back(item);
        drop(inner);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Blocks until an item is available or a shutdown wake is delivered.
    /// Returns `None` exactly when woken for shutdown with nothing left to
    /// drain, distinguishable from a real item by construction.
    pub fn dequeue(&self) -> Option<RequestMeta> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Some(item);
            }
            if inner.shutdown {
                return None;
            }
            inner = self.not_empty.wait(inner).unwrap();
        }
    }

    /// Like [`Self::dequeue`], but gives up and returns `None` if nothing
    /// becomes available within `timeout` even absent a shutdown wake. Used
    /// by tests to avoid hanging on a bug instead of the intended blocking
    /// behavior.
    #[cfg(test)]
    pub fn dequeue_timeout(&self, timeout: StdDuration) -> Option<RequestMeta> {
        let mut inner = self.inner.lock().unwrap();
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Some(item);
            }
            if inner.shutdown {
                return None;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (guard, result) = self.not_empty.wait_timeout(inner, remaining).unwrap();
            inner = guard;
            if result.timed_out() {
                return None;
            }
        }
    }

    /// Signals shutdown and wakes a blocked dequeuer with no item to
    /// deliver. Idempotent.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.shutdown = true;
        drop(inner);
        self.not_empty.notify_one();
    }

    /// Atomically reads the current `req_id` sequence, front to rear,
    /// without modifying the queue.
    pub fn snapshot_ids(&self) -> Vec<u64> {
        let inner = self.inner.lock().unwrap();
        inner.items.iter().map(|m| m.request.req_id).collect()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().unwrap().capacity
    }
}
