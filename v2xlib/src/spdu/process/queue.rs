// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{PipelineError, Result};

/// FIFO shared between pipeline threads.
///
/// Every state change that a waiter may be blocked on, including changes to the
/// gate passed to [`WorkQueue::pop_wait`], must be followed by [`WorkQueue::notify`]
/// so the check and the wait cannot miss it.
pub(crate) struct WorkQueue<T> {
    name: &'static str,
    items: Mutex<VecDeque<T>>,
    changed: Condvar,
    capacity: usize,
}

impl<T> WorkQueue<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        WorkQueue {
            name,
            items: Mutex::new(VecDeque::new()),
            changed: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Appends `item` unless the queue is at capacity.
    pub fn try_push(&self, item: T) -> Result<()> {
        let mut items = self.lock();
        if items.len() >= self.capacity {
            log::warn!("{} queue full ({} units)", self.name, items.len());
            return Err(PipelineError::QueueFull.into());
        }
        items.push_back(item);
        self.changed.notify_all();
        Ok(())
    }

    /// Appends `item` regardless of capacity.
    pub fn push_back(&self, item: T) {
        self.lock().push_back(item);
        self.changed.notify_all();
    }

    /// Puts a resumed unit ahead of new arrivals, regardless of capacity.
    pub fn push_front(&self, item: T) {
        self.lock().push_front(item);
        self.changed.notify_all();
    }

    pub fn notify(&self) {
        let _items = self.lock();
        self.changed.notify_all();
    }

    /// Blocks until the queue is non-empty and `gate` allows a pop.
    ///
    /// Returns `None` once `running` is cleared.
    pub fn pop_wait(&self, running: &AtomicBool, gate: impl Fn() -> bool) -> Option<T> {
        let mut items = self.lock();
        loop {
            if !running.load(Ordering::SeqCst) {
                return None;
            }
            if !items.is_empty() && gate() {
                return items.pop_front();
            }
            items = self
                .changed
                .wait(items)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Removes every item for which `ready` holds. When none is ready, waits up to
    /// `timeout` for a notification and checks once more.
    pub fn take_ready(
        &self,
        running: &AtomicBool,
        timeout: Duration,
        mut ready: impl FnMut(&mut T) -> bool,
    ) -> Vec<T> {
        let mut items = self.lock();
        let taken = Self::extract(&mut items, &mut ready);
        if !taken.is_empty() || !running.load(Ordering::SeqCst) {
            return taken;
        }
        let (mut items, _) = self
            .changed
            .wait_timeout(items, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        Self::extract(&mut items, &mut ready)
    }

    fn extract(items: &mut VecDeque<T>, ready: &mut impl FnMut(&mut T) -> bool) -> Vec<T> {
        let mut taken = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if ready(&mut items[i]) {
                if let Some(item) = items.remove(i) {
                    taken.push(item);
                }
            } else {
                i += 1;
            }
        }
        taken
    }

    pub fn drain(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_capacity_applies_to_new_items_only() {
        let queue = WorkQueue::new("test", 2);
        queue.try_push(1).unwrap();
        queue.try_push(2).unwrap();
        assert!(queue.try_push(3).is_err());
        queue.push_front(0);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain(), vec![0, 1, 2]);
    }

    #[test]
    fn test_pop_wait_respects_gate() {
        let running = AtomicBool::new(true);
        let queue = WorkQueue::new("test", 4);
        queue.try_push(7).unwrap();
        assert_eq!(queue.pop_wait(&running, || true), Some(7));

        running.store(false, Ordering::SeqCst);
        queue.try_push(8).unwrap();
        assert_eq!(queue.pop_wait(&running, || true), None);
    }

    #[test]
    fn test_pop_wait_wakes_on_push() {
        let running = Arc::new(AtomicBool::new(true));
        let queue = Arc::new(WorkQueue::new("test", 4));
        let consumer = {
            let queue = queue.clone();
            let running = running.clone();
            std::thread::spawn(move || queue.pop_wait(&running, || true))
        };
        std::thread::sleep(Duration::from_millis(20));
        queue.try_push(42).unwrap();
        assert_eq!(consumer.join().unwrap(), Some(42));
    }

    #[test]
    fn test_take_ready() {
        let running = AtomicBool::new(true);
        let queue = WorkQueue::new("test", 8);
        for n in 1..=5 {
            queue.try_push(n).unwrap();
        }
        let even = queue.take_ready(&running, Duration::from_millis(1), |n| *n % 2 == 0);
        assert_eq!(even, vec![2, 4]);
        assert_eq!(queue.len(), 3);

        let none = queue.take_ready(&running, Duration::from_millis(1), |n| *n > 10);
        assert!(none.is_empty());
    }
}
