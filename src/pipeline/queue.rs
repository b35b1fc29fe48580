//! Bounded FIFO queue used between pipeline stages. `enqueue` blocks for
//! up to 100ms under backpressure, then drops the packet and increments
//! a counter rather than blocking indefinitely.

use crossbeam::channel::{self, Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const BACKPRESSURE_WAIT: Duration = Duration::from_millis(100);

pub struct BoundedQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    dropped: Arc<AtomicUsize>,
    capacity: usize,
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
            dropped: self.dropped.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = channel::bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            dropped: Arc::new(AtomicUsize::new(0)),
            capacity,
        }
    }

    /// Attempts to enqueue `item`, waiting up to 100ms for room. Returns
    /// `false` (and increments the dropped counter) if the queue is
    /// still full after the wait.
    pub fn enqueue(&self, item: T) -> bool {
        match self.sender.send_timeout(item, BACKPRESSURE_WAIT) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Blocks until a packet arrives or the queue is disconnected
    /// (every sender dropped, signaling stop).
    pub fn dequeue(&self) -> Option<T> {
        self.receiver.recv().ok()
    }

    /// Polls for a packet in 100ms slices, checking `running` between
    /// polls so a worker thread can honor `stop()` without abandoning a
    /// blocking recv indefinitely.
    pub fn dequeue_or_stop(&self, running: &std::sync::atomic::AtomicBool) -> Option<T> {
        loop {
            match self.receiver.recv_timeout(BACKPRESSURE_WAIT) {
                Ok(item) => return Some(item),
                Err(channel::RecvTimeoutError::Timeout) => {
                    if !running.load(Ordering::Relaxed) {
                        return None;
                    }
                }
                Err(channel::RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_dequeue_roundtrip() {
        let q: BoundedQueue<i32> = BoundedQueue::new(4);
        assert!(q.enqueue(1));
        assert_eq!(q.dequeue(), Some(1));
    }

    #[test]
    fn enqueue_drops_when_full_and_increments_counter() {
        let q: BoundedQueue<i32> = BoundedQueue::new(1);
        assert!(q.enqueue(1));
        assert!(!q.enqueue(2));
        assert_eq!(q.dropped_count(), 1);
    }
}
