use crate::player::state::PlaybackRequest;
use std::collections::VecDeque;
use thiserror::Error;

/// Default number of pending requests a queue accepts.
pub const DEFAULT_QUEUE_CAPACITY: usize = 5;

/// Returned when enqueueing on a saturated queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is full (capacity {capacity})")]
pub struct QueueFull {
    pub capacity: usize,
}

/// Bounded FIFO of pending playback requests.
#[derive(Debug, Clone)]
pub struct RequestQueue {
    items: VecDeque<PlaybackRequest>,
    capacity: usize,
}

impl RequestQueue {
    pub fn new(capacity: usize) -> Self {
        RequestQueue {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `request`, or rejects it without touching the queue when full.
    pub fn enqueue(&mut self, request: PlaybackRequest) -> Result<(), QueueFull> {
        if self.is_full() {
            return Err(QueueFull {
                capacity: self.capacity,
            });
        }
        self.items.push_back(request);
        Ok(())
    }

    pub fn dequeue(&mut self) -> Option<PlaybackRequest> {
        self.items.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaybackRequest> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
