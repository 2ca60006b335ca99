use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::engine::order::Order;

/// Lock-free bounded MPMC queue between producers and consumers.
///
/// The fixed capacity is the engine's hard backpressure bound: a push
/// against a full queue fails immediately and hands the order back, and the
/// producer treats that as a signal to pause. Consumers poll; an empty pop
/// is not an error.
pub struct OrderQueue {
    queue: Arc<ArrayQueue<Order>>,
    push_count: Arc<AtomicU64>,
    pop_count: Arc<AtomicU64>,
    reject_count: Arc<AtomicU64>,
}

impl OrderQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: Arc::new(ArrayQueue::new(capacity)),
            push_count: Arc::new(AtomicU64::new(0)),
            pop_count: Arc::new(AtomicU64::new(0)),
            reject_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle for enqueuing. Every producer task gets its own.
    pub fn producer(&self) -> OrderProducer {
        OrderProducer {
            queue: self.queue.clone(),
            push_count: self.push_count.clone(),
            reject_count: self.reject_count.clone(),
        }
    }

    /// Handle for dequeuing. Consumers compete for items.
    pub fn consumer(&self) -> OrderConsumer {
        OrderConsumer {
            queue: self.queue.clone(),
            pop_count: self.pop_count.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn push_count(&self) -> u64 {
        self.push_count.load(Ordering::Relaxed)
    }

    pub fn pop_count(&self) -> u64 {
        self.pop_count.load(Ordering::Relaxed)
    }

    pub fn reject_count(&self) -> u64 {
        self.reject_count.load(Ordering::Relaxed)
    }
}

#[derive(Clone)]
pub struct OrderProducer {
    queue: Arc<ArrayQueue<Order>>,
    push_count: Arc<AtomicU64>,
    reject_count: Arc<AtomicU64>,
}

impl OrderProducer {
    /// Try to enqueue. Hands the order back when the queue is full.
    pub fn push(&self, order: Order) -> Result<(), Order> {
        match self.queue.push(order) {
            Ok(()) => {
                self.push_count.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(order) => {
                self.reject_count.fetch_add(1, Ordering::Relaxed);
                Err(order)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[derive(Clone)]
pub struct OrderConsumer {
    queue: Arc<ArrayQueue<Order>>,
    pop_count: Arc<AtomicU64>,
}

impl OrderConsumer {
    pub fn pop(&self) -> Option<Order> {
        let order = self.queue.pop()?;
        self.pop_count.fetch_add(1, Ordering::Relaxed);
        Some(order)
    }
}
