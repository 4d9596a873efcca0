//! Bounded FIFO queue
//!
//! Fixed-capacity circular buffer of `Copy` records, used for both message
//! pipe queues and the pending-callback queue.
//!
//! # Guarantees
//! - Capacity is the const parameter `N`; storage is inline, never grown
//! - `put` on a full queue fails with [`KernelError::QueueFull`] and leaves
//!   the queue untouched; nothing is ever dropped silently
//! - Records come out in exactly the order they went in
//!
//! The queue itself is not synchronized. The kernel keeps each instance
//! behind a critical section (see [`crate::pipe`]).

use crate::error::{KernelError, Result};

pub struct Fifo<T: Copy, const N: usize> {
    /// Ring storage; slots outside `[head, head + len)` hold stale records
    slots: [T; N],
    /// Index of the oldest record
    head: usize,
    /// Number of records held
    len: usize,
}

impl<T: Copy, const N: usize> Fifo<T, N> {
    /// Create an empty queue
    ///
    /// `blank` only fills unused storage and is never returned by `get`.
    pub const fn new(blank: T) -> Self {
        assert!(N > 0, "Fifo capacity must be non-zero");

        Self {
            slots: [blank; N],
            head: 0,
            len: 0,
        }
    }

    /// Append a record at the tail
    ///
    /// # Errors
    /// Returns `KernelError::QueueFull` if `count() == capacity()`
    pub fn put(&mut self, item: T) -> Result<()> {
        if self.len == N {
            return Err(KernelError::QueueFull { capacity: N });
        }

        let tail = (self.head + self.len) % N;
        self.slots[tail] = item;
        self.len += 1;
        Ok(())
    }

    /// Remove the record at the head
    pub fn get(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        let item = self.slots[self.head];
        self.head = (self.head + 1) % N;
        self.len -= 1;
        Some(item)
    }

    /// Oldest record without removing it
    pub fn peek(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            Some(&self.slots[self.head])
        }
    }

    /// Current occupancy
    pub fn count(&self) -> usize {
        self.len
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}
