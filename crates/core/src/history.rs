// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded FIFO history buffers.

use std::collections::VecDeque;

/// Fixed-capacity buffer that evicts its oldest entry on overflow.
///
/// Pure FIFO: no dedup, no priority. Duplicate entries pushed by the
/// backend are kept as-is.
#[derive(Debug, Clone)]
pub struct History<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// Creates an empty history with the given capacity.
    pub fn new(capacity: usize) -> Self {
        History {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entry, evicting from the front once over capacity.
    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    /// Iterates oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// The most recently pushed entry.
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
