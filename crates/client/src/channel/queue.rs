// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory queue of telemetry events awaiting an open channel.
//!
//! Order-preserving and unbounded: an event submitted while the channel
//! is down is never dropped silently. Entries live only as long as the
//! process; queued events are discarded on teardown, never persisted.

use std::collections::VecDeque;

use vigil_core::TelemetryEvent;

/// FIFO buffer of not-yet-sent telemetry events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<TelemetryEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        EventQueue {
            events: VecDeque::new(),
        }
    }

    /// Append an event for later sending.
    pub fn push(&mut self, event: TelemetryEvent) {
        self.events.push_back(event);
    }

    /// Remove and return all queued events in submission order.
    pub fn drain(&mut self) -> Vec<TelemetryEvent> {
        self.events.drain(..).collect()
    }

    /// Discard all queued events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Get the number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
