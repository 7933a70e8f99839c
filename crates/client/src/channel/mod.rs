// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry channel module.
//!
//! Provides the WebSocket client that streams proctoring events to the
//! backend and receives alerts, commands, and acknowledgements back.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Client     │────►│  Transport  │────►│   Backend   │
//! │ (ChannelClient)◄────│   (trait)   │◄────│   Observer  │
//! └───────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌───────────────┐
//! │  EventQueue   │  (events submitted while the channel is down)
//! └───────────────┘
//! ```
//!
//! # Features
//!
//! - Single owned transport handle with a connect-timeout guard
//! - Automatic reconnect with exponential backoff (1s..30s, 5 attempts)
//! - 30s heartbeat while connected
//! - Unbounded FIFO queue flushed on backend confirmation
//! - Bounded alert (20) and message (100) histories
//! - Injectable transport trait for testing

mod client;
mod queue;
mod transport;

pub use client::{ChannelClient, ChannelConfig, ChannelError, ChannelState};
pub use queue::EventQueue;
pub use transport::{Frame, Transport, TransportError, WebSocketTransport};

#[cfg(test)]
mod test_helpers;




#[cfg(test)]
mod transport_tests;
