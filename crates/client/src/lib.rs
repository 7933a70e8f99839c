// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! vigil: persistent telemetry channel client for the proctoring backend.
//!
//! This crate owns the client side of the bidirectional proctoring
//! channel: connection lifecycle with exponential-backoff reconnects,
//! heartbeats, an offline event queue, and typed dispatch of inbound
//! backend messages. The types it exchanges live in `vigil-core`.

pub mod channel;

pub use channel::{
    ChannelClient, ChannelConfig, ChannelError, ChannelState, Transport, WebSocketTransport,
};
