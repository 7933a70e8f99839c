// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for channel tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use vigil_core::{Endpoint, SignalEvent, TelemetryEvent};

use super::client::{ChannelClient, ChannelConfig};
use super::transport::Frame;
use super::transport_tests::{MockHandle, MockTransport};

/// Standard test config pointed at a fake host.
pub fn test_config() -> ChannelConfig {
    ChannelConfig::new(Endpoint::new("backend.test", false))
}

/// A client over a mock transport, plus the handle to drive the mock.
pub fn make_client() -> (ChannelClient<MockTransport>, MockHandle) {
    let transport = MockTransport::new();
    let handle = transport.handle();
    (ChannelClient::with_transport(test_config(), transport), handle)
}

/// A client already activated and connected under a test identity.
pub async fn connected_client() -> (ChannelClient<MockTransport>, MockHandle) {
    let (mut client, handle) = make_client();
    client.activate("sess-1", "user-1", true).await;
    (client, handle)
}

/// A plain signal event of the given kind.
pub fn signal(kind: &str) -> TelemetryEvent {
    TelemetryEvent::signal(SignalEvent::new(kind))
}

/// An inbound `connection_confirmed` frame.
pub fn confirmed_frame() -> Frame {
    Frame::Text(r#"{"type":"connection_confirmed"}"#.to_string())
}

/// An inbound `alert` frame with the given server id.
pub fn alert_frame(id: &str) -> Frame {
    Frame::Text(format!(r#"{{"type":"alert","alert_id":"{id}"}}"#))
}
