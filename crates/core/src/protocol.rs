// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire messages exchanged with the proctoring backend.
//!
//! The protocol is simple:
//! - Client sends telemetry messages and periodic heartbeats
//! - Backend pushes confirmations, alerts, commands, and errors
//!
//! Inbound frames are parsed leniently: an unrecognized `type` is not a
//! parse error, it becomes [`InboundMessage::Unknown`] so the channel can
//! record it without dropping the frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::alert::AlertPayload;

/// The canonical outbound telemetry message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Wire message type (the event's effective kind, or `heartbeat`).
    #[serde(rename = "type")]
    pub kind: String,
    /// ISO-8601 event time.
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl OutboundMessage {
    /// Creates a liveness heartbeat: `{ "type": "heartbeat", timestamp }`.
    pub fn heartbeat(now: DateTime<Utc>) -> Self {
        OutboundMessage {
            kind: "heartbeat".to_string(),
            timestamp: now,
            severity: None,
            confidence: None,
            description: None,
            metadata: None,
        }
    }
}

/// A frame ready for transmission.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    /// An encoded telemetry or heartbeat message.
    Message(OutboundMessage),
    /// A caller-supplied wire message, sent verbatim.
    Verbatim(Value),
}

impl OutboundFrame {
    /// Serializes the frame to JSON text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        match self {
            OutboundFrame::Message(msg) => serde_json::to_string(msg),
            OutboundFrame::Verbatim(value) => serde_json::to_string(value),
        }
    }
}

/// Messages pushed by the backend, tagged by their `type` field.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Backend acknowledged the connection; the channel is ready to flush.
    ConnectionConfirmed { payload: Value },
    /// A detected issue to surface to the operator.
    Alert(AlertPayload),
    /// A backend-initiated action (e.g. forced capture). Recorded and
    /// exposed to collaborators; no default action is taken here.
    Command { payload: Value },
    /// Acknowledgement of a heartbeat. No-op.
    HeartbeatAck,
    /// Backend-reported error.
    Error { message: String },
    /// Unrecognized `type`; kept for diagnostics only.
    Unknown { kind: String, payload: Value },
}

impl InboundMessage {
    /// Parses a raw frame.
    ///
    /// Malformed JSON is an error; an unknown `type` (or a missing one)
    /// is not.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(match kind.as_str() {
            "connection_confirmed" => InboundMessage::ConnectionConfirmed { payload: value },
            "alert" => InboundMessage::Alert(serde_json::from_value(value)?),
            "command" => InboundMessage::Command { payload: value },
            "heartbeat_ack" => InboundMessage::HeartbeatAck,
            "error" => InboundMessage::Error {
                message: value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unspecified backend error")
                    .to_string(),
            },
            _ => InboundMessage::Unknown {
                kind,
                payload: value,
            },
        })
    }

    /// The wire `type` this message was tagged with.
    pub fn kind(&self) -> &str {
        match self {
            InboundMessage::ConnectionConfirmed { .. } => "connection_confirmed",
            InboundMessage::Alert(_) => "alert",
            InboundMessage::Command { .. } => "command",
            InboundMessage::HeartbeatAck => "heartbeat_ack",
            InboundMessage::Error { .. } => "error",
            InboundMessage::Unknown { kind, .. } => kind,
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
