// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry events submitted by local detectors, and their encoding
//! into the canonical wire message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{OutboundFrame, OutboundMessage};

/// Event kinds that mark local monitoring lifecycle rather than
/// telemetry. Acknowledged to the caller but never transmitted.
const LOCAL_MARKERS: [&str; 2] = ["monitoring_started", "monitoring_stopped"];

/// A signal produced by a local detector (face-auth score, screen
/// activity, keyboard shortcut, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    /// Semantic event kind.
    pub kind: String,
    /// When present, replaces `kind` as the wire `type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Event time; defaults to send time when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl SignalEvent {
    /// Creates a signal event of the given kind with no optional fields.
    pub fn new(kind: impl Into<String>) -> Self {
        SignalEvent {
            kind: kind.into(),
            activity_kind: None,
            severity: None,
            confidence: None,
            description: None,
            timestamp: None,
            metadata: None,
        }
    }

    pub fn with_activity_kind(mut self, activity_kind: impl Into<String>) -> Self {
        self.activity_kind = Some(activity_kind.into());
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// The effective wire `type`: `activity_kind` overrides `kind`.
    pub fn wire_kind(&self) -> &str {
        self.activity_kind.as_deref().unwrap_or(&self.kind)
    }

    /// Whether this is a local monitoring marker (never transmitted).
    pub fn is_local_marker(&self) -> bool {
        LOCAL_MARKERS.contains(&self.kind.as_str())
    }
}

/// One submission to the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    /// A detector signal, encoded into the canonical wire message.
    Signal(SignalEvent),
    /// An already-formed wire message, sent verbatim.
    Raw(Value),
}

impl TelemetryEvent {
    /// Creates a signal event submission.
    pub fn signal(event: SignalEvent) -> Self {
        TelemetryEvent::Signal(event)
    }

    /// Creates a verbatim passthrough submission.
    pub fn raw(value: Value) -> Self {
        TelemetryEvent::Raw(value)
    }

    /// Applies the encoding rules in order. `None` means the event is
    /// handled without transmitting anything (local markers).
    pub fn encode(&self, now: DateTime<Utc>) -> Option<OutboundFrame> {
        match self {
            TelemetryEvent::Raw(value) => Some(OutboundFrame::Verbatim(value.clone())),
            TelemetryEvent::Signal(signal) => {
                if signal.is_local_marker() {
                    return None;
                }
                Some(OutboundFrame::Message(OutboundMessage {
                    kind: signal.wire_kind().to_string(),
                    timestamp: signal.timestamp.unwrap_or(now),
                    severity: signal.severity.clone(),
                    confidence: signal.confidence,
                    description: signal.description.clone(),
                    metadata: Some(
                        signal
                            .metadata
                            .clone()
                            .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
                    ),
                }))
            }
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
