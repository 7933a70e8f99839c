// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Operator-facing alerts pushed by the backend.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw `alert` message body as sent by the backend. Every field is
/// optional; normalization fills the gaps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertPayload {
    #[serde(default)]
    pub alert_id: Option<String>,
    #[serde(default)]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Sequence for locally synthesized alert ids. Bursts of id-less alerts
/// within one millisecond must still get distinct ids.
static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(0);

/// A normalized alert record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: String,
    pub kind: String,
    pub severity: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: Value,
}

impl Alert {
    /// Normalizes a payload, defaulting absent fields.
    ///
    /// Server-supplied ids are kept verbatim; absent ids are synthesized
    /// as `local-{unix_millis}-{seq}`.
    pub fn from_payload(payload: AlertPayload, now: DateTime<Utc>) -> Self {
        let timestamp = payload.timestamp.unwrap_or(now);
        let id = payload.alert_id.unwrap_or_else(|| {
            let seq = NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed);
            format!("local-{}-{}", timestamp.timestamp_millis(), seq)
        });

        Alert {
            id,
            kind: payload.alert_type.unwrap_or_else(|| "alert".to_string()),
            severity: payload.severity.unwrap_or_else(|| "info".to_string()),
            message: payload.message.unwrap_or_default(),
            timestamp,
            metadata: payload
                .metadata
                .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        }
    }
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
