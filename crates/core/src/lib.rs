// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! vigil-core: Shared types for the vigil proctoring telemetry channel
//!
//! This crate provides the wire protocol, telemetry event model, alert
//! normalization, and supporting primitives used by the vigil channel
//! client.

pub mod alert;
pub mod endpoint;
pub mod event;
pub mod history;
pub mod identity;
pub mod protocol;

pub use alert::{Alert, AlertPayload};
pub use endpoint::Endpoint;
pub use event::{SignalEvent, TelemetryEvent};
pub use history::History;
pub use identity::Identity;
pub use protocol::{InboundMessage, OutboundFrame, OutboundMessage};
