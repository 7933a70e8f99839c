// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Channel client: connection lifecycle, outbound encoding, and inbound
//! dispatch.
//!
//! Single-threaded and caller-driven. All timed waits (connect-timeout
//! guard, heartbeat interval, reconnect backoff) are explicit deadlines
//! stored on the client and cleared on every superseding transition; a
//! leaked timer would cause duplicate connect attempts or phantom
//! heartbeats, so that invariant is load-bearing.

use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use vigil_core::{
    Alert, Endpoint, History, Identity, InboundMessage, OutboundFrame, OutboundMessage,
    TelemetryEvent,
};

use super::queue::EventQueue;
use super::transport::{
    Frame, Transport, TransportError, WebSocketTransport, CLOSE_ABNORMAL, CLOSE_NORMAL,
};

/// Configuration for the channel client.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Backend endpoint the channel URL is resolved against.
    pub endpoint: Endpoint,
    /// Abort a connection attempt that has not opened within this window.
    pub connect_timeout: Duration,
    /// Liveness ping period while connected.
    pub heartbeat_interval: Duration,
    /// Initial delay for exponential backoff.
    pub base_delay: Duration,
    /// Cap on the backoff delay.
    pub max_delay: Duration,
    /// Maximum automatic reconnection attempts.
    pub max_attempts: u32,
    /// Delay before the connect half of a manual reconnect.
    pub reconnect_delay: Duration,
    /// Capacity of the diagnostic message history.
    pub message_history_capacity: usize,
    /// Capacity of the operator-facing alert history.
    pub alert_history_capacity: usize,
}

impl ChannelConfig {
    /// Creates a config for the given endpoint with standard timings.
    pub fn new(endpoint: Endpoint) -> Self {
        ChannelConfig {
            endpoint,
            connect_timeout: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(30),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
            reconnect_delay: Duration::from_secs(1),
            message_history_capacity: 100,
            alert_history_capacity: 20,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig::new(Endpoint::new("localhost:8000", false))
    }
}

/// Error type for channel operations.
///
/// These never reach the caller as returned errors; they land in the
/// observable `last_error` field and the log.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The connect-timeout guard fired before the transport opened.
    #[error("connection attempt timed out")]
    ConnectTimeout,

    /// The automatic retry budget is exhausted; only a manual
    /// `reconnect()` restarts the channel.
    #[error("max reconnection attempts reached")]
    MaxAttemptsReached,

    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for internal channel plumbing.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// State of the channel connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Not connected.
    Disconnected,
    /// Attempting to connect.
    Connecting,
    /// Connected to the backend.
    Connected,
    /// Waiting out a backoff delay before the next attempt.
    Reconnecting { attempt: u32 },
}

/// Telemetry channel client.
pub struct ChannelClient<T: Transport = WebSocketTransport> {
    /// Configuration.
    config: ChannelConfig,
    /// Transport layer.
    transport: T,
    /// Identity the channel is (or will be) opened under.
    identity: Option<Identity>,
    /// Whether the caller currently wants the channel up. Re-read by
    /// every handler at invocation time.
    active: bool,
    /// Connection state.
    state: ChannelState,
    /// Abnormal-close counter; reset on every successful open.
    attempts: u32,
    /// Most recent surfaced error, if any.
    last_error: Option<String>,
    /// Events submitted while the channel was down.
    queue: EventQueue,
    /// Operator-facing alert history.
    alerts: History<Alert>,
    /// Diagnostic inbound message history.
    messages: History<InboundMessage>,
    /// Deadline of the pending backoff reconnect, if one is scheduled.
    reconnect_at: Option<Instant>,
    /// Next heartbeat deadline; `Some` only while connected.
    heartbeat_at: Option<Instant>,
}

impl ChannelClient<WebSocketTransport> {
    /// Create a new channel client with the default WebSocket transport.
    pub fn new(config: ChannelConfig) -> Self {
        ChannelClient::with_transport(config, WebSocketTransport::new())
    }
}

impl<T: Transport> ChannelClient<T> {
    /// Create a new channel client with a custom transport (for testing).
    pub fn with_transport(config: ChannelConfig, transport: T) -> Self {
        let alerts = History::new(config.alert_history_capacity);
        let messages = History::new(config.message_history_capacity);

        ChannelClient {
            config,
            transport,
            identity: None,
            active: false,
            state: ChannelState::Disconnected,
            attempts: 0,
            last_error: None,
            queue: EventQueue::new(),
            alerts,
            messages,
            reconnect_at: None,
            heartbeat_at: None,
        }
    }

    /// Get the current connection state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.state == ChannelState::Connected && self.transport.is_connected()
    }

    /// The most recent surfaced error, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Operator-facing alerts, oldest-first, at most 20.
    pub fn alerts(&self) -> &History<Alert> {
        &self.alerts
    }

    /// Recent inbound messages, oldest-first, at most 100.
    pub fn message_history(&self) -> &History<InboundMessage> {
        &self.messages
    }

    /// Number of events waiting for the next confirmed connection.
    pub fn queued_events(&self) -> usize {
        self.queue.len()
    }

    /// Abnormal closes since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.attempts
    }

    /// The automatic retry budget.
    pub fn max_reconnect_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Deadline of the scheduled reconnect, if one is pending.
    pub fn pending_reconnect_at(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Identity the channel is operating under.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// All state transitions funnel through here.
    fn set_state(&mut self, state: ChannelState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "channel state change");
            self.state = state;
        }
    }

    /// Lifecycle control: set identity and desired activation, then
    /// connect or disconnect accordingly. A change of identity tears
    /// down the current channel and opens a new one.
    pub async fn activate(
        &mut self,
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        active: bool,
    ) {
        let identity = Identity::new(session_id, user_id);
        let identity_changed = self.identity.as_ref() != Some(&identity);

        if identity_changed && self.state != ChannelState::Disconnected {
            self.disconnect().await;
        }

        self.identity = Some(identity);
        self.active = active;

        if active {
            self.connect().await;
        } else {
            self.disconnect().await;
        }
    }

    /// Open the channel.
    ///
    /// Idempotent: a no-op while an attempt is in flight or the channel
    /// is already up, and a logged no-op when identity is missing or
    /// incomplete.
    pub async fn connect(&mut self) {
        if matches!(
            self.state,
            ChannelState::Connecting | ChannelState::Connected
        ) {
            debug!(state = ?self.state, "connect ignored: channel already open or opening");
            return;
        }

        let Some(identity) = self.identity.clone() else {
            warn!("connect skipped: no identity set");
            return;
        };
        if !identity.is_complete() {
            warn!(
                session_id = %identity.session_id,
                user_id = %identity.user_id,
                "connect skipped: incomplete identity"
            );
            return;
        }

        // A manual connect supersedes any scheduled retry.
        self.reconnect_at = None;

        let url = self.config.endpoint.url(&identity);
        self.set_state(ChannelState::Connecting);

        match tokio::time::timeout(self.config.connect_timeout, self.transport.connect(&url))
            .await
        {
            Ok(Ok(())) => {
                self.set_state(ChannelState::Connected);
                self.attempts = 0;
                self.heartbeat_at = Some(Instant::now() + self.config.heartbeat_interval);
                info!(%url, "channel connected");
            }
            Ok(Err(e)) => {
                // A failed dial behaves like an abnormal close: eligible
                // for retry.
                warn!(error = %e, "channel connect failed");
                self.last_error = Some(e.to_string());
                self.handle_close(CLOSE_ABNORMAL);
            }
            Err(_) => {
                // Timeout guard: force-close the attempt. This path does
                // not schedule a retry; only a close does.
                warn!(
                    timeout_secs = self.config.connect_timeout.as_secs(),
                    "channel connect timed out"
                );
                let _ = self.transport.disconnect(CLOSE_NORMAL).await;
                self.last_error = Some(ChannelError::ConnectTimeout.to_string());
                self.heartbeat_at = None;
                self.set_state(ChannelState::Disconnected);
            }
        }
    }

    /// Close the channel and cancel every pending timer.
    ///
    /// A manual disconnect is not a failure: the attempt counter resets.
    pub async fn disconnect(&mut self) {
        self.reconnect_at = None;
        self.heartbeat_at = None;

        if self.transport.is_connected() {
            if let Err(e) = self.transport.disconnect(CLOSE_NORMAL).await {
                debug!(error = %e, "transport close reported an error");
            }
        }

        self.set_state(ChannelState::Disconnected);
        self.attempts = 0;
    }

    /// Manual reconnect: tear down, wait briefly, then connect with a
    /// fresh retry budget.
    pub async fn reconnect(&mut self) {
        self.disconnect().await;
        self.active = true;
        tokio::time::sleep(self.config.reconnect_delay).await;
        self.connect().await;
    }

    /// Exponential backoff: base × 2^(attempt − 1), capped at the max.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.config
            .base_delay
            .saturating_mul(1u32 << exp)
            .min(self.config.max_delay)
    }

    /// Shared close path for peer closes, transport errors, and failed
    /// dials.
    fn handle_close(&mut self, code: u16) {
        self.heartbeat_at = None;
        self.set_state(ChannelState::Disconnected);

        if code == CLOSE_NORMAL || !self.active {
            return;
        }

        if self.attempts >= self.config.max_attempts {
            warn!(attempts = self.attempts, "max reconnection attempts reached");
            self.last_error = Some(ChannelError::MaxAttemptsReached.to_string());
            return;
        }

        self.attempts += 1;
        let delay = self.backoff_delay(self.attempts);
        self.set_state(ChannelState::Reconnecting {
            attempt: self.attempts,
        });
        self.reconnect_at = Some(Instant::now() + delay);
        info!(
            attempt = self.attempts,
            delay_ms = delay.as_millis() as u64,
            "reconnect scheduled"
        );
    }

    /// Submit a telemetry event.
    ///
    /// Returns whether the event was handled immediately; `false` means
    /// it was queued for the next confirmed connection (or, while
    /// connected, that the send failed and was surfaced as a soft
    /// error).
    pub async fn submit(&mut self, event: TelemetryEvent) -> bool {
        if self.state != ChannelState::Connected {
            self.queue.push(event);
            debug!(queued = self.queue.len(), "event queued while channel down");
            return false;
        }
        self.send_event(event).await
    }

    /// Send an already-formed wire message, bypassing encoding.
    ///
    /// Unlike `submit`, raw sends are never queued.
    pub async fn send_raw(&mut self, message: serde_json::Value) -> bool {
        if self.state != ChannelState::Connected {
            warn!("raw send refused: channel not connected");
            return false;
        }
        match self.send_frame(&OutboundFrame::Verbatim(message)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "raw send failed");
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    /// Encode and transmit one event. Local monitoring markers are
    /// acknowledged without transmission.
    async fn send_event(&mut self, event: TelemetryEvent) -> bool {
        let Some(frame) = event.encode(Utc::now()) else {
            return true;
        };
        match self.send_frame(&frame).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "event send failed");
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    async fn send_frame(&mut self, frame: &OutboundFrame) -> ChannelResult<()> {
        let text = frame.to_json()?;
        self.transport.send(text).await?;
        Ok(())
    }

    async fn send_heartbeat(&mut self) {
        let frame = OutboundFrame::Message(OutboundMessage::heartbeat(Utc::now()));
        if let Err(e) = self.send_frame(&frame).await {
            warn!(error = %e, "heartbeat send failed");
            self.last_error = Some(e.to_string());
        }
        self.heartbeat_at = Some(Instant::now() + self.config.heartbeat_interval);
    }

    /// Drain queued events through the encoder in submission order.
    ///
    /// Best-effort: a failed send is logged and draining continues.
    /// Returns the number of events handled.
    pub async fn flush_queue(&mut self) -> usize {
        let events = self.queue.drain();
        if events.is_empty() {
            return 0;
        }
        info!(count = events.len(), "flushing queued events");

        let mut sent = 0;
        for event in events {
            if self.send_event(event).await {
                sent += 1;
            }
        }
        sent
    }

    /// Receive and dispatch the next inbound message.
    ///
    /// Malformed frames are logged and skipped. Returns `None` once the
    /// link has closed, after the close path has run (which may schedule
    /// a reconnect).
    pub async fn recv(&mut self) -> Option<InboundMessage> {
        loop {
            match self.transport.recv().await {
                Ok(Frame::Text(text)) => match InboundMessage::parse(&text) {
                    Ok(msg) => {
                        self.dispatch(&msg).await;
                        return Some(msg);
                    }
                    Err(e) => {
                        warn!(error = %e, "malformed inbound frame");
                        continue;
                    }
                },
                Ok(Frame::Closed { code }) => {
                    info!(code, "channel closed by peer");
                    self.handle_close(code);
                    return None;
                }
                Err(e) => {
                    // The stream is dead after a receive error; no close
                    // event will follow, so run the abnormal-close path.
                    warn!(error = %e, "transport receive failed");
                    self.last_error = Some(e.to_string());
                    self.handle_close(CLOSE_ABNORMAL);
                    return None;
                }
            }
        }
    }

    /// Type-directed dispatch of one parsed inbound message. Every
    /// message lands in the history buffer before its handler runs.
    async fn dispatch(&mut self, msg: &InboundMessage) {
        self.messages.push(msg.clone());

        match msg {
            InboundMessage::ConnectionConfirmed { .. } => {
                info!("connection confirmed by backend");
                self.set_state(ChannelState::Connected);
                self.last_error = None;
                self.attempts = 0;
                self.flush_queue().await;
            }
            InboundMessage::Alert(payload) => {
                let alert = Alert::from_payload(payload.clone(), Utc::now());
                info!(id = %alert.id, kind = %alert.kind, severity = %alert.severity, "alert received");
                self.alerts.push(alert);
            }
            InboundMessage::Command { payload } => {
                // Recorded and surfaced to the caller; no default action.
                debug!(%payload, "command received");
            }
            InboundMessage::HeartbeatAck => {}
            InboundMessage::Error { message } => {
                warn!(%message, "backend reported an error");
                self.last_error = Some(message.clone());
            }
            InboundMessage::Unknown { kind, .. } => {
                warn!(%kind, "unrecognized inbound message type");
            }
        }
    }

    /// The next deadline a driver must wake for, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.heartbeat_at, self.reconnect_at) {
            (Some(h), Some(r)) => Some(h.min(r)),
            (h, r) => h.or(r),
        }
    }

    /// Fire whichever timers are due: a pending backoff reconnect, then
    /// the heartbeat.
    pub async fn run_due_timers(&mut self) {
        let now = Instant::now();

        if self.reconnect_at.is_some_and(|at| at <= now) {
            self.reconnect_at = None;
            self.connect().await;
        }

        if self.state == ChannelState::Connected
            && self.heartbeat_at.is_some_and(|at| at <= now)
        {
            self.send_heartbeat().await;
        }
    }

    /// Drive the channel until it is deactivated or terminally down.
    ///
    /// While connected, awaits inbound traffic with the heartbeat
    /// deadline as a timeout; while reconnecting, sleeps out the backoff
    /// window. Returns when no further work is scheduled.
    pub async fn run(&mut self) {
        loop {
            match self.state {
                ChannelState::Connected => {
                    if let Some(deadline) = self.heartbeat_at {
                        if tokio::time::timeout_at(deadline, self.recv()).await.is_err() {
                            self.send_heartbeat().await;
                        }
                    } else {
                        let _ = self.recv().await;
                    }
                }
                _ => {
                    let Some(at) = self.reconnect_at else {
                        break;
                    };
                    tokio::time::sleep_until(at).await;
                    self.reconnect_at = None;
                    self.connect().await;
                }
            }
        }
    }
}
