// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the channel's WebSocket link.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing
//!
//! Unlike the message-typed layers above it, the transport deals in raw
//! JSON text frames; close codes are surfaced so the client can tell a
//! normal shutdown from an abnormal drop.

use std::future::Future;
use std::pin::Pin;

/// Close code for a normal, caller-initiated shutdown.
pub const CLOSE_NORMAL: u16 = 1000;

/// Close code reported when the link drops without a close handshake.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// One delivery from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A text frame carrying a JSON message.
    Text(String),
    /// The link closed with the given close code. Terminal for this
    /// connection instance.
    Closed { code: u16 },
}

/// Transport trait for WebSocket-like communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync {
    /// Connect to the backend.
    fn connect(
        &mut self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Close the link with the given close code.
    fn disconnect(
        &mut self,
        code: u16,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Send a text frame.
    fn send(
        &mut self,
        text: String,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;

    /// Receive the next frame.
    fn recv(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<Frame>> + Send + '_>>;

    /// Check if connected.
    fn is_connected(&self) -> bool;
}

/// WebSocket transport implementation using tokio-tungstenite.
pub struct WebSocketTransport {
    /// The WebSocket connection, if connected.
    ws: Option<WebSocketConnection>,
}

/// Internal WebSocket connection wrapper.
struct WebSocketConnection {
    sink: futures_util::stream::SplitSink<
        tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
        tokio_tungstenite::tungstenite::Message,
    >,
    stream: futures_util::stream::SplitStream<
        tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    >,
}

impl WebSocketTransport {
    /// Create a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport { ws: None }
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn connect(
        &mut self,
        url: &str,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        let url = url.to_string();
        Box::pin(async move {
            use futures_util::StreamExt;

            let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            self.ws = Some(WebSocketConnection { sink, stream });
            Ok(())
        })
    }

    fn disconnect(
        &mut self,
        code: u16,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            if let Some(mut ws) = self.ws.take() {
                use futures_util::SinkExt;
                use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
                use tokio_tungstenite::tungstenite::protocol::CloseFrame;
                use tokio_tungstenite::tungstenite::Message;

                let frame = CloseFrame {
                    code: CloseCode::from(code),
                    reason: "".into(),
                };
                let _ = ws.sink.send(Message::Close(Some(frame))).await;
                let _ = ws.sink.close().await;
            }
            Ok(())
        })
    }

    fn send(
        &mut self,
        text: String,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::SinkExt;
            use tokio_tungstenite::tungstenite::Message;

            // Dropping this future mid-await must not lose the
            // connection, so the slot is cleared only once a send has
            // actually failed.
            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            let result = match ws.sink.send(Message::Text(text.into())).await {
                // Flush to ensure the data is actually sent and we detect
                // connection failures
                Ok(()) => ws.sink.flush().await,
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                // Connection is broken, clear it
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }
            Ok(())
        })
    }

    fn recv(&mut self) -> Pin<Box<dyn Future<Output = TransportResult<Frame>> + Send + '_>> {
        Box::pin(async move {
            use futures_util::StreamExt;
            use tokio_tungstenite::tungstenite::Message;

            // Callers await this under the heartbeat deadline, which
            // drops the future on a quiet interval; the connection must
            // survive that, so the slot is cleared only on the terminal
            // arms below.
            let outcome = loop {
                let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;
                match ws.stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return Ok(Frame::Text(text.to_string()));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        // A close without a code carries no status; treat
                        // it as abnormal so the retry policy applies.
                        let code = frame
                            .map(|f| u16::from(f.code))
                            .unwrap_or(CLOSE_ABNORMAL);
                        break Ok(Frame::Closed { code });
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        // Ignore ping/pong, continue waiting
                        continue;
                    }
                    Some(Ok(_)) => {
                        // Ignore other message types
                        continue;
                    }
                    Some(Err(e)) => {
                        break Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                    None => {
                        // Stream ended without a close handshake
                        break Ok(Frame::Closed {
                            code: CLOSE_ABNORMAL,
                        });
                    }
                }
            };

            self.ws = None;
            outcome
        })
    }

    fn is_connected(&self) -> bool {
        self.ws.is_some()
    }
}
