// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the transport module, plus the mock transport shared by the
//! channel test suite.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::transport::{
    Frame, Transport, TransportError, TransportResult, WebSocketTransport, CLOSE_NORMAL,
};

/// Shared view into a [`MockTransport`], usable after the transport has
/// been moved into a client.
#[derive(Clone)]
pub struct MockHandle {
    incoming: Arc<Mutex<VecDeque<TransportResult<Frame>>>>,
    outgoing: Arc<Mutex<Vec<String>>>,
    connects: Arc<Mutex<u32>>,
    connect_failures: Arc<Mutex<u32>>,
    close_codes: Arc<Mutex<Vec<u16>>>,
    fail_sends: Arc<Mutex<bool>>,
    stall_connects: Arc<Mutex<bool>>,
}

impl MockHandle {
    /// Queue a frame that will be returned by recv().
    pub fn queue_incoming(&self, frame: Frame) {
        self.incoming.lock().unwrap().push_back(Ok(frame));
    }

    /// Queue a raw text frame.
    pub fn queue_text(&self, json: &str) {
        self.queue_incoming(Frame::Text(json.to_string()));
    }

    /// Queue a receive error.
    pub fn queue_recv_error(&self, error: TransportError) {
        self.incoming.lock().unwrap().push_back(Err(error));
    }

    /// All text frames sent so far.
    pub fn sent(&self) -> Vec<String> {
        self.outgoing.lock().unwrap().clone()
    }

    /// All sent frames, parsed as JSON.
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }

    /// How many times connect() was called.
    pub fn connect_count(&self) -> u32 {
        *self.connects.lock().unwrap()
    }

    /// Make the next `n` connect attempts fail.
    pub fn fail_next_connects(&self, n: u32) {
        *self.connect_failures.lock().unwrap() = n;
    }

    /// Close codes passed to disconnect(), in order.
    pub fn close_codes(&self) -> Vec<u16> {
        self.close_codes.lock().unwrap().clone()
    }

    /// Make every send fail until reset.
    pub fn set_fail_sends(&self, fail: bool) {
        *self.fail_sends.lock().unwrap() = fail;
    }

    /// Make connect attempts hang forever until reset.
    pub fn set_stall_connects(&self, stall: bool) {
        *self.stall_connects.lock().unwrap() = stall;
    }
}

/// Mock transport for testing without real sockets.
///
/// When the incoming queue runs dry, recv() reports a normal close.
pub struct MockTransport {
    connected: bool,
    handle: MockHandle,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            connected: false,
            handle: MockHandle {
                incoming: Arc::new(Mutex::new(VecDeque::new())),
                outgoing: Arc::new(Mutex::new(Vec::new())),
                connects: Arc::new(Mutex::new(0)),
                connect_failures: Arc::new(Mutex::new(0)),
                close_codes: Arc::new(Mutex::new(Vec::new())),
                fail_sends: Arc::new(Mutex::new(false)),
                stall_connects: Arc::new(Mutex::new(false)),
            },
        }
    }

    /// A handle that stays usable after the transport moves into a
    /// client.
    pub fn handle(&self) -> MockHandle {
        self.handle.clone()
    }
}

impl Transport for MockTransport {
    fn connect(
        &mut self,
        _url: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = TransportResult<()>> + Send + '_>>
    {
        Box::pin(async move {
            *self.handle.connects.lock().unwrap() += 1;
            let stall = *self.handle.stall_connects.lock().unwrap();
            if stall {
                std::future::pending::<()>().await;
            }
            let mut failures = self.handle.connect_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                Err(TransportError::ConnectionFailed("mock refused".into()))
            } else {
                self.connected = true;
                Ok(())
            }
        })
    }

    fn disconnect(
        &mut self,
        code: u16,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = TransportResult<()>> + Send + '_>>
    {
        Box::pin(async move {
            self.handle.close_codes.lock().unwrap().push(code);
            self.connected = false;
            Ok(())
        })
    }

    fn send(
        &mut self,
        text: String,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = TransportResult<()>> + Send + '_>>
    {
        Box::pin(async move {
            if *self.handle.fail_sends.lock().unwrap() {
                return Err(TransportError::SendFailed("mock send failure".into()));
            }
            self.handle.outgoing.lock().unwrap().push(text);
            Ok(())
        })
    }

    fn recv(
        &mut self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = TransportResult<Frame>> + Send + '_>>
    {
        Box::pin(async move {
            let next = self.handle.incoming.lock().unwrap().pop_front();
            match next {
                Some(Ok(Frame::Closed { code })) => {
                    self.connected = false;
                    Ok(Frame::Closed { code })
                }
                Some(Ok(frame)) => Ok(frame),
                Some(Err(e)) => {
                    self.connected = false;
                    Err(e)
                }
                None => {
                    self.connected = false;
                    Ok(Frame::Closed { code: CLOSE_NORMAL })
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[tokio::test]
async fn test_mock_transport_connect() {
    let mut transport = MockTransport::new();
    assert!(!transport.is_connected());

    transport.connect("ws://backend.test").await.unwrap();
    assert!(transport.is_connected());
    assert_eq!(transport.handle().connect_count(), 1);

    transport.disconnect(CLOSE_NORMAL).await.unwrap();
    assert!(!transport.is_connected());
    assert_eq!(transport.handle().close_codes(), vec![CLOSE_NORMAL]);
}

#[tokio::test]
async fn test_mock_transport_send_recv() {
    let mut transport = MockTransport::new();
    let handle = transport.handle();
    transport.connect("ws://backend.test").await.unwrap();

    transport.send(r#"{"type":"heartbeat"}"#.to_string()).await.unwrap();
    assert_eq!(handle.sent(), vec![r#"{"type":"heartbeat"}"#.to_string()]);

    handle.queue_text(r#"{"type":"heartbeat_ack"}"#);
    let frame = transport.recv().await.unwrap();
    assert_eq!(frame, Frame::Text(r#"{"type":"heartbeat_ack"}"#.to_string()));

    // Queue exhausted: normal close.
    let frame = transport.recv().await.unwrap();
    assert_eq!(frame, Frame::Closed { code: CLOSE_NORMAL });
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn test_cancelled_recv_keeps_the_connection() {
    // A server that completes the handshake and then stays quiet, as a
    // healthy but idle backend would.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let _ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let mut transport = WebSocketTransport::new();
    transport.connect(&format!("ws://{addr}")).await.unwrap();
    assert!(transport.is_connected());

    // The receive future is dropped when the quiet interval elapses; the
    // connection must survive so the heartbeat can go out on it.
    let recv = tokio::time::timeout(Duration::from_millis(100), transport.recv()).await;
    assert!(recv.is_err());
    assert!(transport.is_connected());

    transport
        .send(r#"{"type":"heartbeat"}"#.to_string())
        .await
        .unwrap();
    assert!(transport.is_connected());

    server.abort();
}

#[tokio::test]
async fn test_mock_transport_connect_fail() {
    let mut transport = MockTransport::new();
    transport.handle().fail_next_connects(1);

    assert!(transport.connect("ws://backend.test").await.is_err());
    assert!(!transport.is_connected());

    // The failure budget is spent; the next attempt succeeds.
    transport.connect("ws://backend.test").await.unwrap();
    assert!(transport.is_connected());
}
