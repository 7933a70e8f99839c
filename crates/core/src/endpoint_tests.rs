// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for endpoint resolution.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;

#[test]
fn test_insecure_url() {
    let endpoint = Endpoint::new("localhost:8000", false);
    let identity = Identity::new("sess-42", "user-7");
    assert_eq!(
        endpoint.url(&identity),
        "ws://localhost:8000/api/proctoring/ws/sess-42?user_id=user-7"
    );
}

#[test]
fn test_secure_url() {
    let endpoint = Endpoint::new("exam.example.com", true);
    let identity = Identity::new("s", "u");
    assert_eq!(
        endpoint.url(&identity),
        "wss://exam.example.com/api/proctoring/ws/s?user_id=u"
    );
}
