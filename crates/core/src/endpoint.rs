// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Channel endpoint resolution.

use crate::identity::Identity;

/// Where the proctoring backend lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Backend host, including port if non-default.
    pub host: String,
    /// Use `wss` instead of `ws`, matching the hosting page's scheme.
    pub secure: bool,
}

impl Endpoint {
    /// Creates an endpoint for the given host.
    pub fn new(host: impl Into<String>, secure: bool) -> Self {
        Endpoint {
            host: host.into(),
            secure,
        }
    }

    /// Resolves the channel URL for the given identity.
    pub fn url(&self, identity: &Identity) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!(
            "{scheme}://{}/api/proctoring/ws/{}?user_id={}",
            self.host, identity.session_id, identity.user_id
        )
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
