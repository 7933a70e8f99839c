// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session/user identity a channel is opened under.

use serde::{Deserialize, Serialize};

/// Identity for one channel instance.
///
/// Immutable for the lifetime of a channel: changing either field means
/// tearing down the current channel and opening a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The proctored session being observed.
    pub session_id: String,
    /// The user under observation.
    pub user_id: String,
}

impl Identity {
    /// Creates an identity from its two components.
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Identity {
            session_id: session_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Both ids must be non-empty before a connection attempt is allowed.
    pub fn is_complete(&self) -> bool {
        !self.session_id.is_empty() && !self.user_id.is_empty()
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
