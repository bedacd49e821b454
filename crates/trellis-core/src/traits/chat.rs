// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat plugin contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TrellisError;
use crate::traits::plugin::Plugin;

/// A chat message to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendChatArgs {
    /// Target room. Backends fall back to their default room when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub text: String,
}

/// Posts messages to a chat service.
#[async_trait]
pub trait ChatPlugin: Plugin {
    async fn send(&self, args: SendChatArgs) -> Result<(), TrellisError>;
}
