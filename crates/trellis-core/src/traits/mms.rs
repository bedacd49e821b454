// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MMS plugin contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TrellisError;
use crate::traits::plugin::Plugin;

/// A multimedia message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMmsArgs {
    /// Sender number. Backends use their configured number when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    pub body: String,
}

#[async_trait]
pub trait MmsPlugin: Plugin {
    async fn send(&self, args: SendMmsArgs) -> Result<(), TrellisError>;
}
