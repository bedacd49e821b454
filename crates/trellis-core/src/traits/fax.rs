// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fax plugin contract.

use async_trait::async_trait;

use crate::error::TrellisError;
use crate::traits::plugin::Plugin;

/// A fax transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendFaxArgs {
    /// Destination number.
    pub to: String,
    /// Documents to transmit, in order.
    pub contents: Vec<Vec<u8>>,
    pub header_text: Option<String>,
}

#[async_trait]
pub trait FaxPlugin: Plugin {
    async fn send(&self, args: SendFaxArgs) -> Result<(), TrellisError>;
}
