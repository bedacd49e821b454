// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email (SMTP) plugin contract.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::TrellisError;
use crate::traits::plugin::Plugin;

/// A mailbox: display name plus address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailUser {
    pub display_name: String,
    pub email_address: String,
}

impl EmailUser {
    pub fn new(display_name: impl Into<String>, email_address: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            email_address: email_address.into(),
        }
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
    /// Extra MIME headers for this part.
    pub headers: Option<BTreeMap<String, String>>,
}

/// A message to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendEmailArgs {
    pub from: EmailUser,
    pub reply_to: Option<EmailUser>,
    /// Set when the agent submitting the message differs from `from`.
    pub sender: Option<EmailUser>,
    pub to: Vec<EmailUser>,
    pub cc: Vec<EmailUser>,
    pub bcc: Vec<EmailUser>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl SendEmailArgs {
    /// An empty message from `from`; fill in the remaining fields directly.
    pub fn new(from: EmailUser) -> Self {
        Self {
            from,
            reply_to: None,
            sender: None,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: None,
            text: None,
            html: None,
            attachments: Vec::new(),
        }
    }

    /// All envelope recipients (`to`, `cc` and `bcc`).
    pub fn recipients(&self) -> impl Iterator<Item = &EmailUser> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }
}

/// Delivers email over SMTP.
#[async_trait]
pub trait SmtpPlugin: Plugin {
    async fn send(&self, args: SendEmailArgs) -> Result<(), TrellisError>;
}
