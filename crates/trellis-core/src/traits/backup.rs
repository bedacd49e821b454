// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backup plugin contract.

use async_trait::async_trait;

use crate::error::TrellisError;
use crate::traits::plugin::Plugin;
use crate::types::{ItemStream, JsonMap};

/// Creates and restores application backups.
#[async_trait]
pub trait BackupPlugin: Plugin {
    type BackupArgs: Send + 'static;
    type RestoreArgs: Send + 'static;
    type HistoryItem: Send + 'static;

    async fn create(&self, args: Self::BackupArgs) -> Result<(), TrellisError>;

    async fn restore(&self, args: Self::RestoreArgs) -> Result<(), TrellisError>;

    /// Lazily lists past backups.
    fn history(&self) -> ItemStream<Self::HistoryItem>;
}

/// Backup plugin over JSON values; the default slot type.
pub type DynBackupPlugin =
    dyn BackupPlugin<BackupArgs = JsonMap, RestoreArgs = JsonMap, HistoryItem = JsonMap>;
