// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin contract definitions.
//!
//! Every category contract extends the [`Plugin`] base trait and uses
//! `#[async_trait]` for dynamic dispatch compatibility. Category-specific
//! setup belongs in `activate`, never in category operations.

pub mod auth;
pub mod backup;
pub mod cache;
pub mod chat;
pub mod configuration;
pub mod email;
pub mod execution;
pub mod fax;
pub mod hook;
pub mod init;
pub mod lifecycle;
pub mod logging;
pub mod mms;
pub mod plugin;
pub mod storage;

// Re-export all traits at the traits module level for convenience.
pub use auth::{AuthenticationPlugin, DynAuthenticationPlugin};
pub use backup::{BackupPlugin, DynBackupPlugin};
pub use cache::CachePlugin;
pub use chat::ChatPlugin;
pub use configuration::{ConfigurationPlugin, DynConfigurationPlugin};
pub use email::SmtpPlugin;
pub use execution::{DynExecutionPlugin, ExecutionPlugin};
pub use fax::FaxPlugin;
pub use hook::{DynHookPlugin, HookPlugin};
pub use init::InitPlugin;
pub use lifecycle::{Activate, Bistable, Deactivate};
pub use logging::LoggingPlugin;
pub use mms::MmsPlugin;
pub use plugin::{AnyContext, AsPlugin, Plugin};
pub use storage::StoragePlugin;
