// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Trellis application host.
//!
//! This crate defines the contracts third-party plugins implement: the
//! identity model every plugin carries, the bistable lifecycle, the
//! [`Plugin`] base trait, and one trait per capability category
//! (authentication, storage, cache, messaging, configuration, logging,
//! execution, hooks, bootstrap). It also ships the [`Lifecycle`] state
//! machine plugin authors embed to get the lifecycle guarantees for free.

pub mod coerce;
pub mod error;
pub mod lifecycle;
pub mod traits;
pub mod types;
pub mod uid;

// Re-export key items at crate root for ergonomic imports.
pub use error::{BoxError, TrellisError};
pub use lifecycle::{Lifecycle, LifecycleState, Transition};
pub use types::{ItemStream, JsonMap, Metadata, PluginKind, Resource, API_VERSION};
pub use uid::{uuidcmp, PluginUid};

// Re-export all plugin traits at crate root.
pub use traits::{
    Activate, AnyContext, AsPlugin, AuthenticationPlugin, BackupPlugin, Bistable, CachePlugin,
    ChatPlugin, ConfigurationPlugin, Deactivate, ExecutionPlugin, FaxPlugin, HookPlugin,
    InitPlugin, LoggingPlugin, MmsPlugin, Plugin, SmtpPlugin, StoragePlugin,
};
