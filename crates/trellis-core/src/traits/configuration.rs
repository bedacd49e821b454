// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration plugin contract.
//!
//! A configuration plugin owns two snapshots: `defaults`, complete and
//! immutable, and `values`, the effective configuration. Every load fills
//! whatever the source left out from `defaults` and replaces `values` in a
//! single swap, then notifies subscribers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TrellisError;
use crate::traits::plugin::Plugin;

/// Notification emitted by a configuration plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEvent {
    /// A load replaced `values`. `generation` counts completed loads.
    Loaded { generation: u64 },
}

/// Handle returned by [`ConfigurationPlugin::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked synchronously after each snapshot swap.
pub type Listener = Arc<dyn Fn(&ConfigEvent) + Send + Sync>;

/// Loads application configuration and publishes it as atomic snapshots.
#[async_trait]
pub trait ConfigurationPlugin: Plugin {
    type Config: Send + Sync + 'static;

    /// The configuration composed entirely of default values.
    fn defaults(&self) -> Arc<Self::Config>;

    /// The current snapshot. Only the plugin's own `load` writes it.
    fn values(&self) -> Arc<Self::Config>;

    /// Number of loads completed so far.
    fn generation(&self) -> u64;

    /// Loads (or reloads) configuration from the plugin's source.
    ///
    /// On failure the previous snapshot stays in place.
    async fn load(&self) -> Result<(), TrellisError>;

    /// Serializes the current `values` for diagnostics.
    ///
    /// Never read configuration from this.
    fn dump(&self) -> Result<String, TrellisError>;

    fn subscribe(&self, listener: Listener) -> ListenerId;

    /// Returns false if `id` was not subscribed.
    fn unsubscribe(&self, id: ListenerId) -> bool;
}

/// Configuration plugin over an untyped JSON tree; the default slot type.
pub type DynConfigurationPlugin = dyn ConfigurationPlugin<Config = serde_json::Value>;
