// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bootstrap (init) plugin contract.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::TrellisError;
use crate::traits::plugin::Plugin;
use crate::uid::PluginUid;

/// Supplies just enough information to locate and activate the
/// configuration plugin.
///
/// Unlike every other category, an init plugin needs no prior
/// configuration: everything it returns must be resolvable the moment the
/// process starts, and the choice of implementation is fixed at build time.
/// Implementations may expose further bootstrap values (a configuration URL,
/// a decryption passphrase, ...) through the typed getters.
#[async_trait]
pub trait InitPlugin: Plugin {
    /// Missing keys fail with `NotFound`, unrecognized values with `Config`.
    async fn get_boolean(&self, key: &str) -> Result<bool, TrellisError>;

    async fn get_number(&self, key: &str) -> Result<f64, TrellisError>;

    async fn get_string(&self, key: &str) -> Result<String, TrellisError>;

    /// Local filesystem path where plugin implementations live.
    fn plugins_directory(&self) -> PathBuf;

    /// Identifier (usually a `urn:uuid:`) of the configuration plugin to activate.
    fn configuration_plugin(&self) -> PluginUid;
}
