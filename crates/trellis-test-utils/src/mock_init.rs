// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bootstrap plugin backed by an in-memory string map.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use trellis_core::coerce::{to_bootstrap_boolean, to_number};
use trellis_core::{
    Activate, AnyContext, Deactivate, InitPlugin, Metadata, Plugin, PluginKind, PluginUid,
    TrellisError, API_VERSION,
};

use crate::probe::Probe;

/// An init plugin whose bootstrap values are set by the test.
#[derive(Debug)]
pub struct MockInit {
    metadata: Metadata,
    probe: Probe,
    values: HashMap<String, String>,
    plugins_directory: PathBuf,
    configuration_plugin: PluginUid,
}

impl MockInit {
    /// Selects the configuration plugin `uid`; plugins live in `./plugins`.
    pub fn new(configuration_plugin: impl Into<PluginUid>) -> Self {
        Self {
            metadata: Metadata::generate("mock-init", "test"),
            probe: Probe::new("init"),
            values: HashMap::new(),
            plugins_directory: PathBuf::from("plugins"),
            configuration_plugin: configuration_plugin.into(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_plugins_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugins_directory = dir.into();
        self
    }

    pub fn with_probe(mut self, probe: Probe) -> Self {
        self.probe = probe;
        self
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    fn raw(&self, key: &str) -> Result<&str, TrellisError> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| TrellisError::not_found(format!("bootstrap value `{key}`")))
    }
}

#[async_trait]
impl Activate for MockInit {
    async fn activate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.probe.activate().await
    }

    async fn is_activated(&self) -> bool {
        self.probe.lifecycle().is_activated()
    }
}

#[async_trait]
impl Deactivate for MockInit {
    async fn deactivate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.probe.deactivate().await
    }

    async fn is_deactivated(&self) -> bool {
        self.probe.lifecycle().is_deactivated()
    }
}

impl Plugin for MockInit {
    fn api_version(&self) -> &str {
        API_VERSION
    }

    fn kind(&self) -> PluginKind {
        PluginKind::Init
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

#[async_trait]
impl InitPlugin for MockInit {
    async fn get_boolean(&self, key: &str) -> Result<bool, TrellisError> {
        let raw = self.raw(key)?;
        to_bootstrap_boolean(raw)
            .ok_or_else(|| TrellisError::Config(format!("`{key}` is not a boolean: {raw:?}")))
    }

    async fn get_number(&self, key: &str) -> Result<f64, TrellisError> {
        let raw = self.raw(key)?;
        to_number(raw)
            .ok_or_else(|| TrellisError::Config(format!("`{key}` is not a number: {raw:?}")))
    }

    async fn get_string(&self, key: &str) -> Result<String, TrellisError> {
        self.raw(key).map(str::to_owned)
    }

    fn plugins_directory(&self) -> PathBuf {
        self.plugins_directory.clone()
    }

    fn configuration_plugin(&self) -> PluginUid {
        self.configuration_plugin.clone()
    }
}
