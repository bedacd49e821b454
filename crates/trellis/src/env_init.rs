// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Init plugin backed by `TRELLIS_*` environment variables.
//!
//! Keys map to variables by upper-casing and replacing `.` and `-` with
//! `_`: `get_boolean("reload-on-sighup")` reads `TRELLIS_RELOAD_ON_SIGHUP`.
//! The environment is captured once, at construction.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use trellis_core::coerce::{to_bootstrap_boolean, to_number};
use trellis_core::{
    Activate, AnyContext, Deactivate, InitPlugin, Lifecycle, Metadata, Plugin, PluginKind,
    PluginUid, TrellisError, API_VERSION,
};

use crate::builtin::{ENV_INIT_UID, FILE_CONFIG_UID};

/// Prefix of every bootstrap variable.
pub const ENV_PREFIX: &str = "TRELLIS_";

/// Reads bootstrap values from the process environment.
#[derive(Debug)]
pub struct EnvInit {
    metadata: Metadata,
    lifecycle: Lifecycle,
    vars: HashMap<String, String>,
}

impl EnvInit {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Keeps the `TRELLIS_`-prefixed entries of `vars`.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let vars = vars
            .into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PREFIX)
                    .map(|rest| (rest.to_ascii_lowercase(), value))
            })
            .collect();
        Self {
            metadata: Metadata::new("env-init", "trellis", ENV_INIT_UID),
            lifecycle: Lifecycle::new("env-init"),
            vars,
        }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        let normalized = key.to_ascii_lowercase().replace(['.', '-'], "_");
        self.vars.get(&normalized).map(String::as_str)
    }

    fn require(&self, key: &str) -> Result<&str, TrellisError> {
        self.lookup(key).ok_or_else(|| {
            TrellisError::not_found(format!("bootstrap value `{key}` ({ENV_PREFIX}{})", env_name(key)))
        })
    }
}

fn env_name(key: &str) -> String {
    key.to_ascii_uppercase().replace(['.', '-'], "_")
}

#[async_trait]
impl Activate for EnvInit {
    async fn activate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.lifecycle
            .activate(|| async { Ok::<_, TrellisError>(()) })
            .await
    }

    async fn is_activated(&self) -> bool {
        self.lifecycle.is_activated()
    }
}

#[async_trait]
impl Deactivate for EnvInit {
    async fn deactivate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.lifecycle
            .deactivate(|| async { Ok::<_, TrellisError>(()) })
            .await
    }

    async fn is_deactivated(&self) -> bool {
        self.lifecycle.is_deactivated()
    }
}

impl Plugin for EnvInit {
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
impl InitPlugin for EnvInit {
    async fn get_boolean(&self, key: &str) -> Result<bool, TrellisError> {
        let raw = self.require(key)?;
        to_bootstrap_boolean(raw)
            .ok_or_else(|| TrellisError::Config(format!("`{key}` is not a boolean: {raw:?}")))
    }

    async fn get_number(&self, key: &str) -> Result<f64, TrellisError> {
        let raw = self.require(key)?;
        to_number(raw)
            .ok_or_else(|| TrellisError::Config(format!("`{key}` is not a number: {raw:?}")))
    }

    async fn get_string(&self, key: &str) -> Result<String, TrellisError> {
        self.require(key).map(str::to_owned)
    }

    /// `TRELLIS_PLUGINS_DIR`, else `<data dir>/trellis/plugins`.
    fn plugins_directory(&self) -> PathBuf {
        match self.lookup("plugins_dir") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|d| d.join("trellis/plugins"))
                .unwrap_or_else(|| PathBuf::from("plugins")),
        }
    }

    /// `TRELLIS_CONFIGURATION_PLUGIN`, else the built-in file configuration.
    fn configuration_plugin(&self) -> PluginUid {
        self.lookup("configuration_plugin")
            .map(PluginUid::from)
            .unwrap_or_else(|| PluginUid::from(FILE_CONFIG_UID))
    }
}
