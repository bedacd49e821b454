// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugins compiled into the host binary, and the settings it reads.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trellis_config::{ConfigStore, FigmentSource, FileConfigPlugin};
use trellis_core::traits::{
    DynAuthenticationPlugin, DynBackupPlugin, DynExecutionPlugin, DynHookPlugin,
};
use trellis_core::{
    CachePlugin, ChatPlugin, ConfigurationPlugin, FaxPlugin, InitPlugin, LoggingPlugin, Metadata,
    MmsPlugin, PluginKind, SmtpPlugin, StoragePlugin, TrellisError,
};
use trellis_plugin::{ConfigurationCatalog, ConfigurationFactory, Slots};

pub const ENV_INIT_UID: &str = "urn:uuid:5f0c6d1e-8f5b-4a63-9a57-2f4c0e7d2b11";
pub const FILE_CONFIG_UID: &str = "urn:uuid:0b7e3c52-6a1d-4f0e-b8c4-93d27e5a1f68";

/// Host settings, read from the `[host]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    #[serde(default)]
    pub host: HostSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSettings {
    /// Slots activated at startup, in this order; shutdown runs it reversed.
    /// Empty means [`DEFAULT_ACTIVATION_ORDER`].
    pub activation_order: Vec<PluginKind>,

    /// Deployment manifest the assembled context is verified against.
    pub manifest: Option<PathBuf>,

    /// Upper bound on the whole shutdown sequence.
    pub shutdown_timeout_secs: u64,
}

/// Startup order used when `activation_order` is left empty.
pub const DEFAULT_ACTIVATION_ORDER: [PluginKind; 3] = [
    PluginKind::Init,
    PluginKind::Configuration,
    PluginKind::Logging,
];

impl Default for HostSettings {
    // The default order stays out of the tree: arrays default-fill by
    // index, so a shorter configured order would inherit its tail.
    fn default() -> Self {
        Self {
            activation_order: Vec::new(),
            manifest: None,
            shutdown_timeout_secs: 10,
        }
    }
}

impl HostSettings {
    /// The configured activation order, or the default one if none is set.
    pub fn activation_order(&self) -> Vec<PluginKind> {
        if self.activation_order.is_empty() {
            DEFAULT_ACTIVATION_ORDER.to_vec()
        } else {
            self.activation_order.clone()
        }
    }
}

/// The host's context layout: a typed configuration slot, `dyn` contracts
/// everywhere else.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSlots;

impl Slots for HostSlots {
    type Authn = DynAuthenticationPlugin;
    type Backups = DynBackupPlugin;
    type Cache = dyn CachePlugin;
    type Chat = dyn ChatPlugin;
    type Config = dyn ConfigurationPlugin<Config = HostConfig>;
    type Email = dyn SmtpPlugin;
    type Exec = DynExecutionPlugin;
    type Fax = dyn FaxPlugin;
    type Hooks = DynHookPlugin;
    type Log = dyn LoggingPlugin;
    type Mms = dyn MmsPlugin;
    type Store = dyn StoragePlugin;
}

/// Builds a [`FileConfigPlugin`] over the standard file hierarchy.
///
/// Consults the bootstrap value `reload-on-sighup` (default: on).
#[derive(Debug, Clone, Default)]
pub struct FileConfigFactory {
    explicit: Option<PathBuf>,
}

impl FileConfigFactory {
    /// `explicit` is layered above every standard location.
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    pub fn source(&self) -> FigmentSource {
        match &self.explicit {
            Some(path) => FigmentSource::standard().with_file(path.clone()),
            None => FigmentSource::standard(),
        }
    }
}

#[async_trait]
impl ConfigurationFactory<HostConfig> for FileConfigFactory {
    async fn create(
        &self,
        metadata: Metadata,
        init: &dyn InitPlugin,
    ) -> Result<Arc<dyn ConfigurationPlugin<Config = HostConfig>>, TrellisError> {
        if let Some(path) = self.explicit.as_ref().filter(|p| !p.exists()) {
            return Err(TrellisError::not_found(format!(
                "configuration file {}",
                path.display()
            )));
        }

        let watch = match init.get_boolean("reload-on-sighup").await {
            Ok(enabled) => enabled,
            Err(TrellisError::NotFound { .. }) => true,
            Err(e) => return Err(e),
        };

        let store = ConfigStore::new(HostConfig::default(), self.source()).await?;
        Ok(Arc::new(
            FileConfigPlugin::new(metadata, store).with_signal_reload(watch),
        ))
    }
}

/// The configuration plugins this binary can bootstrap.
pub fn catalog(explicit: Option<PathBuf>) -> ConfigurationCatalog<HostConfig> {
    let mut catalog = ConfigurationCatalog::new();
    catalog.register(
        Metadata::new("file-config", "trellis", FILE_CONFIG_UID),
        FileConfigFactory::new(explicit),
    );
    catalog
}

#[cfg(test)]
mod tests {
    use trellis_core::PluginUid;

    use super::*;

    #[test]
    fn catalog_registers_file_config() {
        let catalog = catalog(None);
        assert_eq!(catalog.len(), 1);
        let uid = PluginUid::from(FILE_CONFIG_UID.trim_start_matches("urn:uuid:"));
        let (metadata, _) = catalog.get(&uid).unwrap();
        assert_eq!(metadata.name, "file-config");
    }

    #[test]
    fn explicit_file_is_the_last_layer() {
        let factory = FileConfigFactory::new(Some(PathBuf::from("/tmp/override.toml")));
        let source = factory.source();
        assert_eq!(
            source.files().last().map(PathBuf::as_path),
            Some(std::path::Path::new("/tmp/override.toml"))
        );
    }

    #[test]
    fn host_table_is_optional() {
        let config: HostConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(config, HostConfig::default());
    }
}
