// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog of compiled-in configuration plugins.
//!
//! The init plugin names the configuration plugin to use by uid; the
//! catalog maps that uid to a factory able to construct it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use trellis_core::{ConfigurationPlugin, InitPlugin, Metadata, PluginUid, TrellisError};

/// Constructs a configuration plugin.
///
/// Construction performs the plugin's initial load; a failure is returned
/// as is.
#[async_trait]
pub trait ConfigurationFactory<C: Send + Sync + 'static>: Send + Sync {
    async fn create(
        &self,
        metadata: Metadata,
        init: &dyn InitPlugin,
    ) -> Result<Arc<dyn ConfigurationPlugin<Config = C>>, TrellisError>;
}

struct CatalogEntry<C: Send + Sync + 'static> {
    metadata: Metadata,
    factory: Box<dyn ConfigurationFactory<C>>,
}

/// Configuration plugin factories keyed by uid.
///
/// Lookups compare uids with `uuidcmp`, so `urn:uuid:` prefixes and letter
/// case do not matter.
pub struct ConfigurationCatalog<C: Send + Sync + 'static = serde_json::Value> {
    entries: HashMap<PluginUid, CatalogEntry<C>>,
}

impl<C: Send + Sync + 'static> ConfigurationCatalog<C> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers a factory under `metadata.uid`, replacing any previous
    /// registration for an equal uid.
    pub fn register(
        &mut self,
        metadata: Metadata,
        factory: impl ConfigurationFactory<C> + 'static,
    ) {
        let uid = metadata.uid.clone();
        self.entries.insert(
            uid,
            CatalogEntry {
                metadata,
                factory: Box::new(factory),
            },
        );
    }

    pub fn get(&self, uid: &PluginUid) -> Option<(&Metadata, &dyn ConfigurationFactory<C>)> {
        self.entries
            .get(uid)
            .map(|entry| (&entry.metadata, entry.factory.as_ref()))
    }

    pub fn contains(&self, uid: &PluginUid) -> bool {
        self.entries.contains_key(uid)
    }

    /// Metadata of every registered plugin, sorted by name.
    pub fn list(&self) -> Vec<&Metadata> {
        let mut all: Vec<&Metadata> = self.entries.values().map(|e| &e.metadata).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Send + Sync + 'static> Default for ConfigurationCatalog<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + Sync + 'static> std::fmt::Debug for ConfigurationCatalog<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationCatalog")
            .field("plugins", &self.list())
            .finish()
    }
}
