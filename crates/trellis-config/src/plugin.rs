// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A ready-to-use configuration plugin over a [`ConfigStore`].

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use trellis_core::traits::configuration::{Listener, ListenerId};
use trellis_core::{
    Activate, AnyContext, ConfigurationPlugin, Deactivate, Lifecycle, Metadata, Plugin,
    PluginKind, TrellisError, API_VERSION,
};

use crate::reload::{sighup_triggers, spawn_reload_task, Reload};
use crate::store::{ConfigShape, ConfigStore};

type Watcher = (CancellationToken, JoinHandle<()>);

/// Configuration plugin that reloads on `SIGHUP` while active.
pub struct FileConfigPlugin<C: ConfigShape> {
    metadata: Metadata,
    lifecycle: Lifecycle,
    store: Arc<ConfigStore<C>>,
    watch_signals: bool,
    watcher: Mutex<Option<Watcher>>,
}

impl<C: ConfigShape> FileConfigPlugin<C> {
    /// Wraps an already loaded store. Signal reloads are on by default.
    pub fn new(metadata: Metadata, store: ConfigStore<C>) -> Self {
        Self {
            lifecycle: Lifecycle::new(metadata.name.clone()),
            metadata,
            store: Arc::new(store),
            watch_signals: true,
            watcher: Mutex::new(None),
        }
    }

    pub fn with_signal_reload(mut self, enabled: bool) -> Self {
        self.watch_signals = enabled;
        self
    }

    pub fn store(&self) -> &Arc<ConfigStore<C>> {
        &self.store
    }

    fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[async_trait]
impl<C: ConfigShape> Activate for FileConfigPlugin<C> {
    async fn activate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.lifecycle
            .activate(|| async {
                if self.watch_signals {
                    let triggers = sighup_triggers()?;
                    let token = CancellationToken::new();
                    let target: Arc<dyn Reload> = self.store.clone();
                    let handle = spawn_reload_task(triggers, target, token.clone());
                    *self.watcher.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some((token, handle));
                }
                Ok::<_, TrellisError>(())
            })
            .await
    }

    async fn is_activated(&self) -> bool {
        self.lifecycle.is_activated()
    }
}

#[async_trait]
impl<C: ConfigShape> Deactivate for FileConfigPlugin<C> {
    async fn deactivate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.lifecycle
            .deactivate(|| async {
                let watcher = self
                    .watcher
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                if let Some((token, handle)) = watcher {
                    token.cancel();
                    handle
                        .await
                        .map_err(|e| TrellisError::Internal(format!("reload watcher: {e}")))?;
                }
                Ok::<_, TrellisError>(())
            })
            .await
    }

    async fn is_deactivated(&self) -> bool {
        self.lifecycle.is_deactivated()
    }
}

impl<C: ConfigShape> Plugin for FileConfigPlugin<C> {
    fn api_version(&self) -> &str {
        API_VERSION
    }

    fn kind(&self) -> PluginKind {
        PluginKind::Configuration
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

#[async_trait]
impl<C: ConfigShape> ConfigurationPlugin for FileConfigPlugin<C> {
    type Config = C;

    fn defaults(&self) -> Arc<C> {
        self.store.defaults()
    }

    fn values(&self) -> Arc<C> {
        self.store.values()
    }

    fn generation(&self) -> u64 {
        self.store.generation()
    }

    async fn load(&self) -> Result<(), TrellisError> {
        self.store.load().await.map(|_| ())
    }

    fn dump(&self) -> Result<String, TrellisError> {
        self.store.dump()
    }

    fn subscribe(&self, listener: Listener) -> ListenerId {
        self.store.subscribe(listener)
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        self.store.unsubscribe(id)
    }
}

impl<C: ConfigShape> std::fmt::Debug for FileConfigPlugin<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigPlugin")
            .field("name", &self.metadata.name)
            .field("lifecycle", &self.lifecycle)
            .field("watching", &self.is_watching())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use trellis_core::traits::DynConfigurationPlugin;

    use super::*;
    use crate::loader::ConfigSource;

    struct Empty;

    #[async_trait]
    impl ConfigSource for Empty {
        fn describe(&self) -> String {
            "empty".into()
        }

        async fn read(&self) -> Result<Value, TrellisError> {
            Ok(Value::Null)
        }
    }

    async fn plugin() -> FileConfigPlugin<Value> {
        let store = ConfigStore::new(json!({ "motd": "hello" }), Empty).await.unwrap();
        FileConfigPlugin::new(Metadata::new("file-config", "test", "urn:uuid:c0"), store)
    }

    #[tokio::test]
    async fn watcher_runs_only_while_active() {
        let plugin = plugin().await;
        assert!(!plugin.is_watching());

        plugin.activate(None).await.unwrap();
        assert!(plugin.is_watching());

        plugin.deactivate(None).await.unwrap();
        assert!(!plugin.is_watching());
        assert!(plugin.is_deactivated().await);
    }

    #[tokio::test]
    async fn signal_reload_can_be_disabled() {
        let plugin = plugin().await.with_signal_reload(false);
        plugin.activate(None).await.unwrap();
        assert!(!plugin.is_watching());
        assert!(plugin.is_activated().await);
    }

    #[tokio::test]
    async fn fills_the_default_configuration_slot() {
        let plugin: Arc<DynConfigurationPlugin> = Arc::new(plugin().await);
        assert_eq!(plugin.kind(), PluginKind::Configuration);
        assert_eq!(plugin.values()["motd"], "hello");

        plugin.load().await.unwrap();
        assert_eq!(plugin.generation(), 2);
    }
}
