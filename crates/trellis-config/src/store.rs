// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration protocol engine.
//!
//! [`ConfigStore`] keeps a complete, immutable `defaults` snapshot and the
//! current `values` snapshot. Readers load `values` through `arc-swap` and
//! never lock. Writers are serialized: each pass default-fills the loaded
//! tree, deserializes it, swaps the new snapshot in whole, bumps the
//! generation, then notifies subscribers synchronously.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use trellis_core::traits::configuration::{ConfigEvent, Listener, ListenerId};
use trellis_core::TrellisError;

use crate::loader::ConfigSource;
use crate::merge;

/// Types usable as a configuration snapshot.
pub trait ConfigShape: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> ConfigShape for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Defaults, current snapshot, and subscribers of one configuration.
pub struct ConfigStore<C> {
    defaults: Arc<C>,
    defaults_tree: Value,
    values: ArcSwap<C>,
    source: Box<dyn ConfigSource>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    generation: AtomicU64,
    write_gate: tokio::sync::Mutex<()>,
}

impl<C: ConfigShape> ConfigStore<C> {
    /// Creates the store and performs the initial load.
    ///
    /// A failing initial load is returned to the caller; there is no
    /// snapshot to fall back to yet.
    pub async fn new(
        defaults: C,
        source: impl ConfigSource + 'static,
    ) -> Result<Self, TrellisError> {
        let defaults_tree = serde_json::to_value(&defaults)
            .map_err(|e| TrellisError::Config(format!("defaults are not serializable: {e}")))?;
        let defaults = Arc::new(defaults);
        let store = Self {
            values: ArcSwap::new(defaults.clone()),
            defaults,
            defaults_tree,
            source: Box::new(source),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            generation: AtomicU64::new(0),
            write_gate: tokio::sync::Mutex::new(()),
        };
        store.load().await?;
        Ok(store)
    }

    /// Reads the source and publishes a new snapshot.
    ///
    /// Returns the generation of the published snapshot. On failure the
    /// previous snapshot stays in place and no event is emitted.
    pub async fn load(&self) -> Result<u64, TrellisError> {
        let _writer = self.write_gate.lock().await;
        debug!(source = %self.source.describe(), "loading configuration");
        let loaded = self.source.read().await.inspect_err(|err| {
            warn!(error = %err, "configuration source unreadable, keeping previous values");
        })?;
        self.apply(loaded)
    }

    /// Default-fills `loaded` and publishes it as the new snapshot.
    ///
    /// For embedders that fetch configuration trees themselves; `load` is
    /// this plus a read from the source.
    pub async fn update_values(&self, loaded: Value) -> Result<u64, TrellisError> {
        let _writer = self.write_gate.lock().await;
        self.apply(loaded)
    }

    fn apply(&self, loaded: Value) -> Result<u64, TrellisError> {
        let config: C = merge::resolve(&self.defaults_tree, loaded).map_err(|err| {
            let err = err.with_sources(&self.source.documents());
            warn!(error = %err, "configuration rejected, keeping previous values");
            TrellisError::from(err)
        })?;

        self.values.store(Arc::new(config));
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(generation, "configuration loaded");
        self.notify(&ConfigEvent::Loaded { generation });
        Ok(generation)
    }

    /// The configuration composed entirely of default values.
    pub fn defaults(&self) -> Arc<C> {
        self.defaults.clone()
    }

    /// The current snapshot.
    pub fn values(&self) -> Arc<C> {
        self.values.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Pretty-printed JSON of the current snapshot, for diagnostics.
    pub fn dump(&self) -> Result<String, TrellisError> {
        let values = self.values.load_full();
        serde_json::to_string_pretty(values.as_ref())
            .map_err(|e| TrellisError::Internal(format!("cannot serialize configuration: {e}")))
    }

    pub fn subscribe(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.lock_listeners().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Number of current subscribers.
    pub fn subscribers(&self) -> usize {
        self.lock_listeners().len()
    }

    // Dispatches from a snapshot of the list so listeners may
    // (un)subscribe from inside the callback.
    fn notify(&self, event: &ConfigEvent) {
        let snapshot: Vec<Listener> = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> std::fmt::Debug for ConfigStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("source", &self.source.describe())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
