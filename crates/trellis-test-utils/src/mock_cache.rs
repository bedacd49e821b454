// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock cache plugin for deterministic testing.
//!
//! Expiry is measured on tokio time, so tests can step past a lifetime with
//! a paused clock instead of sleeping.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use trellis_core::{
    Activate, AnyContext, CachePlugin, Deactivate, Metadata, Plugin, PluginKind, TrellisError,
    API_VERSION,
};

use crate::probe::Probe;

type Entry = (String, Option<Instant>);

/// In-memory cache. Operations fail with `Unavailable` unless active;
/// deactivation drops every entry.
#[derive(Debug)]
pub struct MockCache {
    metadata: Metadata,
    probe: Probe,
    entries: Mutex<HashMap<String, Entry>>,
}

impl MockCache {
    pub fn new() -> Self {
        Self {
            metadata: Metadata::generate("mock-cache", "test"),
            probe: Probe::new("cache"),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_probe(mut self, probe: Probe) -> Self {
        self.probe = probe;
        self
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_active(&self) -> Result<(), TrellisError> {
        if self.probe.lifecycle().is_activated() {
            Ok(())
        } else {
            Err(TrellisError::Unavailable {
                message: "cache is not active".into(),
                source: None,
            })
        }
    }
}

impl Default for MockCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Activate for MockCache {
    async fn activate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.probe.activate().await
    }

    async fn is_activated(&self) -> bool {
        self.probe.lifecycle().is_activated()
    }
}

#[async_trait]
impl Deactivate for MockCache {
    async fn deactivate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.probe.deactivate().await?;
        self.entries().clear();
        Ok(())
    }

    async fn is_deactivated(&self) -> bool {
        self.probe.lifecycle().is_deactivated()
    }
}

impl Plugin for MockCache {
    fn api_version(&self) -> &str {
        API_VERSION
    }

    fn kind(&self) -> PluginKind {
        PluginKind::Cache
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

#[async_trait]
impl CachePlugin for MockCache {
    async fn get(&self, key: &str) -> Result<Option<String>, TrellisError> {
        self.ensure_active()?;
        let mut entries = self.entries();
        match entries.get(key) {
            Some((_, Some(expires))) if *expires <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        lifetime: Option<Duration>,
    ) -> Result<(), TrellisError> {
        self.ensure_active()?;
        let expires = lifetime.map(|lifetime| Instant::now() + lifetime);
        self.entries()
            .insert(key.to_owned(), (value.to_owned(), expires));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_on_tokio_time() {
        let cache = MockCache::new();
        cache.activate(None).await.unwrap();
        cache
            .set("session", "abc", Some(Duration::from_secs(30)))
            .await
            .unwrap();
        cache.set("pinned", "x", None).await.unwrap();

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get("session").await.unwrap().as_deref(), Some("abc"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("session").await.unwrap(), None);
        assert_eq!(cache.get("pinned").await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn inactive_cache_refuses_operations() {
        let cache = MockCache::new();
        assert!(matches!(
            cache.set("k", "v", None).await,
            Err(TrellisError::Unavailable { .. })
        ));

        cache.activate(None).await.unwrap();
        cache.set("k", "v", None).await.unwrap();
        cache.deactivate(None).await.unwrap();
        assert!(cache.is_empty());
    }
}
