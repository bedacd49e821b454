// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instrumented lifecycle for tests.
//!
//! A [`Probe`] wraps a [`Lifecycle`] and counts how often setup and teardown
//! actually run. Failures can be queued for upcoming transitions, every
//! transition can be slowed down by a fixed delay, and a shared [`Journal`]
//! records the order in which several probes moved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use trellis_core::{
    Activate, AnyContext, Deactivate, HookPlugin, JsonMap, Lifecycle, Metadata, Plugin,
    PluginKind, TrellisError, API_VERSION,
};

/// Ordered record of transitions shared between probes.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.into());
    }

    /// Entries in the order they were recorded, e.g. `"cache:activate"`.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Lifecycle with counters and injectable failures.
#[derive(Debug)]
pub struct Probe {
    lifecycle: Lifecycle,
    setups: AtomicUsize,
    teardowns: AtomicUsize,
    failing_activations: AtomicUsize,
    failing_deactivations: AtomicUsize,
    delay: Option<Duration>,
    journal: Option<Journal>,
}

impl Probe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            lifecycle: Lifecycle::new(name),
            setups: AtomicUsize::new(0),
            teardowns: AtomicUsize::new(0),
            failing_activations: AtomicUsize::new(0),
            failing_deactivations: AtomicUsize::new(0),
            delay: None,
            journal: None,
        }
    }

    /// Every setup and teardown sleeps this long (on tokio time) first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// The next activation attempt that reaches setup fails.
    pub fn fail_next_activation(&self) {
        self.failing_activations.fetch_add(1, Ordering::SeqCst);
    }

    /// The next deactivation attempt that reaches teardown fails.
    pub fn fail_next_deactivation(&self) {
        self.failing_deactivations.fetch_add(1, Ordering::SeqCst);
    }

    /// How many times setup ran, failed runs included.
    pub fn setups(&self) -> usize {
        self.setups.load(Ordering::SeqCst)
    }

    /// How many times teardown ran, failed runs included.
    pub fn teardowns(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub async fn activate(&self) -> Result<(), TrellisError> {
        self.lifecycle
            .activate(|| self.step("activate", &self.setups, &self.failing_activations))
            .await
    }

    pub async fn deactivate(&self) -> Result<(), TrellisError> {
        self.lifecycle
            .deactivate(|| self.step("deactivate", &self.teardowns, &self.failing_deactivations))
            .await
    }

    async fn step(
        &self,
        what: &str,
        runs: &AtomicUsize,
        failures: &AtomicUsize,
    ) -> Result<(), TrellisError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        runs.fetch_add(1, Ordering::SeqCst);

        let fail = failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let name = self.lifecycle.name();
        if fail {
            self.note(format!("{name}:{what}:failed"));
            return Err(TrellisError::Internal(format!("injected {what} failure")));
        }
        self.note(format!("{name}:{what}"));
        Ok(())
    }

    fn note(&self, entry: String) {
        if let Some(journal) = &self.journal {
            journal.record(entry);
        }
    }
}

/// A plugin of any kind whose lifecycle is a [`Probe`].
///
/// Also implements the hook contract, recording the arguments of every call,
/// so it can fill the `hooks` slot of a context.
#[derive(Debug)]
pub struct ProbePlugin {
    metadata: Metadata,
    kind: PluginKind,
    probe: Probe,
    calls: Mutex<Vec<JsonMap>>,
}

impl ProbePlugin {
    /// Names the probe after the kind's slot (`"cache"`, `"hooks"`, ...).
    pub fn new(kind: PluginKind) -> Self {
        let name = kind.slot_name();
        Self {
            metadata: Metadata::generate(name, "test"),
            kind,
            probe: Probe::new(name),
            calls: Mutex::new(Vec::new()),
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

    /// Arguments of every hook call so far.
    pub fn calls(&self) -> Vec<JsonMap> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl Activate for ProbePlugin {
    async fn activate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.probe.activate().await
    }

    async fn is_activated(&self) -> bool {
        self.probe.lifecycle().is_activated()
    }
}

#[async_trait]
impl Deactivate for ProbePlugin {
    async fn deactivate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.probe.deactivate().await
    }

    async fn is_deactivated(&self) -> bool {
        self.probe.lifecycle().is_deactivated()
    }
}

impl Plugin for ProbePlugin {
    fn api_version(&self) -> &str {
        API_VERSION
    }

    fn kind(&self) -> PluginKind {
        self.kind
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

#[async_trait]
impl HookPlugin for ProbePlugin {
    type Args = JsonMap;

    async fn call(&self, args: JsonMap) -> Result<(), TrellisError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args);
        Ok(())
    }
}
