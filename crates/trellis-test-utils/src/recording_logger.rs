// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging plugin that captures entries for assertions.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use trellis_core::{
    Activate, AnyContext, Deactivate, LoggingPlugin, Metadata, Plugin, PluginKind, TrellisError,
    API_VERSION,
};

use crate::probe::Probe;

/// Severity of a captured entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Captures every log call in order.
#[derive(Debug)]
pub struct RecordingLogger {
    metadata: Metadata,
    probe: Probe,
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self {
            metadata: Metadata::generate("recording-logger", "test"),
            probe: Probe::new("log"),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_probe(mut self, probe: Probe) -> Self {
        self.probe = probe;
        self
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages logged at `level`.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    fn push(&self, level: LogLevel, message: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message));
    }
}

impl Default for RecordingLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Activate for RecordingLogger {
    async fn activate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.probe.activate().await
    }

    async fn is_activated(&self) -> bool {
        self.probe.lifecycle().is_activated()
    }
}

#[async_trait]
impl Deactivate for RecordingLogger {
    async fn deactivate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.probe.deactivate().await
    }

    async fn is_deactivated(&self) -> bool {
        self.probe.lifecycle().is_deactivated()
    }
}

impl Plugin for RecordingLogger {
    fn api_version(&self) -> &str {
        API_VERSION
    }

    fn kind(&self) -> PluginKind {
        PluginKind::Logging
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

impl LoggingPlugin for RecordingLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message.to_owned());
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message.to_owned());
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message.to_owned());
    }

    fn error(&self, error: &(dyn std::error::Error + 'static)) {
        self.push(LogLevel::Error, error.to_string());
    }
}
