// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging plugin that forwards to the process-wide tracing subscriber.

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use trellis_core::{
    Activate, AnyContext, Deactivate, Lifecycle, LoggingPlugin, Metadata, Plugin, PluginKind,
    TrellisError, API_VERSION,
};

/// Events carry this target so operators can filter application logs
/// separately from host internals.
pub const LOG_TARGET: &str = "trellis::app";

#[derive(Debug)]
pub struct TracingLogger {
    metadata: Metadata,
    lifecycle: Lifecycle,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self {
            metadata: Metadata::generate("tracing-logger", "trellis"),
            lifecycle: Lifecycle::new("tracing-logger"),
        }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Activate for TracingLogger {
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
impl Deactivate for TracingLogger {
    async fn deactivate(&self, _ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError> {
        self.lifecycle
            .deactivate(|| async { Ok::<_, TrellisError>(()) })
            .await
    }

    async fn is_deactivated(&self) -> bool {
        self.lifecycle.is_deactivated()
    }
}

impl Plugin for TracingLogger {
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

impl LoggingPlugin for TracingLogger {
    fn debug(&self, message: &str) {
        debug!(target: LOG_TARGET, "{message}");
    }

    fn info(&self, message: &str) {
        info!(target: LOG_TARGET, "{message}");
    }

    fn warn(&self, message: &str) {
        warn!(target: LOG_TARGET, "{message}");
    }

    fn error(&self, err: &(dyn std::error::Error + 'static)) {
        error!(target: LOG_TARGET, error = %err, "{err}");
    }
}
