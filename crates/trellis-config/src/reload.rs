// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reload-signal watcher.
//!
//! A background task that re-runs `load()` each time a trigger fires. A
//! rejected reload is logged and the previous snapshot stays in place; the
//! task itself never stops on errors, only on cancellation or when the
//! trigger stream ends.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use trellis_core::TrellisError;

use crate::store::{ConfigShape, ConfigStore};

/// Anything that can reload its configuration on demand.
#[async_trait]
pub trait Reload: Send + Sync {
    /// Returns the generation published by the reload.
    async fn reload(&self) -> Result<u64, TrellisError>;
}

#[async_trait]
impl<C: ConfigShape> Reload for ConfigStore<C> {
    async fn reload(&self) -> Result<u64, TrellisError> {
        self.load().await
    }
}

/// Spawns the watcher. Each item of `triggers` causes one reload.
pub fn spawn_reload_task<S>(
    triggers: S,
    target: Arc<dyn Reload>,
    token: CancellationToken,
) -> JoinHandle<()>
where
    S: Stream<Item = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut triggers = std::pin::pin!(triggers);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                next = triggers.next() => match next {
                    Some(()) => match target.reload().await {
                        Ok(generation) => info!(generation, "configuration reloaded"),
                        Err(e) => warn!(error = %e, "configuration reload rejected"),
                    },
                    None => break,
                },
            }
        }
        debug!("reload watcher stopped");
    })
}

/// One item per `SIGHUP` received by the process.
#[cfg(unix)]
pub fn sighup_triggers() -> Result<BoxStream<'static, ()>, TrellisError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())
        .map_err(|e| TrellisError::unavailable("cannot install SIGHUP handler", e))?;
    Ok(futures::stream::poll_fn(move |cx| hangup.poll_recv(cx)).boxed())
}

/// Never fires: there is no hangup signal on this platform.
#[cfg(not(unix))]
pub fn sighup_triggers() -> Result<BoxStream<'static, ()>, TrellisError> {
    Ok(futures::stream::pending().boxed())
}
