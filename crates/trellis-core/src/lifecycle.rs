// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bistable lifecycle state machine.
//!
//! States: Inactive -> Activating -> Active -> Deactivating -> Inactive.
//!
//! [`Lifecycle`] is meant to be embedded in plugin implementations. It
//! serializes overlapping transitions on the same instance (later callers
//! queue behind the in-flight one and resolve after it settles), turns a
//! repeated transition into a no-op, and never leaves the machine parked in
//! `Activating`/`Deactivating`: a failed or abandoned transition rolls back
//! to the state it started from.

use std::future::Future;

use strum::Display;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::error::{BoxError, TrellisError};

/// States of the bistable lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LifecycleState {
    /// Initial state, and the state after a completed deactivation.
    Inactive,
    /// Setup is in flight.
    Activating,
    /// Setup completed.
    Active,
    /// Teardown is in flight.
    Deactivating,
}

/// One of the two lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Transition {
    Activation,
    Deactivation,
}

impl Transition {
    /// State the transition starts from, and rolls back to on failure.
    pub fn origin(self) -> LifecycleState {
        match self {
            Transition::Activation => LifecycleState::Inactive,
            Transition::Deactivation => LifecycleState::Active,
        }
    }

    /// State observed while the transition is in flight.
    pub fn in_flight(self) -> LifecycleState {
        match self {
            Transition::Activation => LifecycleState::Activating,
            Transition::Deactivation => LifecycleState::Deactivating,
        }
    }

    /// State reached when the transition succeeds.
    pub fn target(self) -> LifecycleState {
        match self {
            Transition::Activation => LifecycleState::Active,
            Transition::Deactivation => LifecycleState::Inactive,
        }
    }
}

/// Lifecycle state holder for a single plugin instance.
pub struct Lifecycle {
    name: String,
    state: watch::Sender<LifecycleState>,
    gate: Mutex<()>,
}

impl Lifecycle {
    /// Creates an inactive lifecycle. `name` is used in logs and errors.
    pub fn new(name: impl Into<String>) -> Self {
        let (state, _) = watch::channel(LifecycleState::Inactive);
        Self {
            name: name.into(),
            state,
            gate: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// True only once activation has completed.
    pub fn is_activated(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    /// True only once deactivation has completed (or before first activation).
    pub fn is_deactivated(&self) -> bool {
        self.state() == LifecycleState::Inactive
    }

    /// Subscribes to state changes.
    pub fn watch(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Runs `setup` to move from `Inactive` to `Active`.
    ///
    /// Returns immediately without running `setup` if already active.
    pub async fn activate<F, Fut, E>(&self, setup: F) -> Result<(), TrellisError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Into<BoxError>,
    {
        self.run(Transition::Activation, setup).await
    }

    /// Runs `teardown` to move from `Active` to `Inactive`.
    ///
    /// Returns immediately without running `teardown` if already inactive.
    pub async fn deactivate<F, Fut, E>(&self, teardown: F) -> Result<(), TrellisError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Into<BoxError>,
    {
        self.run(Transition::Deactivation, teardown).await
    }

    async fn run<F, Fut, E>(&self, transition: Transition, work: F) -> Result<(), TrellisError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Into<BoxError>,
    {
        let _permit = self.gate.lock().await;

        if self.state() == transition.target() {
            debug!(plugin = %self.name, %transition, "already {}, skipping", transition.target());
            return Ok(());
        }

        let guard = RollbackGuard {
            lifecycle: self,
            rollback: transition.origin(),
            armed: true,
        };
        self.state.send_replace(transition.in_flight());
        debug!(plugin = %self.name, %transition, "transition started");

        match work().await {
            Ok(()) => {
                guard.commit(transition.target());
                info!(plugin = %self.name, state = %transition.target(), "{transition} complete");
                Ok(())
            }
            Err(source) => {
                drop(guard);
                let source = source.into();
                warn!(plugin = %self.name, error = %source, "{transition} failed, state restored");
                Err(TrellisError::Lifecycle {
                    name: self.name.clone(),
                    transition,
                    source,
                })
            }
        }
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

/// Restores the origin state unless the transition committed, so a
/// transition future dropped mid-flight does not block later calls.
struct RollbackGuard<'a> {
    lifecycle: &'a Lifecycle,
    rollback: LifecycleState,
    armed: bool,
}

impl RollbackGuard<'_> {
    fn commit(mut self, state: LifecycleState) {
        self.armed = false;
        self.lifecycle.state.send_replace(state);
    }
}

impl Drop for RollbackGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.lifecycle.state.send_replace(self.rollback);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn ok() -> std::future::Ready<Result<(), TrellisError>> {
        std::future::ready(Ok(()))
    }

    #[tokio::test]
    async fn starts_inactive() {
        let lc = Lifecycle::new("probe");
        assert_eq!(lc.state(), LifecycleState::Inactive);
        assert!(lc.is_deactivated());
        assert!(!lc.is_activated());
    }

    #[tokio::test]
    async fn activate_then_deactivate() {
        let lc = Lifecycle::new("probe");
        lc.activate(ok).await.unwrap();
        assert!(lc.is_activated());
        assert!(!lc.is_deactivated());

        lc.deactivate(ok).await.unwrap();
        assert!(lc.is_deactivated());

        // Reactivation is allowed.
        lc.activate(ok).await.unwrap();
        assert_eq!(lc.state(), LifecycleState::Active);
    }

    #[tokio::test]
    async fn repeated_activation_skips_setup() {
        let lc = Lifecycle::new("probe");
        let runs = AtomicUsize::new(0);
        for _ in 0..3 {
            lc.activate(|| async {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TrellisError>(())
            })
            .await
            .unwrap();
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(lc.is_activated());
    }

    #[tokio::test]
    async fn deactivating_inactive_instance_is_noop() {
        let lc = Lifecycle::new("probe");
        let runs = AtomicUsize::new(0);
        lc.deactivate(|| async {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok::<_, TrellisError>(())
        })
        .await
        .unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(lc.is_deactivated());
    }

    #[tokio::test]
    async fn failed_activation_returns_to_inactive() {
        let lc = Lifecycle::new("probe");
        let err = lc
            .activate(|| async { Err(TrellisError::Internal("boom".into())) })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TrellisError::Lifecycle {
                transition: Transition::Activation,
                ..
            }
        ));
        assert_eq!(lc.state(), LifecycleState::Inactive);

        // Not stuck: a later attempt can still succeed.
        lc.activate(ok).await.unwrap();
        assert!(lc.is_activated());
    }

    #[tokio::test]
    async fn failed_deactivation_stays_active() {
        let lc = Lifecycle::new("probe");
        lc.activate(ok).await.unwrap();
        let err = lc
            .deactivate(|| async { Err(TrellisError::Internal("stuck socket".into())) })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("deactivation of plugin `probe` failed"));
        assert_eq!(lc.state(), LifecycleState::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_activations_queue_and_run_setup_once() {
        let lc = Arc::new(Lifecycle::new("probe"));
        let runs = Arc::new(AtomicUsize::new(0));

        let call = |lc: Arc<Lifecycle>, runs: Arc<AtomicUsize>| async move {
            lc.activate(|| async {
                runs.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, TrellisError>(())
            })
            .await
        };

        let (a, b) = tokio::join!(
            call(lc.clone(), runs.clone()),
            call(lc.clone(), runs.clone())
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(lc.is_activated());
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_state_is_neither_activated_nor_deactivated() {
        let lc = Arc::new(Lifecycle::new("probe"));
        let mut states = lc.watch();

        let task = {
            let lc = lc.clone();
            tokio::spawn(async move {
                lc.activate(|| async {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    Ok::<_, TrellisError>(())
                })
                .await
            })
        };

        states.changed().await.unwrap();
        assert_eq!(*states.borrow_and_update(), LifecycleState::Activating);
        assert!(!lc.is_activated());
        assert!(!lc.is_deactivated());

        task.await.unwrap().unwrap();
        assert!(lc.is_activated());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_activation_rolls_back() {
        let lc = Lifecycle::new("probe");
        let attempt = tokio::time::timeout(
            Duration::from_millis(10),
            lc.activate(|| std::future::pending::<Result<(), TrellisError>>()),
        )
        .await;
        assert!(attempt.is_err());
        assert_eq!(lc.state(), LifecycleState::Inactive);

        lc.activate(ok).await.unwrap();
        assert!(lc.is_activated());
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn failed_transition_is_logged() {
        let lc = Lifecycle::new("flaky");
        let _ = lc
            .activate(|| async { Err(TrellisError::Internal("no route".into())) })
            .await;
        assert!(logs_contain("activation failed, state restored"));
    }
}
