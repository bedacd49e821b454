// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activation capabilities.
//!
//! Activation and deactivation are separate capabilities so that code which
//! only ever brings a resource up (or only tears it down) can depend on the
//! narrower trait. [`Bistable`] is the conjunction of both.

use async_trait::async_trait;

use crate::error::TrellisError;
use crate::traits::plugin::AnyContext;

/// A resource that can be brought up.
#[async_trait]
pub trait Activate: Send + Sync {
    /// Activates the resource. Idempotent once active.
    async fn activate(&self, ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError>;

    /// Whether activation has completed.
    async fn is_activated(&self) -> bool;
}

/// A resource that can be torn down.
#[async_trait]
pub trait Deactivate: Send + Sync {
    /// Deactivates the resource. Idempotent once inactive.
    async fn deactivate(&self, ctx: Option<&dyn AnyContext>) -> Result<(), TrellisError>;

    /// Whether deactivation has completed.
    async fn is_deactivated(&self) -> bool;
}

/// Two-state lifecycle shared by every plugin.
///
/// `is_activated` and `is_deactivated` may both be false while a transition
/// is in flight, but never both true.
pub trait Bistable: Activate + Deactivate {}

impl<T: Activate + Deactivate + ?Sized> Bistable for T {}
