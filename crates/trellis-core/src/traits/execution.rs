// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Execution plugin contract.

use async_trait::async_trait;

use crate::error::TrellisError;
use crate::traits::plugin::{AnyContext, Plugin};

/// Runs a function on behalf of the application.
#[async_trait]
pub trait ExecutionPlugin: Plugin {
    type Args: Send + 'static;
    type Output: Send + 'static;

    /// Executes the function with all of its arguments in `args`.
    async fn call(
        &self,
        ctx: &dyn AnyContext,
        args: Self::Args,
    ) -> Result<Self::Output, TrellisError>;
}

/// Execution plugin over JSON values; the default slot type.
pub type DynExecutionPlugin =
    dyn ExecutionPlugin<Args = serde_json::Value, Output = serde_json::Value>;
