// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hook plugin contract.

use async_trait::async_trait;

use crate::error::TrellisError;
use crate::traits::plugin::Plugin;
use crate::types::JsonMap;

/// A callback invoked by the application at a named extension point.
#[async_trait]
pub trait HookPlugin: Plugin {
    type Args: Send + 'static;

    async fn call(&self, args: Self::Args) -> Result<(), TrellisError>;
}

/// Hook plugin taking free-form JSON arguments; the default slot type.
pub type DynHookPlugin = dyn HookPlugin<Args = JsonMap>;
