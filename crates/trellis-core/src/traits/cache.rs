// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache plugin contract.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TrellisError;
use crate::traits::plugin::Plugin;

/// Key/value cache with optional expiry.
#[async_trait]
pub trait CachePlugin: Plugin {
    /// Returns the cached value, or `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<String>, TrellisError>;

    /// Stores a value. Without a `lifetime` the entry does not expire.
    async fn set(
        &self,
        key: &str,
        value: &str,
        lifetime: Option<Duration>,
    ) -> Result<(), TrellisError>;
}
