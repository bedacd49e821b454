// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration protocol for the Trellis application host.
//!
//! Provides the [`ConfigStore`] engine (default-fill, atomic snapshot swap,
//! change notification), the [`ConfigSource`] seam with a figment-backed
//! TOML/environment implementation, a `SIGHUP` reload watcher, the
//! ready-made [`FileConfigPlugin`], and miette diagnostics with typo
//! suggestions for rejected configuration.
//!
//! # Usage
//!
//! ```no_run
//! use trellis_config::{ConfigStore, FigmentSource};
//!
//! # async fn run() -> Result<(), trellis_core::TrellisError> {
//! let defaults = serde_json::json!({ "server": { "port": 8080 } });
//! let store = ConfigStore::new(defaults, FigmentSource::standard()).await?;
//! println!("port: {}", store.values()["server"]["port"]);
//! # Ok(())
//! # }
//! ```

pub mod diagnostic;
pub mod loader;
pub mod merge;
pub mod plugin;
pub mod reload;
pub mod store;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{ConfigSource, FigmentSource};
pub use merge::default_fill;
pub use plugin::FileConfigPlugin;
pub use reload::{sighup_triggers, spawn_reload_task, Reload};
pub use store::{ConfigShape, ConfigStore};

/// Reads `source` and resolves it against `defaults` without publishing
/// anything.
///
/// Errors keep their diagnostic detail (spans, suggestions) for
/// [`render_errors`].
pub async fn check<C: ConfigShape>(defaults: &C, source: &dyn ConfigSource) -> Result<C, ConfigError> {
    let defaults = serde_json::to_value(defaults).map_err(|e| ConfigError::Other(e.to_string()))?;
    let loaded = source.read().await.map_err(|e| ConfigError::Source {
        detail: e.to_string(),
    })?;
    merge::resolve(&defaults, loaded).map_err(|err| err.with_sources(&source.documents()))
}
