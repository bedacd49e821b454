// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bootstrap: from the init plugin to an active configuration plugin.
//!
//! The init plugin needs no prior configuration. It names the
//! configuration plugin, which is constructed from the catalog (performing
//! its initial load) and activated in a context holding only the init
//! plugin.

use std::sync::Arc;

use tracing::info;
use trellis_core::{
    Activate, AnyContext, AsPlugin, ConfigurationPlugin, InitPlugin, Plugin, PluginKind,
    TrellisError,
};

use crate::catalog::ConfigurationCatalog;

/// The context available while bootstrapping: the init plugin only.
#[derive(Clone)]
pub struct BootstrapContext {
    init: Arc<dyn InitPlugin>,
}

impl BootstrapContext {
    pub fn new(init: Arc<dyn InitPlugin>) -> Self {
        Self { init }
    }
}

impl AnyContext for BootstrapContext {
    fn init(&self) -> &dyn InitPlugin {
        self.init.as_ref()
    }

    fn plugin(&self, kind: PluginKind) -> Option<&dyn Plugin> {
        (kind == PluginKind::Init).then(|| self.init.as_ref().as_plugin())
    }

    fn kinds(&self) -> Vec<PluginKind> {
        vec![PluginKind::Init]
    }
}

impl std::fmt::Debug for BootstrapContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapContext")
            .field("init", &self.init.metadata().name)
            .finish()
    }
}

/// Activates `init`, then constructs and activates the configuration
/// plugin it selects.
///
/// Fails with `NotFound` if the catalog has no plugin under the selected
/// uid, and with `KindMismatch` or `Config` if the factory returns a plugin
/// that is not the one registered.
pub async fn bootstrap<C: Send + Sync + 'static>(
    init: Arc<dyn InitPlugin>,
    catalog: &ConfigurationCatalog<C>,
) -> Result<Arc<dyn ConfigurationPlugin<Config = C>>, TrellisError> {
    let ctx = BootstrapContext::new(init.clone());
    init.activate(Some(&ctx)).await?;

    let uid = init.configuration_plugin();
    let (metadata, factory) = catalog
        .get(&uid)
        .ok_or_else(|| TrellisError::not_found(format!("configuration plugin `{uid}`")))?;
    info!(plugin = %metadata.name, %uid, "constructing configuration plugin");

    let plugin = factory.create(metadata.clone(), init.as_ref()).await?;
    if plugin.kind() != PluginKind::Configuration {
        return Err(TrellisError::KindMismatch {
            slot: PluginKind::Configuration.slot_name(),
            expected: PluginKind::Configuration,
            found: plugin.kind(),
        });
    }
    if plugin.metadata().uid != uid {
        return Err(TrellisError::Config(format!(
            "factory for `{uid}` built plugin `{}`",
            plugin.metadata().uid
        )));
    }

    plugin.activate(Some(&ctx)).await?;
    info!(plugin = %metadata.name, generation = plugin.generation(), "configuration active");
    Ok(plugin)
}
