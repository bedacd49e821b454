// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait that all plugins must implement, and the type-erased context
//! view handed to lifecycle calls.

use crate::traits::init::InitPlugin;
use crate::traits::lifecycle::Bistable;
use crate::types::{Metadata, PluginKind, Resource};

/// The base trait for all Trellis plugins.
///
/// Combines identity (api version, kind, metadata) with the bistable
/// lifecycle. Category contracts extend this trait and add operations; they
/// never change lifecycle semantics.
pub trait Plugin: Bistable + AsPlugin + Send + Sync + 'static {
    /// API version of the resource shape this plugin describes itself with.
    fn api_version(&self) -> &str;

    /// The category tag. Fixed per implementation.
    fn kind(&self) -> PluginKind;

    /// Identity metadata, set at construction.
    fn metadata(&self) -> &Metadata;

    /// The plugin's identity as a manifest resource.
    fn resource(&self) -> Resource {
        Resource {
            api_version: self.api_version().to_owned(),
            kind: self.kind(),
            metadata: self.metadata().clone(),
        }
    }
}

/// Views any plugin, including a category trait object, as `&dyn Plugin`.
///
/// Implemented for every sized plugin type; category trait objects inherit
/// it through their vtable.
pub trait AsPlugin {
    fn as_plugin(&self) -> &dyn Plugin;
}

impl<T: Plugin> AsPlugin for T {
    fn as_plugin(&self) -> &dyn Plugin {
        self
    }
}

/// Type-erased view of an application context.
///
/// Handed to `activate`/`deactivate` and to execution plugins so they can
/// reach other installed plugins without knowing how the context was
/// narrowed.
pub trait AnyContext: Send + Sync {
    /// The bootstrap plugin. Always present.
    fn init(&self) -> &dyn InitPlugin;

    /// The plugin installed for `kind`, if any.
    fn plugin(&self, kind: PluginKind) -> Option<&dyn Plugin>;

    /// Kinds of every filled slot, `Init` included.
    fn kinds(&self) -> Vec<PluginKind>;
}
