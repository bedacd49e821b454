// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context registry, deployment manifests, and bootstrap.
//!
//! A [`Context`] wires one plugin into each category slot next to the
//! mandatory init plugin. Deployments describe the intended wiring in a
//! TOML [`DeploymentManifest`], and [`bootstrap`] brings up the
//! configuration plugin chosen by the init plugin from a compiled-in
//! [`ConfigurationCatalog`].

pub mod bootstrap;
pub mod catalog;
pub mod context;
pub mod manifest;

pub use bootstrap::{bootstrap, BootstrapContext};
pub use catalog::{ConfigurationCatalog, ConfigurationFactory};
pub use context::{Context, ContextBuilder, DefaultSlots, Slots};
pub use manifest::{DeploymentManifest, Discrepancy};
