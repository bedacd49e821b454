// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Trellis plugin contracts.

use std::time::Duration;

use thiserror::Error;

use crate::lifecycle::Transition;
use crate::types::PluginKind;

/// Boxed error carried as the source of a collaborator failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type returned by every fallible contract operation.
///
/// Backends classify their failures into one of these categories at the
/// collaborator boundary so that application code can react without knowing
/// which concrete plugin is installed.
#[derive(Debug, Error)]
pub enum TrellisError {
    /// Configuration errors (unreadable source, shape mismatch, invalid value).
    #[error("configuration error: {0}")]
    Config(String),

    /// The requested resource (object, bucket, key, plugin) does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The backend refused the operation.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// The backend could not be reached or is not ready.
    #[error("unavailable: {message}")]
    Unavailable {
        message: String,
        source: Option<BoxError>,
    },

    /// A lifecycle transition failed.
    #[error("{transition} of plugin `{name}` failed: {source}")]
    Lifecycle {
        name: String,
        transition: Transition,
        source: BoxError,
    },

    /// A plugin was installed into a context slot of a different category.
    #[error("slot `{slot}` expects a {expected} but got a {found}")]
    KindMismatch {
        slot: &'static str,
        expected: PluginKind,
        found: PluginKind,
    },

    /// An operation addressed a context slot that holds no plugin.
    #[error("context slot `{slot}` is empty")]
    MissingSlot { slot: &'static str },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TrellisError {
    /// Shorthand for an [`Unavailable`](TrellisError::Unavailable) error with a source.
    pub fn unavailable(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        TrellisError::Unavailable {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Shorthand for a [`NotFound`](TrellisError::NotFound) error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        TrellisError::NotFound {
            resource: resource.into(),
        }
    }
}
