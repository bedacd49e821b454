// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity model shared by every plugin: kind tags, metadata, and the
//! manifest-style resource shape.

use std::collections::BTreeMap;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::TrellisError;
use crate::uid::PluginUid;

/// API version stamped on resources produced by this crate.
pub const API_VERSION: &str = "trellis.dev/v1";

/// A lazy, finite sequence of results produced by listing operations.
pub type ItemStream<T> = Pin<Box<dyn Stream<Item = Result<T, TrellisError>> + Send>>;

/// Free-form JSON object used as the default argument shape of generic contracts.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Identifies the capability category a plugin implements.
///
/// The set is closed. The tag is fixed by the concrete implementation and is
/// used by the context registry to validate slot assignments.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum PluginKind {
    #[strum(serialize = "AuthenticationPlugin")]
    #[serde(rename = "AuthenticationPlugin")]
    Authentication,
    #[strum(serialize = "BackupPlugin")]
    #[serde(rename = "BackupPlugin")]
    Backup,
    #[strum(serialize = "CachePlugin")]
    #[serde(rename = "CachePlugin")]
    Cache,
    #[strum(serialize = "ChatPlugin")]
    #[serde(rename = "ChatPlugin")]
    Chat,
    #[strum(serialize = "ConfigurationPlugin")]
    #[serde(rename = "ConfigurationPlugin")]
    Configuration,
    /// Email delivery over SMTP.
    #[strum(serialize = "SMTPPlugin")]
    #[serde(rename = "SMTPPlugin")]
    Smtp,
    #[strum(serialize = "ExecutionPlugin")]
    #[serde(rename = "ExecutionPlugin")]
    Execution,
    #[strum(serialize = "FaxPlugin")]
    #[serde(rename = "FaxPlugin")]
    Fax,
    #[strum(serialize = "HookPlugin")]
    #[serde(rename = "HookPlugin")]
    Hook,
    #[strum(serialize = "InitPlugin")]
    #[serde(rename = "InitPlugin")]
    Init,
    #[strum(serialize = "LoggingPlugin")]
    #[serde(rename = "LoggingPlugin")]
    Logging,
    #[strum(serialize = "MMSPlugin")]
    #[serde(rename = "MMSPlugin")]
    Mms,
    #[strum(serialize = "StoragePlugin")]
    #[serde(rename = "StoragePlugin")]
    Storage,
}

impl PluginKind {
    /// Name of the context slot that holds plugins of this kind.
    pub fn slot_name(self) -> &'static str {
        match self {
            PluginKind::Authentication => "authn",
            PluginKind::Backup => "backups",
            PluginKind::Cache => "cache",
            PluginKind::Chat => "chat",
            PluginKind::Configuration => "config",
            PluginKind::Smtp => "email",
            PluginKind::Execution => "exec",
            PluginKind::Fax => "fax",
            PluginKind::Hook => "hooks",
            PluginKind::Init => "init",
            PluginKind::Logging => "log",
            PluginKind::Mms => "mms",
            PluginKind::Storage => "store",
        }
    }
}

/// Descriptive metadata carried by every plugin instance.
///
/// Set once when the plugin is constructed. Field names serialize in the
/// camelCase manifest style (`creationTimestamp`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    pub namespace: String,
    pub uid: PluginUid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
}

impl Metadata {
    /// Creates metadata with the three required fields and nothing else.
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        uid: impl Into<PluginUid>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            uid: uid.into(),
            labels: None,
            annotations: None,
            creation_timestamp: None,
            generation: None,
        }
    }

    /// Creates metadata with a freshly generated `urn:uuid:` identifier,
    /// stamped with the current time.
    pub fn generate(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::new(name, namespace, PluginUid::generate()).with_creation_timestamp(Utc::now())
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_creation_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.creation_timestamp = Some(at);
        self
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Looks up a label value.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.as_ref()?.get(key).map(String::as_str)
    }
}

/// Manifest-style description of a plugin instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub api_version: String,
    pub kind: PluginKind,
    pub metadata: Metadata,
}

impl Resource {
    /// Returns true if `other` names the same plugin instance: same kind,
    /// name and namespace, and an equal uid.
    pub fn same_identity(&self, other: &Resource) -> bool {
        self.kind == other.kind
            && self.metadata.name == other.metadata.name
            && self.metadata.namespace == other.metadata.namespace
            && self.metadata.uid == other.metadata.uid
    }
}
