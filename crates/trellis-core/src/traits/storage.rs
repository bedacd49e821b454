// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage plugin contract.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrellisError;
use crate::traits::plugin::Plugin;
use crate::types::ItemStream;

/// Object tags.
pub type Tags = BTreeMap<String, String>;

/// Addresses one object, optionally one version of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageObjectId {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl StorageObjectId {
    /// The latest version of `key`.
    pub fn latest(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version: None,
        }
    }

    pub fn versioned(key: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version: Some(version.into()),
        }
    }
}

/// Object listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageObjectInfo {
    #[serde(flatten)]
    pub id: StorageObjectId,
    pub last_modified: Option<DateTime<Utc>>,
    pub size_in_bytes: Option<u64>,
    pub storage_class: Option<String>,
    pub owner: Option<String>,
    pub etag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketId {
    pub name: String,
}

/// Bucket listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    pub name: String,
    pub versioning: Option<bool>,
}

/// Permissions granted by a presigned URL.
///
/// The comments name the matching Azure Blob Storage SAS letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageObjectPermissions {
    /// `c`
    pub create: bool,
    /// `r`
    pub read: bool,
    /// `w`
    pub update: bool,
    /// `d`
    pub delete: bool,
    /// `a`
    pub append: bool,
    /// `c`
    pub create_version: bool,
    /// `r`
    pub read_version: bool,
    /// `x`
    pub delete_version: bool,
    /// `t`
    pub read_tags: bool,
    /// `t`
    pub write_tags: bool,
}

impl StorageObjectPermissions {
    pub fn read_only() -> Self {
        Self {
            read: true,
            read_version: true,
            read_tags: true,
            ..Self::default()
        }
    }
}

/// Options for [`StoragePlugin::get_presigned_url`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresignedUrlOptions {
    /// Only permit access over HTTPS.
    pub https_only: Option<bool>,
    /// Defaults to now.
    pub start: Option<DateTime<Utc>>,
    /// No expiration when absent.
    pub end: Option<DateTime<Utc>>,
    pub permissions: Option<StorageObjectPermissions>,
}

/// Bucket/object storage.
#[async_trait]
pub trait StoragePlugin: Plugin {
    async fn check_bucket(&self, bucket: &str) -> Result<bool, TrellisError>;

    async fn check_object(&self, bucket: &str, oid: &StorageObjectId)
        -> Result<bool, TrellisError>;

    async fn copy_object(
        &self,
        bucket: &str,
        src: &StorageObjectId,
        dest: &StorageObjectId,
        overwrite: bool,
    ) -> Result<(), TrellisError>;

    async fn create_bucket(
        &self,
        bucket: &str,
        options: Option<&BTreeMap<String, String>>,
    ) -> Result<(), TrellisError>;

    async fn delete_bucket(&self, bucket: &str) -> Result<(), TrellisError>;

    async fn delete_object(&self, bucket: &str, oid: &StorageObjectId)
        -> Result<(), TrellisError>;

    async fn delete_objects(
        &self,
        bucket: &str,
        objects: &[StorageObjectInfo],
    ) -> Result<(), TrellisError>;

    async fn delete_object_tagging(
        &self,
        bucket: &str,
        oid: &StorageObjectId,
    ) -> Result<(), TrellisError>;

    async fn get_object(&self, bucket: &str, oid: &StorageObjectId)
        -> Result<Vec<u8>, TrellisError>;

    async fn get_object_tagging(
        &self,
        bucket: &str,
        oid: &StorageObjectId,
    ) -> Result<Tags, TrellisError>;

    /// With `oid` absent the URL grants access to the whole bucket.
    async fn get_presigned_url(
        &self,
        bucket: &str,
        oid: Option<&StorageObjectId>,
        options: &PresignedUrlOptions,
    ) -> Result<String, TrellisError>;

    async fn list_buckets(&self) -> Result<ItemStream<BucketInfo>, TrellisError>;

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<ItemStream<StorageObjectInfo>, TrellisError>;

    async fn list_object_versions(
        &self,
        bucket: &str,
        oid: &StorageObjectId,
    ) -> Result<ItemStream<StorageObjectInfo>, TrellisError>;

    async fn put_object(
        &self,
        bucket: &str,
        oid: &StorageObjectId,
        content: Vec<u8>,
    ) -> Result<(), TrellisError>;

    async fn put_object_tagging(
        &self,
        bucket: &str,
        oid: &StorageObjectId,
        tags: &Tags,
    ) -> Result<(), TrellisError>;
}
