// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin identifiers and their comparison rule.
//!
//! Identifiers are opaque strings that may carry a `urn:uuid:` prefix. Two
//! identifiers are equal when they match after the prefix is removed and
//! letter case is folded.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

const URN_PREFIX: &str = "urn:uuid:";

/// Compares two plugin identifiers, ignoring a `urn:uuid:` prefix and case.
pub fn uuidcmp(a: &str, b: &str) -> bool {
    canonicalize(a) == canonicalize(b)
}

/// Lowercases per character and strips every leading `urn:uuid:` marker.
fn canonicalize(id: &str) -> String {
    let folded: String = id.chars().flat_map(char::to_lowercase).collect();
    let mut rest = folded.as_str();
    while let Some(stripped) = rest.strip_prefix(URN_PREFIX) {
        rest = stripped;
    }
    rest.to_owned()
}

/// A plugin's unique identifier.
///
/// Equality and hashing follow [`uuidcmp`], so `urn:uuid:ABC` and `abc`
/// are the same key in a map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginUid(String);

impl PluginUid {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random v4 identifier in `urn:uuid:` form.
    pub fn generate() -> Self {
        Self(format!("{URN_PREFIX}{}", uuid::Uuid::new_v4()))
    }

    /// The identifier exactly as it was supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical form used for comparison.
    pub fn canonical(&self) -> String {
        canonicalize(&self.0)
    }
}

impl PartialEq for PluginUid {
    fn eq(&self, other: &Self) -> bool {
        uuidcmp(&self.0, &other.0)
    }
}

impl Eq for PluginUid {}

impl Hash for PluginUid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl PartialEq<str> for PluginUid {
    fn eq(&self, other: &str) -> bool {
        uuidcmp(&self.0, other)
    }
}

impl PartialEq<&str> for PluginUid {
    fn eq(&self, other: &&str) -> bool {
        uuidcmp(&self.0, other)
    }
}

impl fmt::Display for PluginUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginUid {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PluginUid {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<uuid::Uuid> for PluginUid {
    fn from(id: uuid::Uuid) -> Self {
        Self(format!("{URN_PREFIX}{id}"))
    }
}
