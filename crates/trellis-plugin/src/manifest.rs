// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deployment manifests.
//!
//! A manifest declares, in TOML, which plugin is expected in each context
//! slot:
//!
//! ```toml
//! [[plugins]]
//! apiVersion = "trellis.dev/v1"
//! kind = "InitPlugin"
//!
//! [plugins.metadata]
//! name = "env-init"
//! namespace = "trellis"
//! uid = "urn:uuid:5f0c6d1e-8f5b-4a63-9a57-2f4c0e7d2b11"
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;
use trellis_core::{AnyContext, Metadata, PluginKind, Resource, TrellisError, API_VERSION};

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// The plugins a deployment expects, one resource per slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentManifest {
    pub plugins: Vec<Resource>,
}

/// Intermediate TOML deserialization struct; `kind` stays a string so an
/// unknown kind can be reported with a suggestion.
#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    plugins: Vec<ResourceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceEntry {
    api_version: String,
    kind: String,
    metadata: Metadata,
}

/// A difference between a manifest and an assembled context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Discrepancy {
    #[error("{kind} `{name}` is declared but slot `{slot}` is empty")]
    Missing {
        kind: PluginKind,
        slot: &'static str,
        name: String,
    },

    #[error("slot `{slot}` holds {installed}, but the manifest declares {declared}")]
    IdentityMismatch {
        kind: PluginKind,
        slot: &'static str,
        declared: String,
        installed: String,
    },
}

impl DeploymentManifest {
    /// Parse and validate a manifest from TOML content.
    ///
    /// Every entry needs the supported api version, a known kind, and a
    /// non-empty name, namespace and uid. Kinds may not repeat, and exactly
    /// one `InitPlugin` must be declared.
    pub fn parse(toml_content: &str) -> Result<Self, TrellisError> {
        let file: ManifestFile = toml::from_str(toml_content)
            .map_err(|e| TrellisError::Config(format!("invalid deployment manifest: {e}")))?;

        let mut seen = HashSet::new();
        let mut plugins = Vec::with_capacity(file.plugins.len());
        for (index, entry) in file.plugins.into_iter().enumerate() {
            let resource = validate_entry(index, entry)?;
            if !seen.insert(resource.kind) {
                return Err(manifest_error(
                    index,
                    format!(
                        "second {} declared; slot `{}` holds a single plugin",
                        resource.kind,
                        resource.kind.slot_name()
                    ),
                ));
            }
            plugins.push(resource);
        }

        if !seen.contains(&PluginKind::Init) {
            return Err(TrellisError::Config(
                "deployment manifest: an InitPlugin must be declared".to_string(),
            ));
        }

        Ok(Self { plugins })
    }

    pub fn from_path(path: &Path) -> Result<Self, TrellisError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TrellisError::Config(format!("cannot read manifest {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    pub fn to_toml(&self) -> Result<String, TrellisError> {
        toml::to_string(self)
            .map_err(|e| TrellisError::Internal(format!("cannot serialize manifest: {e}")))
    }

    /// The resource declared for `kind`.
    pub fn get(&self, kind: PluginKind) -> Option<&Resource> {
        self.plugins.iter().find(|r| r.kind == kind)
    }

    /// Compares the manifest with the plugins installed in `ctx`.
    ///
    /// Identity means name, namespace and uid (uids compare with
    /// [`uuidcmp`](trellis_core::uuidcmp)). Slots the manifest does not
    /// mention are ignored.
    pub fn verify(&self, ctx: &dyn AnyContext) -> Result<(), Vec<Discrepancy>> {
        let discrepancies: Vec<Discrepancy> = self
            .plugins
            .iter()
            .filter_map(|declared| {
                let kind = declared.kind;
                let slot = kind.slot_name();
                match ctx.plugin(kind) {
                    None => Some(Discrepancy::Missing {
                        kind,
                        slot,
                        name: declared.metadata.name.clone(),
                    }),
                    Some(installed) if !declared.same_identity(&installed.resource()) => {
                        Some(Discrepancy::IdentityMismatch {
                            kind,
                            slot,
                            declared: identity(&declared.metadata),
                            installed: identity(installed.metadata()),
                        })
                    }
                    Some(_) => None,
                }
            })
            .collect();

        if discrepancies.is_empty() {
            Ok(())
        } else {
            Err(discrepancies)
        }
    }
}

fn validate_entry(index: usize, entry: ResourceEntry) -> Result<Resource, TrellisError> {
    if entry.api_version != API_VERSION {
        return Err(manifest_error(
            index,
            format!(
                "unsupported apiVersion `{}` (expected `{API_VERSION}`)",
                entry.api_version
            ),
        ));
    }

    let kind = PluginKind::from_str(&entry.kind).map_err(|_| {
        let hint = match suggest_kind(&entry.kind) {
            Some(kind) => format!(" Did you mean `{kind}`?"),
            None => String::new(),
        };
        manifest_error(
            index,
            format!("`{}` is not a plugin kind.{hint}", entry.kind),
        )
    })?;

    let metadata = entry.metadata;
    for (field, value) in [
        ("name", metadata.name.as_str()),
        ("namespace", metadata.namespace.as_str()),
        ("uid", metadata.uid.as_str()),
    ] {
        if value.trim().is_empty() {
            return Err(manifest_error(
                index,
                format!("metadata.{field} must not be empty"),
            ));
        }
    }

    Ok(Resource {
        api_version: entry.api_version,
        kind,
        metadata,
    })
}

fn manifest_error(index: usize, message: String) -> TrellisError {
    TrellisError::Config(format!("deployment manifest: plugins[{index}]: {message}"))
}

fn identity(metadata: &Metadata) -> String {
    format!(
        "`{}/{}` ({})",
        metadata.namespace, metadata.name, metadata.uid
    )
}

/// Closest plugin kind name by Jaro-Winkler similarity.
fn suggest_kind(unknown: &str) -> Option<PluginKind> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for kind in PluginKind::iter() {
        let score = strsim::jaro_winkler(unknown, &kind.to_string());
        if score > best_score {
            best_score = score;
            best_match = Some(kind);
        }
    }

    best_match
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[[plugins]]
apiVersion = "trellis.dev/v1"
kind = "InitPlugin"

[plugins.metadata]
name = "env-init"
namespace = "trellis"
uid = "urn:uuid:aaaa"

[[plugins]]
apiVersion = "trellis.dev/v1"
kind = "SMTPPlugin"

[plugins.metadata]
name = "relay"
namespace = "mail"
uid = "BBBB"
labels = { tier = "edge" }
"#;

    #[test]
    fn parse_valid_manifest() {
        let manifest = DeploymentManifest::parse(VALID).unwrap();
        assert_eq!(manifest.plugins.len(), 2);

        let email = manifest.get(PluginKind::Smtp).unwrap();
        assert_eq!(email.metadata.name, "relay");
        assert_eq!(email.metadata.label("tier"), Some("edge"));
        assert!(manifest.get(PluginKind::Cache).is_none());
    }

    #[test]
    fn unknown_kind_gets_a_suggestion() {
        let toml = VALID.replace("SMTPPlugin", "SMTPPlugn");
        let err = DeploymentManifest::parse(&toml).unwrap_err().to_string();
        assert!(err.contains("plugins[1]"), "{err}");
        assert!(err.contains("Did you mean `SMTPPlugin`?"), "{err}");
    }

    #[test]
    fn duplicate_kind_is_rejected() {
        let toml = VALID.replace("SMTPPlugin", "InitPlugin");
        let err = DeploymentManifest::parse(&toml).unwrap_err().to_string();
        assert!(err.contains("second InitPlugin"), "{err}");
    }

    #[test]
    fn init_plugin_is_required() {
        let toml = VALID.replacen("InitPlugin", "CachePlugin", 1);
        let err = DeploymentManifest::parse(&toml).unwrap_err().to_string();
        assert!(err.contains("an InitPlugin must be declared"), "{err}");
    }

    #[test]
    fn empty_identity_fields_are_rejected() {
        let toml = VALID.replace("name = \"relay\"", "name = \"  \"");
        let err = DeploymentManifest::parse(&toml).unwrap_err().to_string();
        assert!(err.contains("metadata.name must not be empty"), "{err}");
    }

    #[test]
    fn foreign_api_version_is_rejected() {
        let toml = VALID.replacen("trellis.dev/v1", "trellis.dev/v0", 1);
        let err = DeploymentManifest::parse(&toml).unwrap_err().to_string();
        assert!(err.contains("unsupported apiVersion `trellis.dev/v0`"), "{err}");
    }

    #[test]
    fn serialized_manifest_parses_back() {
        let manifest = DeploymentManifest::parse(VALID).unwrap();
        let again = DeploymentManifest::parse(&manifest.to_toml().unwrap()).unwrap();
        assert_eq!(again, manifest);
    }
}
