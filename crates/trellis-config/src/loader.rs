// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration sources.
//!
//! [`ConfigSource`] is where a load pass gets its raw tree from. The tree
//! may be partial; the store fills the gaps from the defaults.
//!
//! [`FigmentSource`] layers TOML files in XDG order:
//! `/etc/trellis/trellis.toml` < `~/.config/trellis/trellis.toml` <
//! `./trellis.toml` < an explicit file, then `TRELLIS_CONFIG_*` environment
//! variables with `__` separating nested keys
//! (`TRELLIS_CONFIG_SERVER__PORT=9000` sets `server.port`).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde_json::Value;
use trellis_core::TrellisError;

use crate::diagnostic::ConfigError;

/// Default environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "TRELLIS_CONFIG_";

/// Supplies raw configuration trees to a load pass.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;

    /// Reads the current (possibly partial) configuration tree.
    ///
    /// `Value::Null` means the source has nothing to contribute.
    async fn read(&self) -> Result<Value, TrellisError>;

    /// `(name, content)` of the documents behind the last read, used to
    /// point diagnostics at the offending line.
    fn documents(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Layered TOML + environment source backed by figment.
#[derive(Debug, Clone)]
pub struct FigmentSource {
    files: Vec<PathBuf>,
    env_prefix: Option<String>,
}

impl FigmentSource {
    /// The standard XDG hierarchy with environment overrides.
    pub fn standard() -> Self {
        let mut files = vec![PathBuf::from("/etc/trellis/trellis.toml")];
        if let Some(dir) = dirs::config_dir() {
            files.push(dir.join("trellis/trellis.toml"));
        }
        files.push(PathBuf::from("trellis.toml"));
        Self {
            files,
            env_prefix: Some(ENV_PREFIX.to_owned()),
        }
    }

    /// No files and no environment; add layers with the builder methods.
    pub fn empty() -> Self {
        Self {
            files: Vec::new(),
            env_prefix: None,
        }
    }

    /// Adds a file layered above every file added so far. Missing files
    /// are skipped at read time.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Replaces the environment prefix, or disables environment overrides.
    pub fn with_env_prefix(mut self, prefix: Option<&str>) -> Self {
        self.env_prefix = prefix.map(str::to_owned);
        self
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Build the Figment used for a read (exposed for diagnostic use).
    pub fn figment(&self) -> Figment {
        let mut figment = Figment::new();
        for file in &self.files {
            figment = figment.merge(Toml::file(file));
        }
        if let Some(prefix) = &self.env_prefix {
            figment = figment.merge(Env::prefixed(prefix).split("__"));
        }
        figment
    }

    fn existing_files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path).filter(|p| p.is_file())
    }
}

#[async_trait]
impl ConfigSource for FigmentSource {
    fn describe(&self) -> String {
        let files: Vec<String> = self
            .existing_files()
            .map(|p| p.display().to_string())
            .collect();
        let files = if files.is_empty() {
            "no files".to_owned()
        } else {
            files.join(", ")
        };
        match &self.env_prefix {
            Some(prefix) => format!("{files} + {prefix}* env"),
            None => files,
        }
    }

    async fn read(&self) -> Result<Value, TrellisError> {
        self.figment().extract::<Value>().map_err(|err| {
            ConfigError::Source {
                detail: err.to_string(),
            }
            .into()
        })
    }

    fn documents(&self) -> Vec<(String, String)> {
        self.existing_files()
            .filter_map(|path| {
                std::fs::read_to_string(path)
                    .ok()
                    .map(|content| (path.display().to_string(), content))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use serial_test::serial;

    use super::*;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn later_files_override_earlier_ones() {
        let base = toml_file("[server]\nhost = \"0.0.0.0\"\nport = 80\n");
        let local = toml_file("[server]\nport = 8080\n");
        let source = FigmentSource::empty()
            .with_file(base.path())
            .with_file(local.path());

        let tree = source.read().await.unwrap();
        assert_eq!(tree, json!({ "server": { "host": "0.0.0.0", "port": 8080 } }));
        assert_eq!(source.documents().len(), 2);
    }

    #[tokio::test]
    async fn missing_files_are_skipped() {
        let source = FigmentSource::empty().with_file("/nonexistent/trellis.toml");
        let tree = source.read().await.unwrap();
        assert_eq!(tree, json!({}));
        assert!(source.documents().is_empty());
        assert_eq!(source.describe(), "no files");
    }

    #[tokio::test]
    async fn malformed_toml_is_a_config_error() {
        let broken = toml_file("[server\nport = 1\n");
        let source = FigmentSource::empty().with_file(broken.path());
        let err = source.read().await.unwrap_err();
        assert!(matches!(err, TrellisError::Config(ref m) if m.contains("could not read")));
    }

    #[tokio::test]
    #[serial]
    async fn env_overrides_nest_on_double_underscore() {
        let file = toml_file("[server]\nport = 80\n");
        // SAFETY: serialized with every other test touching the environment.
        unsafe {
            std::env::set_var("TRELLIS_TEST_SERVER__PORT", "9000");
            std::env::set_var("TRELLIS_TEST_LOG_LEVEL", "debug");
        }
        let source = FigmentSource::empty()
            .with_file(file.path())
            .with_env_prefix(Some("TRELLIS_TEST_"));
        let tree = source.read().await;
        unsafe {
            std::env::remove_var("TRELLIS_TEST_SERVER__PORT");
            std::env::remove_var("TRELLIS_TEST_LOG_LEVEL");
        }

        let tree = tree.unwrap();
        assert_eq!(tree["server"]["port"], json!(9000));
        assert_eq!(tree["log_level"], json!("debug"));
    }
}
