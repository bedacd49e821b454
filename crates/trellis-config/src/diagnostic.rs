// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Turns shape errors from the default-filled tree into miette diagnostics
//! with source spans and "did you mean?" suggestions (Jaro-Winkler).

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use trellis_core::TrellisError;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key the configuration type does not know.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(trellis::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key with no value and no default.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(trellis::config::missing_key),
        help("set `{key}` in the configuration, or give it a default")
    )]
    MissingKey { key: String },

    /// A value of the wrong type or out of range.
    #[error("invalid configuration value: {detail}")]
    #[diagnostic(code(trellis::config::invalid_value))]
    InvalidValue { detail: String },

    /// The configuration source could not be read or parsed.
    #[error("could not read configuration: {detail}")]
    #[diagnostic(
        code(trellis::config::source),
        help("check that every configuration file is readable and valid TOML")
    )]
    Source { detail: String },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(trellis::config::other))]
    Other(String),
}

impl ConfigError {
    /// Points an unknown-key error at the first source file that mentions
    /// the key. Other errors are returned unchanged.
    pub fn with_sources(self, sources: &[(String, String)]) -> Self {
        match self {
            ConfigError::UnknownKey {
                key,
                suggestion,
                valid_keys,
                span: None,
                src: None,
            } => {
                let located = sources.iter().find_map(|(path, content)| {
                    find_key_offset(content, &key).map(|offset| (path, content, offset))
                });
                let (span, src) = match located {
                    Some((path, content, offset)) => (
                        Some(SourceSpan::new(offset.into(), key.len())),
                        Some(NamedSource::new(path, content.clone())),
                    ),
                    None => (None, None),
                };
                ConfigError::UnknownKey {
                    key,
                    suggestion,
                    valid_keys,
                    span,
                    src,
                }
            }
            other => other,
        }
    }
}

impl From<ConfigError> for TrellisError {
    fn from(err: ConfigError) -> Self {
        TrellisError::Config(err.to_string())
    }
}

/// Format the help message for unknown key errors.
fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Classifies a deserialization failure of the merged configuration tree.
pub fn shape_error(err: serde_json::Error) -> ConfigError {
    let message = err.to_string();
    // Backticked names: [_, field, _, expected1, _, expected2, ...]
    let quoted: Vec<&str> = message.split('`').skip(1).step_by(2).collect();

    if message.starts_with("unknown field") {
        if let Some((key, expected)) = quoted.split_first() {
            return ConfigError::UnknownKey {
                key: (*key).to_owned(),
                suggestion: suggest_key(key, expected),
                valid_keys: expected.join(", "),
                span: None,
                src: None,
            };
        }
    }

    if message.starts_with("missing field") {
        if let Some(key) = quoted.first() {
            return ConfigError::MissingKey {
                key: (*key).to_owned(),
            };
        }
    }

    if message.starts_with("invalid type") || message.starts_with("invalid value") {
        return ConfigError::InvalidValue { detail: message };
    }

    ConfigError::Other(message)
}

/// Byte offset of `field` used as a key at the start of a TOML line.
pub fn find_key_offset(content: &str, field: &str) -> Option<usize> {
    let mut line_start = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(field) {
            if after.starts_with([' ', '=', '\t']) {
                return Some(line_start + (line.len() - trimmed.len()));
            }
        }
        line_start += line.len();
    }
    None
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
///
/// Returns the best match above the similarity threshold, or `None` if
/// no valid key is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    #[allow(dead_code)]
    struct Server {
        host: String,
        port: u16,
        workers: u32,
    }

    fn parse(value: serde_json::Value) -> ConfigError {
        shape_error(serde_json::from_value::<Server>(value).unwrap_err())
    }

    #[test]
    fn suggest_prot_for_port() {
        assert_eq!(
            suggest_key("prot", &["host", "port", "workers"]),
            Some("port".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        assert_eq!(suggest_key("zzzzzz", &["host", "port"]), None);
    }

    #[test]
    fn unknown_field_becomes_unknown_key() {
        let err = parse(serde_json::json!({
            "host": "h", "port": 1, "workers": 2, "wrokers": 3
        }));
        match err {
            ConfigError::UnknownKey {
                key,
                suggestion,
                valid_keys,
                ..
            } => {
                assert_eq!(key, "wrokers");
                assert_eq!(suggestion.as_deref(), Some("workers"));
                assert_eq!(valid_keys, "host, port, workers");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_field_becomes_missing_key() {
        let err = parse(serde_json::json!({ "host": "h", "port": 1 }));
        assert!(matches!(err, ConfigError::MissingKey { ref key } if key == "workers"));
    }

    #[test]
    fn wrong_type_becomes_invalid_value() {
        let err = parse(serde_json::json!({ "host": "h", "port": "eighty", "workers": 1 }));
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = parse(serde_json::json!({ "host": "h", "port": 70000, "workers": 1 }));
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn find_key_offset_skips_prefix_matches() {
        let content = "[server]\nhostname = \"x\"\r\n  host = \"y\"\n";
        let offset = find_key_offset(content, "host").unwrap();
        assert_eq!(&content[offset..offset + 4], "host");
        assert!(content[..offset].contains("hostname"));
    }

    #[test]
    fn with_sources_attaches_span() {
        let err = ConfigError::UnknownKey {
            key: "prot".into(),
            suggestion: Some("port".into()),
            valid_keys: "host, port".into(),
            span: None,
            src: None,
        };
        let sources = vec![("trellis.toml".to_string(), "[server]\nprot = 1\n".to_string())];
        match err.with_sources(&sources) {
            ConfigError::UnknownKey { span, src, .. } => {
                assert_eq!(span.unwrap().offset(), 9);
                assert!(src.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn converts_into_trellis_config_error() {
        let err: TrellisError = ConfigError::MissingKey { key: "port".into() }.into();
        assert!(matches!(err, TrellisError::Config(ref m) if m.contains("`port`")));
    }
}
