// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deep default-fill of loaded configuration trees.
//!
//! Objects merge key by key, recursively. Arrays merge index by index: each
//! loaded element is filled from the default at the same index, and default
//! elements past the loaded length are appended. Any other value present in
//! the loaded tree (scalars, explicit `null`) wins as a whole. Keys the loaded
//! tree does not mention take their default.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::diagnostic::{shape_error, ConfigError};

/// Fills every key and index of `defaults` missing from `loaded`.
pub fn default_fill(defaults: &Value, loaded: Value) -> Value {
    match (defaults, loaded) {
        (Value::Object(defaults), Value::Object(mut loaded)) => {
            for (key, default) in defaults {
                match loaded.get_mut(key) {
                    Some(slot) => {
                        let value = slot.take();
                        *slot = default_fill(default, value);
                    }
                    None => {
                        loaded.insert(key.clone(), default.clone());
                    }
                }
            }
            Value::Object(loaded)
        }
        (Value::Array(defaults), Value::Array(loaded)) => {
            let mut loaded = loaded.into_iter();
            let mut filled: Vec<Value> = defaults
                .iter()
                .map(|default| match loaded.next() {
                    Some(value) => default_fill(default, value),
                    None => default.clone(),
                })
                .collect();
            filled.extend(loaded);
            Value::Array(filled)
        }
        (_, loaded) => loaded,
    }
}

/// Default-fills `loaded` and deserializes the result into `C`.
///
/// A `null` root means the source supplied nothing, so the result is
/// exactly the defaults.
pub fn resolve<C: DeserializeOwned>(defaults: &Value, loaded: Value) -> Result<C, ConfigError> {
    let loaded = match loaded {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    let merged = default_fill(defaults, loaded);
    serde_json::from_value(merged).map_err(shape_error)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_keys_take_defaults_at_every_depth() {
        let defaults = json!({
            "server": { "host": "127.0.0.1", "port": 8080, "tls": { "enabled": false } },
            "name": "trellis"
        });
        let loaded = json!({ "server": { "port": 9090, "tls": {} } });

        let merged = default_fill(&defaults, loaded);
        assert_eq!(
            merged,
            json!({
                "server": { "host": "127.0.0.1", "port": 9090, "tls": { "enabled": false } },
                "name": "trellis"
            })
        );
    }

    #[test]
    fn loaded_scalars_and_nulls_win_wholesale() {
        let defaults = json!({ "peers": ["a", "b"], "motd": "hi", "limits": { "rps": 5 } });
        let loaded = json!({ "peers": null, "motd": 7, "limits": 0 });
        let merged = default_fill(&defaults, loaded);
        assert_eq!(merged, json!({ "peers": null, "motd": 7, "limits": 0 }));
    }

    #[test]
    fn arrays_fill_index_by_index() {
        let defaults = json!({ "peers": ["a", "b", "c"], "list": [{ "x": 1, "y": 2 }] });
        let loaded = json!({ "peers": ["z"], "list": [{ "x": 9 }] });
        let merged = default_fill(&defaults, loaded);
        assert_eq!(merged, json!({ "peers": ["z", "b", "c"], "list": [{ "x": 9, "y": 2 }] }));
    }

    #[test]
    fn longer_loaded_arrays_keep_their_tail() {
        let merged = default_fill(&json!([{ "a": 1 }]), json!([{}, 5, null]));
        assert_eq!(merged, json!([{ "a": 1 }, 5, null]));
    }

    #[test]
    fn unknown_loaded_keys_are_kept() {
        let merged = default_fill(&json!({ "a": 1 }), json!({ "b": 2 }));
        assert_eq!(merged, json!({ "a": 1, "b": 2 }));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Limits {
        rps: u32,
        burst: u32,
    }

    #[test]
    fn resolve_treats_null_root_as_empty() {
        let limits: Limits = resolve(&json!({ "rps": 5, "burst": 10 }), Value::Null).unwrap();
        assert_eq!(limits, Limits { rps: 5, burst: 10 });
    }

    #[test]
    fn resolve_reports_unknown_keys() {
        let err = resolve::<Limits>(&json!({ "rps": 5, "burst": 10 }), json!({ "brust": 1 }))
            .unwrap_err();
        match err {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => {
                assert_eq!(key, "brust");
                assert_eq!(suggestion.as_deref(), Some("burst"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    fn json_tree() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i32>().prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
            prop::collection::vec(any::<u8>().prop_map(Value::from), 0..3).prop_map(Value::Array),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::btree_map("[a-c]{1,2}", inner.clone(), 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
                prop::collection::vec(inner, 0..3).prop_map(Value::Array),
            ]
        })
    }

    fn json_object() -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[a-c]{1,2}", json_tree(), 0..4)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    }

    /// Paths to every scalar of `tree`, plus every empty object or array.
    /// Array elements use their index as the path segment.
    fn leaf_paths(tree: &Value, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
        match tree {
            Value::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    prefix.push(key.clone());
                    leaf_paths(child, prefix, out);
                    prefix.pop();
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for (index, child) in items.iter().enumerate() {
                    prefix.push(index.to_string());
                    leaf_paths(child, prefix, out);
                    prefix.pop();
                }
            }
            _ => out.push(prefix.clone()),
        }
    }

    fn step<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
        match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    fn lookup<'a>(tree: &'a Value, path: &[String]) -> Option<&'a Value> {
        path.iter().try_fold(tree, |node, segment| step(node, segment))
    }

    proptest! {
        #[test]
        fn every_default_path_survives_and_overrides_win(
            defaults in json_object(),
            loaded in json_object(),
        ) {
            let merged = default_fill(&defaults, loaded.clone());

            let mut paths = Vec::new();
            leaf_paths(&defaults, &mut Vec::new(), &mut paths);

            for path in paths {
                // Walk both trees along the default path. Descent continues
                // only while the two nodes are containers of the same kind.
                let mut node = &loaded;
                let mut default_node = &defaults;
                let mut depth = 0;
                let expected = loop {
                    if depth == path.len() {
                        break (path.clone(), node);
                    }
                    let same_kind = matches!(
                        (default_node, node),
                        (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_))
                    );
                    if !same_kind {
                        break (path[..depth].to_vec(), node);
                    }
                    match step(node, &path[depth]) {
                        Some(child) => {
                            node = child;
                            default_node = step(default_node, &path[depth]).unwrap();
                            depth += 1;
                        }
                        None => {
                            break (path.clone(), lookup(&defaults, &path).unwrap());
                        }
                    }
                };

                let (at, value) = expected;
                prop_assert_eq!(lookup(&merged, &at), Some(value));
            }
        }

        #[test]
        fn filling_with_itself_is_identity(tree in json_object()) {
            prop_assert_eq!(default_fill(&tree, tree.clone()), tree);
        }
    }
}
