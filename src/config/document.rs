// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::graph::relative_path;
use crate::observability::messages::{config::DocumentMissing, StructuredLog};

/// The persisted JSON configuration, addressed with node-path syntax.
///
/// `/Processors/Gain1/gain` names `document["Processors"]["Gain1"]["gain"]`.
/// When a file is attached, [`ConfigDocument::save`] writes it back as
/// pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Value,
    file: Option<PathBuf>,
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    relative_path(path).split('/').filter(|segment| !segment.is_empty())
}

impl ConfigDocument {
    /// Empty in-memory document.
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
            file: None,
        }
    }

    /// In-memory document; a non-object value is replaced by `{}`.
    pub fn from_value(value: Value) -> Self {
        let root = match value {
            Value::Object(_) => value,
            _ => Value::Object(Map::new()),
        };
        Self { root, file: None }
    }

    /// Loads `path`, or starts empty (still attached to `path`) when the
    /// file does not exist yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            DocumentMissing { path }.log();
            return Ok(Self {
                root: Value::Object(Map::new()),
                file: Some(path.to_path_buf()),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if !value.is_object() {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                message: "top-level value must be an object".to_string(),
            });
        }
        Ok(Self {
            root: value,
            file: Some(path.to_path_buf()),
        })
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn attach_file<P: Into<PathBuf>>(&mut self, path: P) {
        self.file = Some(path.into());
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        segments(path).try_fold(&self.root, |value, segment| value.get(segment))
    }

    /// Returns the value at `path`, creating empty objects along the way and
    /// a `null` leaf when it is missing. Non-object values in the way are
    /// replaced.
    pub fn get_or_create(&mut self, path: &str) -> &mut Value {
        let mut current = &mut self.root;
        for segment in segments(path) {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            current = &mut current[segment];
        }
        current
    }

    /// Replaces the value at `path`. Setting the root only accepts objects.
    pub fn set(&mut self, path: &str, value: Value) {
        if segments(path).next().is_none() {
            if value.is_object() {
                self.root = value;
            }
            return;
        }
        *self.get_or_create(path) = value;
    }

    /// Removes the value at `path` and any ancestor object left empty by
    /// the removal. Returns false when nothing was there.
    pub fn remove(&mut self, path: &str) -> bool {
        let segments: Vec<&str> = segments(path).collect();
        match &mut self.root {
            Value::Object(map) => remove_at(map, &segments),
            _ => false,
        }
    }

    /// Writes the document to its attached file; in-memory documents are
    /// left untouched.
    pub fn save(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        let text = serde_json::to_string_pretty(&self.root).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })
    }
}

fn remove_at(map: &mut Map<String, Value>, segments: &[&str]) -> bool {
    match segments {
        [] => false,
        [last] => map.remove(*last).is_some(),
        [first, rest @ ..] => {
            let Some(Value::Object(child)) = map.get_mut(*first) else {
                return false;
            };
            let removed = remove_at(child, rest);
            if removed && child.is_empty() {
                map.remove(*first);
            }
            removed
        }
    }
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample() -> ConfigDocument {
        ConfigDocument::from_value(json!({
            "Processors": {
                "Gain1": {"type": "gain", "gain": 2, "in": "/Processors/A/out"},
                "Seq": {"type": "sequence"}
            },
            "wifi": {"ssid": "lab"}
        }))
    }

    #[test]
    fn get_follows_node_paths() {
        let doc = sample();
        assert_eq!(doc.get("/Processors/Gain1/gain"), Some(&json!(2)));
        assert_eq!(doc.get("Processors/Gain1/type"), Some(&json!("gain")));
        assert_eq!(doc.get("root/wifi/ssid"), Some(&json!("lab")));
        assert_eq!(doc.get("/Processors/Missing"), None);
        assert_eq!(doc.get("/wifi/ssid/deeper"), None);
        assert_eq!(doc.get(""), Some(doc.root()));
    }

    #[test]
    fn get_or_create_builds_intermediate_objects() {
        let mut doc = ConfigDocument::new();
        *doc.get_or_create("/Connectors/PWM_0/frequency") = json!(1000);
        assert_eq!(doc.root(), &json!({"Connectors": {"PWM_0": {"frequency": 1000}}}));

        let mut doc = sample();
        *doc.get_or_create("/wifi/ssid/band") = json!(5);
        assert_eq!(doc.get("/wifi/ssid"), Some(&json!({"band": 5})));
    }

    #[test]
    fn remove_prunes_emptied_ancestors() {
        let mut doc = ConfigDocument::from_value(json!({
            "Processors": {"group": {"g1": {"type": "gain"}}, "Other": {"type": "gain"}}
        }));

        assert!(doc.remove("/Processors/group/g1"));
        assert_eq!(doc.root(), &json!({"Processors": {"Other": {"type": "gain"}}}));

        assert!(doc.remove("/Processors/Other"));
        assert_eq!(doc.root(), &json!({}));
        assert!(!doc.remove("/Processors/Other"));
    }

    #[test]
    fn set_on_root_requires_an_object() {
        let mut doc = sample();
        doc.set("", json!(3));
        assert!(doc.get("/wifi").is_some());
        doc.set("/", json!({"fresh": true}));
        assert_eq!(doc.root(), &json!({"fresh": true}));
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Config.json");

        let mut doc = ConfigDocument::load(&path).unwrap();
        assert_eq!(doc.root(), &json!({}));
        doc.set("/Processors/Gain1", json!({"type": "gain", "gain": 3}));
        doc.save().unwrap();

        let reloaded = ConfigDocument::load(&path).unwrap();
        assert_eq!(reloaded.get("/Processors/Gain1/gain"), Some(&json!(3)));
        assert_eq!(reloaded.file(), Some(path.as_path()));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ConfigDocument::load(&path), Err(ConfigError::Parse { .. })));

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(ConfigDocument::load(&path), Err(ConfigError::Parse { .. })));
    }
}
