// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::consts::{
    DEFAULT_DOCUMENT_PATH, DEFAULT_EDGE_NAME, DEFAULT_LOG_FILTER, DEFAULT_NAMESPACE_PATH,
    DEFAULT_TICK_INTERVAL_MS, DEFAULT_WILDCARD_SUFFIX,
};
use crate::errors::ConfigError;

/// Runtime settings of the controller process.
///
/// Every field has a default, so an empty file (or no file at all) yields a
/// working configuration.
///
/// # Example
/// ```yaml
/// document_path: /data/Config.json
/// tick_interval_ms: 10
/// namespace_path: /Connectors/mqtt
/// edge_name: greenhouse-1
/// log_filter: model_controller=debug
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub document_path: PathBuf,
    pub tick_interval_ms: u64,
    pub namespace_path: String,
    pub wildcard_suffix: String,
    pub log_filter: String,
    pub edge_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            document_path: PathBuf::from(DEFAULT_DOCUMENT_PATH),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            namespace_path: DEFAULT_NAMESPACE_PATH.to_string(),
            wildcard_suffix: DEFAULT_WILDCARD_SUFFIX.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            edge_name: DEFAULT_EDGE_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from a `.yaml`/`.yml` or `.toml` file and validates
    /// them.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let settings: Settings = match extension.as_str() {
            "yaml" | "yml" => {
                if text.trim().is_empty() {
                    Settings::default()
                } else {
                    serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?
                }
            }
            "toml" => toml::from_str(&text).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "tick_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !self.namespace_path.starts_with('/') {
            return Err(ConfigError::InvalidSetting {
                field: "namespace_path",
                reason: format!("'{}' must be an absolute path", self.namespace_path),
            });
        }
        if self.wildcard_suffix.is_empty() {
            return Err(ConfigError::InvalidSetting {
                field: "wildcard_suffix",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn yaml_settings_override_defaults() {
        let file = write_temp(
            ".yaml",
            r#"
tick_interval_ms: 25
edge_name: greenhouse-1
"#,
        );
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.tick_interval_ms, 25);
        assert_eq!(settings.edge_name, "greenhouse-1");
        assert_eq!(settings.namespace_path, DEFAULT_NAMESPACE_PATH);
        assert_eq!(settings.document_path, PathBuf::from(DEFAULT_DOCUMENT_PATH));
    }

    #[test]
    fn toml_settings_are_supported() {
        let file = write_temp(
            ".toml",
            r#"
document_path = "/data/Config.json"
namespace_path = "/Connectors/net"
"#,
        );
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.document_path, PathBuf::from("/data/Config.json"));
        assert_eq!(settings.namespace_path, "/Connectors/net");
        assert_eq!(settings.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let file = write_temp(".yml", "");
        assert_eq!(Settings::load(file.path()).unwrap(), Settings::default());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let cases = [
            ("tick_interval_ms: 0", "tick_interval_ms"),
            ("namespace_path: Connectors/mqtt", "namespace_path"),
            ("wildcard_suffix: ''", "wildcard_suffix"),
        ];
        for (yaml, expected_field) in cases {
            let file = write_temp(".yaml", yaml);
            match Settings::load(file.path()) {
                Err(ConfigError::InvalidSetting { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected InvalidSetting for {}, got {:?}", yaml, other),
            }
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_temp(".ini", "tick_interval_ms=5");
        assert!(matches!(
            Settings::load(file.path()),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "ini"
        ));
    }
}
