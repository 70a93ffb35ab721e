// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading, validating, or persisting configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read or written.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON, YAML or TOML.
    #[error("Cannot parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// The settings file extension maps to no known format.
    #[error("Unsupported settings format '{0}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(String),

    /// A setting holds a value outside its accepted range.
    #[error("Invalid setting '{field}': {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}
