// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the configuration document, module instantiation and
//! controller lifecycle.

use crate::errors::{ConfigError, GraphError};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// The configuration document does not exist yet; starting empty.
///
/// # Log Level
/// `warn!` - First boot or a misplaced file
pub struct DocumentMissing<'a> {
    pub path: &'a Path,
}

impl Display for DocumentMissing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration document {} not found, starting with an empty model",
            self.path.display()
        )
    }
}

impl StructuredLog for DocumentMissing<'_> {
    fn log(&self) {
        tracing::warn!(path = %self.path.display(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("document_missing", span_name = name, path = %self.path.display())
    }
}

/// Writing the document back to disk failed.
///
/// # Log Level
/// `error!` - Changes will be lost on restart
pub struct DocumentSaveFailed<'a> {
    pub error: &'a ConfigError,
}

impl Display for DocumentSaveFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to save configuration document: {}", self.error)
    }
}

impl StructuredLog for DocumentSaveFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("document_save_failed", span_name = name, error = %self.error)
    }
}

/// A fragment of the document was written.
///
/// # Log Level
/// `info!` - Configuration change
pub struct ConfigChanged<'a> {
    pub path: &'a str,
}

impl Display for ConfigChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration at {} changed", self.path)
    }
}

impl StructuredLog for ConfigChanged<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("config_changed", span_name = name, path = self.path)
    }
}

/// A fragment of the document was removed.
///
/// # Log Level
/// `info!` - Configuration change
pub struct ConfigDeleted<'a> {
    pub path: &'a str,
}

impl Display for ConfigDeleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration at {} deleted", self.path)
    }
}

impl StructuredLog for ConfigDeleted<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("config_deleted", span_name = name, path = self.path)
    }
}

/// A module was instantiated from its fragment.
///
/// # Log Level
/// `info!` - Model change
pub struct ModuleCreated<'a> {
    pub path: &'a str,
    pub module_type: &'a str,
}

impl Display for ModuleCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Created {} module at {}", self.module_type, self.path)
    }
}

impl StructuredLog for ModuleCreated<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, module_type = self.module_type, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "module_created",
            span_name = name,
            path = self.path,
            module_type = self.module_type,
        )
    }
}

/// A module fragment could not be instantiated.
///
/// # Log Level
/// `error!` - Part of the model is missing
pub struct ModuleCreationFailed<'a> {
    pub path: &'a str,
    pub module_type: &'a str,
    pub error: &'a GraphError,
}

impl Display for ModuleCreationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to create {} module at {}: {}",
            self.module_type, self.path, self.error
        )
    }
}

impl StructuredLog for ModuleCreationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            path = self.path,
            module_type = self.module_type,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "module_creation_failed",
            span_name = name,
            path = self.path,
            module_type = self.module_type,
            error = %self.error,
        )
    }
}

/// A fragment without a known `type` is treated as a namespace for its
/// object-valued children.
///
/// # Log Level
/// `debug!` - Normal for grouping keys
pub struct FragmentNamespaced<'a> {
    pub path: &'a str,
}

impl Display for FragmentNamespaced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "No module type at {}, descending into children", self.path)
    }
}

impl StructuredLog for FragmentNamespaced<'_> {
    fn log(&self) {
        tracing::debug!(path = self.path, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("fragment_namespaced", span_name = name, path = self.path)
    }
}

/// Controller settings were read from a file.
///
/// # Log Level
/// `info!` - Start-up
pub struct SettingsLoaded<'a> {
    pub path: &'a Path,
    pub document_path: &'a Path,
    pub tick_interval_ms: u64,
}

impl Display for SettingsLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded settings from {}: document {}, tick every {}ms",
            self.path.display(),
            self.document_path.display(),
            self.tick_interval_ms
        )
    }
}

impl StructuredLog for SettingsLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = %self.path.display(),
            document_path = %self.document_path.display(),
            tick_interval_ms = self.tick_interval_ms,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "settings_loaded",
            span_name = name,
            path = %self.path.display(),
            document_path = %self.document_path.display(),
            tick_interval_ms = self.tick_interval_ms,
        )
    }
}

/// The cooperative loop is starting.
///
/// # Log Level
/// `info!` - Start-up
pub struct ControllerStarted<'a> {
    pub edge_name: &'a str,
    pub node_count: usize,
    pub tick_interval_ms: u64,
}

impl Display for ControllerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Controller {} running with {} nodes, tick every {}ms",
            self.edge_name, self.node_count, self.tick_interval_ms
        )
    }
}

impl StructuredLog for ControllerStarted<'_> {
    fn log(&self) {
        tracing::info!(
            edge_name = self.edge_name,
            node_count = self.node_count,
            tick_interval_ms = self.tick_interval_ms,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "controller",
            span_name = name,
            edge_name = self.edge_name,
            node_count = self.node_count,
            tick_interval_ms = self.tick_interval_ms,
        )
    }
}

/// The cooperative loop stopped after `ticks` iterations.
///
/// # Log Level
/// `info!` - Shutdown
pub struct ControllerStopped<'a> {
    pub edge_name: &'a str,
    pub ticks: u64,
}

impl Display for ControllerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Controller {} stopped after {} ticks", self.edge_name, self.ticks)
    }
}

impl StructuredLog for ControllerStopped<'_> {
    fn log(&self) {
        tracing::info!(edge_name = self.edge_name, ticks = self.ticks, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "controller_stopped",
            span_name = name,
            edge_name = self.edge_name,
            ticks = self.ticks,
        )
    }
}
