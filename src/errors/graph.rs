// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failures raised while mutating the node tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A sibling with the same name already exists under the parent.
    #[error("Node '{name}' already exists under '{parent_path}'")]
    DuplicateName { parent_path: String, name: String },

    /// The handle refers to a node that has been removed.
    #[error("Node handle {0} is stale")]
    StaleHandle(String),

    /// A node name must not be empty once leading separators are trimmed.
    #[error("Node name must not be empty (parent '{0}')")]
    EmptyName(String),

    /// A module could not be built from its configuration fragment.
    #[error("Cannot create '{module_type}' module at '{path}': {reason}")]
    ModuleCreation {
        module_type: String,
        path: String,
        reason: String,
    },
}
