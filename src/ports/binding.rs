// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{Map, Value};

use crate::config::consts::BINDING_DISABLED;
use crate::graph::relative_path;

/// Where a port wants to be wired, as read from its module's fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingTarget {
    /// No entry in the fragment: bind into the network namespace.
    Default,
    /// The fragment says `"none"`.
    Disabled,
    Explicit(String),
}

/// Lifecycle of an input's link to its upstream output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unbound,
    AwaitingCreation,
    Bound,
}

impl BindingTarget {
    pub fn from_fragment(fragment: Option<&Map<String, Value>>, port_name: &str) -> Self {
        match fragment
            .and_then(|fragment| fragment.get(port_name))
            .and_then(Value::as_str)
        {
            Some(BINDING_DISABLED) => BindingTarget::Disabled,
            Some(path) => BindingTarget::Explicit(path.to_string()),
            None => BindingTarget::Default,
        }
    }

    /// Concrete path to bind to, if any. Ports that already live under the
    /// namespace get no default binding.
    pub fn resolve(&self, port_path: &str, namespace_path: &str) -> Option<String> {
        match self {
            BindingTarget::Default => {
                if is_under(port_path, namespace_path) {
                    None
                } else {
                    Some(format!("{}{}", namespace_path.trim_end_matches('/'), port_path))
                }
            }
            BindingTarget::Disabled => None,
            BindingTarget::Explicit(path) => Some(path.clone()),
        }
    }

    /// Value written back into the module fragment on export.
    pub fn export(&self) -> Option<Value> {
        match self {
            BindingTarget::Default => None,
            BindingTarget::Disabled => Some(Value::String(BINDING_DISABLED.to_string())),
            BindingTarget::Explicit(path) => Some(Value::String(path.clone())),
        }
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    let path = relative_path(path);
    let prefix = relative_path(prefix).trim_end_matches('/');
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// True when a creation broadcast for `created` concerns a port bound to
/// `target`: either the same path, or `created` ends in the wildcard suffix
/// and the rest of it is a prefix of `target`.
pub fn matches_binding(created: &str, target: &str, wildcard: &str) -> bool {
    let created = relative_path(created);
    let target = relative_path(target);
    if created == target {
        return true;
    }
    match created.strip_suffix(wildcard) {
        Some(prefix) if !wildcard.is_empty() => target.starts_with(prefix),
        _ => false,
    }
}
