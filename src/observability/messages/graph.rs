// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for node tree events.

use crate::graph::{Direction, PrimitiveType};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A node was inserted into the tree.
///
/// # Log Level
/// `debug!` - Fires for every port and module
pub struct NodeRegistered<'a> {
    pub path: &'a str,
    pub direction: Direction,
    pub primitive_type: PrimitiveType,
}

impl Display for NodeRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered node {} ({}, {})",
            self.path, self.direction, self.primitive_type
        )
    }
}

impl StructuredLog for NodeRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            path = self.path,
            direction = %self.direction,
            primitive_type = %self.primitive_type,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_registered",
            span_name = name,
            path = self.path,
            direction = %self.direction,
            primitive_type = %self.primitive_type,
        )
    }
}

/// A node was removed together with its subtree.
///
/// # Log Level
/// `debug!` - Fires once per removed node
pub struct NodeRemoved<'a> {
    pub path: &'a str,
    pub kind: &'static str,
}

impl Display for NodeRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Removed {} node {}", self.kind, self.path)
    }
}

impl StructuredLog for NodeRemoved<'_> {
    fn log(&self) {
        tracing::debug!(path = self.path, kind = self.kind, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("node_removed", span_name = name, path = self.path, kind = self.kind)
    }
}

/// A typed port lookup found nothing, even after asking the enclosing
/// namespace.
///
/// # Log Level
/// `trace!` - Expected while bindings wait for their targets
pub struct LookupMissed<'a> {
    pub path: &'a str,
    pub direction: Direction,
    pub primitive_type: PrimitiveType,
}

impl Display for LookupMissed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No {} {} port at {}",
            self.primitive_type, self.direction, self.path
        )
    }
}

impl StructuredLog for LookupMissed<'_> {
    fn log(&self) {
        tracing::trace!(
            path = self.path,
            direction = %self.direction,
            primitive_type = %self.primitive_type,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "lookup_missed",
            span_name = name,
            path = self.path,
            direction = %self.direction,
            primitive_type = %self.primitive_type,
        )
    }
}
