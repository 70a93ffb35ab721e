// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the port binding lifecycle.
//!
//! An input binds immediately when its target output exists, otherwise it
//! waits on the creation channel. Outputs that name their input do the
//! same from the other side.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// An input is now fed by an output.
///
/// # Log Level
/// `info!` - Wiring change
pub struct BindingResolved<'a> {
    pub input_path: &'a str,
    pub output_path: &'a str,
}

impl Display for BindingResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Bound {} -> {}", self.output_path, self.input_path)
    }
}

impl StructuredLog for BindingResolved<'_> {
    fn log(&self) {
        tracing::info!(
            input_path = self.input_path,
            output_path = self.output_path,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "binding_resolved",
            span_name = name,
            input_path = self.input_path,
            output_path = self.output_path,
        )
    }
}

/// A port is waiting for its counterpart to be created.
///
/// # Log Level
/// `debug!` - Normal during start-up
pub struct BindingDeferred<'a> {
    pub port_path: &'a str,
    pub target_path: &'a str,
}

impl Display for BindingDeferred<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} waits for {} to appear", self.port_path, self.target_path)
    }
}

impl StructuredLog for BindingDeferred<'_> {
    fn log(&self) {
        tracing::debug!(
            port_path = self.port_path,
            target_path = self.target_path,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "binding_deferred",
            span_name = name,
            port_path = self.port_path,
            target_path = self.target_path,
        )
    }
}

/// An output found its target input, but the input is already wired
/// elsewhere.
///
/// # Log Level
/// `warn!` - Two writers competing for one input
pub struct BindingRejected<'a> {
    pub input_path: &'a str,
    pub output_path: &'a str,
}

impl Display for BindingRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} is already bound; ignoring {}",
            self.input_path, self.output_path
        )
    }
}

impl StructuredLog for BindingRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            input_path = self.input_path,
            output_path = self.output_path,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "binding_rejected",
            span_name = name,
            input_path = self.input_path,
            output_path = self.output_path,
        )
    }
}

/// The output feeding an input was dropped.
///
/// # Log Level
/// `info!` - Wiring change
pub struct UpstreamDetached<'a> {
    pub input_path: &'a str,
}

impl Display for UpstreamDetached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Upstream of {} went away", self.input_path)
    }
}

impl StructuredLog for UpstreamDetached<'_> {
    fn log(&self) {
        tracing::info!(input_path = self.input_path, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("upstream_detached", span_name = name, input_path = self.input_path)
    }
}
