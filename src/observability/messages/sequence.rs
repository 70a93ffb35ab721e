// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for sequence processors.

use crate::backends::local::Phase;
use crate::errors::SequenceWarning;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A sequence string was only partly understood.
///
/// # Log Level
/// `warn!` - The processor runs with substituted values
pub struct SequenceParseWarning<'a> {
    pub processor_path: &'a str,
    pub source: &'a str,
    pub warning: &'a SequenceWarning,
}

impl Display for SequenceParseWarning<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Sequence '{}' of {}: {}",
            self.source, self.processor_path, self.warning
        )
    }
}

impl StructuredLog for SequenceParseWarning<'_> {
    fn log(&self) {
        tracing::warn!(
            processor_path = self.processor_path,
            source = self.source,
            warning = %self.warning,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "sequence_parse_warning",
            span_name = name,
            processor_path = self.processor_path,
            source = self.source,
        )
    }
}

/// An on/off transition never ends; it is treated as empty.
///
/// # Log Level
/// `warn!` - Configuration mistake
pub struct InfiniteTransition<'a> {
    pub processor_path: &'a str,
    pub transition: &'a str,
}

impl Display for InfiniteTransition<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "The '{}' transition of {} never ends and will be skipped",
            self.transition, self.processor_path
        )
    }
}

impl StructuredLog for InfiniteTransition<'_> {
    fn log(&self) {
        tracing::warn!(
            processor_path = self.processor_path,
            transition = self.transition,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "infinite_transition",
            span_name = name,
            processor_path = self.processor_path,
            transition = self.transition,
        )
    }
}

/// A mode was requested through the `targetMode` input.
///
/// # Log Level
/// `info!` - Operator action
pub struct ModeSelected<'a> {
    pub processor_path: &'a str,
    pub mode: &'a str,
}

impl Display for ModeSelected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.mode.is_empty() {
            write!(f, "{} deactivated", self.processor_path)
        } else {
            write!(f, "{} switching to mode '{}'", self.processor_path, self.mode)
        }
    }
}

impl StructuredLog for ModeSelected<'_> {
    fn log(&self) {
        tracing::info!(processor_path = self.processor_path, mode = self.mode, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "mode_selected",
            span_name = name,
            processor_path = self.processor_path,
            mode = self.mode,
        )
    }
}

/// The processor moved between activation phases.
///
/// # Log Level
/// `debug!` - State machine trace
pub struct PhaseChanged<'a> {
    pub mode: &'a str,
    pub from: Phase,
    pub to: Phase,
    pub now_ms: u64,
}

impl Display for PhaseChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Mode '{}': {} -> {} at {}ms",
            self.mode, self.from, self.to, self.now_ms
        )
    }
}

impl StructuredLog for PhaseChanged<'_> {
    fn log(&self) {
        tracing::debug!(
            mode = self.mode,
            from = %self.from,
            to = %self.to,
            now_ms = self.now_ms,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "phase_changed",
            span_name = name,
            mode = self.mode,
            from = %self.from,
            to = %self.to,
        )
    }
}
