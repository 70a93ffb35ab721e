// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it at a fixed level with its fields attached.
//!
//! # Organization
//!
//! * `graph` - node tree events
//! * `binding` - port binding lifecycle
//! * `config` - document persistence and module instantiation
//! * `sequence` - sequence processor events
//! * `hardware` - PWM allocation and driver calls
//! * `network` - messaging namespace traffic
//!
//! # Usage Pattern
//!
//! ```rust
//! use model_controller::observability::messages::{config::ConfigChanged, StructuredLog};
//!
//! let msg = ConfigChanged {
//!     path: "/Processors/Gain1",
//! };
//!
//! msg.log();
//! tracing::info!("{}", msg);
//! ```

use tracing::Span;

pub mod binding;
pub mod config;
pub mod graph;
pub mod hardware;
pub mod network;
pub mod sequence;

/// A log event that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emits the event at its level with its fields attached.
    fn log(&self);

    /// Opens a span carrying the same fields.
    fn span(&self, name: &str) -> Span;
}
