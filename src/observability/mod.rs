// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout the model controller. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Keep log wording out of the code that raises the event
//! * Attach the same structured fields to every occurrence of an event
//! * Provide consistent, human-readable output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::graph` - node tree registration, removal and lookups
//! * `messages::binding` - port binding lifecycle
//! * `messages::config` - configuration document and module instantiation
//! * `messages::sequence` - sequence processor parsing and phase changes
//! * `messages::hardware` - PWM channel allocation and driver calls
//! * `messages::network` - messaging namespace traffic
//!
//! # Usage
//!
//! ```rust
//! use model_controller::observability::messages::{binding::UpstreamDetached, StructuredLog};
//!
//! UpstreamDetached {
//!     input_path: "/Processors/Gain1/in",
//! }
//! .log();
//! ```
//!
//! Subscriber setup lives in [`init_tracing`].

pub mod messages;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when it is set and parses.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
