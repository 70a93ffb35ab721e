// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for PWM channel allocation and driver calls.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Every hardware PWM channel is in use.
///
/// # Log Level
/// `error!` - The module is created without an output
pub struct PwmChannelsExhausted<'a> {
    pub path: &'a str,
    pub channel_count: usize,
}

impl Display for PwmChannelsExhausted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No free PWM channel for {} (all {} in use)",
            self.path, self.channel_count
        )
    }
}

impl StructuredLog for PwmChannelsExhausted<'_> {
    fn log(&self) {
        tracing::error!(path = self.path, channel_count = self.channel_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "pwm_channels_exhausted",
            span_name = name,
            path = self.path,
            channel_count = self.channel_count,
        )
    }
}

/// A driver operation, as seen by the logging driver.
///
/// # Log Level
/// `debug!` - One event per driver call
pub struct PwmDriverCall {
    pub operation: &'static str,
    pub channel: Option<u8>,
    pub pin: Option<u8>,
    pub value: u32,
}

impl Display for PwmDriverCall {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "pwm {}", self.operation)?;
        if let Some(channel) = self.channel {
            write!(f, " channel={}", channel)?;
        }
        if let Some(pin) = self.pin {
            write!(f, " pin={}", pin)?;
        }
        write!(f, " value={}", self.value)
    }
}

impl StructuredLog for PwmDriverCall {
    fn log(&self) {
        tracing::debug!(
            operation = self.operation,
            channel = ?self.channel,
            pin = ?self.pin,
            value = self.value,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "pwm_driver_call",
            span_name = name,
            operation = self.operation,
            channel = ?self.channel,
        )
    }
}
