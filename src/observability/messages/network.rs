// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the messaging namespace.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A namespace subscribed to an inbound topic.
///
/// # Log Level
/// `debug!` - One per materialized output
pub struct TopicSubscribed<'a> {
    pub namespace_path: &'a str,
    pub topic: &'a str,
}

impl Display for TopicSubscribed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} subscribed to {}", self.namespace_path, self.topic)
    }
}

impl StructuredLog for TopicSubscribed<'_> {
    fn log(&self) {
        tracing::debug!(namespace_path = self.namespace_path, topic = self.topic, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "topic_subscribed",
            span_name = name,
            namespace_path = self.namespace_path,
            topic = self.topic,
        )
    }
}

/// A value left the node on a topic.
///
/// # Log Level
/// `trace!` - Every published value
pub struct MessagePublished<'a> {
    pub topic: &'a str,
    pub payload: &'a str,
}

impl Display for MessagePublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Published {} = {}", self.topic, self.payload)
    }
}

impl StructuredLog for MessagePublished<'_> {
    fn log(&self) {
        tracing::trace!(topic = self.topic, payload = self.payload, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("message_published", span_name = name, topic = self.topic)
    }
}

/// An inbound message matched no live output.
///
/// # Log Level
/// `debug!` - Stale subscription or foreign traffic
pub struct MessageUnrouted<'a> {
    pub namespace_path: &'a str,
    pub topic: &'a str,
}

impl Display for MessageUnrouted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} has no output for topic {}", self.namespace_path, self.topic)
    }
}

impl StructuredLog for MessageUnrouted<'_> {
    fn log(&self) {
        tracing::debug!(namespace_path = self.namespace_path, topic = self.topic, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "message_unrouted",
            span_name = name,
            namespace_path = self.namespace_path,
            topic = self.topic,
        )
    }
}

/// An inbound payload could not be parsed by the port it targets.
///
/// # Log Level
/// `warn!` - Sender and port disagree on the type
pub struct PayloadRejected<'a> {
    pub topic: &'a str,
    pub payload: &'a str,
}

impl Display for PayloadRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Payload '{}' on {} was rejected", self.payload, self.topic)
    }
}

impl StructuredLog for PayloadRejected<'_> {
    fn log(&self) {
        tracing::warn!(topic = self.topic, payload = self.payload, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("payload_rejected", span_name = name, topic = self.topic)
    }
}
