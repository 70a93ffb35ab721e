// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// A message received from the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: String,
}

/// Publish/subscribe link used by the network namespace.
///
/// Polled once per tick; implementations must not block.
pub trait Transport {
    fn subscribe(&self, topic: &str);

    fn publish(&self, topic: &str, payload: &str);

    /// Drains messages received since the last poll.
    fn poll(&self) -> Vec<InboundMessage>;
}
