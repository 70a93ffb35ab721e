// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::RefCell;
use std::collections::BTreeSet;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::traits::{InboundMessage, Transport};

/// In-process transport.
///
/// Messages sent through [`LoopbackTransport::sender`] (from any task or
/// thread) and everything published locally are delivered on the next
/// poll, filtered by the current subscriptions.
pub struct LoopbackTransport {
    sender: UnboundedSender<InboundMessage>,
    receiver: RefCell<UnboundedReceiver<InboundMessage>>,
    subscriptions: RefCell<BTreeSet<String>>,
    published: RefCell<Vec<InboundMessage>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: RefCell::new(receiver),
            subscriptions: RefCell::new(BTreeSet::new()),
            published: RefCell::new(Vec::new()),
        }
    }

    /// Handle for injecting inbound messages.
    pub fn sender(&self) -> UnboundedSender<InboundMessage> {
        self.sender.clone()
    }

    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.subscriptions.borrow().contains(topic)
    }

    /// Everything published so far, oldest first.
    pub fn published(&self) -> Vec<InboundMessage> {
        self.published.borrow().clone()
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for LoopbackTransport {
    fn subscribe(&self, topic: &str) {
        self.subscriptions.borrow_mut().insert(topic.to_string());
    }

    fn publish(&self, topic: &str, payload: &str) {
        let message = InboundMessage {
            topic: topic.to_string(),
            payload: payload.to_string(),
        };
        self.published.borrow_mut().push(message.clone());
        // The receiver lives as long as self, so this cannot fail.
        let _ = self.sender.send(message);
    }

    fn poll(&self) -> Vec<InboundMessage> {
        let mut receiver = self.receiver.borrow_mut();
        let subscriptions = self.subscriptions.borrow();
        let mut messages = Vec::new();
        loop {
            match receiver.try_recv() {
                Ok(message) if subscriptions.contains(&message.topic) => messages.push(message),
                Ok(_) => {}
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(topic: &str, payload: &str) -> InboundMessage {
        InboundMessage {
            topic: topic.to_string(),
            payload: payload.to_string(),
        }
    }

    #[test]
    fn delivers_only_subscribed_topics() {
        let transport = LoopbackTransport::new();
        transport.subscribe("/edge/a");
        transport.publish("/edge/a", "1");
        transport.publish("/edge/b", "2");

        assert_eq!(transport.poll(), vec![message("/edge/a", "1")]);
        assert!(transport.poll().is_empty());
        assert_eq!(transport.published().len(), 2);
    }

    #[tokio::test]
    async fn accepts_messages_from_other_tasks() {
        let transport = LoopbackTransport::new();
        transport.subscribe("/edge/level");
        let sender = transport.sender();

        tokio::spawn(async move {
            for payload in ["10", "20"] {
                sender.send(message("/edge/level", payload)).unwrap();
            }
        })
        .await
        .unwrap();

        assert_eq!(
            transport.poll(),
            vec![message("/edge/level", "10"), message("/edge/level", "20")]
        );
    }
}
