// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Network variable namespace.
//!
//! A [`NetworkNamespace`] turns every port lookup that lands below it into
//! a topic on the node's messaging link: outputs it creates are fed from
//! inbound messages, inputs it creates publish their values. The link
//! itself is any [`Transport`](crate::traits::Transport); the in-process
//! [`LoopbackTransport`] is the default.

pub mod loopback;
pub mod namespace;

pub use loopback::LoopbackTransport;
pub use namespace::NetworkNamespace;
