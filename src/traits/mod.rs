// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod hardware;
pub mod module;
pub mod transport;

pub use hardware::PwmDriver;
pub use module::{downcast_module, Module, Namespace};
pub use transport::{InboundMessage, Transport};
