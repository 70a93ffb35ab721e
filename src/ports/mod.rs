// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed value ports and the deferred binding between them.
//!
//! An [`OutputPort`] broadcasts value changes; an [`InputPort`] names the
//! output it wants by path and binds whenever that output appears, in
//! whatever order the two are created.

mod binding;
mod erased;
mod event;
mod input;
mod output;
mod value;

pub use binding::{matches_binding, BindingState, BindingTarget};
pub use erased::{create_dynamic_port, downcast_port, CreationChannels, ErasedPort, TextSink};
pub use event::{Event, Subscription};
pub use input::InputPort;
pub use output::OutputPort;
pub use value::PortValue;
