// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod bridge;
pub mod context;
pub mod scheduler;
#[cfg(test)]
pub mod integration_tests;

pub use context::{Graph, GraphBuilder, WeakGraph};
pub use scheduler::{LoopListener, LoopRegistry};
