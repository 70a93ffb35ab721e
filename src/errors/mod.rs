// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod admin;
mod config;
mod graph;
mod sequence;

pub use admin::AdminError;
pub use config::ConfigError;
pub use graph::GraphError;
pub use sequence::SequenceWarning;
