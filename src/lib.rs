// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod api;           // administrative surface
pub mod backends;      // module implementations
pub mod config;        // document + settings
pub mod engine;        // graph context, bridge, scheduler
pub mod errors;        // error handling
pub mod graph;         // node tree
pub mod observability;
pub mod ports;         // typed ports and binding
pub mod sequence;      // sequence grammar and evaluation
pub mod traits;        // module and collaborator abstractions
