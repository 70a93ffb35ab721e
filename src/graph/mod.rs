// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Addressable node tree.
//!
//! Every module, container and port lives in one [`NodeTree`] and is found
//! by its `/`-separated path.

mod tree;
mod types;

pub use tree::{relative_path, Node, NodeBody, NodeId, NodeTree};
pub use types::{Direction, PrimitiveType};
