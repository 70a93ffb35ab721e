// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{Map, Value};
use std::any::Any;
use std::rc::Rc;

use crate::engine::Graph;
use crate::graph::{Direction, PrimitiveType};
use crate::ports::ErasedPort;

/// A configurable block living in the node tree.
///
/// Modules own their ports and periodic tasks; dropping the module (when
/// its node is removed) releases all of them.
pub trait Module {
    /// Type discriminator as written in the configuration document.
    fn name(&self) -> &'static str;

    /// The module's own configuration, `type` included. Port bindings and
    /// nested modules are added by the exporter.
    fn parameters(&self) -> Map<String, Value>;

    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

/// Recovers the concrete module behind a node body.
pub fn downcast_module<M: 'static>(module: &Rc<dyn Module>) -> Option<Rc<M>> {
    module.clone().into_any().downcast::<M>().ok()
}

/// A module that creates ports on demand when a lookup below it misses.
pub trait Namespace: Module {
    fn as_module(&self) -> &dyn Module;

    /// Creates the port addressed by `relative_path` (relative to the
    /// namespace node) with the requested direction and type.
    fn materialize(
        &self,
        graph: &Graph,
        relative_path: &str,
        direction: Direction,
        primitive_type: PrimitiveType,
    ) -> Option<Rc<dyn ErasedPort>>;
}
