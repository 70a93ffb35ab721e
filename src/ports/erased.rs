// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::any::Any;
use std::rc::Rc;

use crate::engine::Graph;
use crate::errors::GraphError;
use crate::graph::{Direction, NodeId, PrimitiveType};
use crate::ports::{BindingTarget, Event, InputPort, OutputPort, PortValue};

/// Type-erased view of a port as stored in the node tree.
pub trait ErasedPort {
    fn path(&self) -> &str;

    fn direction(&self) -> Direction;

    fn primitive_type(&self) -> PrimitiveType;

    /// Parses `text` into the port's type and sets it. Returns false when the
    /// text does not parse or the value is rejected.
    fn set_string_value(&self, text: &str) -> bool;

    fn value_string(&self) -> String;

    fn value_json(&self) -> Value;

    fn binding_origin(&self) -> BindingTarget;

    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

/// Recovers the concrete port behind an erased handle.
pub fn downcast_port<P: 'static>(port: &Rc<dyn ErasedPort>) -> Option<Rc<P>> {
    port.clone().into_any().downcast::<P>().ok()
}

/// Per-graph broadcast channels announcing newly created ports by path.
#[derive(Default)]
pub struct CreationChannels {
    pub outputs: Event<String>,
    pub inputs: Event<String>,
}

/// Callback receiving the textual value of a dynamically created input.
pub type TextSink = Rc<dyn Fn(&str)>;

/// Creates a port whose value type is only known at runtime.
///
/// Inputs forward every change to `sink` in textual form. Unsupported
/// types (`None`, `Undefined`) create nothing.
pub fn create_dynamic_port(
    graph: &Graph,
    parent: NodeId,
    name: &str,
    direction: Direction,
    primitive_type: PrimitiveType,
    sink: TextSink,
) -> Result<Option<Rc<dyn ErasedPort>>, GraphError> {
    fn build<T: PortValue>(
        graph: &Graph,
        parent: NodeId,
        name: &str,
        direction: Direction,
        sink: TextSink,
    ) -> Result<Option<Rc<dyn ErasedPort>>, GraphError> {
        match direction {
            Direction::Output => {
                let port: Rc<dyn ErasedPort> =
                    OutputPort::<T>::create(graph, parent, name, BindingTarget::Default)?;
                Ok(Some(port))
            }
            Direction::Input => {
                let port: Rc<dyn ErasedPort> = InputPort::<T>::create(
                    graph,
                    parent,
                    name,
                    BindingTarget::Default,
                    move |value: &T| sink(&value.to_string()),
                )?;
                Ok(Some(port))
            }
            _ => Ok(None),
        }
    }

    match primitive_type {
        PrimitiveType::Double => build::<f64>(graph, parent, name, direction, sink),
        PrimitiveType::Float => build::<f32>(graph, parent, name, direction, sink),
        PrimitiveType::String => build::<String>(graph, parent, name, direction, sink),
        PrimitiveType::Int8 => build::<i8>(graph, parent, name, direction, sink),
        PrimitiveType::Int16 => build::<i16>(graph, parent, name, direction, sink),
        PrimitiveType::Int32 => build::<i32>(graph, parent, name, direction, sink),
        PrimitiveType::Int64 => build::<i64>(graph, parent, name, direction, sink),
        PrimitiveType::UInt8 => build::<u8>(graph, parent, name, direction, sink),
        PrimitiveType::UInt16 => build::<u16>(graph, parent, name, direction, sink),
        PrimitiveType::UInt32 => build::<u32>(graph, parent, name, direction, sink),
        PrimitiveType::UInt64 => build::<u64>(graph, parent, name, direction, sink),
        PrimitiveType::Bool => build::<bool>(graph, parent, name, direction, sink),
        PrimitiveType::None | PrimitiveType::Undefined => Ok(None),
    }
}
