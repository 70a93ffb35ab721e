// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::engine::{Graph, WeakGraph};
use crate::errors::GraphError;
use crate::graph::{Direction, NodeBody, NodeId, PrimitiveType};
use crate::observability::messages::{binding::*, StructuredLog};
use crate::ports::{matches_binding, BindingTarget, ErasedPort, Event, PortValue, Subscription};

struct OutputBinding {
    origin: BindingTarget,
    target: Option<String>,
    settled: bool,
    listener: Option<Subscription>,
}

/// Source side of a typed link.
///
/// Notifies its subscribers whenever the value actually changes, and tells
/// bound inputs when it is dropped so they can wait for a replacement.
pub struct OutputPort<T: PortValue> {
    path: String,
    value: RefCell<T>,
    changed: Event<T>,
    detached: Event<()>,
    binding: RefCell<OutputBinding>,
    graph: WeakGraph,
    me: Weak<OutputPort<T>>,
}

impl<T: PortValue> OutputPort<T> {
    /// Registers a new output under `parent`, announces it on the output
    /// creation channel, then wires it to its desired input if it has one.
    pub fn create(
        graph: &Graph,
        parent: NodeId,
        name: &str,
        origin: BindingTarget,
    ) -> Result<Rc<Self>, GraphError> {
        let id = graph.insert_node(parent, name, Direction::Output, T::PRIMITIVE, NodeBody::Container)?;
        let path = graph.path_of(id).unwrap_or_default();
        let target = origin.resolve(&path, &graph.settings().namespace_path);

        let port = Rc::new_cyclic(|me| OutputPort {
            path,
            value: RefCell::new(T::default()),
            changed: Event::new(),
            detached: Event::new(),
            binding: RefCell::new(OutputBinding {
                origin,
                target: target.clone(),
                settled: false,
                listener: None,
            }),
            graph: graph.downgrade(),
            me: me.clone(),
        });
        graph.set_body(id, NodeBody::Port(port.clone()))?;

        graph.channels().outputs.raise(&port.path);
        if let Some(target) = target {
            port.on_input_created(&target);
        }
        Ok(port)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> T {
        self.value.borrow().clone()
    }

    /// Stores `value` and notifies subscribers; returns false when the value
    /// was already current.
    pub fn set_value(&self, value: T) -> bool {
        {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value.clone();
        }
        self.changed.raise(&value);
        true
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.changed.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.changed.listener_count()
    }

    pub(crate) fn on_detached(&self, callback: impl Fn(&()) + 'static) -> Subscription {
        self.detached.subscribe(callback)
    }

    /// Path of the input this output wants to drive, if any.
    pub fn target_input(&self) -> Option<String> {
        self.binding.borrow().target.clone()
    }

    fn on_input_created(&self, created: &str) {
        let target = {
            let binding = self.binding.borrow();
            if binding.settled {
                return;
            }
            match &binding.target {
                Some(target) => target.clone(),
                None => return,
            }
        };
        let Some(graph) = self.graph.upgrade() else {
            return;
        };
        if !matches_binding(created, &target, &graph.settings().wildcard_suffix) {
            return;
        }
        let Some(me) = self.me.upgrade() else {
            return;
        };

        let found = graph.find_input::<T>(&target);
        if self.binding.borrow().settled {
            return;
        }
        match found {
            Some(input) => {
                {
                    let mut binding = self.binding.borrow_mut();
                    binding.settled = true;
                    binding.listener = None;
                }
                if !input.attach(&me) {
                    BindingRejected {
                        input_path: input.path(),
                        output_path: &self.path,
                    }
                    .log();
                }
            }
            None => {
                let mut binding = self.binding.borrow_mut();
                if binding.listener.is_none() {
                    let weak = self.me.clone();
                    binding.listener = Some(graph.channels().inputs.subscribe(move |created| {
                        if let Some(port) = weak.upgrade() {
                            port.on_input_created(created);
                        }
                    }));
                    BindingDeferred {
                        port_path: &self.path,
                        target_path: &target,
                    }
                    .log();
                }
            }
        }
    }
}

impl<T: PortValue> Drop for OutputPort<T> {
    fn drop(&mut self) {
        self.detached.raise(&());
    }
}

impl<T: PortValue> ErasedPort for OutputPort<T> {
    fn path(&self) -> &str {
        &self.path
    }

    fn direction(&self) -> Direction {
        Direction::Output
    }

    fn primitive_type(&self) -> PrimitiveType {
        T::PRIMITIVE
    }

    fn set_string_value(&self, text: &str) -> bool {
        match T::parse(text) {
            Some(value) => {
                self.set_value(value);
                true
            }
            None => false,
        }
    }

    fn value_string(&self) -> String {
        self.value.borrow().to_string()
    }

    fn value_json(&self) -> Value {
        self.value.borrow().to_json()
    }

    fn binding_origin(&self) -> BindingTarget {
        self.binding.borrow().origin.clone()
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
