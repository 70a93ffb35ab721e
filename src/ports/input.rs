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
use crate::ports::{
    matches_binding, BindingState, BindingTarget, ErasedPort, Event, OutputPort, PortValue,
    Subscription,
};

struct Upstream<T: PortValue> {
    output: Weak<OutputPort<T>>,
    _value: Subscription,
    _detached: Subscription,
}

struct InputBinding<T: PortValue> {
    origin: BindingTarget,
    target: Option<String>,
    bound_path: Option<String>,
    state: BindingState,
    upstream: Option<Upstream<T>>,
    listener: Option<Subscription>,
}

type Validator<T> = Box<dyn Fn(&T) -> bool>;

/// Sink side of a typed link.
///
/// Binds to the output named by its fragment as soon as that output
/// exists; until then it listens to output creation broadcasts and keeps
/// its last value.
pub struct InputPort<T: PortValue> {
    path: String,
    value: RefCell<T>,
    changed: Event<T>,
    binding: RefCell<InputBinding<T>>,
    validator: Option<Validator<T>>,
    _on_change: Subscription,
    graph: WeakGraph,
    me: Weak<InputPort<T>>,
}

impl<T: PortValue> InputPort<T> {
    /// Registers a new input under `parent`; `on_change` runs on every
    /// accepted value change.
    pub fn create(
        graph: &Graph,
        parent: NodeId,
        name: &str,
        origin: BindingTarget,
        on_change: impl Fn(&T) + 'static,
    ) -> Result<Rc<Self>, GraphError> {
        Self::create_with(graph, parent, name, origin, None, on_change)
    }

    /// Like [`InputPort::create`], rejecting values for which `validator`
    /// returns false.
    pub fn create_validated(
        graph: &Graph,
        parent: NodeId,
        name: &str,
        origin: BindingTarget,
        validator: impl Fn(&T) -> bool + 'static,
        on_change: impl Fn(&T) + 'static,
    ) -> Result<Rc<Self>, GraphError> {
        Self::create_with(graph, parent, name, origin, Some(Box::new(validator)), on_change)
    }

    fn create_with(
        graph: &Graph,
        parent: NodeId,
        name: &str,
        origin: BindingTarget,
        validator: Option<Validator<T>>,
        on_change: impl Fn(&T) + 'static,
    ) -> Result<Rc<Self>, GraphError> {
        let id = graph.insert_node(parent, name, Direction::Input, T::PRIMITIVE, NodeBody::Container)?;
        let path = graph.path_of(id).unwrap_or_default();
        let target = origin.resolve(&path, &graph.settings().namespace_path);

        let changed = Event::new();
        let on_change = changed.subscribe(on_change);
        let port = Rc::new_cyclic(|me| InputPort {
            path,
            value: RefCell::new(T::default()),
            changed,
            binding: RefCell::new(InputBinding {
                origin,
                target,
                bound_path: None,
                state: BindingState::Unbound,
                upstream: None,
                listener: None,
            }),
            validator,
            _on_change: on_change,
            graph: graph.downgrade(),
            me: me.clone(),
        });
        graph.set_body(id, NodeBody::Port(port.clone()))?;

        port.bind();
        graph.channels().inputs.raise(&port.path);
        Ok(port)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> T {
        self.value.borrow().clone()
    }

    /// Stores `value` if it passes validation and differs from the current
    /// one, then notifies listeners.
    pub fn set_value(&self, value: T) -> bool {
        if let Some(validator) = &self.validator {
            if !validator(&value) {
                return false;
            }
        }
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

    pub fn binding_state(&self) -> BindingState {
        self.binding.borrow().state
    }

    /// Path of the output this input is (or wants to be) bound to.
    pub fn bound_output_path(&self) -> Option<String> {
        let binding = self.binding.borrow();
        binding.bound_path.clone().or_else(|| binding.target.clone())
    }

    /// Starts binding to the configured output. Does nothing while already
    /// bound or waiting for the output to appear.
    pub fn bind(&self) {
        let target = {
            let binding = self.binding.borrow();
            if binding.state != BindingState::Unbound {
                return;
            }
            match &binding.target {
                Some(target) => target.clone(),
                None => return,
            }
        };
        self.on_output_created(&target);
    }

    /// Binding requested from the output side. Refused while this input is
    /// bound or waiting for its own target.
    pub fn attach(&self, output: &Rc<OutputPort<T>>) -> bool {
        if self.binding.borrow().state != BindingState::Unbound {
            return false;
        }
        self.bind_to(output);
        true
    }

    fn on_output_created(&self, created: &str) {
        let target = {
            let mut binding = self.binding.borrow_mut();
            if binding.state == BindingState::Bound {
                let alive = binding
                    .upstream
                    .as_ref()
                    .is_some_and(|upstream| upstream.output.strong_count() > 0);
                if alive {
                    return;
                }
                binding.upstream = None;
                binding.bound_path = None;
                binding.state = BindingState::Unbound;
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

        let found = graph.find_output::<T>(&target);
        if self.binding.borrow().state == BindingState::Bound {
            return;
        }
        match found {
            Some(output) => self.bind_to(&output),
            None => self.await_creation(&graph, &target),
        }
    }

    fn await_creation(&self, graph: &Graph, target: &str) {
        let mut binding = self.binding.borrow_mut();
        binding.state = BindingState::AwaitingCreation;
        if binding.listener.is_none() {
            let weak = self.me.clone();
            binding.listener = Some(graph.channels().outputs.subscribe(move |created| {
                if let Some(port) = weak.upgrade() {
                    port.on_output_created(created);
                }
            }));
            BindingDeferred {
                port_path: &self.path,
                target_path: target,
            }
            .log();
        }
    }

    fn bind_to(&self, output: &Rc<OutputPort<T>>) {
        let weak = self.me.clone();
        let value = output.subscribe(move |value: &T| {
            if let Some(port) = weak.upgrade() {
                port.set_value(value.clone());
            }
        });
        let weak = self.me.clone();
        let detached = output.on_detached(move |_| {
            if let Some(port) = weak.upgrade() {
                port.upstream_detached();
            }
        });
        {
            let mut binding = self.binding.borrow_mut();
            binding.state = BindingState::Bound;
            binding.listener = None;
            binding.bound_path = Some(output.path().to_string());
            binding.upstream = Some(Upstream {
                output: Rc::downgrade(output),
                _value: value,
                _detached: detached,
            });
        }
        BindingResolved {
            input_path: &self.path,
            output_path: output.path(),
        }
        .log();
        self.set_value(output.value());
    }

    fn upstream_detached(&self) {
        let target = {
            let mut binding = self.binding.borrow_mut();
            binding.upstream = None;
            binding.bound_path = None;
            binding.state = BindingState::Unbound;
            binding.target.clone()
        };
        UpstreamDetached {
            input_path: &self.path,
        }
        .log();
        if let (Some(target), Some(graph)) = (target, self.graph.upgrade()) {
            self.await_creation(&graph, &target);
        }
    }
}

impl<T: PortValue> ErasedPort for InputPort<T> {
    fn path(&self) -> &str {
        &self.path
    }

    fn direction(&self) -> Direction {
        Direction::Input
    }

    fn primitive_type(&self) -> PrimitiveType {
        T::PRIMITIVE
    }

    fn set_string_value(&self, text: &str) -> bool {
        match T::parse(text) {
            Some(value) => self.set_value(value.clone()) || *self.value.borrow() == value,
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
