// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::backends::hardware::{ChannelAllocator, LogPwmDriver};
use crate::backends::network::LoopbackTransport;
use crate::config::{ConfigDocument, ConfigStore, Settings};
use crate::engine::LoopRegistry;
use crate::errors::GraphError;
use crate::graph::{relative_path, Direction, Node, NodeBody, NodeId, NodeTree, PrimitiveType};
use crate::observability::messages::{graph::*, StructuredLog};
use crate::ports::{downcast_port, CreationChannels, ErasedPort, InputPort, OutputPort, PortValue};
use crate::traits::{Namespace, PwmDriver, Transport};

struct GraphInner {
    tree: RefCell<NodeTree>,
    channels: CreationChannels,
    store: ConfigStore,
    scheduler: LoopRegistry,
    settings: Settings,
    pwm_driver: Rc<dyn PwmDriver>,
    pwm_channels: Rc<RefCell<ChannelAllocator>>,
    transport: Rc<dyn Transport>,
}

/// Process context shared by every module.
///
/// Cloning is cheap. Tree borrows never outlive a single method call, so
/// callbacks raised by one operation may freely call back into the graph.
#[derive(Clone)]
pub struct Graph {
    inner: Rc<GraphInner>,
}

/// Non-owning handle held by ports and modules.
#[derive(Clone)]
pub struct WeakGraph {
    inner: Weak<GraphInner>,
}

impl WeakGraph {
    pub fn upgrade(&self) -> Option<Graph> {
        self.inner.upgrade().map(|inner| Graph { inner })
    }
}

/// Assembles a [`Graph`] with optional collaborators.
pub struct GraphBuilder {
    settings: Settings,
    document: ConfigDocument,
    pwm_driver: Option<Rc<dyn PwmDriver>>,
    transport: Option<Rc<dyn Transport>>,
}

impl GraphBuilder {
    pub fn with_document(mut self, document: ConfigDocument) -> Self {
        self.document = document;
        self
    }

    pub fn with_pwm_driver(mut self, driver: Rc<dyn PwmDriver>) -> Self {
        self.pwm_driver = Some(driver);
        self
    }

    pub fn with_transport(mut self, transport: Rc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Graph {
        let pwm_driver = self
            .pwm_driver
            .unwrap_or_else(|| Rc::new(LogPwmDriver::new()));
        let transport = self
            .transport
            .unwrap_or_else(|| Rc::new(LoopbackTransport::new()));
        Graph {
            inner: Rc::new(GraphInner {
                tree: RefCell::new(NodeTree::new()),
                channels: CreationChannels::default(),
                store: ConfigStore::new(self.document),
                scheduler: LoopRegistry::new(),
                settings: self.settings,
                pwm_driver,
                pwm_channels: Rc::new(RefCell::new(ChannelAllocator::new())),
                transport,
            }),
        }
    }
}

impl Graph {
    /// Graph with an empty in-memory document and the in-process
    /// collaborators.
    pub fn new(settings: Settings) -> Self {
        Self::builder(settings).build()
    }

    pub fn builder(settings: Settings) -> GraphBuilder {
        GraphBuilder {
            settings,
            document: ConfigDocument::new(),
            pwm_driver: None,
            transport: None,
        }
    }

    pub fn downgrade(&self) -> WeakGraph {
        WeakGraph {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn channels(&self) -> &CreationChannels {
        &self.inner.channels
    }

    pub fn store(&self) -> &ConfigStore {
        &self.inner.store
    }

    pub fn scheduler(&self) -> &LoopRegistry {
        &self.inner.scheduler
    }

    pub fn pwm_driver(&self) -> Rc<dyn PwmDriver> {
        self.inner.pwm_driver.clone()
    }

    pub fn pwm_channels(&self) -> Rc<RefCell<ChannelAllocator>> {
        self.inner.pwm_channels.clone()
    }

    pub fn transport(&self) -> Rc<dyn Transport> {
        self.inner.transport.clone()
    }

    /// Runs one cooperative tick of every periodic task.
    pub fn tick(&self, now_ms: u64) {
        self.inner.scheduler.tick(now_ms);
    }

    pub fn root(&self) -> NodeId {
        self.inner.tree.borrow().root()
    }

    pub fn node_count(&self) -> usize {
        self.inner.tree.borrow().len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.tree.borrow().contains(id)
    }

    pub fn path_of(&self, id: NodeId) -> Option<String> {
        self.inner.tree.borrow().path_of(id).map(str::to_string)
    }

    pub fn name_of(&self, id: NodeId) -> Option<String> {
        self.inner.tree.borrow().get(id).map(|node| node.name.clone())
    }

    pub fn body_of(&self, id: NodeId) -> Option<NodeBody> {
        self.inner.tree.borrow().get(id).map(|node| node.body.clone())
    }

    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.inner.tree.borrow().children(id).to_vec()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.inner.tree.borrow().parent(id)
    }

    pub fn insert_node(
        &self,
        parent: NodeId,
        name: &str,
        direction: Direction,
        primitive_type: PrimitiveType,
        body: NodeBody,
    ) -> Result<NodeId, GraphError> {
        let id = self
            .inner
            .tree
            .borrow_mut()
            .insert(parent, name, direction, primitive_type, body)?;
        if let Some(path) = self.path_of(id) {
            NodeRegistered {
                path: &path,
                direction,
                primitive_type,
            }
            .log();
        }
        Ok(id)
    }

    pub fn set_body(&self, id: NodeId, body: NodeBody) -> Result<(), GraphError> {
        self.inner.tree.borrow_mut().set_body(id, body)
    }

    /// Detaches the subtree rooted at `id`. The caller owns the returned
    /// nodes; their bodies drop, releasing ports and tasks, when the vector
    /// does.
    pub fn remove_subtree(&self, id: NodeId) -> Vec<Node> {
        let removed = self.inner.tree.borrow_mut().remove(id);
        for node in &removed {
            NodeRemoved {
                path: &node.path,
                kind: node.body.kind(),
            }
            .log();
        }
        removed
    }

    pub fn resolve(
        &self,
        path: &str,
        direction: Direction,
        primitive_type: PrimitiveType,
    ) -> Option<NodeId> {
        self.inner
            .tree
            .borrow()
            .resolve(path, direction, primitive_type)
    }

    /// Unfiltered lookup.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.resolve(path, Direction::Undefined, PrimitiveType::Undefined)
    }

    /// Deepest node on `path` and the unmatched remainder.
    pub fn closest_ancestor(&self, path: &str) -> (NodeId, String) {
        let tree = self.inner.tree.borrow();
        let (id, rest) = tree.closest_ancestor(path);
        (id, rest.to_string())
    }

    pub fn find_output<T: PortValue>(&self, path: &str) -> Option<Rc<OutputPort<T>>> {
        self.find_port::<OutputPort<T>>(path, Direction::Output, T::PRIMITIVE)
    }

    pub fn find_input<T: PortValue>(&self, path: &str) -> Option<Rc<InputPort<T>>> {
        self.find_port::<InputPort<T>>(path, Direction::Input, T::PRIMITIVE)
    }

    /// Typed port lookup; a miss below a namespace asks the namespace to
    /// create the port.
    fn find_port<P: 'static>(
        &self,
        path: &str,
        direction: Direction,
        primitive_type: PrimitiveType,
    ) -> Option<Rc<P>> {
        if let Some(id) = self.resolve(path, direction, primitive_type) {
            let body = self.body_of(id)?;
            return body.as_port().and_then(downcast_port::<P>);
        }
        let port = self.materialize(path, direction, primitive_type);
        if port.is_none() {
            LookupMissed {
                path,
                direction,
                primitive_type,
            }
            .log();
        }
        downcast_port::<P>(&port?)
    }

    fn materialize(
        &self,
        path: &str,
        direction: Direction,
        primitive_type: PrimitiveType,
    ) -> Option<Rc<dyn ErasedPort>> {
        let (namespace, relative) = self.enclosing_namespace(path)?;
        namespace.materialize(self, &relative, direction, primitive_type)
    }

    /// Nearest namespace above the missing node at `path`, with the path
    /// relative to it.
    fn enclosing_namespace(&self, path: &str) -> Option<(Rc<dyn Namespace>, String)> {
        let tree = self.inner.tree.borrow();
        let (closest, rest) = tree.closest_ancestor(path);
        if rest.is_empty() {
            return None;
        }
        let mut current = Some(closest);
        while let Some(id) = current {
            let node = tree.get(id)?;
            if let Some(namespace) = node.body.as_namespace() {
                let target = relative_path(path);
                let base = relative_path(&node.path);
                let relative = target
                    .strip_prefix(base)
                    .map(|tail| tail.trim_start_matches('/'))
                    .filter(|tail| !tail.is_empty())?;
                return Some((namespace.clone(), relative.to_string()));
            }
            current = node.parent;
        }
        None
    }
}
