// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::rc::Rc;

use crate::errors::GraphError;
use crate::graph::{Direction, PrimitiveType};
use crate::ports::ErasedPort;
use crate::traits::{Module, Namespace};

/// Generation-checked handle into a [`NodeTree`].
///
/// A handle outlives the node it names; once the slot is reused the old
/// handle stops resolving instead of aliasing the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// What a node carries besides its position in the tree.
#[derive(Clone)]
pub enum NodeBody {
    /// Structural node that only groups children.
    Container,
    Port(Rc<dyn ErasedPort>),
    Module(Rc<dyn Module>),
    /// Module that can materialise ports on a lookup miss.
    Namespace(Rc<dyn Namespace>),
}

impl NodeBody {
    pub fn as_module(&self) -> Option<&dyn Module> {
        match self {
            NodeBody::Module(module) => Some(module.as_ref()),
            NodeBody::Namespace(namespace) => Some(namespace.as_module()),
            _ => None,
        }
    }

    pub fn as_port(&self) -> Option<&Rc<dyn ErasedPort>> {
        match self {
            NodeBody::Port(port) => Some(port),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&Rc<dyn Namespace>> {
        match self {
            NodeBody::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NodeBody::Container => "container",
            NodeBody::Port(_) => "port",
            NodeBody::Module(_) => "module",
            NodeBody::Namespace(_) => "namespace",
        }
    }
}

/// A named, addressable entry in the module tree.
pub struct Node {
    pub name: String,
    pub path: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub direction: Direction,
    pub primitive_type: PrimitiveType,
    pub body: NodeBody,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &self.path)
            .field("direction", &self.direction)
            .field("primitive_type", &self.primitive_type)
            .field("body", &self.body.kind())
            .field("children", &self.children.len())
            .finish()
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena holding every node of one graph.
///
/// The root has an empty name and the empty path; every other path is the
/// parent path plus `/` plus the node name, computed once at insertion.
pub struct NodeTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    len: usize,
}

/// Strips leading separators and an optional leading `root` segment.
pub fn relative_path(path: &str) -> &str {
    let trimmed = path.trim_start_matches('/');
    if trimmed == "root" {
        return "";
    }
    match trimmed.strip_prefix("root/") {
        Some(rest) => rest.trim_start_matches('/'),
        None => trimmed,
    }
}

/// Returns the remainder of `rest` after `name` when `name` is a whole
/// leading segment group of it.
fn strip_segment<'p>(rest: &'p str, name: &str) -> Option<&'p str> {
    rest.strip_prefix(name)
        .and_then(|tail| tail.strip_prefix('/'))
        .map(|tail| tail.trim_start_matches('/'))
}

impl NodeTree {
    pub fn new() -> Self {
        let root = Node {
            name: String::new(),
            path: String::new(),
            parent: None,
            children: Vec::new(),
            direction: Direction::None,
            primitive_type: PrimitiveType::None,
            body: NodeBody::Container,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            len: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len <= 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn path_of(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|node| node.path.as_str())
    }

    /// Adds a child under `parent` and returns its handle.
    pub fn insert(
        &mut self,
        parent: NodeId,
        name: &str,
        direction: Direction,
        primitive_type: PrimitiveType,
        body: NodeBody,
    ) -> Result<NodeId, GraphError> {
        let name = name.trim_start_matches('/');
        let parent_node = self
            .get(parent)
            .ok_or_else(|| GraphError::StaleHandle(parent.to_string()))?;
        if name.is_empty() {
            return Err(GraphError::EmptyName(parent_node.path.clone()));
        }
        let duplicate = parent_node
            .children
            .iter()
            .filter_map(|child| self.get(*child))
            .any(|child| child.name == name);
        if duplicate {
            return Err(GraphError::DuplicateName {
                parent_path: parent_node.path.clone(),
                name: name.to_string(),
            });
        }

        let node = Node {
            name: name.to_string(),
            path: format!("{}/{}", parent_node.path, name),
            parent: Some(parent),
            children: Vec::new(),
            direction,
            primitive_type,
            body,
        };

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.push(id);
        }
        self.len += 1;
        Ok(id)
    }

    pub fn set_body(&mut self, id: NodeId, body: NodeBody) -> Result<(), GraphError> {
        let node = self
            .get_mut(id)
            .ok_or_else(|| GraphError::StaleHandle(id.to_string()))?;
        node.body = body;
        Ok(())
    }

    /// Detaches `id` and its whole subtree, children first.
    ///
    /// The removed nodes are handed back so the caller decides when their
    /// bodies drop; the root and stale handles remove nothing.
    pub fn remove(&mut self, id: NodeId) -> Vec<Node> {
        if id == self.root || !self.contains(id) {
            return Vec::new();
        }
        if let Some(parent) = self.parent(id) {
            if let Some(parent_node) = self.get_mut(parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        let mut removed = Vec::new();
        self.remove_recursive(id, &mut removed);
        removed
    }

    fn remove_recursive(&mut self, id: NodeId, removed: &mut Vec<Node>) {
        let children = match self.get_mut(id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            self.remove_recursive(child, removed);
        }
        let slot = &mut self.slots[id.index as usize];
        if let Some(node) = slot.node.take() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            self.len -= 1;
            removed.push(node);
        }
    }

    /// Finds the node addressed by `path`, honouring the direction and type
    /// filters (`Undefined` disables a filter).
    ///
    /// A child whose name equals the remaining path is the candidate; a
    /// child whose name is a segment prefix is recursed into. A recursion
    /// that comes back empty lets later siblings try.
    pub fn resolve(
        &self,
        path: &str,
        direction: Direction,
        primitive_type: PrimitiveType,
    ) -> Option<NodeId> {
        let rest = relative_path(path);
        if rest.is_empty() {
            let root = self.get(self.root)?;
            let matches = root.direction.satisfies(direction)
                && root.primitive_type.satisfies(primitive_type);
            return matches.then_some(self.root);
        }
        self.resolve_from(self.root, rest, direction, primitive_type)
    }

    fn resolve_from(
        &self,
        parent: NodeId,
        rest: &str,
        direction: Direction,
        primitive_type: PrimitiveType,
    ) -> Option<NodeId> {
        for child in self.children(parent) {
            let Some(node) = self.get(*child) else {
                continue;
            };
            if rest == node.name {
                if node.direction.satisfies(direction)
                    && node.primitive_type.satisfies(primitive_type)
                {
                    return Some(*child);
                }
            } else if let Some(tail) = strip_segment(rest, &node.name) {
                if let Some(found) = self.resolve_from(*child, tail, direction, primitive_type) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Deepest existing node whose path prefixes `path` at a segment
    /// boundary, together with the unmatched remainder (empty on an exact
    /// match). Falls back to the root.
    pub fn closest_ancestor<'p>(&self, path: &'p str) -> (NodeId, &'p str) {
        let mut current = self.root;
        let mut rest = relative_path(path);
        while !rest.is_empty() {
            let next = self.children(current).iter().find_map(|child| {
                let node = self.get(*child)?;
                if rest == node.name {
                    Some((*child, ""))
                } else {
                    strip_segment(rest, &node.name).map(|tail| (*child, tail))
                }
            });
            match next {
                Some((child, tail)) => {
                    current = child;
                    rest = tail;
                }
                None => break,
            }
        }
        (current, rest)
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(tree: &mut NodeTree, parent: NodeId, name: &str) -> NodeId {
        tree.insert(parent, name, Direction::None, PrimitiveType::None, NodeBody::Container)
            .unwrap()
    }

    fn port(tree: &mut NodeTree, parent: NodeId, name: &str, direction: Direction) -> NodeId {
        tree.insert(parent, name, direction, PrimitiveType::Double, NodeBody::Container)
            .unwrap()
    }

    #[test]
    fn paths_are_built_from_parent_paths() {
        let mut tree = NodeTree::new();
        let root = tree.root();
        let processors = container(&mut tree, root, "/Processors");
        let gain = container(&mut tree, processors, "Gain1");

        assert_eq!(tree.path_of(processors), Some("/Processors"));
        assert_eq!(tree.path_of(gain), Some("/Processors/Gain1"));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn duplicate_sibling_names_are_rejected() {
        let mut tree = NodeTree::new();
        let root = tree.root();
        container(&mut tree, root, "Processors");
        let err = tree
            .insert(root, "Processors", Direction::None, PrimitiveType::None, NodeBody::Container)
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateName { .. }));
    }

    #[test]
    fn resolve_applies_filters() {
        let mut tree = NodeTree::new();
        let root = tree.root();
        let processors = container(&mut tree, root, "Processors");
        let gain = container(&mut tree, processors, "Gain1");
        let out = port(&mut tree, gain, "out", Direction::Output);

        let cases = [
            ("/Processors/Gain1/out", Direction::Undefined, PrimitiveType::Undefined, Some(out)),
            ("Processors/Gain1/out", Direction::Output, PrimitiveType::Double, Some(out)),
            ("/Processors/Gain1/out", Direction::Input, PrimitiveType::Undefined, None),
            ("/Processors/Gain1/out", Direction::Output, PrimitiveType::Bool, None),
            ("root/Processors/Gain1", Direction::Undefined, PrimitiveType::Undefined, Some(gain)),
            ("//Processors", Direction::Undefined, PrimitiveType::Undefined, Some(processors)),
            ("/Processors/Gain2", Direction::Undefined, PrimitiveType::Undefined, None),
            ("/Proc", Direction::Undefined, PrimitiveType::Undefined, None),
        ];
        for (path, direction, primitive_type, expected) in cases {
            assert_eq!(tree.resolve(path, direction, primitive_type), expected, "path {}", path);
        }
    }

    #[test]
    fn compound_names_resolve_as_segments() {
        let mut tree = NodeTree::new();
        let root = tree.root();
        let mqtt = container(&mut tree, root, "mqtt");
        let materialised = port(&mut tree, mqtt, "Processors/Gain1/in", Direction::Output);

        assert_eq!(
            tree.resolve("/mqtt/Processors/Gain1/in", Direction::Output, PrimitiveType::Double),
            Some(materialised)
        );
        assert_eq!(tree.path_of(materialised), Some("/mqtt/Processors/Gain1/in"));
    }

    #[test]
    fn failed_recursion_lets_later_siblings_match() {
        let mut tree = NodeTree::new();
        let root = tree.root();
        let group = container(&mut tree, root, "group");
        container(&mut tree, group, "other");
        let grouped = container(&mut tree, root, "group/g1");

        assert_eq!(
            tree.resolve("/group/g1", Direction::Undefined, PrimitiveType::Undefined),
            Some(grouped)
        );
    }

    #[test]
    fn removal_is_depth_first_and_invalidates_handles() {
        let mut tree = NodeTree::new();
        let root = tree.root();
        let processors = container(&mut tree, root, "Processors");
        let gain = container(&mut tree, processors, "Gain1");
        let out = port(&mut tree, gain, "out", Direction::Output);

        let removed = tree.remove(gain);
        let paths: Vec<&str> = removed.iter().map(|node| node.path.as_str()).collect();
        assert_eq!(paths, vec!["/Processors/Gain1/out", "/Processors/Gain1"]);
        assert!(!tree.contains(out));
        assert!(tree.children(processors).is_empty());

        let reused = container(&mut tree, processors, "Gain2");
        assert!(tree.contains(reused));
        assert!(!tree.contains(gain));
        assert!(tree.remove(gain).is_empty());
        assert!(tree.remove(root).is_empty());
    }

    #[test]
    fn closest_ancestor_returns_remainder() {
        let mut tree = NodeTree::new();
        let root = tree.root();
        let processors = container(&mut tree, root, "Processors");

        assert_eq!(tree.closest_ancestor("/Processors/Gain1/gain"), (processors, "Gain1/gain"));
        assert_eq!(tree.closest_ancestor("/Processors"), (processors, ""));
        assert_eq!(tree.closest_ancestor("/Missing/x"), (root, "Missing/x"));
    }
}
