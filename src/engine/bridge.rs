// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Two-way bridge between the configuration document and the node tree.
//!
//! The document is the source of truth: [`Graph::populate`] builds modules
//! from it, [`Graph::update`] and [`Graph::delete`] edit both sides, and
//! [`Graph::export`] renders any subtree back into document form.

use serde_json::{Map, Value};

use crate::backends::ModuleFactory;
use crate::config::consts::TYPE_KEY;
use crate::config::ConfigDocument;
use crate::engine::Graph;
use crate::errors::AdminError;
use crate::graph::{relative_path, Direction, NodeBody, NodeId, PrimitiveType};
use crate::observability::messages::{config::*, StructuredLog};

fn module_type(fragment: &Map<String, Value>) -> Option<&str> {
    fragment
        .get(TYPE_KEY)
        .and_then(Value::as_str)
        .filter(|module_type| ModuleFactory::is_type_available(module_type))
}

/// Inserts `value` under a possibly `/`-segmented `name`, creating the
/// intermediate objects.
fn insert_nested(map: &mut Map<String, Value>, name: &str, value: Value) {
    let mut segments: Vec<&str> = name.split('/').filter(|s| !s.is_empty()).collect();
    let Some(last) = segments.pop() else {
        return;
    };
    let mut current = map;
    for segment in segments {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
    if let (Some(Value::Object(existing)), Value::Object(incoming)) = (current.get_mut(last), &value) {
        existing.extend(incoming.clone());
        return;
    }
    current.insert(last.to_string(), value);
}

impl Graph {
    /// Instantiates every top-level entry of the document.
    pub fn populate(&self) {
        if let Value::Object(entries) = self.store().snapshot() {
            for (key, fragment) in &entries {
                if let Some(fragment) = fragment.as_object() {
                    self.populate_entry(key, fragment);
                }
            }
        }
    }

    /// Replaces the whole model with `document`.
    pub fn reload(&self, document: ConfigDocument) {
        let root = self.root();
        for child in self.children_of(root) {
            drop(self.remove_subtree(child));
        }
        self.store().replace(document);
        self.populate();
    }

    /// Top-level keys without a module type become plain containers.
    fn populate_entry(&self, key: &str, fragment: &Map<String, Value>) {
        let root = self.root();
        if module_type(fragment).is_some() {
            self.instantiate(key, fragment, root);
            return;
        }
        let Some(container) = self.top_level_container(key) else {
            return;
        };
        for (name, child) in fragment {
            if let Some(child) = child.as_object() {
                self.instantiate(name, child, container);
            }
        }
    }

    fn top_level_container(&self, key: &str) -> Option<NodeId> {
        let root = self.root();
        if let Some(id) = self.children_of(root).into_iter().find(|id| self.name_of(*id).as_deref() == Some(key)) {
            return Some(id);
        }
        match self.insert_node(root, key, Direction::None, PrimitiveType::None, NodeBody::Container) {
            Ok(id) => Some(id),
            Err(error) => {
                ModuleCreationFailed {
                    path: key,
                    module_type: "container",
                    error: &error,
                }
                .log();
                None
            }
        }
    }

    /// Creates the module described by `fragment` as `name` under `parent`.
    ///
    /// A fragment without a known `type` is not a module; each of its
    /// object-valued children is tried instead, named `name/key`.
    pub fn instantiate(&self, name: &str, fragment: &Map<String, Value>, parent: NodeId) -> Option<NodeId> {
        let path = format!("{}/{}", self.path_of(parent).unwrap_or_default(), name);
        let Some(module_type) = module_type(fragment) else {
            FragmentNamespaced { path: &path }.log();
            for (key, child) in fragment {
                if let Some(child) = child.as_object() {
                    self.instantiate(&format!("{}/{}", name, key), child, parent);
                }
            }
            return None;
        };

        match ModuleFactory::create_module(self, parent, name, module_type, fragment) {
            Ok(id) => {
                ModuleCreated {
                    path: &path,
                    module_type,
                }
                .log();
                Some(id)
            }
            Err(error) => {
                ModuleCreationFailed {
                    path: &path,
                    module_type,
                    error: &error,
                }
                .log();
                None
            }
        }
    }

    /// Writes `fragment` at `path` and rebuilds the affected part of the
    /// model.
    ///
    /// Paths inside a module (a port binding or a parameter) rebuild that
    /// module from its updated fragment. Any other path is replaced
    /// wholesale, including sibling modules whose segmented names extend
    /// it.
    pub fn update(&self, path: &str, fragment: Value) -> Result<(), AdminError> {
        let target = relative_path(path);
        if target.is_empty() {
            return Err(AdminError::RootPath);
        }
        let path = format!("/{}", target);

        if let Some(module) = self.owning_module(&path) {
            self.store().set(&path, fragment);
            self.rebuild(module);
            return Ok(());
        }

        self.remove_overlapping(&path);
        self.store().set(&path, fragment.clone());

        let Value::Object(fields) = fragment else {
            return Ok(());
        };
        let (parent, rest) = self.closest_ancestor(&path);
        if parent != self.root() {
            self.instantiate(&rest, &fields, parent);
            return Ok(());
        }
        match rest.split_once('/') {
            None => self.populate_entry(&rest, &fields),
            Some((key, name)) => {
                if let Some(container) = self.top_level_container(key) {
                    self.instantiate(name, &fields, container);
                }
            }
        }
        Ok(())
    }

    /// Removes the subtree at `path`, every sibling whose segmented name
    /// extends it, and their persisted configuration. Does nothing when
    /// neither resolves.
    pub fn delete(&self, path: &str) {
        let found = self.find(path);
        let mut removed = Vec::new();
        for id in self.overlapping(path) {
            removed.extend(self.remove_subtree(id));
        }
        for node in &removed {
            if !matches!(node.body, NodeBody::Port(_)) {
                self.store().remove(&node.path);
            }
        }
        if found.is_none() && !removed.is_empty() {
            self.store().remove(path);
        }
        drop(removed);
    }

    /// Document form of the subtree at `id`. The root renders its body
    /// directly; any other node is wrapped in its (re-nested) name.
    pub fn export(&self, id: NodeId) -> Value {
        if !self.contains(id) {
            return Value::Null;
        }
        let body = Value::Object(self.export_body(id));
        if id == self.root() {
            return body;
        }
        let mut wrapper = Map::new();
        insert_nested(&mut wrapper, &self.name_of(id).unwrap_or_default(), body);
        Value::Object(wrapper)
    }

    fn export_body(&self, id: NodeId) -> Map<String, Value> {
        let mut map = self
            .body_of(id)
            .and_then(|body| body.as_module().map(|module| module.parameters()))
            .unwrap_or_default();
        for child in self.children_of(id) {
            let (Some(name), Some(body)) = (self.name_of(child), self.body_of(child)) else {
                continue;
            };
            match body.as_port() {
                Some(port) => {
                    if let Some(binding) = port.binding_origin().export() {
                        insert_nested(&mut map, &name, binding);
                    }
                }
                None => insert_nested(&mut map, &name, Value::Object(self.export_body(child))),
            }
        }
        map
    }

    /// Module whose configuration contains `path`, when the path names one
    /// of its ports or a field inside it.
    fn owning_module(&self, path: &str) -> Option<NodeId> {
        let (closest, rest) = self.closest_ancestor(path);
        let body = self.body_of(closest)?;
        if rest.is_empty() {
            body.as_port()?;
            let parent = self.parent_of(closest)?;
            return matches!(self.body_of(parent)?, NodeBody::Module(_)).then_some(parent);
        }
        matches!(body, NodeBody::Module(_) | NodeBody::Namespace(_)).then_some(closest)
    }

    fn rebuild(&self, module: NodeId) {
        let (Some(path), Some(name), Some(parent)) =
            (self.path_of(module), self.name_of(module), self.parent_of(module))
        else {
            return;
        };
        drop(self.remove_subtree(module));
        if let Some(Value::Object(fragment)) = self.store().get(&path) {
            self.instantiate(&name, &fragment, parent);
        }
    }

    /// Removes the node at `path` and every sibling whose segmented name
    /// extends it.
    fn remove_overlapping(&self, path: &str) {
        for id in self.overlapping(path) {
            drop(self.remove_subtree(id));
        }
    }

    /// The node at `path` (if any) followed by the siblings whose segmented
    /// names start with its last segment.
    fn overlapping(&self, path: &str) -> Vec<NodeId> {
        let (parent, prefix, mut nodes) = match self.find(path) {
            Some(id) => {
                let (Some(parent), Some(name)) = (self.parent_of(id), self.name_of(id)) else {
                    return Vec::new();
                };
                (parent, name, vec![id])
            }
            None => {
                let (parent, rest) = self.closest_ancestor(path);
                if rest.is_empty() {
                    return Vec::new();
                }
                (parent, rest, Vec::new())
            }
        };
        let prefix = format!("{}/", prefix);
        nodes.extend(
            self.children_of(parent)
                .into_iter()
                .filter(|sibling| self.name_of(*sibling).is_some_and(|name| name.starts_with(&prefix))),
        );
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use serde_json::json;

    fn graph_with(document: Value) -> Graph {
        let graph = Graph::builder(Settings::default())
            .with_document(ConfigDocument::from_value(document))
            .build();
        graph.populate();
        graph
    }

    #[test]
    fn nested_names_round_trip() {
        let cases = [
            ("a", json!({"a": 1})),
            ("a/b", json!({"a": {"b": 1}})),
            ("/a//b/", json!({"a": {"b": 1}})),
        ];
        for (name, expected) in cases {
            let mut map = Map::new();
            insert_nested(&mut map, name, json!(1));
            assert_eq!(Value::Object(map), expected, "{}", name);
        }
    }

    #[test]
    fn untyped_fragments_namespace_their_children() {
        let graph = graph_with(json!({
            "Processors": {
                "Stage": {
                    "Gain1": {"type": "gain", "gain": 2.0, "in": "none"},
                    "note": "ignored"
                },
                "Broken": {"type": "blender"}
            }
        }));

        let id = graph.find("/Processors/Stage/Gain1").unwrap();
        assert_eq!(graph.name_of(id).as_deref(), Some("Stage/Gain1"));
        assert!(graph.find("/Processors/Broken").is_none());
        assert_eq!(
            graph.export(graph.find("/Processors").unwrap()),
            json!({"Processors": {"Stage": {"Gain1": {"type": "gain", "gain": 2.0, "in": "none"}}}})
        );
    }

    #[test]
    fn updating_a_parameter_rebuilds_the_module() {
        let graph = graph_with(json!({
            "Processors": {"Gain1": {"type": "gain", "gain": 2.0, "in": "none"}}
        }));
        graph.update("/Processors/Gain1/gain", json!(4.0)).unwrap();

        let input = graph.find_input::<f64>("/Processors/Gain1/in").unwrap();
        input.set_value(1.0);
        assert_eq!(graph.find_output::<f64>("/Processors/Gain1/out").unwrap().value(), 4.0);
        assert_eq!(graph.store().get("/Processors/Gain1/gain"), Some(json!(4.0)));
    }

    #[test]
    fn updating_replaces_segmented_siblings() {
        let graph = graph_with(json!({
            "Processors": {"Stage": {"A": {"type": "gain", "in": "none"}}}
        }));
        assert!(graph.find("/Processors/Stage/A").is_some());

        graph
            .update("/Processors/Stage", json!({"B": {"type": "gain", "in": "none"}}))
            .unwrap();
        assert!(graph.find("/Processors/Stage/A").is_none());
        assert!(graph.find("/Processors/Stage/B").is_some());
    }

    #[test]
    fn root_cannot_be_updated() {
        let graph = graph_with(json!({}));
        assert_eq!(graph.update("/", json!({})), Err(AdminError::RootPath));
        assert_eq!(graph.update("", json!({})), Err(AdminError::RootPath));
    }

    #[test]
    fn delete_erases_configuration() {
        let graph = graph_with(json!({
            "Processors": {
                "Gain1": {"type": "gain", "in": "none"},
                "Gain2": {"type": "gain", "in": "none"}
            }
        }));
        graph.delete("/Processors/Gain1");
        assert!(graph.find("/Processors/Gain1").is_none());
        assert_eq!(graph.store().get("/Processors/Gain1"), None);
        assert!(graph.store().get("/Processors/Gain2").is_some());

        let before = graph.node_count();
        graph.delete("/Processors/Missing");
        assert_eq!(graph.node_count(), before);
    }

    #[test]
    fn delete_takes_segmented_siblings_with_it() {
        let graph = graph_with(json!({
            "Processors": {
                "Stage": {
                    "Gain1": {"type": "gain", "in": "none"},
                    "Gain2": {"type": "gain", "in": "none"}
                },
                "Gain3": {"type": "gain", "in": "none"}
            }
        }));
        assert!(graph.find("/Processors/Stage/Gain1").is_some());

        graph.delete("/Processors/Stage");
        assert!(graph.find("/Processors/Stage/Gain1").is_none());
        assert!(graph.find("/Processors/Stage/Gain2").is_none());
        assert_eq!(graph.store().get("/Processors/Stage"), None);
        assert!(graph.find("/Processors/Gain3").is_some());
        assert!(graph.store().get("/Processors/Gain3").is_some());
    }
}
