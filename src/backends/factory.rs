// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{Map, Value};

use crate::backends::hardware::PwmChannel;
use crate::backends::local::{GainModule, SequenceProcessor};
use crate::backends::network::NetworkNamespace;
use crate::engine::Graph;
use crate::errors::GraphError;
use crate::graph::{Direction, NodeBody, NodeId, PrimitiveType};

/// Inserts the bare node a module hangs its ports on. The module sets the
/// body once its ports exist.
pub fn module_node(graph: &Graph, parent: NodeId, name: &str) -> Result<NodeId, GraphError> {
    graph.insert_node(parent, name, Direction::None, PrimitiveType::None, NodeBody::Container)
}

/// Factory for creating modules from configuration fragments
pub struct ModuleFactory;

impl ModuleFactory {
    /// Create a module named `name` under `parent` from its fragment
    ///
    /// The fragment's `type` field determines which module to create:
    /// - "gain" -> GainModule
    /// - "sequence" -> SequenceProcessor
    /// - "pwm" -> PwmChannel
    /// - "mqtt" -> NetworkNamespace
    ///
    /// A partially built module is removed again when creation fails.
    pub fn create_module(
        graph: &Graph,
        parent: NodeId,
        name: &str,
        module_type: &str,
        fragment: &Map<String, Value>,
    ) -> Result<NodeId, GraphError> {
        let result = match module_type {
            GainModule::TYPE => GainModule::create(graph, parent, name, fragment),
            SequenceProcessor::TYPE => SequenceProcessor::create(graph, parent, name, fragment),
            PwmChannel::TYPE => PwmChannel::create(graph, parent, name, fragment),
            NetworkNamespace::TYPE => NetworkNamespace::create(graph, parent, name, fragment),
            _ => {
                return Err(GraphError::ModuleCreation {
                    module_type: module_type.to_string(),
                    path: name.to_string(),
                    reason: "unknown module type".to_string(),
                })
            }
        };

        if let Err(error) = &result {
            if !matches!(error, GraphError::DuplicateName { .. }) {
                Self::discard_partial(graph, parent, name);
            }
        }
        result
    }

    fn discard_partial(graph: &Graph, parent: NodeId, name: &str) {
        let partial = graph
            .children_of(parent)
            .into_iter()
            .find(|child| graph.name_of(*child).as_deref() == Some(name));
        if let Some(id) = partial {
            drop(graph.remove_subtree(id));
        }
    }

    /// List all available module types
    pub fn list_available_types() -> Vec<&'static str> {
        vec![
            GainModule::TYPE,
            SequenceProcessor::TYPE,
            PwmChannel::TYPE,
            NetworkNamespace::TYPE,
        ]
    }

    /// Check if a module type is available
    pub fn is_type_available(module_type: &str) -> bool {
        Self::list_available_types().contains(&module_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use serde_json::json;

    fn fragment(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn creates_every_listed_type() {
        let graph = Graph::new(Settings::default());
        let root = graph.root();
        for module_type in ModuleFactory::list_available_types() {
            let name = format!("{}1", module_type);
            let id = ModuleFactory::create_module(&graph, root, &name, module_type, &Map::new())
                .unwrap_or_else(|error| panic!("{}: {}", module_type, error));
            let body = graph.body_of(id).unwrap();
            assert_eq!(body.as_module().map(|module| module.name()), Some(module_type));
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let graph = Graph::new(Settings::default());
        let root = graph.root();
        let result = ModuleFactory::create_module(&graph, root, "X", "blender", &Map::new());
        assert!(matches!(result, Err(GraphError::ModuleCreation { .. })));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn duplicate_name_keeps_the_existing_module() {
        let graph = Graph::new(Settings::default());
        let root = graph.root();
        let first = ModuleFactory::create_module(&graph, root, "Gain1", "gain", &fragment(json!({"gain": 3.0})))
            .unwrap();
        let second = ModuleFactory::create_module(&graph, root, "Gain1", "gain", &Map::new());
        assert!(matches!(second, Err(GraphError::DuplicateName { .. })));
        assert!(graph.contains(first));
    }

    #[test]
    fn is_type_available() {
        assert!(ModuleFactory::is_type_available("gain"));
        assert!(ModuleFactory::is_type_available("mqtt"));
        assert!(!ModuleFactory::is_type_available("blender"));
    }
}
