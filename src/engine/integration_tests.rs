// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Value};
use std::rc::Rc;

use crate::backends::local::{Phase, SequenceProcessor};
use crate::backends::network::LoopbackTransport;
use crate::config::{ConfigDocument, Settings};
use crate::engine::Graph;
use crate::graph::{Direction, NodeBody, PrimitiveType};
use crate::ports::{BindingState, BindingTarget, InputPort, OutputPort};
use crate::traits::{downcast_module, InboundMessage};

/// Cross-module scenarios: wiring, document round trips and timing.
#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(document: Value) -> Graph {
        let graph = Graph::builder(Settings::default())
            .with_document(ConfigDocument::from_value(document))
            .build();
        graph.populate();
        graph
    }

    fn container(graph: &Graph, name: &str) -> crate::graph::NodeId {
        graph
            .insert_node(graph.root(), name, Direction::None, PrimitiveType::None, NodeBody::Container)
            .unwrap()
    }

    #[test]
    fn wiring_is_independent_of_creation_order() {
        for output_first in [true, false] {
            let graph = Graph::new(Settings::default());
            let a = container(&graph, "A");
            let b = container(&graph, "B");
            let target = BindingTarget::Explicit("/A/out".to_string());

            let (output, input) = if output_first {
                let output = OutputPort::<f64>::create(&graph, a, "out", BindingTarget::Disabled).unwrap();
                output.set_value(3.5);
                let input = InputPort::<f64>::create(&graph, b, "in", target, |_| {}).unwrap();
                (output, input)
            } else {
                let input = InputPort::<f64>::create(&graph, b, "in", target, |_| {}).unwrap();
                assert_eq!(input.binding_state(), BindingState::AwaitingCreation);
                let output = OutputPort::<f64>::create(&graph, a, "out", BindingTarget::Disabled).unwrap();
                output.set_value(3.5);
                (output, input)
            };

            assert_eq!(input.binding_state(), BindingState::Bound, "output_first={}", output_first);
            assert_eq!(input.value(), output.value(), "output_first={}", output_first);
            output.set_value(-1.0);
            assert_eq!(input.value(), -1.0, "output_first={}", output_first);
        }
    }

    #[test]
    fn output_side_binding_reaches_a_later_input() {
        let graph = Graph::new(Settings::default());
        let a = container(&graph, "A");
        let b = container(&graph, "B");
        let output =
            OutputPort::<i32>::create(&graph, a, "out", BindingTarget::Explicit("/B/in".to_string())).unwrap();
        output.set_value(7);

        let input = InputPort::<i32>::create(&graph, b, "in", BindingTarget::Disabled, |_| {}).unwrap();
        assert_eq!(input.binding_state(), BindingState::Bound);
        assert_eq!(input.value(), 7);
    }

    #[test]
    fn binding_twice_is_a_no_op() {
        let graph = Graph::new(Settings::default());
        let a = container(&graph, "A");
        let output = OutputPort::<f64>::create(&graph, a, "out", BindingTarget::Disabled).unwrap();
        let input = InputPort::<f64>::create(
            &graph,
            a,
            "in",
            BindingTarget::Explicit("/A/out".to_string()),
            |_| {},
        )
        .unwrap();
        let subscribers = output.subscriber_count();

        input.bind();
        input.bind();
        assert_eq!(output.subscriber_count(), subscribers);
        assert!(!input.attach(&output));
        assert_eq!(output.subscriber_count(), subscribers);
    }

    #[test]
    fn export_then_reinstantiate_is_isomorphic() {
        let document = json!({
            "Processors": {
                "Gain1": {"type": "gain", "gain": 2.5, "in": "/Processors/Seq/out"},
                "Seq": {
                    "type": "sequence",
                    "modes": {"day": {"mode": "inf{0;1000;100}", "on": false, "off": false, "sync": 1000}},
                    "on": "{}",
                    "off": "{}",
                    "defaultMode": "day",
                    "activate": "none",
                    "manualTarget": "none",
                    "targetMode": "none"
                }
            }
        });
        let first = graph_with(document.clone());
        let exported = first.export(first.root());
        assert_eq!(exported, document);

        let second = graph_with(exported.clone());
        assert_eq!(second.export(second.root()), exported);
        assert_eq!(second.node_count(), first.node_count());
        let input = second.find_input::<f64>("/Processors/Gain1/in").unwrap();
        assert_eq!(input.binding_state(), BindingState::Bound);
    }

    #[test]
    fn deleting_a_module_removes_its_ports() {
        let graph = graph_with(json!({
            "Processors": {"Gain1": {"type": "gain", "gain": 2.0, "in": "none"}}
        }));
        assert!(graph.find("/Processors/Gain1/out").is_some());

        graph.delete("/Processors/Gain1");
        assert!(graph.find("/Processors/Gain1").is_none());
        assert!(graph.find("/Processors/Gain1/out").is_none());
        assert!(graph.find("/Processors/Gain1/in").is_none());
        assert_eq!(graph.store().get("/Processors/Gain1"), None);
    }

    #[test]
    fn setting_a_different_type_replaces_the_module() {
        let graph = graph_with(json!({
            "Processors": {"Gain1": {"type": "sequence", "modes": {"m": "{5}"}, "activate": "none"}}
        }));
        assert!(graph.find("/Processors/Gain1/targetMode").is_some());

        graph
            .update("/Processors/Gain1", json!({"type": "gain", "gain": 2, "in": "none"}))
            .unwrap();
        assert!(graph.find("/Processors/Gain1/targetMode").is_none());

        let id = graph.find("/Processors/Gain1").unwrap();
        let module = graph.body_of(id).unwrap();
        let parameters = module.as_module().unwrap().parameters();
        assert_eq!(parameters.get("type"), Some(&json!("gain")));
        assert_eq!(parameters.get("gain").and_then(Value::as_f64), Some(2.0));

        graph.find_input::<f64>("/Processors/Gain1/in").unwrap().set_value(1.5);
        assert_eq!(graph.find_output::<f64>("/Processors/Gain1/out").unwrap().value(), 3.0);
    }

    #[test]
    fn synced_mode_waits_for_the_period_boundary() {
        let graph = graph_with(json!({
            "Processors": {
                "Seq": {
                    "type": "sequence",
                    "modes": {"day": {"mode": "{40}", "sync": 1000}},
                    "defaultMode": "day",
                    "activate": "none",
                    "manualTarget": "none",
                    "targetMode": "none"
                }
            }
        }));
        let id = graph.find("/Processors/Seq").unwrap();
        let NodeBody::Module(module) = graph.body_of(id).unwrap() else {
            panic!("Seq is not a module");
        };
        let processor = downcast_module::<SequenceProcessor>(&module).unwrap();

        graph.find_input::<bool>("/Processors/Seq/activate").unwrap().set_value(true);
        for now in [1350, 1500, 1999] {
            graph.tick(now);
            assert_eq!(processor.phase(), Phase::Idle, "t={}", now);
        }
        graph.tick(2000);
        assert_eq!(processor.phase(), Phase::Running);
        assert_eq!(graph.find_output::<f64>("/Processors/Seq/out").unwrap().value(), 40.0);
    }

    #[test]
    fn inputs_rebind_when_their_upstream_is_recreated() {
        let graph = graph_with(json!({
            "Processors": {
                "Source": {"type": "gain", "gain": 1.0, "in": "none"},
                "Sink": {"type": "gain", "gain": 10.0, "in": "/Processors/Source/out"}
            }
        }));
        let sink = graph.find_input::<f64>("/Processors/Sink/in").unwrap();
        assert_eq!(sink.binding_state(), BindingState::Bound);

        graph.delete("/Processors/Source");
        assert_eq!(sink.binding_state(), BindingState::AwaitingCreation);

        graph
            .update("/Processors/Source", json!({"type": "gain", "gain": 1.0, "in": "none"}))
            .unwrap();
        assert_eq!(sink.binding_state(), BindingState::Bound);

        graph.find_input::<f64>("/Processors/Source/in").unwrap().set_value(2.0);
        assert_eq!(graph.find_output::<f64>("/Processors/Sink/out").unwrap().value(), 20.0);
    }

    #[test]
    fn default_bindings_go_through_the_network_namespace() {
        let transport = Rc::new(LoopbackTransport::new());
        let settings = Settings {
            edge_name: "edge".to_string(),
            ..Settings::default()
        };
        let graph = Graph::builder(settings)
            .with_transport(transport.clone())
            .with_document(ConfigDocument::from_value(json!({
                "Processors": {"Gain1": {"type": "gain", "gain": 3.0}},
                "Connectors": {"mqtt": {"type": "mqtt"}}
            })))
            .build();
        graph.populate();

        let input = graph.find_input::<f64>("/Processors/Gain1/in").unwrap();
        assert_eq!(input.binding_state(), BindingState::Bound);
        assert_eq!(
            input.bound_output_path().as_deref(),
            Some("/Connectors/mqtt/Processors/Gain1/in")
        );

        transport
            .sender()
            .send(InboundMessage {
                topic: "/edge/Processors/Gain1/in".to_string(),
                payload: "2".to_string(),
            })
            .unwrap();
        graph.tick(0);

        assert_eq!(graph.find_output::<f64>("/Processors/Gain1/out").unwrap().value(), 6.0);
        assert_eq!(
            transport.published().last(),
            Some(&InboundMessage {
                topic: "/edge/Processors/Gain1/out".to_string(),
                payload: "6".to_string(),
            })
        );
    }

    #[test]
    fn waiting_ports_bind_when_the_namespace_appears_later() {
        let transport = Rc::new(LoopbackTransport::new());
        let settings = Settings {
            edge_name: "edge".to_string(),
            namespace_path: "/Zed/mqtt".to_string(),
            ..Settings::default()
        };
        let graph = Graph::builder(settings).with_transport(transport.clone()).build();

        graph
            .update("/Processors/Gain1", json!({"type": "gain", "gain": 3.0}))
            .unwrap();
        let input = graph.find_input::<f64>("/Processors/Gain1/in").unwrap();
        assert_eq!(input.binding_state(), BindingState::AwaitingCreation);

        graph.update("/Zed/mqtt", json!({"type": "mqtt"})).unwrap();
        assert_eq!(input.binding_state(), BindingState::Bound);
        assert_eq!(input.bound_output_path().as_deref(), Some("/Zed/mqtt/Processors/Gain1/in"));

        transport
            .sender()
            .send(InboundMessage {
                topic: "/edge/Processors/Gain1/in".to_string(),
                payload: "2".to_string(),
            })
            .unwrap();
        graph.tick(0);

        assert_eq!(graph.find_output::<f64>("/Processors/Gain1/out").unwrap().value(), 6.0);
        assert!(transport.published().contains(&InboundMessage {
            topic: "/edge/Processors/Gain1/out".to_string(),
            payload: "6".to_string(),
        }));
    }
}
