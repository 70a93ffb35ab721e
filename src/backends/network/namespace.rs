// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Map, Value};
use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::backends::factory::module_node;
use crate::config::consts::{DEFAULT_MQTT_PORT, DEFAULT_MQTT_SERVER};
use crate::engine::{Graph, LoopListener};
use crate::errors::GraphError;
use crate::graph::{Direction, NodeBody, NodeId, PrimitiveType};
use crate::observability::messages::{network::*, StructuredLog};
use crate::ports::{create_dynamic_port, ErasedPort, TextSink};
use crate::traits::{Module, Namespace, Transport};

/// Messaging namespace (`type: "mqtt"`).
///
/// Ports are created lazily, one per topic
/// `"/" + edge_name + "/" + relative_path`. Inbound messages are polled on
/// every tick and written to the matching output as text.
pub struct NetworkNamespace {
    id: NodeId,
    path: String,
    edge_name: String,
    server: String,
    port: u16,
    client_id: String,
    transport: Rc<dyn Transport>,
    topics: RefCell<BTreeMap<String, Weak<dyn ErasedPort>>>,
    _task: LoopListener,
}

impl NetworkNamespace {
    pub const TYPE: &'static str = "mqtt";

    pub fn create(
        graph: &Graph,
        parent: NodeId,
        name: &str,
        fragment: &Map<String, Value>,
    ) -> Result<NodeId, GraphError> {
        let id = module_node(graph, parent, name)?;
        let path = graph.path_of(id).unwrap_or_default();
        let settings = graph.settings();

        let server = fragment
            .get("server")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_MQTT_SERVER)
            .to_string();
        let port = fragment
            .get("port")
            .and_then(Value::as_u64)
            .and_then(|port| u16::try_from(port).ok())
            .unwrap_or(DEFAULT_MQTT_PORT);
        let client_id = fragment
            .get("clientID")
            .and_then(Value::as_str)
            .unwrap_or(settings.edge_name.as_str())
            .to_string();

        let namespace = Rc::new_cyclic(|weak: &Weak<NetworkNamespace>| {
            let weak = weak.clone();
            let task = graph.scheduler().register(0, move |_| {
                if let Some(namespace) = weak.upgrade() {
                    namespace.dispatch_inbound();
                }
            });
            NetworkNamespace {
                id,
                path: path.clone(),
                edge_name: settings.edge_name.clone(),
                server,
                port,
                client_id,
                transport: graph.transport(),
                topics: RefCell::new(BTreeMap::new()),
                _task: task,
            }
        });
        graph.set_body(id, NodeBody::Namespace(namespace))?;

        let everything = format!("{}/{}", path, settings.wildcard_suffix);
        graph.channels().outputs.raise(&everything);
        graph.channels().inputs.raise(&everything);
        Ok(id)
    }

    pub fn topic_for(&self, relative_path: &str) -> String {
        format!("/{}/{}", self.edge_name, relative_path.trim_start_matches('/'))
    }

    /// Number of inbound topics with a live output.
    pub fn topic_count(&self) -> usize {
        self.topics
            .borrow()
            .values()
            .filter(|port| port.strong_count() > 0)
            .count()
    }

    fn dispatch_inbound(&self) {
        for message in self.transport.poll() {
            let port = self.topics.borrow().get(&message.topic).and_then(Weak::upgrade);
            match port {
                Some(port) => {
                    if !port.set_string_value(&message.payload) {
                        PayloadRejected {
                            topic: &message.topic,
                            payload: &message.payload,
                        }
                        .log();
                    }
                }
                None => MessageUnrouted {
                    namespace_path: &self.path,
                    topic: &message.topic,
                }
                .log(),
            }
        }
    }

    fn publisher(&self, topic: String) -> TextSink {
        let transport = self.transport.clone();
        Rc::new(move |payload: &str| {
            MessagePublished {
                topic: &topic,
                payload,
            }
            .log();
            transport.publish(&topic, payload);
        })
    }
}

impl Module for NetworkNamespace {
    fn name(&self) -> &'static str {
        Self::TYPE
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn parameters(&self) -> Map<String, Value> {
        let mut parameters = Map::new();
        parameters.insert("type".to_string(), json!(Self::TYPE));
        parameters.insert("server".to_string(), json!(self.server));
        parameters.insert("port".to_string(), json!(self.port));
        parameters.insert("clientID".to_string(), json!(self.client_id));
        parameters
    }
}

impl Namespace for NetworkNamespace {
    fn as_module(&self) -> &dyn Module {
        self
    }

    fn materialize(
        &self,
        graph: &Graph,
        relative_path: &str,
        direction: Direction,
        primitive_type: PrimitiveType,
    ) -> Option<Rc<dyn ErasedPort>> {
        let topic = self.topic_for(relative_path);
        let sink: TextSink = match direction {
            Direction::Input => self.publisher(topic.clone()),
            _ => Rc::new(|_: &str| {}),
        };
        let port = create_dynamic_port(graph, self.id, relative_path, direction, primitive_type, sink)
            .ok()
            .flatten()?;

        if direction == Direction::Output {
            self.topics.borrow_mut().insert(topic.clone(), Rc::downgrade(&port));
            self.transport.subscribe(&topic);
            TopicSubscribed {
                namespace_path: &self.path,
                topic: &topic,
            }
            .log();
        }
        Some(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::network::LoopbackTransport;
    use crate::config::Settings;
    use crate::ports::BindingTarget;
    use crate::traits::InboundMessage;

    struct Fixture {
        graph: Graph,
        transport: Rc<LoopbackTransport>,
    }

    fn fixture() -> Fixture {
        let transport = Rc::new(LoopbackTransport::new());
        let settings = Settings {
            edge_name: "edge".to_string(),
            ..Settings::default()
        };
        let graph = Graph::builder(settings).with_transport(transport.clone()).build();
        let root = graph.root();
        let connectors = graph
            .insert_node(root, "Connectors", Direction::None, PrimitiveType::None, NodeBody::Container)
            .unwrap();
        NetworkNamespace::create(&graph, connectors, "mqtt", &Map::new()).unwrap();
        Fixture { graph, transport }
    }

    #[test]
    fn lookups_below_the_namespace_create_ports() {
        let fixture = fixture();
        let output = fixture
            .graph
            .find_output::<f64>("/Connectors/mqtt/Processors/Gain1/in")
            .unwrap();
        assert_eq!(output.path(), "/Connectors/mqtt/Processors/Gain1/in");
        assert!(fixture.transport.is_subscribed("/edge/Processors/Gain1/in"));

        let again = fixture
            .graph
            .find_output::<f64>("/Connectors/mqtt/Processors/Gain1/in")
            .unwrap();
        assert!(Rc::ptr_eq(&output, &again));
    }

    #[test]
    fn inbound_messages_reach_bound_inputs() {
        let fixture = fixture();
        let root = fixture.graph.root();
        let input = crate::ports::InputPort::<f64>::create(
            &fixture.graph,
            root,
            "level",
            BindingTarget::Default,
            |_| {},
        )
        .unwrap();
        assert_eq!(input.bound_output_path().as_deref(), Some("/Connectors/mqtt/level"));

        fixture
            .transport
            .sender()
            .send(InboundMessage {
                topic: "/edge/level".to_string(),
                payload: "42.5".to_string(),
            })
            .unwrap();
        fixture.graph.tick(0);
        assert_eq!(input.value(), 42.5);
    }

    #[test]
    fn outputs_publish_through_the_namespace() {
        let fixture = fixture();
        let root = fixture.graph.root();
        let output =
            crate::ports::OutputPort::<bool>::create(&fixture.graph, root, "alarm", BindingTarget::Default).unwrap();
        output.set_value(true);

        let published = fixture.transport.published();
        assert_eq!(
            published.last(),
            Some(&InboundMessage {
                topic: "/edge/alarm".to_string(),
                payload: "true".to_string(),
            })
        );
    }

    #[test]
    fn exports_connection_parameters() {
        let fixture = fixture();
        let id = fixture.graph.find("/Connectors/mqtt").unwrap();
        let parameters = fixture.graph.body_of(id).unwrap().as_module().unwrap().parameters();
        assert_eq!(
            Value::Object(parameters),
            json!({"type": "mqtt", "server": "localhost", "port": 1883, "clientID": "edge"})
        );
    }
}
