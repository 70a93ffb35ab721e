// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Map, Value};
use std::any::Any;
use std::rc::Rc;

use crate::backends::factory::module_node;
use crate::config::consts::DEFAULT_GAIN;
use crate::engine::Graph;
use crate::errors::GraphError;
use crate::graph::{NodeBody, NodeId};
use crate::ports::{BindingTarget, InputPort, OutputPort};
use crate::traits::Module;

/// Gain block - multiplies its input by a constant factor
pub struct GainModule {
    gain: f64,
    input: Rc<InputPort<f64>>,
    output: Rc<OutputPort<f64>>,
}

impl GainModule {
    pub const TYPE: &'static str = "gain";

    pub fn create(
        graph: &Graph,
        parent: NodeId,
        name: &str,
        fragment: &Map<String, Value>,
    ) -> Result<NodeId, GraphError> {
        let id = module_node(graph, parent, name)?;
        let gain = fragment
            .get("gain")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_GAIN);

        let output = OutputPort::<f64>::create(
            graph,
            id,
            "out",
            BindingTarget::from_fragment(Some(fragment), "out"),
        )?;
        let downstream = Rc::downgrade(&output);
        let input = InputPort::<f64>::create(
            graph,
            id,
            "in",
            BindingTarget::from_fragment(Some(fragment), "in"),
            move |value| {
                if let Some(output) = downstream.upgrade() {
                    output.set_value(value * gain);
                }
            },
        )?;

        let module = GainModule {
            gain,
            input,
            output,
        };
        graph.set_body(id, NodeBody::Module(Rc::new(module)))?;
        Ok(id)
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn input(&self) -> &Rc<InputPort<f64>> {
        &self.input
    }

    pub fn output(&self) -> &Rc<OutputPort<f64>> {
        &self.output
    }
}

impl Module for GainModule {
    fn name(&self) -> &'static str {
        Self::TYPE
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn parameters(&self) -> Map<String, Value> {
        let mut parameters = Map::new();
        parameters.insert("type".to_string(), json!(Self::TYPE));
        parameters.insert("gain".to_string(), json!(self.gain));
        parameters
    }
}
