// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Map, Value};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::backends::factory::module_node;
use crate::backends::hardware::ChannelAllocator;
use crate::config::consts::{DEFAULT_PWM_FREQUENCY_HZ, DEFAULT_PWM_RESOLUTION_BITS, PWM_CHANNEL_COUNT};
use crate::engine::Graph;
use crate::errors::GraphError;
use crate::graph::{NodeBody, NodeId};
use crate::observability::messages::{hardware::PwmChannelsExhausted, StructuredLog};
use crate::ports::{BindingTarget, InputPort};
use crate::traits::{Module, PwmDriver};

const MAX_RESOLUTION_BITS: u8 = 31;

/// Converts a 0-100 % level into a raw duty value for `resolution_bits`.
pub fn duty_for(percent: f64, resolution_bits: u8) -> u32 {
    let max_duty = (1u32 << resolution_bits.clamp(1, MAX_RESOLUTION_BITS)) - 1;
    let fraction = if percent.is_finite() { percent.clamp(0.0, 100.0) / 100.0 } else { 0.0 };
    (fraction * max_duty as f64).round() as u32
}

/// PWM output module (`type: "pwm"`).
///
/// Holds one hardware channel for its lifetime; the `in` port sets the
/// duty cycle in percent on every attached pin.
pub struct PwmChannel {
    channel: u8,
    pins: Vec<u8>,
    resolution_bits: u8,
    frequency_hz: u32,
    input: Rc<InputPort<f64>>,
    driver: Rc<dyn PwmDriver>,
    allocator: Rc<RefCell<ChannelAllocator>>,
}

impl PwmChannel {
    pub const TYPE: &'static str = "pwm";

    pub fn create(
        graph: &Graph,
        parent: NodeId,
        name: &str,
        fragment: &Map<String, Value>,
    ) -> Result<NodeId, GraphError> {
        let id = module_node(graph, parent, name)?;
        let path = graph.path_of(id).unwrap_or_default();

        let allocator = graph.pwm_channels();
        let Some(channel) = allocator.borrow_mut().allocate() else {
            PwmChannelsExhausted {
                path: &path,
                channel_count: PWM_CHANNEL_COUNT,
            }
            .log();
            return Err(GraphError::ModuleCreation {
                module_type: Self::TYPE.to_string(),
                path,
                reason: "no free PWM channel".to_string(),
            });
        };

        let pins = read_pins(fragment.get("pin"));
        let resolution_bits = fragment
            .get("resolution")
            .and_then(Value::as_u64)
            .and_then(|bits| u8::try_from(bits).ok())
            .map(|bits| bits.clamp(1, MAX_RESOLUTION_BITS))
            .unwrap_or(DEFAULT_PWM_RESOLUTION_BITS);
        let frequency_hz = fragment
            .get("frequency")
            .and_then(Value::as_u64)
            .and_then(|hz| u32::try_from(hz).ok())
            .unwrap_or(DEFAULT_PWM_FREQUENCY_HZ);

        let driver = graph.pwm_driver();
        driver.configure(channel, frequency_hz, resolution_bits);
        for pin in &pins {
            driver.attach_pin(channel, *pin);
        }

        let writer = driver.clone();
        let input = match InputPort::<f64>::create(
            graph,
            id,
            "in",
            BindingTarget::from_fragment(Some(fragment), "in"),
            move |percent| writer.write(channel, duty_for(*percent, resolution_bits)),
        ) {
            Ok(input) => input,
            Err(error) => {
                allocator.borrow_mut().release(channel);
                return Err(error);
            }
        };

        let module = PwmChannel {
            channel,
            pins,
            resolution_bits,
            frequency_hz,
            input,
            driver,
            allocator,
        };
        graph.set_body(id, NodeBody::Module(Rc::new(module)))?;
        Ok(id)
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn input(&self) -> &Rc<InputPort<f64>> {
        &self.input
    }
}

fn read_pins(value: Option<&Value>) -> Vec<u8> {
    let to_pin = |value: &Value| value.as_u64().and_then(|pin| u8::try_from(pin).ok());
    match value {
        Some(Value::Array(pins)) => pins.iter().filter_map(to_pin).collect(),
        Some(single) => to_pin(single).into_iter().collect(),
        None => Vec::new(),
    }
}

impl Drop for PwmChannel {
    fn drop(&mut self) {
        self.driver.write(self.channel, 0);
        for pin in &self.pins {
            self.driver.detach_pin(*pin);
        }
        self.allocator.borrow_mut().release(self.channel);
    }
}

impl Module for PwmChannel {
    fn name(&self) -> &'static str {
        Self::TYPE
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn parameters(&self) -> Map<String, Value> {
        let mut parameters = Map::new();
        parameters.insert("type".to_string(), json!(Self::TYPE));
        parameters.insert("pin".to_string(), json!(self.pins));
        parameters.insert("resolution".to_string(), json!(self.resolution_bits));
        parameters.insert("frequency".to_string(), json!(self.frequency_hz));
        parameters
    }
}
