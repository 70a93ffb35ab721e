// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Mode-driven sequence processor.
//!
//! Plays one of several named [`Mode`]s on its `out` port, wrapped in the
//! shared on/off transition sequences. Start and end times snap to the
//! mode's sync period, and a mode swap only takes effect once the current
//! mode has fully wound down.

use serde_json::{json, Map, Value};
use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use crate::backends::factory::module_node;
use crate::engine::{Graph, LoopListener};
use crate::errors::{GraphError, SequenceWarning};
use crate::graph::{NodeBody, NodeId};
use crate::observability::messages::{sequence::*, StructuredLog};
use crate::ports::{BindingTarget, InputPort, OutputPort};
use crate::sequence::{align_to_period, Duration, Mode, Sequence};
use crate::traits::Module;

/// Where the processor is in its activation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    OnTransition,
    Running,
    OffTransition,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "Idle",
            Phase::OnTransition => "OnTransition",
            Phase::Running => "Running",
            Phase::OffTransition => "OffTransition",
        };
        f.write_str(name)
    }
}

/// Result of one tick, applied to the ports once the state is released.
struct Step {
    value: f64,
    active: bool,
    release_activate: bool,
}

struct SequenceState {
    modes: BTreeMap<String, Mode>,
    on: Sequence,
    off: Sequence,
    default_mode: Option<String>,
    active_mode: Option<String>,
    pending_mode: Option<String>,
    mode_start_ms: Option<u64>,
    mode_end_ms: Option<u64>,
    manual_setpoint: Option<f64>,
    target_active: bool,
    phase: Phase,
}

fn finite_millis(sequence: &Sequence) -> u64 {
    sequence.total_duration().as_millis().unwrap_or(0)
}

impl SequenceState {
    fn select_mode(&mut self, name: &str) {
        if name.is_empty() {
            self.pending_mode = None;
            self.target_active = false;
            return;
        }
        if self.active_mode.as_deref() == Some(name) {
            self.pending_mode = None;
        } else {
            self.pending_mode = Some(name.to_string());
        }
        self.target_active = true;
    }

    fn step(&mut self, now: u64) -> Step {
        if let Some(setpoint) = self.manual_setpoint {
            self.target_active = false;
            self.mode_start_ms = None;
            self.mode_end_ms = None;
            self.phase = Phase::Idle;
            return Step {
                value: setpoint,
                active: false,
                release_activate: false,
            };
        }

        let idle = self.mode_start_ms.is_none() && self.mode_end_ms.is_none();
        if self.active_mode.is_none() || (idle && self.pending_mode.is_some()) {
            if let Some(pending) = self.pending_mode.take() {
                self.active_mode = Some(pending);
            }
        }
        let swapping = self.pending_mode.is_some() && self.pending_mode != self.active_mode;
        let Some(mode) = self.active_mode.as_ref().and_then(|name| self.modes.get(name)) else {
            self.phase = Phase::Idle;
            return Step {
                value: 0.0,
                active: self.target_active,
                release_activate: false,
            };
        };
        let on_ms = if mode.uses_on_transition { finite_millis(&self.on) } else { 0 };
        let off_ms = if mode.uses_off_transition { finite_millis(&self.off) } else { 0 };

        if !self.target_active || swapping {
            if self.mode_end_ms.is_none() {
                if let Some(start) = self.mode_start_ms {
                    self.mode_end_ms = Some(align_to_period(now.max(start), mode.sync_period_ms));
                }
            }
            if self.mode_end_ms.is_some_and(|end| now >= end) {
                self.mode_start_ms = None;
            }
        } else {
            if self.mode_start_ms.is_none() {
                let earliest = match self.mode_end_ms {
                    Some(end) => now.max(end + off_ms),
                    None => now,
                };
                self.mode_start_ms = Some(align_to_period(earliest + on_ms, mode.sync_period_ms));
            }
            if self.mode_start_ms.is_some_and(|start| now >= start) {
                self.mode_end_ms = None;
            }
        }

        let mut release_activate = false;
        let (phase, value) = match (self.mode_start_ms, self.mode_end_ms) {
            (Some(start), _) if on_ms > 0 && now + on_ms >= start && now < start => {
                (Phase::OnTransition, self.on.value_at(now + on_ms - start))
            }
            (Some(start), end) if now >= start && end.map_or(true, |end| now < end) => {
                (Phase::Running, mode.value_at(now - start))
            }
            (_, Some(end)) if now >= end && now < end + off_ms => {
                (Phase::OffTransition, self.off.value_at(now - end))
            }
            // A start scheduled past the off transition keeps its activation.
            (None, Some(end)) if now >= end + off_ms => {
                self.mode_start_ms = None;
                self.mode_end_ms = None;
                if swapping {
                    self.active_mode = None;
                } else {
                    release_activate = true;
                }
                (Phase::Idle, 0.0)
            }
            _ => (Phase::Idle, 0.0),
        };

        if phase != self.phase {
            PhaseChanged {
                mode: self.active_mode.as_deref().unwrap_or_default(),
                from: self.phase,
                to: phase,
                now_ms: now,
            }
            .log();
            self.phase = phase;
        }
        Step {
            value,
            active: self.target_active,
            release_activate,
        }
    }
}

/// Sequence processor module (`type: "sequence"`).
///
/// # Ports
/// * `out` - current value
/// * `active` - true while a mode is requested
/// * `activate` - starts (true) or winds down (false) the active mode
/// * `manualTarget` - forces `out` while non-negative
/// * `targetMode` - selects a configured mode by name; empty deactivates
pub struct SequenceProcessor {
    state: Rc<RefCell<SequenceState>>,
    out: Rc<OutputPort<f64>>,
    active: Rc<OutputPort<bool>>,
    activate: Rc<InputPort<bool>>,
    manual_target: Rc<InputPort<f64>>,
    target_mode: Rc<InputPort<String>>,
    _task: LoopListener,
}

impl SequenceProcessor {
    pub const TYPE: &'static str = "sequence";

    pub fn create(
        graph: &Graph,
        parent: NodeId,
        name: &str,
        fragment: &Map<String, Value>,
    ) -> Result<NodeId, GraphError> {
        let id = module_node(graph, parent, name)?;
        let path = graph.path_of(id).unwrap_or_default();
        let state = Rc::new(RefCell::new(Self::read_state(&path, fragment)));
        let mode_names: BTreeSet<String> = state.borrow().modes.keys().cloned().collect();
        let binding = |port: &str| BindingTarget::from_fragment(Some(fragment), port);

        let out = OutputPort::<f64>::create(graph, id, "out", binding("out"))?;
        let active = OutputPort::<bool>::create(graph, id, "active", binding("active"))?;

        let weak = Rc::downgrade(&state);
        let activate = InputPort::<bool>::create(graph, id, "activate", binding("activate"), move |value| {
            if let Some(state) = weak.upgrade() {
                let mut state = state.borrow_mut();
                if *value {
                    state.manual_setpoint = None;
                }
                state.target_active = *value;
            }
        })?;

        let weak = Rc::downgrade(&state);
        let manual_target =
            InputPort::<f64>::create(graph, id, "manualTarget", binding("manualTarget"), move |value| {
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().manual_setpoint = (*value >= 0.0).then_some(*value);
                }
            })?;

        let weak = Rc::downgrade(&state);
        let mode_path = path.clone();
        let target_mode = InputPort::<String>::create_validated(
            graph,
            id,
            "targetMode",
            binding("targetMode"),
            move |name| name.is_empty() || mode_names.contains(name),
            move |name| {
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().select_mode(name);
                    ModeSelected {
                        processor_path: &mode_path,
                        mode: name,
                    }
                    .log();
                }
            },
        )?;

        let processor = Rc::new_cyclic(|weak: &std::rc::Weak<SequenceProcessor>| {
            let weak = weak.clone();
            let task = graph.scheduler().register(0, move |now| {
                if let Some(processor) = weak.upgrade() {
                    processor.execute(now);
                }
            });
            SequenceProcessor {
                state,
                out,
                active,
                activate,
                manual_target,
                target_mode,
                _task: task,
            }
        });
        graph.set_body(id, NodeBody::Module(processor))?;
        Ok(id)
    }

    fn read_state(path: &str, fragment: &Map<String, Value>) -> SequenceState {
        let report = |source: &str, warnings: Vec<SequenceWarning>| {
            for warning in warnings {
                SequenceParseWarning {
                    processor_path: path,
                    source,
                    warning: &warning,
                }
                .log();
            }
        };

        let mut modes = BTreeMap::new();
        if let Some(entries) = fragment.get("modes").and_then(Value::as_object) {
            for (name, value) in entries {
                let (mode, warnings) = Mode::from_json(value);
                report(name, warnings);
                modes.insert(name.clone(), mode);
            }
        }
        let transition = |key: &str| {
            let text = fragment.get(key).and_then(Value::as_str).unwrap_or("{}");
            let (sequence, warnings) = Sequence::parse_with_warnings(text);
            report(key, warnings);
            if sequence.total_duration() == Duration::Infinite {
                InfiniteTransition {
                    processor_path: path,
                    transition: key,
                }
                .log();
            }
            sequence
        };
        let on = transition("on");
        let off = transition("off");

        let default_mode = fragment
            .get("defaultMode")
            .and_then(Value::as_str)
            .filter(|name| modes.contains_key(*name))
            .map(str::to_string);

        SequenceState {
            modes,
            on,
            off,
            active_mode: default_mode.clone(),
            default_mode,
            pending_mode: None,
            mode_start_ms: None,
            mode_end_ms: None,
            manual_setpoint: None,
            target_active: false,
            phase: Phase::Idle,
        }
    }

    /// Advances the state machine to `now_ms` and publishes the result.
    pub fn execute(&self, now_ms: u64) {
        let step = self.state.borrow_mut().step(now_ms);
        self.out.set_value(step.value);
        self.active.set_value(step.active);
        if step.release_activate {
            self.activate.set_value(false);
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn active_mode(&self) -> Option<String> {
        self.state.borrow().active_mode.clone()
    }

    pub fn output(&self) -> &Rc<OutputPort<f64>> {
        &self.out
    }

    pub fn manual_target(&self) -> &Rc<InputPort<f64>> {
        &self.manual_target
    }

    pub fn target_mode(&self) -> &Rc<InputPort<String>> {
        &self.target_mode
    }
}

impl Module for SequenceProcessor {
    fn name(&self) -> &'static str {
        Self::TYPE
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn parameters(&self) -> Map<String, Value> {
        let state = self.state.borrow();
        let modes: Map<String, Value> = state
            .modes
            .iter()
            .map(|(name, mode)| (name.clone(), mode.to_json()))
            .collect();

        let mut parameters = Map::new();
        parameters.insert("type".to_string(), json!(Self::TYPE));
        parameters.insert("modes".to_string(), Value::Object(modes));
        parameters.insert("on".to_string(), json!(state.on.to_string()));
        parameters.insert("off".to_string(), json!(state.off.to_string()));
        if let Some(default_mode) = &state.default_mode {
            parameters.insert("defaultMode".to_string(), json!(default_mode));
        }
        parameters
    }
}
