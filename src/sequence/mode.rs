// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Map, Value};

use crate::errors::SequenceWarning;
use crate::sequence::Sequence;

const MODE_KEY: &str = "mode";
const ON_KEY: &str = "on";
const OFF_KEY: &str = "off";
const SYNC_KEY: &str = "sync";

/// A named behaviour of a sequence processor: the sequence it plays, whether
/// the shared on/off transitions wrap it, and an optional period its start
/// and end snap to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mode {
    pub sequence: Sequence,
    pub uses_on_transition: bool,
    pub uses_off_transition: bool,
    pub sync_period_ms: Option<u64>,
}

impl Mode {
    /// Reads `{"mode": "...", "on": bool, "off": bool, "sync": ms}`. A bare
    /// string is accepted as the sequence alone.
    pub fn from_json(value: &Value) -> (Self, Vec<SequenceWarning>) {
        if let Some(text) = value.as_str() {
            let (sequence, warnings) = Sequence::parse_with_warnings(text);
            return (
                Self {
                    sequence,
                    ..Self::default()
                },
                warnings,
            );
        }
        let empty = Map::new();
        let fields = value.as_object().unwrap_or(&empty);
        let text = fields.get(MODE_KEY).and_then(Value::as_str).unwrap_or("{}");
        let (sequence, warnings) = Sequence::parse_with_warnings(text);
        let mode = Self {
            sequence,
            uses_on_transition: fields.get(ON_KEY).and_then(Value::as_bool).unwrap_or(false),
            uses_off_transition: fields.get(OFF_KEY).and_then(Value::as_bool).unwrap_or(false),
            sync_period_ms: fields
                .get(SYNC_KEY)
                .and_then(Value::as_u64)
                .filter(|period| *period > 0),
        };
        (mode, warnings)
    }

    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "mode": self.sequence.to_string(),
            "on": self.uses_on_transition,
            "off": self.uses_off_transition,
        });
        if let (Some(period), Some(fields)) = (self.sync_period_ms, value.as_object_mut()) {
            fields.insert(SYNC_KEY.to_string(), json!(period));
        }
        value
    }

    pub fn value_at(&self, elapsed_ms: u64) -> f64 {
        self.sequence.value_at(elapsed_ms)
    }
}

/// Rounds `time_ms` up to the next multiple of `period_ms`.
pub fn align_to_period(time_ms: u64, period_ms: Option<u64>) -> u64 {
    match period_ms {
        Some(period) if period > 0 => time_ms.div_ceil(period).saturating_mul(period),
        _ => time_ms,
    }
}
