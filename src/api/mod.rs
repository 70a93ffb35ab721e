// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Administrative surface.
//!
//! Text-in, text-out operations an operator console or remote shell calls
//! to inspect and edit the live model. Every edit goes through the
//! configuration document first, so the model and the persisted file never
//! disagree.

use serde_json::Value;

use crate::engine::Graph;
use crate::errors::AdminError;

pub struct AdminApi {
    graph: Graph,
}

impl AdminApi {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// JSON text of the document fragment at `path`; `"null"` when absent.
    pub fn get_parameters(&self, path: &str) -> String {
        self.graph
            .store()
            .get(path)
            .unwrap_or(Value::Null)
            .to_string()
    }

    pub fn delete(&self, path: &str) {
        self.graph.delete(path);
    }

    /// Parses `fragment_json` and applies it at `path`. Returns an empty
    /// string on success, otherwise the reason it was refused.
    pub fn set(&self, path: &str, fragment_json: &str) -> String {
        match self.try_set(path, fragment_json) {
            Ok(()) => String::new(),
            Err(error) => error.to_string(),
        }
    }

    fn try_set(&self, path: &str, fragment_json: &str) -> Result<(), AdminError> {
        let fragment: Value =
            serde_json::from_str(fragment_json).map_err(|error| AdminError::InvalidJson(error.to_string()))?;
        self.graph.update(path, fragment)
    }

    /// Document form of the live subtree at `path`, `null` when nothing
    /// resolves.
    pub fn export(&self, path: &str) -> Value {
        match self.graph.find(path) {
            Some(id) => self.graph.export(id),
            None => Value::Null,
        }
    }
}
