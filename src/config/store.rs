// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::cell::RefCell;

use crate::config::ConfigDocument;
use crate::errors::ConfigError;
use crate::observability::messages::{config::*, StructuredLog};
use crate::ports::Event;

/// Shared owner of the configuration document.
///
/// Every mutation is written through to the attached file and announced
/// on the matching event after the document borrow is released, so
/// listeners may read the store again.
pub struct ConfigStore {
    document: RefCell<ConfigDocument>,
    pub reloaded: Event<()>,
    pub changed: Event<String>,
    pub deleted: Event<String>,
}

impl ConfigStore {
    pub fn new(document: ConfigDocument) -> Self {
        Self {
            document: RefCell::new(document),
            reloaded: Event::new(),
            changed: Event::new(),
            deleted: Event::new(),
        }
    }

    /// Copy of the value at `path`.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.document.borrow().get(path).cloned()
    }

    pub fn snapshot(&self) -> Value {
        self.document.borrow().root().clone()
    }

    pub fn set(&self, path: &str, value: Value) {
        self.document.borrow_mut().set(path, value);
        self.persist();
        ConfigChanged { path }.log();
        self.changed.raise(&path.to_string());
    }

    pub fn remove(&self, path: &str) -> bool {
        let removed = self.document.borrow_mut().remove(path);
        if removed {
            self.persist();
            ConfigDeleted { path }.log();
            self.deleted.raise(&path.to_string());
        }
        removed
    }

    /// Swaps in a new document, keeping the attached file when the new one
    /// has none.
    pub fn replace(&self, mut document: ConfigDocument) {
        {
            let mut current = self.document.borrow_mut();
            if document.file().is_none() {
                if let Some(file) = current.file() {
                    document.attach_file(file.to_path_buf());
                }
            }
            *current = document;
        }
        self.reloaded.raise(&());
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.document.borrow().save()
    }

    fn persist(&self) {
        if let Err(error) = self.save() {
            DocumentSaveFailed { error: &error }.log();
        }
    }
}
