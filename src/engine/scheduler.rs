// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

struct LoopEntry {
    timeout_ms: u64,
    last_call_ms: Cell<Option<u64>>,
    callback: Box<dyn Fn(u64)>,
}

/// Handle keeping a periodic task registered; dropping it stops the task.
#[must_use = "dropping a LoopListener unregisters the task"]
pub struct LoopListener {
    _entry: Rc<LoopEntry>,
}

/// Registry of periodic tasks driven by the cooperative tick.
///
/// A task with timeout `t` runs on a tick when at least `t` ms passed since
/// its previous run; timeout 0 runs on every tick.
#[derive(Default)]
pub struct LoopRegistry {
    entries: RefCell<Vec<Weak<LoopEntry>>>,
}

impl LoopRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, timeout_ms: u64, callback: impl Fn(u64) + 'static) -> LoopListener {
        let entry = Rc::new(LoopEntry {
            timeout_ms,
            last_call_ms: Cell::new(None),
            callback: Box::new(callback),
        });
        self.entries.borrow_mut().push(Rc::downgrade(&entry));
        LoopListener { _entry: entry }
    }

    /// Runs every due task with the current time.
    pub fn tick(&self, now_ms: u64) {
        let snapshot: Vec<Weak<LoopEntry>> = {
            let mut entries = self.entries.borrow_mut();
            entries.retain(|entry| entry.strong_count() > 0);
            entries.clone()
        };
        for entry in snapshot {
            let Some(entry) = entry.upgrade() else {
                continue;
            };
            let due = match entry.last_call_ms.get() {
                None => true,
                Some(last) => now_ms.saturating_sub(last) >= entry.timeout_ms,
            };
            if due {
                entry.last_call_ms.set(Some(now_ms));
                (entry.callback)(now_ms);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_gates_calls() {
        let registry = LoopRegistry::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let log = calls.clone();
        let _every = registry.register(0, move |now| log.borrow_mut().push(("every", now)));
        let log = calls.clone();
        let _slow = registry.register(100, move |now| log.borrow_mut().push(("slow", now)));

        for now in [0, 50, 100, 150, 230] {
            registry.tick(now);
        }

        let slow: Vec<u64> = calls.borrow().iter().filter(|(n, _)| *n == "slow").map(|(_, t)| *t).collect();
        let every = calls.borrow().iter().filter(|(n, _)| *n == "every").count();
        assert_eq!(slow, vec![0, 100, 230]);
        assert_eq!(every, 5);
    }

    #[test]
    fn dropped_listener_stops_running() {
        let registry = LoopRegistry::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let listener = registry.register(0, move |_| counter.set(counter.get() + 1));

        registry.tick(1);
        drop(listener);
        registry.tick(2);

        assert_eq!(hits.get(), 1);
        assert!(registry.is_empty());
    }
}
