// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<A> = dyn Fn(&A);

/// Synchronous broadcast to a set of listeners.
///
/// The event keeps only weak references; the listener stays registered for
/// as long as its [`Subscription`] is alive. Raising snapshots the listener
/// list first, so callbacks may subscribe, unsubscribe or raise again.
/// Listeners run most-recently-subscribed first.
pub struct Event<A: 'static> {
    listeners: RefCell<Vec<Weak<Callback<A>>>>,
}

/// Strong handle keeping one listener registered.
#[must_use = "dropping a Subscription unregisters the listener"]
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Subscription")
    }
}

impl<A: 'static> Event<A> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, callback: impl Fn(&A) + 'static) -> Subscription {
        let callback: Rc<Callback<A>> = Rc::new(callback);
        self.listeners.borrow_mut().push(Rc::downgrade(&callback));
        Subscription {
            _callback: Box::new(callback),
        }
    }

    pub fn raise(&self, args: &A) {
        let snapshot: Vec<Weak<Callback<A>>> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|listener| listener.strong_count() > 0);
            listeners.iter().rev().cloned().collect()
        };
        for listener in snapshot {
            // Skips listeners dropped by an earlier callback of this raise.
            if let Some(callback) = listener.upgrade() {
                callback(args);
            }
        }
    }

    /// Number of listeners whose subscription is still alive.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|listener| listener.strong_count() > 0)
            .count()
    }
}

impl<A: 'static> Default for Event<A> {
    fn default() -> Self {
        Self::new()
    }
}
