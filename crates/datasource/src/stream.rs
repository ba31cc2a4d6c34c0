//! Synchronous multicast of change events.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<E> = Rc<dyn Fn(&E)>;

struct Registry<E> {
    next_listener_id: u64,
    listeners: BTreeMap<u64, Listener<E>>,
    closed: bool,
}

/// A push stream of events delivered to listeners in subscription order.
///
/// No borrow is held while a listener runs, so listeners may subscribe,
/// cancel or trigger further emissions. A listener cancelled mid-emission is
/// not called for the remainder of that emission.
pub struct ChangeStream<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E: 'static> ChangeStream<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_listener_id: 1,
                listeners: BTreeMap::new(),
                closed: false,
            })),
        }
    }

    /// Registers `listener`. It stays registered until the returned
    /// [`Subscription`] is cancelled or dropped. Subscribing to a closed
    /// stream yields an inert subscription.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + 'static,
    {
        let id = {
            let mut registry = self.registry.borrow_mut();
            if registry.closed {
                return Subscription::inert();
            }
            let id = registry.next_listener_id;
            registry.next_listener_id = registry.next_listener_id.saturating_add(1);
            registry.listeners.insert(id, Rc::new(listener));
            id
        };
        let registry: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    let removed = registry.borrow_mut().listeners.remove(&id);
                    drop(removed);
                }
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    pub fn is_closed(&self) -> bool {
        self.registry.borrow().closed
    }

    pub(crate) fn emit(&self, event: &E) {
        let snapshot: Vec<(u64, Listener<E>)> = {
            let registry = self.registry.borrow();
            if registry.closed {
                return;
            }
            registry
                .listeners
                .iter()
                .map(|(id, listener)| (*id, Rc::clone(listener)))
                .collect()
        };
        tracing::trace!(listeners = snapshot.len(), "emitting change");
        for (id, listener) in snapshot {
            let live = {
                let registry = self.registry.borrow();
                !registry.closed && registry.listeners.contains_key(&id)
            };
            if live {
                listener(event);
            }
        }
    }

    /// Drops every listener; later emissions and subscriptions are no-ops.
    pub(crate) fn close(&self) {
        let listeners = {
            let mut registry = self.registry.borrow_mut();
            registry.closed = true;
            std::mem::take(&mut registry.listeners)
        };
        drop(listeners);
    }
}

impl<E: 'static> Default for ChangeStream<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ChangeStream<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("ChangeStream")
            .field("listeners", &registry.listeners.len())
            .field("closed", &registry.closed)
            .finish()
    }
}

/// Handle keeping a listener registered. Dropping it cancels the listener.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn inert() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
