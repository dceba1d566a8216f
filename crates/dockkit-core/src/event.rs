#![forbid(unsafe_code)]

//! Change notifications: emitters, events, and subscriptions.
//!
//! An [`Emitter`] owns a list of listeners and fires values to them. Its
//! [`Event`] handle is what gets handed out to subscribers; it holds only a
//! weak reference, so an event outliving its emitter simply never fires.
//!
//! # Invariants
//!
//! 1. Listeners run in subscription order.
//! 2. A listener subscribed or removed while a value is being fired does not
//!    affect the current fan-out (the listener list is snapshotted).
//! 3. A panicking listener never prevents the remaining listeners from
//!    running; the panic is caught, logged, and reported in [`FireOutcome`].
//! 4. Dropping a [`Subscription`] detaches every listener it registered.
//!
//! # Failure Modes
//!
//! - Subscribing to an event whose emitter is gone yields an inert
//!   subscription.
//! - Single-threaded only: emitters are `Rc`-based and not `Send`.

use std::cell::RefCell;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use crate::lifecycle::panic_message;

type Listener<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    listeners: Vec<(u64, Listener<T>)>,
    next_id: u64,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }
}

trait Detach {
    fn detach(&self, id: u64);
}

impl<T> Detach for RefCell<Registry<T>> {
    fn detach(&self, id: u64) {
        if let Ok(mut registry) = self.try_borrow_mut() {
            registry.listeners.retain(|(listener_id, _)| *listener_id != id);
        }
    }
}

/// Result of one [`Emitter::fire`] fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FireOutcome {
    /// Listeners that returned normally.
    pub delivered: usize,
    /// Panic messages of listeners that failed.
    pub failures: Vec<String>,
}

impl FireOutcome {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Source side of a change notification.
pub struct Emitter<T: 'static> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Emitter<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry::new())),
        }
    }

    /// Subscriber-facing handle.
    #[must_use]
    pub fn event(&self) -> Event<T> {
        Event {
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver `value` to every listener, isolating listener panics.
    pub fn fire(&self, value: &T) -> FireOutcome {
        let snapshot: Vec<Listener<T>> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        let mut outcome = FireOutcome::default();
        for listener in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener(value))) {
                Ok(()) => outcome.delivered += 1,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    crate::error!(reason = %message, "event listener panicked");
                    outcome.failures.push(message);
                }
            }
        }
        outcome
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// Drop every listener.
    pub fn clear(&self) {
        self.registry.borrow_mut().listeners.clear();
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<T: 'static> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Subscriber side of a change notification.
pub struct Event<T: 'static> {
    registry: Weak<RefCell<Registry<T>>>,
}

impl<T: 'static> Event<T> {
    /// An event that never fires.
    #[must_use]
    pub fn none() -> Self {
        Self {
            registry: Weak::new(),
        }
    }

    /// Register `listener`; it stays attached until the returned
    /// subscription is dropped or disposed.
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.subscribe_rc(Rc::new(listener))
    }

    /// Register one listener on every event in `events`.
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn any(
        events: impl IntoIterator<Item = Event<T>>,
        listener: impl Fn(&T) + 'static,
    ) -> Subscription {
        let listener: Listener<T> = Rc::new(listener);
        let mut subscription = Subscription::empty();
        for event in events {
            subscription.merge(event.subscribe_rc(Rc::clone(&listener)));
        }
        subscription
    }

    fn subscribe_rc(&self, listener: Listener<T>) -> Subscription {
        let Some(registry) = self.registry.upgrade() else {
            return Subscription::empty();
        };
        let id = {
            let mut inner = registry.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, listener));
            id
        };
        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&registry);
        let detach: Weak<dyn Detach> = weak;
        Subscription {
            entries: vec![(detach, id)],
        }
    }
}

impl<T: 'static> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Weak::clone(&self.registry),
        }
    }
}

impl<T: 'static> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("live", &(self.registry.strong_count() > 0))
            .finish()
    }
}

/// Handle keeping one or more listeners attached.
#[derive(Default)]
pub struct Subscription {
    entries: Vec<(Weak<dyn Detach>, u64)>,
}

impl Subscription {
    /// A subscription holding nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Take over the listeners of `other`.
    pub fn merge(&mut self, mut other: Subscription) {
        self.entries.append(&mut other.entries);
    }

    /// Number of listeners still attached to a live emitter.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(registry, _)| registry.strong_count() > 0)
            .count()
    }

    /// Detach every listener now.
    pub fn dispose(&mut self) {
        for (registry, id) in self.entries.drain(..) {
            if let Some(registry) = registry.upgrade() {
                registry.detach(id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("entries", &self.entries.len())
            .finish()
    }
}
