// CaseSleuth - core/channel.rs
//
// Typed publish/subscribe bus with explicit register/unregister lifecycle.
//
// Architecture:
//   - A channel is an ordinary value: each composite view receives an
//     `Rc<EventChannel<_>>` at construction. There is no global instance.
//   - Subscribers are held weakly. The channel never keeps a panel alive,
//     and a panel dropped without unregistering is pruned on the next publish.
//   - Registration uses set semantics keyed by `SubscriberId`; unregister is
//     idempotent so every teardown path may call it.
//   - Delivery is synchronous and in registration order. A publish issued
//     from inside a handler is queued and delivered after the current event
//     has reached every subscriber (FIFO, no interleaving).
//   - A failing handler is logged and recorded; delivery continues to the
//     remaining subscribers.
//
// All state uses `Cell`/`RefCell`, so a channel is `!Send` and confined to
// the UI thread by the type system.

use crate::core::model::Event;
use crate::util::constants;
use crate::util::error::CollaboratorError;
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId {
    raw: u64,
    label: &'static str,
}

impl SubscriberId {
    /// Allocate a process-unique id. `label` only appears in logs.
    pub fn next(label: &'static str) -> Self {
        Self {
            raw: NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed),
            label,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.label, self.raw)
    }
}

/// A listener that can be registered on an [`EventChannel`].
///
/// Handlers take `&self`: subscribers keep their mutable state behind
/// `Cell`/`RefCell` because the channel only holds a shared reference.
pub trait Subscriber<E: Event> {
    fn subscriber_id(&self) -> SubscriberId;

    /// Event-kind filter. Defaults to every kind.
    fn accepts(&self, kind: E::Kind) -> bool {
        let _ = kind;
        true
    }

    fn on_event(&self, event: &E) -> Result<(), CollaboratorError>;
}

/// One isolated handler failure, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberFailure {
    pub subscriber: SubscriberId,
    /// Debug rendering of the event kind being delivered.
    pub kind: String,
    pub error: CollaboratorError,
    pub at: DateTime<Utc>,
}

struct Registration<E: Event> {
    id: SubscriberId,
    subscriber: Weak<dyn Subscriber<E>>,
}

/// Resets the dispatching flag even if a handler panics.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Publish/subscribe bus for one family of events.
pub struct EventChannel<E: Event + 'static> {
    name: &'static str,
    registrations: RefCell<Vec<Registration<E>>>,
    queue: RefCell<VecDeque<E>>,
    dispatching: Cell<bool>,
    failures: RefCell<VecDeque<SubscriberFailure>>,
    max_failures: usize,
}

impl<E: Event + 'static> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("name", &self.name)
            .field("subscribers", &self.registrations.borrow().len())
            .field("queued", &self.queue.borrow().len())
            .field("failures", &self.failures.borrow().len())
            .finish()
    }
}

impl<E: Event + 'static> EventChannel<E> {
    pub fn new(name: &'static str) -> Self {
        Self::with_failure_limit(name, constants::DEFAULT_MAX_RECORDED_FAILURES)
    }

    /// Create a channel that retains at most `max_failures` failure records.
    pub fn with_failure_limit(name: &'static str, max_failures: usize) -> Self {
        Self {
            name,
            registrations: RefCell::new(Vec::new()),
            queue: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
            failures: RefCell::new(VecDeque::new()),
            max_failures,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a subscriber. Returns `false` if its id is already registered
    /// (the existing registration is kept; delivery is never duplicated).
    pub fn register(&self, subscriber: Rc<dyn Subscriber<E>>) -> bool {
        let id = subscriber.subscriber_id();
        let mut regs = self.registrations.borrow_mut();

        if let Some(existing) = regs.iter_mut().find(|r| r.id == id) {
            if existing.subscriber.strong_count() > 0 {
                tracing::trace!(channel = self.name, subscriber = %id, "Already registered");
                return false;
            }
            // Same id, previous instance already dropped: adopt the new one.
            existing.subscriber = Rc::downgrade(&subscriber);
            return true;
        }

        regs.push(Registration {
            id,
            subscriber: Rc::downgrade(&subscriber),
        });
        tracing::debug!(
            channel = self.name,
            subscriber = %id,
            total = regs.len(),
            "Subscriber registered"
        );
        true
    }

    /// Remove a subscriber. Returns `false` (and does nothing) if it was not
    /// registered.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let mut regs = self.registrations.borrow_mut();
        let before = regs.len();
        regs.retain(|r| r.id != id);
        let removed = regs.len() != before;
        if removed {
            tracing::debug!(channel = self.name, subscriber = %id, "Subscriber unregistered");
        } else {
            tracing::trace!(channel = self.name, subscriber = %id, "Unregister of unknown subscriber ignored");
        }
        removed
    }

    pub fn is_registered(&self, id: SubscriberId) -> bool {
        self.registrations.borrow().iter().any(|r| r.id == id)
    }

    /// Number of registrations whose subscriber is still alive.
    pub fn subscriber_count(&self) -> usize {
        self.registrations
            .borrow()
            .iter()
            .filter(|r| r.subscriber.strong_count() > 0)
            .count()
    }

    /// Deliver `event` to every matching subscriber.
    ///
    /// When called from inside a handler the event is queued and delivered
    /// once the outer publish has finished the current event.
    pub fn publish(&self, event: E) {
        self.queue.borrow_mut().push_back(event);
        if self.dispatching.get() {
            tracing::trace!(channel = self.name, "Re-entrant publish queued");
            return;
        }

        self.dispatching.set(true);
        let _guard = DispatchGuard(&self.dispatching);

        loop {
            let next = self.queue.borrow_mut().pop_front();
            match next {
                Some(event) => self.deliver(&event),
                None => break,
            }
        }
    }

    /// Failures recorded so far, oldest first.
    pub fn failures(&self) -> Vec<SubscriberFailure> {
        self.failures.borrow().iter().cloned().collect()
    }

    pub fn clear_failures(&self) {
        self.failures.borrow_mut().clear();
    }

    fn deliver(&self, event: &E) {
        let kind = event.kind();

        // Snapshot so handlers may register/unregister while we iterate.
        let snapshot: Vec<(SubscriberId, Weak<dyn Subscriber<E>>)> = {
            let mut regs = self.registrations.borrow_mut();
            regs.retain(|r| {
                let alive = r.subscriber.strong_count() > 0;
                if !alive {
                    tracing::debug!(channel = self.name, subscriber = %r.id, "Pruned dropped subscriber");
                }
                alive
            });
            regs.iter()
                .map(|r| (r.id, Weak::clone(&r.subscriber)))
                .collect()
        };

        tracing::trace!(channel = self.name, kind = ?kind, candidates = snapshot.len(), "Publishing");

        for (id, weak) in snapshot {
            if !self.is_registered(id) {
                continue;
            }
            let Some(subscriber) = weak.upgrade() else {
                continue;
            };
            if !subscriber.accepts(kind) {
                continue;
            }
            if let Err(error) = subscriber.on_event(event) {
                self.record_failure(id, kind, error);
            }
        }
    }

    fn record_failure(&self, subscriber: SubscriberId, kind: E::Kind, error: CollaboratorError) {
        tracing::warn!(
            channel = self.name,
            subscriber = %subscriber,
            kind = ?kind,
            error = %error,
            "Subscriber failed while handling event; continuing delivery"
        );
        if self.max_failures == 0 {
            return;
        }
        let mut failures = self.failures.borrow_mut();
        while failures.len() >= self.max_failures {
            failures.pop_front();
        }
        failures.push_back(SubscriberFailure {
            subscriber,
            kind: format!("{kind:?}"),
            error,
            at: Utc::now(),
        });
    }
}
