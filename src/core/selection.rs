// CaseSleuth - core/selection.rs
//
// Redirectable selection source. A composite view exposes one proxy to
// selection-sensitive consumers; the proxy follows whichever child view is
// active.
//
// The proxy never owns a source. It keeps a `Weak` handle so panels can be
// closed independently; a dropped source reads as an empty selection.

use crate::core::model::SelectionSet;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Anything exposing a live selection (a table, a graph view, a case list).
pub trait SelectionSource {
    /// Identity used to route change notifications to the right proxy slot.
    fn source_id(&self) -> &str;

    /// The selection as it is right now. Never cached by the proxy.
    fn current_selection(&self) -> SelectionSet;
}

/// Handle returned by [`SelectionProxy::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Rc<RefCell<dyn FnMut(&SelectionSet)>>;

#[derive(Clone)]
struct ActiveSource {
    id: String,
    source: Weak<dyn SelectionSource>,
}

impl ActiveSource {
    fn of(source: &Rc<dyn SelectionSource>) -> Self {
        Self {
            id: source.source_id().to_string(),
            source: Rc::downgrade(source),
        }
    }
}

/// Aggregate selection that always reflects exactly one active source.
///
/// All operations take `&self`. No internal borrow is held while observers
/// run, so an observer may read the proxy, retarget it, or add and remove
/// observers. An observer already running is not re-entered by a nested
/// broadcast.
pub struct SelectionProxy {
    name: &'static str,
    active: RefCell<ActiveSource>,
    observers: RefCell<Vec<(ObserverId, Observer)>>,
    next_observer: Cell<u64>,
}

impl fmt::Debug for SelectionProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionProxy")
            .field("name", &self.name)
            .field("active", &self.active.borrow().id)
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

impl SelectionProxy {
    /// Create a proxy pointed at `initial`. There is no "no source" state.
    pub fn new(name: &'static str, initial: &Rc<dyn SelectionSource>) -> Self {
        Self {
            name,
            active: RefCell::new(ActiveSource::of(initial)),
            observers: RefCell::new(Vec::new()),
            next_observer: Cell::new(0),
        }
    }

    /// Swap the active source and notify observers once with its selection.
    ///
    /// The swap is a single assignment; observers never see an intermediate
    /// empty state or the previous source's selection.
    pub fn retarget(&self, source: &Rc<dyn SelectionSource>) {
        let next = ActiveSource::of(source);
        let to = next.id.clone();
        let previous = self.active.replace(next);
        let selection = self.current();
        tracing::debug!(
            proxy = self.name,
            from = %previous.id,
            to = %to,
            selected = selection.len(),
            "Selection proxy retargeted"
        );
        self.notify(&selection);
    }

    /// Live selection of the active source; empty if that source is gone.
    pub fn current(&self) -> SelectionSet {
        let active = self.active.borrow().clone();
        match active.source.upgrade() {
            Some(source) => source.current_selection(),
            None => {
                tracing::debug!(
                    proxy = self.name,
                    source = %active.id,
                    "Active selection source dropped; reporting empty selection"
                );
                SelectionSet::empty()
            }
        }
    }

    pub fn active_source_id(&self) -> String {
        self.active.borrow().id.clone()
    }

    /// Whether the active source is still alive.
    pub fn is_live(&self) -> bool {
        self.active.borrow().source.strong_count() > 0
    }

    /// Re-broadcast if `source_id` is the active source. Changes in inactive
    /// sources are ignored. Returns whether observers were notified.
    pub fn source_changed(&self, source_id: &str) -> bool {
        if source_id != self.active.borrow().id {
            tracing::trace!(proxy = self.name, source = source_id, "Ignoring inactive source change");
            return false;
        }
        let selection = self.current();
        self.notify(&selection);
        true
    }

    /// Register a callback receiving every selection the proxy broadcasts.
    pub fn observe<F>(&self, observer: F) -> ObserverId
    where
        F: FnMut(&SelectionSet) + 'static,
    {
        let id = ObserverId(self.next_observer.get() + 1);
        self.next_observer.set(id.0);
        let observer: Observer = Rc::new(RefCell::new(observer));
        self.observers.borrow_mut().push((id, observer));
        id
    }

    /// Remove an observer. Unknown ids are ignored.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(oid, _)| *oid != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    fn notify(&self, selection: &SelectionSet) {
        let snapshot: Vec<(ObserverId, Observer)> = self.observers.borrow().clone();
        for (id, observer) in snapshot {
            // Removed by an earlier observer in this round.
            if !self.observers.borrow().iter().any(|(oid, _)| *oid == id) {
                continue;
            }
            match observer.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(selection),
                Err(_) => tracing::debug!(
                    proxy = self.name,
                    observer = id.0,
                    "Observer already running; skipping nested broadcast"
                ),
            }
        }
    }
}
