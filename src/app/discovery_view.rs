// CaseSleuth - app/discovery_view.rs
//
// Discovery composite view: group list on the left, results on the top
// right, details drawer on the bottom right.
//
// Panels never reference each other. They talk over the injected event
// channel:
//   - search progress (polled from the search collaborator) becomes
//     SearchStarted / SearchCompleted / SearchCancelled events;
//   - the group list publishes GroupSelected;
//   - the results panel publishes SelectionChanged and ShowAuxiliaryArea;
//   - the view's router turns ShowAuxiliaryArea into divider transitions.
//
// Lifecycle: on open, the router and the three panels register (four
// subscribers). On close, all four unregister and then the search
// collaborator is cancelled. Both hooks are idempotent.

use crate::app::auxiliary::{AuxState, AuxiliaryArea, SplitContainer, TransitionSettings};
use crate::app::coordinator::{Lifecycle, SubscriptionSet};
use crate::app::search::SearchOperation;
use crate::core::channel::{EventChannel, Subscriber, SubscriberId};
use crate::core::model::{
    EventKind, GroupSummary, ItemRef, SearchCriteria, SearchProgress, SelectionSet, UiEvent,
};
use crate::core::selection::SelectionSource;
use crate::util::error::{CollaboratorError, TransitionError};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

/// Selection source id of the discovery results table.
pub const RESULTS_SOURCE_ID: &str = "discovery.results";

// =============================================================================
// Group list
// =============================================================================

/// Left-hand list of groups produced by the last search.
pub struct GroupListPanel {
    id: SubscriberId,
    channel: Rc<EventChannel<UiEvent>>,
    groups: RefCell<Vec<GroupSummary>>,
    selected: RefCell<Option<String>>,
    searching: Cell<bool>,
}

impl GroupListPanel {
    fn new(channel: Rc<EventChannel<UiEvent>>) -> Self {
        Self {
            id: SubscriberId::next("discovery.group_list"),
            channel,
            groups: RefCell::new(Vec::new()),
            selected: RefCell::new(None),
            searching: Cell::new(false),
        }
    }

    pub fn groups(&self) -> Vec<GroupSummary> {
        self.groups.borrow().clone()
    }

    pub fn selected_key(&self) -> Option<String> {
        self.selected.borrow().clone()
    }

    pub fn is_searching(&self) -> bool {
        self.searching.get()
    }

    /// Select a group by key and announce it.
    pub fn select_group(&self, key: &str) -> Result<(), CollaboratorError> {
        let group = self
            .groups
            .borrow()
            .iter()
            .find(|g| g.key == key)
            .cloned()
            .ok_or_else(|| {
                CollaboratorError::new("group_list", format!("no group with key '{key}'"))
            })?;
        *self.selected.borrow_mut() = Some(group.key.clone());
        self.channel.publish(UiEvent::GroupSelected { group });
        Ok(())
    }

    pub fn reset(&self) {
        self.groups.borrow_mut().clear();
        *self.selected.borrow_mut() = None;
        self.searching.set(false);
    }
}

impl Subscriber<UiEvent> for GroupListPanel {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn accepts(&self, kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::SearchStarted | EventKind::SearchCompleted | EventKind::SearchCancelled
        )
    }

    fn on_event(&self, event: &UiEvent) -> Result<(), CollaboratorError> {
        match event {
            UiEvent::SearchStarted { .. } => {
                self.reset();
                self.searching.set(true);
            }
            UiEvent::SearchCompleted { groups } => {
                *self.groups.borrow_mut() = groups.clone();
                *self.selected.borrow_mut() = None;
                self.searching.set(false);
            }
            UiEvent::SearchCancelled => self.reset(),
            _ => {}
        }
        Ok(())
    }
}

// =============================================================================
// Results
// =============================================================================

/// Records of the selected group; the selection source for the details pane.
pub struct ResultsPanel {
    id: SubscriberId,
    channel: Rc<EventChannel<UiEvent>>,
    group: RefCell<Option<GroupSummary>>,
    selection: RefCell<SelectionSet>,
}

impl ResultsPanel {
    fn new(channel: Rc<EventChannel<UiEvent>>) -> Self {
        Self {
            id: SubscriberId::next("discovery.results"),
            channel,
            group: RefCell::new(None),
            selection: RefCell::new(SelectionSet::empty()),
        }
    }

    pub fn group(&self) -> Option<GroupSummary> {
        self.group.borrow().clone()
    }

    /// Select one record of the displayed group and reveal the details area.
    pub fn select_item(&self, item: &ItemRef) -> Result<(), CollaboratorError> {
        let known = self
            .group
            .borrow()
            .as_ref()
            .is_some_and(|g| g.items.contains(item));
        if !known {
            return Err(CollaboratorError::new(
                "results_panel",
                format!("'{item}' is not in the displayed group"),
            ));
        }
        *self.selection.borrow_mut() = SelectionSet::from_items([item.clone()]);
        self.channel.publish(UiEvent::SelectionChanged {
            selection_id: RESULTS_SOURCE_ID.to_string(),
        });
        self.channel
            .publish(UiEvent::ShowAuxiliaryArea { visible: true });
        Ok(())
    }

    /// Drop the selection and hide the details area.
    pub fn clear_selection(&self) {
        let had_selection = !self.selection.borrow().is_empty();
        *self.selection.borrow_mut() = SelectionSet::empty();
        if had_selection {
            self.channel.publish(UiEvent::SelectionChanged {
                selection_id: RESULTS_SOURCE_ID.to_string(),
            });
            self.channel
                .publish(UiEvent::ShowAuxiliaryArea { visible: false });
        }
    }

    pub fn reset(&self) {
        *self.group.borrow_mut() = None;
        self.clear_selection();
    }
}

impl SelectionSource for ResultsPanel {
    fn source_id(&self) -> &str {
        RESULTS_SOURCE_ID
    }

    fn current_selection(&self) -> SelectionSet {
        self.selection.borrow().clone()
    }
}

impl Subscriber<UiEvent> for ResultsPanel {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn accepts(&self, kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::GroupSelected | EventKind::SearchStarted | EventKind::SearchCancelled
        )
    }

    fn on_event(&self, event: &UiEvent) -> Result<(), CollaboratorError> {
        match event {
            UiEvent::GroupSelected { group } => {
                *self.group.borrow_mut() = Some(group.clone());
                self.clear_selection();
            }
            UiEvent::SearchStarted { .. } | UiEvent::SearchCancelled => self.reset(),
            _ => {}
        }
        Ok(())
    }
}

// =============================================================================
// Details
// =============================================================================

/// Shows the record selected in the results panel.
pub struct DetailsPanel {
    id: SubscriberId,
    results: Weak<dyn SelectionSource>,
    item: RefCell<Option<ItemRef>>,
}

impl DetailsPanel {
    fn new(results: Weak<dyn SelectionSource>) -> Self {
        Self {
            id: SubscriberId::next("discovery.details"),
            results,
            item: RefCell::new(None),
        }
    }

    pub fn item(&self) -> Option<ItemRef> {
        self.item.borrow().clone()
    }
}

impl Subscriber<UiEvent> for DetailsPanel {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn accepts(&self, kind: EventKind) -> bool {
        matches!(kind, EventKind::SelectionChanged | EventKind::SearchStarted)
    }

    fn on_event(&self, event: &UiEvent) -> Result<(), CollaboratorError> {
        match event {
            UiEvent::SelectionChanged { selection_id } if selection_id == RESULTS_SOURCE_ID => {
                let selection = self
                    .results
                    .upgrade()
                    .map(|r| r.current_selection())
                    .unwrap_or_default();
                *self.item.borrow_mut() = selection.first().cloned();
            }
            UiEvent::SearchStarted { .. } => *self.item.borrow_mut() = None,
            _ => {}
        }
        Ok(())
    }
}

// =============================================================================
// View router
// =============================================================================

/// The view's own subscription: routes ShowAuxiliaryArea into the drawer.
struct AuxiliaryRouter {
    id: SubscriberId,
    area: Rc<RefCell<AuxiliaryArea>>,
}

impl Subscriber<UiEvent> for AuxiliaryRouter {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn accepts(&self, kind: EventKind) -> bool {
        kind == EventKind::ShowAuxiliaryArea
    }

    fn on_event(&self, event: &UiEvent) -> Result<(), CollaboratorError> {
        if let UiEvent::ShowAuxiliaryArea { visible } = event {
            let mut area = self.area.try_borrow_mut().map_err(|_| {
                CollaboratorError::new("discovery_view", "details area busy during event delivery")
            })?;
            area.request(*visible);
        }
        Ok(())
    }
}

// =============================================================================
// DiscoveryView
// =============================================================================

pub struct DiscoveryView {
    channel: Rc<EventChannel<UiEvent>>,
    subscriptions: SubscriptionSet,
    group_list: Rc<GroupListPanel>,
    results: Rc<ResultsPanel>,
    details: Rc<DetailsPanel>,
    area: Rc<RefCell<AuxiliaryArea>>,
    search: Box<dyn SearchOperation>,
    open: bool,
}

impl DiscoveryView {
    /// Build the child panels and wire them to `channel`. Nothing is
    /// registered until the view is opened.
    pub fn new(
        channel: Rc<EventChannel<UiEvent>>,
        container: Rc<dyn SplitContainer>,
        settings: TransitionSettings,
        search: Box<dyn SearchOperation>,
    ) -> Self {
        let group_list = Rc::new(GroupListPanel::new(Rc::clone(&channel)));
        let results = Rc::new(ResultsPanel::new(Rc::clone(&channel)));
        let results_source: Rc<dyn SelectionSource> = results.clone();
        let details = Rc::new(DetailsPanel::new(Rc::downgrade(&results_source)));
        let area = Rc::new(RefCell::new(AuxiliaryArea::new(
            container,
            settings,
            AuxState::Hidden,
        )));
        let router = Rc::new(AuxiliaryRouter {
            id: SubscriberId::next("discovery.view"),
            area: Rc::clone(&area),
        });

        let subscriptions = SubscriptionSet::new(
            Rc::clone(&channel),
            vec![router, results.clone(), group_list.clone(), details.clone()],
        );

        Self {
            channel,
            subscriptions,
            group_list,
            results,
            details,
            area,
            search,
            open: false,
        }
    }

    pub fn group_list(&self) -> &GroupListPanel {
        &self.group_list
    }

    pub fn results(&self) -> &ResultsPanel {
        &self.results
    }

    pub fn details(&self) -> &DetailsPanel {
        &self.details
    }

    pub fn channel(&self) -> &Rc<EventChannel<UiEvent>> {
        &self.channel
    }

    pub fn subscriber_ids(&self) -> Vec<SubscriberId> {
        self.subscriptions.member_ids()
    }

    pub fn aux_state(&self) -> AuxState {
        self.area.borrow().state()
    }

    pub fn is_animating(&self) -> bool {
        self.area.borrow().is_animating()
    }

    pub fn transitions_started(&self) -> u64 {
        self.area.borrow().transitions_started()
    }

    pub fn search(&self) -> &dyn SearchOperation {
        self.search.as_ref()
    }

    pub fn start_search(&mut self, criteria: SearchCriteria) {
        self.search.start(criteria);
    }

    pub fn cancel_search(&mut self) {
        self.search.cancel();
    }

    /// Clear the group list and results so the view can host a new search.
    pub fn reset(&self) {
        self.results.reset();
        self.group_list.reset();
    }

    /// Per-frame work: forward search progress onto the channel, then
    /// advance the details transition if one is due.
    pub fn poll(&mut self, now: Instant) -> Result<AuxState, TransitionError> {
        for msg in self.search.poll() {
            let event = match msg {
                SearchProgress::Started { criteria } => UiEvent::SearchStarted { criteria },
                SearchProgress::Completed { groups } => UiEvent::SearchCompleted { groups },
                SearchProgress::Cancelled => UiEvent::SearchCancelled,
                SearchProgress::Failed { error } => {
                    tracing::warn!(error = %error, "Discovery search failed");
                    UiEvent::SearchCancelled
                }
            };
            self.channel.publish(event);
        }
        self.area.borrow_mut().poll(now)
    }

    /// Advance the details transition by one step, ignoring cadence.
    pub fn tick_transition(&mut self) -> Result<AuxState, TransitionError> {
        self.area.borrow_mut().tick()
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.area.borrow().time_until_next_tick(now)
    }
}

impl Lifecycle for DiscoveryView {
    fn on_open(&mut self) {
        let added = self.subscriptions.register_all();
        if self.open {
            tracing::debug!(added, "Discovery view already open");
            return;
        }
        self.open = true;
        tracing::info!(subscribers = added, "Discovery view opened");
    }

    fn on_close(&mut self) {
        if !self.open {
            // A search started on an unopened view must not outlive it.
            if self.search.is_active() {
                self.search.cancel();
            }
            tracing::debug!("Discovery view already closed");
            return;
        }
        let removed = self.subscriptions.unregister_all();
        self.search.cancel();
        self.open = false;
        tracing::info!(unregistered = removed, "Discovery view closed");
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

impl Drop for DiscoveryView {
    fn drop(&mut self) {
        self.on_close();
    }
}
