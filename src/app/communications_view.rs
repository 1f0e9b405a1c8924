// CaseSleuth - app/communications_view.rs
//
// Communications view: an accounts browser tab and a visualisation tab,
// with a filters pane shared by both.
//
// The view exposes a single SelectionProxy that follows the active tab, so
// consumers (details viewers, context actions) never need to know which tab
// is showing. Pinning a record from the browser switches straight to the
// visualisation tab.

use crate::app::coordinator::{Lifecycle, SubscriptionSet};
use crate::core::channel::{EventChannel, Subscriber, SubscriberId};
use crate::core::model::{EventKind, ItemRef, SelectionSet, UiEvent};
use crate::core::selection::{ObserverId, SelectionProxy, SelectionSource};
use crate::util::error::CollaboratorError;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub const ACCOUNTS_SOURCE_ID: &str = "cvt.accounts_browser";
pub const VISUALIZATION_SOURCE_ID: &str = "cvt.visualization";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvtTab {
    Browse,
    Visualize,
}

impl CvtTab {
    pub fn label(self) -> &'static str {
        match self {
            Self::Browse => "Browse",
            Self::Visualize => "Visualize",
        }
    }
}

// =============================================================================
// Accounts browser
// =============================================================================

pub struct AccountsBrowser {
    id: SubscriberId,
    channel: Rc<EventChannel<UiEvent>>,
    accounts: RefCell<Vec<ItemRef>>,
    filter: RefCell<String>,
    selection: RefCell<SelectionSet>,
}

impl AccountsBrowser {
    fn new(channel: Rc<EventChannel<UiEvent>>) -> Self {
        Self {
            id: SubscriberId::next("cvt.accounts_browser"),
            channel,
            accounts: RefCell::new(Vec::new()),
            filter: RefCell::new(String::new()),
            selection: RefCell::new(SelectionSet::empty()),
        }
    }

    pub fn set_accounts(&self, accounts: Vec<ItemRef>) {
        *self.accounts.borrow_mut() = accounts;
    }

    pub fn filter(&self) -> String {
        self.filter.borrow().clone()
    }

    /// Accounts matching the last applied filter (case-insensitive substring).
    pub fn visible_accounts(&self) -> Vec<ItemRef> {
        let needle = self.filter.borrow().to_lowercase();
        self.accounts
            .borrow()
            .iter()
            .filter(|a| needle.is_empty() || a.as_str().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Replace the selection and announce the change.
    pub fn select(&self, items: Vec<ItemRef>) {
        *self.selection.borrow_mut() = SelectionSet::from_items(items);
        self.channel.publish(UiEvent::SelectionChanged {
            selection_id: ACCOUNTS_SOURCE_ID.to_string(),
        });
    }

    /// Pin every selected account into the visualisation. Returns how many
    /// pin requests were published.
    pub fn pin_selected(&self) -> usize {
        let selection = self.selection.borrow().clone();
        for item in selection.items() {
            self.channel
                .publish(UiEvent::PinToSecondaryView { item: item.clone() });
        }
        selection.len()
    }
}

impl SelectionSource for AccountsBrowser {
    fn source_id(&self) -> &str {
        ACCOUNTS_SOURCE_ID
    }

    fn current_selection(&self) -> SelectionSet {
        self.selection.borrow().clone()
    }
}

impl Subscriber<UiEvent> for AccountsBrowser {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn accepts(&self, kind: EventKind) -> bool {
        kind == EventKind::FiltersChanged
    }

    fn on_event(&self, event: &UiEvent) -> Result<(), CollaboratorError> {
        if let UiEvent::FiltersChanged { filter } = event {
            *self.filter.borrow_mut() = filter.clone();
        }
        Ok(())
    }
}

// =============================================================================
// Visualisation panel
// =============================================================================

pub struct VisualizationPanel {
    id: SubscriberId,
    channel: Rc<EventChannel<UiEvent>>,
    pinned: RefCell<Vec<ItemRef>>,
    filter: RefCell<String>,
    selection: RefCell<SelectionSet>,
}

impl VisualizationPanel {
    fn new(channel: Rc<EventChannel<UiEvent>>) -> Self {
        Self {
            id: SubscriberId::next("cvt.visualization"),
            channel,
            pinned: RefCell::new(Vec::new()),
            filter: RefCell::new(String::new()),
            selection: RefCell::new(SelectionSet::empty()),
        }
    }

    pub fn pinned(&self) -> Vec<ItemRef> {
        self.pinned.borrow().clone()
    }

    pub fn filter(&self) -> String {
        self.filter.borrow().clone()
    }

    pub fn select(&self, items: Vec<ItemRef>) {
        *self.selection.borrow_mut() = SelectionSet::from_items(items);
        self.channel.publish(UiEvent::SelectionChanged {
            selection_id: VISUALIZATION_SOURCE_ID.to_string(),
        });
    }

    /// Remove every pinned record and clear the selection.
    pub fn clear(&self) {
        self.pinned.borrow_mut().clear();
        self.select(Vec::new());
    }
}

impl SelectionSource for VisualizationPanel {
    fn source_id(&self) -> &str {
        VISUALIZATION_SOURCE_ID
    }

    fn current_selection(&self) -> SelectionSet {
        self.selection.borrow().clone()
    }
}

impl Subscriber<UiEvent> for VisualizationPanel {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn accepts(&self, kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::PinToSecondaryView | EventKind::FiltersChanged
        )
    }

    fn on_event(&self, event: &UiEvent) -> Result<(), CollaboratorError> {
        match event {
            UiEvent::PinToSecondaryView { item } => {
                let mut pinned = self.pinned.borrow_mut();
                if !pinned.contains(item) {
                    pinned.push(item.clone());
                }
            }
            UiEvent::FiltersChanged { filter } => *self.filter.borrow_mut() = filter.clone(),
            _ => {}
        }
        Ok(())
    }
}

// =============================================================================
// Filters pane
// =============================================================================

/// Edits a filter and publishes it on apply. Holds no subscription.
pub struct FiltersPane {
    channel: Rc<EventChannel<UiEvent>>,
    filter: RefCell<String>,
    applied: Cell<u32>,
}

impl FiltersPane {
    fn new(channel: Rc<EventChannel<UiEvent>>) -> Self {
        Self {
            channel,
            filter: RefCell::new(String::new()),
            applied: Cell::new(0),
        }
    }

    pub fn set_filter(&self, filter: impl Into<String>) {
        *self.filter.borrow_mut() = filter.into();
    }

    pub fn filter(&self) -> String {
        self.filter.borrow().clone()
    }

    /// How many times the filter has been applied.
    pub fn applied_count(&self) -> u32 {
        self.applied.get()
    }

    pub fn apply(&self) {
        let filter = self.filter();
        self.applied.set(self.applied.get() + 1);
        tracing::debug!(filter = %filter, "Communications filters applied");
        self.channel.publish(UiEvent::FiltersChanged { filter });
    }
}

// =============================================================================
// View router
// =============================================================================

/// The view's own subscription: tracks the active tab and keeps the proxy
/// in step with it.
struct CvtRouter {
    id: SubscriberId,
    tab: Cell<CvtTab>,
    proxy: SelectionProxy,
    browser: Rc<dyn SelectionSource>,
    visualization: Rc<dyn SelectionSource>,
}

impl CvtRouter {
    fn source_for(&self, tab: CvtTab) -> &Rc<dyn SelectionSource> {
        match tab {
            CvtTab::Browse => &self.browser,
            CvtTab::Visualize => &self.visualization,
        }
    }

    fn select_tab(&self, tab: CvtTab) -> Result<bool, CollaboratorError> {
        if self.tab.get() == tab {
            return Ok(false);
        }
        self.tab.set(tab);
        tracing::debug!(tab = tab.label(), "Communications tab selected");
        self.proxy.retarget(self.source_for(tab));
        Ok(true)
    }
}

impl Subscriber<UiEvent> for CvtRouter {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn accepts(&self, kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::PinToSecondaryView | EventKind::SelectionChanged
        )
    }

    fn on_event(&self, event: &UiEvent) -> Result<(), CollaboratorError> {
        match event {
            UiEvent::PinToSecondaryView { .. } => {
                self.select_tab(CvtTab::Visualize)?;
            }
            UiEvent::SelectionChanged { selection_id } => {
                self.proxy.source_changed(selection_id);
            }
            _ => {}
        }
        Ok(())
    }
}

// =============================================================================
// CommunicationsView
// =============================================================================

pub struct CommunicationsView {
    subscriptions: SubscriptionSet,
    router: Rc<CvtRouter>,
    browser: Rc<AccountsBrowser>,
    visualization: Rc<VisualizationPanel>,
    filters: FiltersPane,
    open: bool,
}

impl CommunicationsView {
    pub fn new(channel: Rc<EventChannel<UiEvent>>) -> Self {
        let browser = Rc::new(AccountsBrowser::new(Rc::clone(&channel)));
        let visualization = Rc::new(VisualizationPanel::new(Rc::clone(&channel)));
        let browser_source: Rc<dyn SelectionSource> = browser.clone();
        let visualization_source: Rc<dyn SelectionSource> = visualization.clone();

        let router = Rc::new(CvtRouter {
            id: SubscriberId::next("cvt.view"),
            tab: Cell::new(CvtTab::Browse),
            proxy: SelectionProxy::new("communications", &browser_source),
            browser: browser_source,
            visualization: visualization_source,
        });

        let members: Vec<Rc<dyn Subscriber<UiEvent>>> =
            vec![router.clone(), visualization.clone(), browser.clone()];
        let subscriptions = SubscriptionSet::new(Rc::clone(&channel), members);

        Self {
            subscriptions,
            router,
            browser,
            visualization,
            filters: FiltersPane::new(channel),
            open: false,
        }
    }

    pub fn browser(&self) -> &AccountsBrowser {
        &self.browser
    }

    pub fn visualization(&self) -> &VisualizationPanel {
        &self.visualization
    }

    pub fn filters(&self) -> &FiltersPane {
        &self.filters
    }

    pub fn subscriber_ids(&self) -> Vec<SubscriberId> {
        self.subscriptions.member_ids()
    }

    pub fn active_tab(&self) -> CvtTab {
        self.router.tab.get()
    }

    /// Switch tabs and point the selection proxy at the new tab's source.
    /// Selecting the tab already showing does nothing.
    pub fn select_tab(&self, tab: CvtTab) -> Result<bool, CollaboratorError> {
        self.router.select_tab(tab)
    }

    /// Selection of whichever tab is active.
    pub fn selection(&self) -> SelectionSet {
        self.router.proxy.current()
    }

    pub fn active_source_id(&self) -> String {
        self.router.proxy.active_source_id()
    }

    pub fn observe_selection<F>(&self, observer: F) -> ObserverId
    where
        F: FnMut(&SelectionSet) + 'static,
    {
        self.router.proxy.observe(observer)
    }

    pub fn unobserve_selection(&self, id: ObserverId) -> bool {
        self.router.proxy.unobserve(id)
    }
}

impl Lifecycle for CommunicationsView {
    fn on_open(&mut self) {
        if self.open {
            return;
        }
        let added = self.subscriptions.register_all();
        self.open = true;
        // Push the initial filter to both tabs.
        self.filters.apply();
        tracing::info!(subscribers = added, "Communications view opened");
    }

    fn on_close(&mut self) {
        if !self.open {
            return;
        }
        let removed = self.subscriptions.unregister_all();
        self.open = false;
        tracing::info!(unregistered = removed, "Communications view closed");
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

impl Drop for CommunicationsView {
    fn drop(&mut self) {
        self.on_close();
    }
}
