// CaseSleuth - core/model.rs
//
// Value types passed through the coordination layer. Payloads are opaque:
// the engine routes them by kind and never inspects their contents.

use std::fmt;

// =============================================================================
// Selection
// =============================================================================

/// Opaque reference to one selectable domain record (an account, a case,
/// a discovered file instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemRef(pub String);

impl ItemRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The set of records currently selected within one sub-view.
///
/// Order is preserved as the source reports it. An empty set is the
/// "nothing selected" value; there is no separate `None` state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    items: Vec<ItemRef>,
}

impl SelectionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = ItemRef>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn items(&self) -> &[ItemRef] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&ItemRef> {
        self.items.first()
    }
}

// =============================================================================
// Discovery search payloads
// =============================================================================

/// Criteria handed to the discovery search collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Free-form description of the attribute grouping (e.g. "file size").
    pub group_by: String,
    /// Filter clauses, opaque to the engine.
    pub filters: Vec<String>,
}

/// One group produced by a discovery search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    /// Stable key identifying the group.
    pub key: String,
    /// Records in the group, in display order.
    pub items: Vec<ItemRef>,
}

impl GroupSummary {
    pub fn size(&self) -> usize {
        self.items.len()
    }
}

// =============================================================================
// Events
// =============================================================================

/// Cross-cutting UI events exchanged between independently-built panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The contents of the selection source `selection_id` changed.
    SelectionChanged { selection_id: String },

    /// Show or hide the auxiliary (details) area.
    ShowAuxiliaryArea { visible: bool },

    /// Pin a record into the secondary (visualisation) view.
    PinToSecondaryView { item: ItemRef },

    /// The communications filters pane applied a new filter.
    FiltersChanged { filter: String },

    /// A discovery search was started.
    SearchStarted { criteria: SearchCriteria },

    /// A discovery search finished and produced these groups.
    SearchCompleted { groups: Vec<GroupSummary> },

    /// A discovery search was cancelled before completion.
    SearchCancelled,

    /// A group was chosen in the discovery group list.
    GroupSelected { group: GroupSummary },
}

/// Routing key for [`UiEvent`]. Subscribers filter on this, never on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SelectionChanged,
    ShowAuxiliaryArea,
    PinToSecondaryView,
    FiltersChanged,
    SearchStarted,
    SearchCompleted,
    SearchCancelled,
    GroupSelected,
}

/// A payload type that can be routed through an event channel.
pub trait Event {
    type Kind: Copy + Eq + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

impl Event for UiEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            Self::SelectionChanged { .. } => EventKind::SelectionChanged,
            Self::ShowAuxiliaryArea { .. } => EventKind::ShowAuxiliaryArea,
            Self::PinToSecondaryView { .. } => EventKind::PinToSecondaryView,
            Self::FiltersChanged { .. } => EventKind::FiltersChanged,
            Self::SearchStarted { .. } => EventKind::SearchStarted,
            Self::SearchCompleted { .. } => EventKind::SearchCompleted,
            Self::SearchCancelled => EventKind::SearchCancelled,
            Self::GroupSelected { .. } => EventKind::GroupSelected,
        }
    }
}

/// Progress messages sent from a background search to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchProgress {
    Started { criteria: SearchCriteria },
    Completed { groups: Vec<GroupSummary> },
    Cancelled,
    Failed { error: String },
}
