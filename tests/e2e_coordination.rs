// CaseSleuth - tests/e2e_coordination.rs
//
// End-to-end tests for panel coordination.
//
// These tests wire the real event channel, real views, real transition
// drivers and the real background search thread together, with only the
// split container and the search job supplied by the test. They cover the
// user-visible behaviour: selection follows the active tab, the details
// drawer animates without fighting itself, and closing a view leaves nothing
// registered or running.

use casesleuth::app::auxiliary::{AuxState, AuxiliaryArea, SplitContainer, TransitionSettings};
use casesleuth::app::case_select::{CaseListing, CaseSelectionPanel};
use casesleuth::app::communications_view::{
    CommunicationsView, CvtTab, ACCOUNTS_SOURCE_ID, VISUALIZATION_SOURCE_ID,
};
use casesleuth::app::coordinator::Lifecycle;
use casesleuth::app::discovery_view::DiscoveryView;
use casesleuth::app::search::{BackgroundSearch, SearchJob, SearchOperation};
use casesleuth::core::channel::{EventChannel, Subscriber, SubscriberId};
use casesleuth::core::model::{
    EventKind, GroupSummary, ItemRef, SearchCriteria, SelectionSet, UiEvent,
};
use casesleuth::core::selection::{SelectionProxy, SelectionSource};
use casesleuth::core::transition::{Bounds, Direction, TickOutcome, TransitionDriver, TransitionSlot};
use casesleuth::ui::panels::split::EguiSplit;
use casesleuth::util::error::CollaboratorError;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

// =============================================================================
// Helpers
// =============================================================================

fn settings() -> TransitionSettings {
    TransitionSettings {
        step_size: 10,
        tick_interval: Duration::from_millis(16),
        shown_position: 250,
    }
}

fn items(ids: &[&str]) -> Vec<ItemRef> {
    ids.iter().map(|s| ItemRef::new(*s)).collect()
}

struct StaticSource {
    id: String,
    selection: SelectionSet,
}

impl SelectionSource for StaticSource {
    fn source_id(&self) -> &str {
        &self.id
    }

    fn current_selection(&self) -> SelectionSet {
        self.selection.clone()
    }
}

struct Tally {
    id: SubscriberId,
    seen: Cell<u32>,
}

impl Subscriber<UiEvent> for Tally {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn on_event(&self, _event: &UiEvent) -> Result<(), CollaboratorError> {
        self.seen.set(self.seen.get() + 1);
        Ok(())
    }
}

/// Search collaborator that only counts calls.
#[derive(Default)]
struct CountingSearch {
    starts: Rc<Cell<u32>>,
    cancels: Rc<Cell<u32>>,
    active: bool,
}

impl SearchOperation for CountingSearch {
    fn start(&mut self, _criteria: SearchCriteria) {
        self.starts.set(self.starts.get() + 1);
        self.active = true;
    }

    fn cancel(&mut self) {
        self.cancels.set(self.cancels.get() + 1);
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

// =============================================================================
// Selection proxy
// =============================================================================

#[test]
fn e2e_proxy_reports_latest_retarget() {
    let sources: Vec<Rc<dyn SelectionSource>> = (0..5)
        .map(|n| {
            Rc::new(StaticSource {
                id: format!("source-{n}"),
                selection: SelectionSet::from_items(items(&["x"; 3][..n % 3 + 1])),
            }) as Rc<dyn SelectionSource>
        })
        .collect();
    let proxy = SelectionProxy::new("e2e", &sources[0]);

    for source in &sources {
        proxy.retarget(source);
        assert_eq!(proxy.current(), source.current_selection());
    }
    assert_eq!(proxy.active_source_id(), "source-4");
}

// =============================================================================
// Event channel
// =============================================================================

#[test]
fn e2e_double_register_delivers_once() {
    let channel: EventChannel<UiEvent> = EventChannel::new("e2e");
    let tally = Rc::new(Tally {
        id: SubscriberId::next("tally"),
        seen: Cell::new(0),
    });

    assert!(channel.register(tally.clone()));
    assert!(!channel.register(tally.clone()));
    channel.publish(UiEvent::ShowAuxiliaryArea { visible: true });

    assert_eq!(tally.seen.get(), 1);
}

#[test]
fn e2e_unregister_unknown_is_noop() {
    let channel: EventChannel<UiEvent> = EventChannel::new("e2e");
    let tally = Rc::new(Tally {
        id: SubscriberId::next("tally"),
        seen: Cell::new(0),
    });
    channel.register(tally.clone());

    assert!(!channel.unregister(SubscriberId::next("never-registered")));
    assert_eq!(channel.subscriber_count(), 1);
    channel.publish(UiEvent::SearchCancelled);
    assert_eq!(tally.seen.get(), 1);
}

// =============================================================================
// Transitions
// =============================================================================

#[test]
fn e2e_driver_visits_expected_positions() {
    let visited = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&visited);
    let mut driver = TransitionDriver::new(Bounds::new(0, 100), 60, 10, Duration::from_millis(16));
    driver.start(
        Direction::Increasing,
        move |p: i32| {
            sink.borrow_mut().push(p);
            Ok(())
        },
        |p| p >= 100,
    );

    let mut outcomes = Vec::new();
    while driver.is_running() {
        outcomes.push(driver.tick().unwrap());
    }

    assert_eq!(*visited.borrow(), vec![70, 80, 90, 100]);
    assert_eq!(outcomes.last(), Some(&TickOutcome::Finished(100)));
}

#[test]
fn e2e_reverse_transition_halts_previous() {
    let visited = Rc::new(RefCell::new(Vec::new()));
    let mut slot = TransitionSlot::new();

    let sink = Rc::clone(&visited);
    slot.start(
        TransitionDriver::new(Bounds::new(0, 100), 50, 10, Duration::from_millis(16)),
        Direction::Increasing,
        move |p: i32| {
            sink.borrow_mut().push(p);
            Ok(())
        },
        |p| p >= 100,
    );
    slot.tick().unwrap();

    let sink = Rc::clone(&visited);
    let from = slot.driver().map(|d| d.position()).unwrap_or_default();
    slot.start(
        TransitionDriver::new(Bounds::new(0, 100), from, 10, Duration::from_millis(16)),
        Direction::Decreasing,
        move |p: i32| {
            sink.borrow_mut().push(p);
            Ok(())
        },
        |p| p <= 0,
    );
    slot.tick().unwrap();
    slot.tick().unwrap();

    assert_eq!(*visited.borrow(), vec![60, 50, 40]);
    assert_eq!(slot.generation(), 2);
}

#[test]
fn e2e_hide_then_show_ends_shown() {
    let split = Rc::new(EguiSplit::new(400));
    split.set_divider_location(250).unwrap();
    let mut area = AuxiliaryArea::new(split.clone(), settings(), AuxState::Shown);

    area.request(false);
    area.tick().unwrap();
    area.request(true);

    let mut guard = 0;
    while area.is_animating() && guard < 100 {
        area.tick().unwrap();
        guard += 1;
    }

    assert_eq!(area.state(), AuxState::Shown);
    assert_eq!(split.divider_location(), 250);
    assert_eq!(area.transitions_started(), 2);
}

#[test]
fn e2e_poll_respects_tick_interval() {
    let split = Rc::new(EguiSplit::new(300));
    let mut area = AuxiliaryArea::new(split.clone(), settings(), AuxState::Hidden);
    area.request(true);

    let t0 = Instant::now();
    area.poll(t0).unwrap();
    area.poll(t0 + Duration::from_millis(5)).unwrap();
    let before = split.divider_location();
    area.poll(t0 + Duration::from_millis(20)).unwrap();

    assert!(split.divider_location() < before);
}

// =============================================================================
// Discovery view
// =============================================================================

#[test]
fn e2e_close_cancels_search_once_and_unregisters_all() {
    let channel = Rc::new(EventChannel::new("e2e"));
    let search = CountingSearch::default();
    let cancels = Rc::clone(&search.cancels);
    let mut view = DiscoveryView::new(
        Rc::clone(&channel),
        Rc::new(EguiSplit::new(400)),
        settings(),
        Box::new(search),
    );
    view.on_open();
    view.start_search(SearchCriteria::default());
    assert_eq!(channel.subscriber_count(), 4);

    // Some children torn down first by another path.
    let ids = view.subscriber_ids();
    channel.unregister(ids[3]);
    channel.unregister(ids[1]);

    view.on_close();
    view.on_close();
    drop(view);

    assert_eq!(cancels.get(), 1);
    assert_eq!(channel.subscriber_count(), 0);
}

#[test]
fn e2e_dropping_unopened_view_cancels_running_search() {
    let channel = Rc::new(EventChannel::new("e2e"));
    let search = CountingSearch::default();
    let cancels = Rc::clone(&search.cancels);
    let mut view = DiscoveryView::new(
        Rc::clone(&channel),
        Rc::new(EguiSplit::new(400)),
        settings(),
        Box::new(search),
    );
    view.start_search(SearchCriteria::default());
    assert!(view.search().is_active());

    drop(view);

    assert_eq!(cancels.get(), 1);
    assert_eq!(channel.subscriber_count(), 0);
}

#[test]
fn e2e_background_search_populates_discovery() {
    let job: SearchJob = Arc::new(
        |criteria: &SearchCriteria, _cancel: &AtomicBool| -> Result<Vec<GroupSummary>, String> {
            Ok(vec![GroupSummary {
                key: criteria.group_by.clone(),
                items: vec![ItemRef::new("/evidence/a.jpg"), ItemRef::new("/evidence/b.jpg")],
            }])
        },
    );
    let channel = Rc::new(EventChannel::new("e2e"));
    let split = Rc::new(EguiSplit::new(400));
    let mut view = DiscoveryView::new(
        Rc::clone(&channel),
        split.clone(),
        settings(),
        Box::new(BackgroundSearch::new(job)),
    );
    view.on_open();
    view.start_search(SearchCriteria {
        group_by: "file type".to_string(),
        filters: Vec::new(),
    });

    let deadline = Instant::now() + Duration::from_secs(5);
    while view.group_list().groups().is_empty() && Instant::now() < deadline {
        view.poll(Instant::now()).unwrap();
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(view.group_list().groups().len(), 1);
    assert!(!view.search().is_active());

    view.group_list().select_group("file type").unwrap();
    view.results()
        .select_item(&ItemRef::new("/evidence/b.jpg"))
        .unwrap();
    assert_eq!(view.details().item(), Some(ItemRef::new("/evidence/b.jpg")));

    while view.is_animating() {
        view.tick_transition().unwrap();
    }
    assert_eq!(view.aux_state(), AuxState::Shown);
    assert_eq!(split.divider_location(), 250);

    view.results().clear_selection();
    while view.is_animating() {
        view.tick_transition().unwrap();
    }
    assert_eq!(view.aux_state(), AuxState::Hidden);
    assert_eq!(split.divider_location(), 400);
}

// =============================================================================
// Communications view
// =============================================================================

#[test]
fn e2e_pin_switches_to_visualization_and_proxy_follows() {
    let channel = Rc::new(EventChannel::new("e2e"));
    let mut view = CommunicationsView::new(Rc::clone(&channel));
    view.browser().set_accounts(items(&["alice@example.com", "bob@example.com"]));
    view.on_open();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    view.observe_selection(move |s| sink.borrow_mut().push(s.clone()));

    view.browser().select(items(&["bob@example.com"]));
    assert_eq!(view.active_source_id(), ACCOUNTS_SOURCE_ID);
    view.browser().pin_selected();

    assert_eq!(view.active_tab(), CvtTab::Visualize);
    assert_eq!(view.active_source_id(), VISUALIZATION_SOURCE_ID);
    assert_eq!(view.visualization().pinned(), items(&["bob@example.com"]));
    // One broadcast for the browser selection, one for the retarget.
    assert_eq!(seen.borrow().len(), 2);
    assert!(seen.borrow()[1].is_empty());

    view.select_tab(CvtTab::Browse).unwrap();
    assert_eq!(view.selection(), SelectionSet::from_items(items(&["bob@example.com"])));
}

#[test]
fn e2e_failing_subscriber_does_not_block_views() {
    struct Broken(SubscriberId);

    impl Subscriber<UiEvent> for Broken {
        fn subscriber_id(&self) -> SubscriberId {
            self.0
        }

        fn accepts(&self, kind: EventKind) -> bool {
            kind == EventKind::PinToSecondaryView
        }

        fn on_event(&self, _event: &UiEvent) -> Result<(), CollaboratorError> {
            Err(CollaboratorError::new("broken", "always fails"))
        }
    }

    let channel = Rc::new(EventChannel::new("e2e"));
    let broken = Rc::new(Broken(SubscriberId::next("broken")));
    channel.register(broken.clone());
    let mut view = CommunicationsView::new(Rc::clone(&channel));
    view.on_open();

    view.browser().select(items(&["carol"]));
    view.browser().pin_selected();

    assert_eq!(view.active_tab(), CvtTab::Visualize);
    assert_eq!(view.visualization().pinned(), items(&["carol"]));
    assert_eq!(channel.failures().len(), 1);
}

// =============================================================================
// Case selection
// =============================================================================

#[test]
fn e2e_case_dialog_confirm_and_cancel() {
    let panel = CaseSelectionPanel::new(Box::new(CaseListing::default()));
    let confirmed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&confirmed);
    panel.subscribe_to_new_case_selections(move |cases| sink.borrow_mut().push(cases.to_vec()));

    panel.refresh(items(&["case-1", "case-2"]));
    panel.show();
    panel.select_all();
    panel.cancel();
    assert!(confirmed.borrow().is_empty());
    assert!(!panel.is_visible());

    panel.show();
    panel.set_selections(&items(&["case-2"])).unwrap();
    panel.confirm();
    assert_eq!(*confirmed.borrow(), vec![items(&["case-2"])]);
    assert!(!panel.is_visible());
}
