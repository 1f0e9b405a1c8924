// CaseSleuth - app/auxiliary.rs
//
// Visibility state machine for an auxiliary (details) area revealed by moving
// a split divider.
//
//   Hidden --show--> Showing --finished--> Shown
//   Shown  --hide--> Hiding  --finished--> Hidden
//
// Showing/Hiding are driven by a TransitionDriver held in a TransitionSlot.
// A request arriving while transient replaces the running driver (last
// request wins). The divider moves between `shown_position` (results area
// at its minimum height) and the container extent (details fully hidden).

use crate::core::transition::{
    Bounds, Direction, TickOutcome, TransitionDriver, TransitionSlot,
};
use crate::util::constants;
use crate::util::error::{CollaboratorError, TransitionError};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Split container hosting the auxiliary area. Passive sink for divider
/// positions computed here.
pub trait SplitContainer {
    /// Total extent along the split axis (px).
    fn extent(&self) -> i32;

    /// Current divider position (px from the top).
    fn divider_location(&self) -> i32;

    fn set_divider_location(&self, position: i32) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxState {
    Hidden,
    Showing,
    Shown,
    Hiding,
}

impl AuxState {
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Showing | Self::Hiding)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Showing => "showing",
            Self::Shown => "shown",
            Self::Hiding => "hiding",
        }
    }
}

/// Animation parameters for divider transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionSettings {
    pub step_size: i32,
    pub tick_interval: Duration,
    /// Divider position when the auxiliary area is fully shown.
    pub shown_position: i32,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            step_size: constants::DEFAULT_ANIMATION_STEP_PX,
            tick_interval: Duration::from_millis(constants::DEFAULT_TRANSITION_TICK_MS),
            shown_position: constants::DEFAULT_RESULTS_AREA_MIN_PX,
        }
    }
}

pub struct AuxiliaryArea {
    container: Rc<dyn SplitContainer>,
    settings: TransitionSettings,
    state: AuxState,
    slot: TransitionSlot,
}

impl AuxiliaryArea {
    /// Create the area in a resting state. A transient `initial` is treated
    /// as `Hidden`.
    pub fn new(
        container: Rc<dyn SplitContainer>,
        settings: TransitionSettings,
        initial: AuxState,
    ) -> Self {
        let state = if initial.is_transient() {
            AuxState::Hidden
        } else {
            initial
        };
        Self {
            container,
            settings,
            state,
            slot: TransitionSlot::new(),
        }
    }

    pub fn state(&self) -> AuxState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.slot.is_running()
    }

    /// Number of transitions started so far.
    pub fn transitions_started(&self) -> u64 {
        self.slot.generation()
    }

    pub fn settings(&self) -> TransitionSettings {
        self.settings
    }

    /// Divider range for the container's current extent.
    pub fn bounds(&self) -> Bounds {
        let lower = self.settings.shown_position;
        Bounds::new(lower, self.container.extent().max(lower))
    }

    /// Ask for the area to become visible or hidden.
    ///
    /// Requesting the terminal state already reached does nothing, as long
    /// as the divider sits at that state's boundary. Repeating the request
    /// that is already animating keeps the running driver. Any other
    /// request stops the in-flight driver and starts a new one from the
    /// container's current divider position.
    pub fn request(&mut self, visible: bool) {
        let (target, moving) = if visible {
            (AuxState::Shown, AuxState::Showing)
        } else {
            (AuxState::Hidden, AuxState::Hiding)
        };
        let bounds = self.bounds();
        let start = self.container.divider_location();
        let resting = if visible { bounds.lower } else { bounds.upper };

        if self.state == target && start == resting {
            tracing::trace!(state = target.label(), "Auxiliary area already in requested state");
            return;
        }
        if self.state == moving && self.slot.is_running() {
            tracing::trace!(state = moving.label(), "Auxiliary area already moving to requested state");
            return;
        }

        let driver = TransitionDriver::new(
            bounds,
            start,
            self.settings.step_size,
            self.settings.tick_interval,
        );
        let container = Rc::clone(&self.container);
        let on_step = move |position: i32| container.set_divider_location(position);

        if visible {
            let lower = bounds.lower;
            self.slot
                .start(driver, Direction::Decreasing, on_step, move |p| p <= lower);
            self.state = AuxState::Showing;
        } else {
            let upper = bounds.upper;
            self.slot
                .start(driver, Direction::Increasing, on_step, move |p| p >= upper);
            self.state = AuxState::Hiding;
        }

        tracing::debug!(
            state = self.state.label(),
            from = start,
            lower = bounds.lower,
            upper = bounds.upper,
            "Auxiliary area transition requested"
        );
    }

    /// Advance one step immediately (ignores cadence).
    pub fn tick(&mut self) -> Result<AuxState, TransitionError> {
        let outcome = self.slot.tick();
        self.settle(outcome)
    }

    /// Advance if the tick interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Result<AuxState, TransitionError> {
        let outcome = self.slot.poll(now);
        self.settle(outcome)
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.slot.time_until_next_tick(now)
    }

    /// Stop any running transition and jump straight to its target.
    pub fn finish_immediately(&mut self) -> Result<AuxState, CollaboratorError> {
        if !self.state.is_transient() {
            return Ok(self.state);
        }
        self.slot.stop();
        let bounds = self.bounds();
        let (position, state) = match self.state {
            AuxState::Showing => (bounds.lower, AuxState::Shown),
            _ => (bounds.upper, AuxState::Hidden),
        };
        self.state = state;
        self.container.set_divider_location(position)?;
        Ok(state)
    }

    fn settle(
        &mut self,
        outcome: Result<TickOutcome, TransitionError>,
    ) -> Result<AuxState, TransitionError> {
        match outcome {
            Ok(TickOutcome::Finished(position)) => {
                self.state = match self.state {
                    AuxState::Showing => AuxState::Shown,
                    AuxState::Hiding => AuxState::Hidden,
                    other => other,
                };
                tracing::debug!(state = self.state.label(), position, "Auxiliary area settled");
                Ok(self.state)
            }
            Ok(_) => Ok(self.state),
            Err(e) => {
                // The transition did not complete: fall back to the state it
                // was leaving. The divider may sit between the boundaries, so
                // `request` checks it before treating this state as reached.
                self.state = match self.state {
                    AuxState::Showing => AuxState::Hidden,
                    AuxState::Hiding => AuxState::Shown,
                    other => other,
                };
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct FakeSplit {
        extent: i32,
        divider: Cell<i32>,
        history: RefCell<Vec<i32>>,
        fail_at: Cell<Option<i32>>,
    }

    impl FakeSplit {
        fn new(extent: i32, divider: i32) -> Rc<Self> {
            Rc::new(Self {
                extent,
                divider: Cell::new(divider),
                history: RefCell::new(Vec::new()),
                fail_at: Cell::new(None),
            })
        }
    }

    impl SplitContainer for FakeSplit {
        fn extent(&self) -> i32 {
            self.extent
        }

        fn divider_location(&self) -> i32 {
            self.divider.get()
        }

        fn set_divider_location(&self, position: i32) -> Result<(), CollaboratorError> {
            if self.fail_at.get() == Some(position) {
                self.fail_at.set(None);
                return Err(CollaboratorError::new("fake_split", "detached"));
            }
            self.divider.set(position);
            self.history.borrow_mut().push(position);
            Ok(())
        }
    }

    fn settings() -> TransitionSettings {
        TransitionSettings {
            step_size: 10,
            tick_interval: Duration::from_millis(16),
            shown_position: 250,
        }
    }

    fn run(area: &mut AuxiliaryArea) -> AuxState {
        for _ in 0..1_000 {
            if !area.is_animating() {
                break;
            }
            area.tick().unwrap();
        }
        area.state()
    }

    #[test]
    fn test_show_moves_divider_down_to_min() {
        let split = FakeSplit::new(300, 300);
        let mut area = AuxiliaryArea::new(split.clone(), settings(), AuxState::Hidden);

        area.request(true);
        assert_eq!(area.state(), AuxState::Showing);

        assert_eq!(run(&mut area), AuxState::Shown);
        assert_eq!(*split.history.borrow(), vec![290, 280, 270, 260, 250]);
    }

    #[test]
    fn test_hide_moves_divider_to_extent() {
        let split = FakeSplit::new(280, 250);
        let mut area = AuxiliaryArea::new(split.clone(), settings(), AuxState::Shown);

        area.request(false);

        assert_eq!(run(&mut area), AuxState::Hidden);
        assert_eq!(*split.history.borrow(), vec![260, 270, 280]);
    }

    #[test]
    fn test_repeat_request_for_resting_state_is_noop() {
        let split = FakeSplit::new(400, 400);
        let mut area = AuxiliaryArea::new(split, settings(), AuxState::Hidden);

        area.request(false);

        assert_eq!(area.state(), AuxState::Hidden);
        assert_eq!(area.transitions_started(), 0);
    }

    #[test]
    fn test_reversal_mid_transition_last_request_wins() {
        let split = FakeSplit::new(400, 250);
        let mut area = AuxiliaryArea::new(split.clone(), settings(), AuxState::Shown);

        area.request(false);
        area.tick().unwrap();
        area.tick().unwrap();
        assert_eq!(split.divider.get(), 270);

        area.request(true);
        assert_eq!(area.state(), AuxState::Showing);
        area.tick().unwrap();
        assert_eq!(split.divider.get(), 260);

        assert_eq!(run(&mut area), AuxState::Shown);
        assert_eq!(area.transitions_started(), 2);
        assert_eq!(*split.history.borrow(), vec![260, 270, 260, 250]);
    }

    #[test]
    fn test_step_failure_falls_back_to_origin_state() {
        let split = Rc::new(FakeSplit {
            extent: 300,
            divider: Cell::new(300),
            history: RefCell::new(Vec::new()),
            fail_at: Cell::new(Some(280)),
        });
        let mut area = AuxiliaryArea::new(split, settings(), AuxState::Hidden);

        area.request(true);
        area.tick().unwrap();
        let err = area.tick().unwrap_err();

        assert!(matches!(err, TransitionError::StepFailed { position: 280, .. }));
        assert_eq!(area.state(), AuxState::Hidden);
        assert!(!area.is_animating());
    }

    #[test]
    fn test_finish_immediately_snaps_to_target() {
        let split = FakeSplit::new(500, 500);
        let mut area = AuxiliaryArea::new(split.clone(), settings(), AuxState::Hidden);

        area.request(true);
        area.tick().unwrap();

        assert_eq!(area.finish_immediately().unwrap(), AuxState::Shown);
        assert_eq!(split.divider.get(), 250);
        assert!(!area.is_animating());
    }

    #[test]
    fn test_small_container_does_not_invert_bounds() {
        let split = FakeSplit::new(100, 100);
        let area = AuxiliaryArea::new(split, settings(), AuxState::Hidden);
        let bounds = area.bounds();
        assert_eq!((bounds.lower, bounds.upper), (250, 250));
    }

    #[test]
    fn test_request_after_step_failure_moves_stranded_divider() {
        let split = Rc::new(FakeSplit {
            extent: 400,
            divider: Cell::new(400),
            history: RefCell::new(Vec::new()),
            fail_at: Cell::new(Some(340)),
        });
        let mut area = AuxiliaryArea::new(split.clone(), settings(), AuxState::Hidden);

        area.request(true);
        for _ in 0..5 {
            area.tick().unwrap();
        }
        assert!(area.tick().is_err());
        assert_eq!(area.state(), AuxState::Hidden);
        assert_eq!(split.divider.get(), 350);

        area.request(false);
        assert_eq!(area.state(), AuxState::Hiding);
        assert_eq!(run(&mut area), AuxState::Hidden);
        assert_eq!(split.divider.get(), 400);
        assert_eq!(area.transitions_started(), 2);
    }

    #[test]
    fn test_repeat_request_while_moving_keeps_driver() {
        let split = FakeSplit::new(300, 300);
        let mut area = AuxiliaryArea::new(split.clone(), settings(), AuxState::Hidden);

        area.request(true);
        area.tick().unwrap();
        area.request(true);

        assert_eq!(area.state(), AuxState::Showing);
        assert_eq!(area.transitions_started(), 1);
        assert_eq!(run(&mut area), AuxState::Shown);
        assert_eq!(*split.history.borrow(), vec![290, 280, 270, 260, 250]);
    }
}
