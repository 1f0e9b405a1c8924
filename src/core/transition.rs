// CaseSleuth - core/transition.rs
//
// Bounded value animator driven by cooperative ticks.
//
// Architecture:
//   - `TransitionDriver` moves an integer position toward one end of its
//     bounds by a fixed step per tick. It never sleeps: the host calls
//     `poll(now)` every frame and schedules a repaint for
//     `time_until_next_tick`.
//   - The step callback reports each clamped position to whatever is being
//     animated. The termination predicate is pure and only inspects the
//     candidate position.
//   - `TransitionSlot` owns at most one driver per animated property and
//     stops the previous driver before starting a replacement. This is the
//     only cancellation primitive.

use crate::util::error::{CollaboratorError, TransitionError};
use std::time::{Duration, Instant};

/// Callback receiving every reported (clamped) position.
pub type StepFn = Box<dyn FnMut(i32) -> Result<(), CollaboratorError>>;

/// Pure termination check evaluated on each candidate position.
pub type DonePredicate = Box<dyn Fn(i32) -> bool>;

/// Direction of travel for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increasing,
    Decreasing,
}

impl Direction {
    fn sign(self) -> i32 {
        match self {
            Self::Increasing => 1,
            Self::Decreasing => -1,
        }
    }
}

/// Inclusive range a position is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub lower: i32,
    pub upper: i32,
}

impl Bounds {
    /// Build bounds; a reversed pair is swapped rather than rejected.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.lower, self.upper)
    }
}

/// Result of a single tick or poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing happened.
    Idle,
    /// Running, but the tick interval has not elapsed yet.
    Waiting,
    /// Moved to the given position and keeps running.
    Continue(i32),
    /// Moved to the given position and stopped.
    Finished(i32),
}

/// Animates one bounded position toward a target.
pub struct TransitionDriver {
    bounds: Bounds,
    position: i32,
    step_size: i32,
    tick_interval: Duration,
    direction: Direction,
    running: bool,
    last_tick: Option<Instant>,
    on_step: Option<StepFn>,
    is_done: Option<DonePredicate>,
}

impl std::fmt::Debug for TransitionDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionDriver")
            .field("bounds", &self.bounds)
            .field("position", &self.position)
            .field("step_size", &self.step_size)
            .field("direction", &self.direction)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl TransitionDriver {
    /// Create a stopped driver at `position` (clamped into `bounds`).
    ///
    /// A non-positive `step_size` is raised to 1 so every run converges.
    pub fn new(bounds: Bounds, position: i32, step_size: i32, tick_interval: Duration) -> Self {
        Self {
            bounds,
            position: bounds.clamp(position),
            step_size: step_size.max(1),
            tick_interval,
            direction: Direction::Increasing,
            running: false,
            last_tick: None,
            on_step: None,
            is_done: None,
        }
    }

    /// Begin ticking in `direction`.
    ///
    /// Starting a driver that is already running is a contract violation:
    /// debug builds panic, release builds log it and stop the old run first.
    /// Callers that replace transitions should go through [`TransitionSlot`].
    pub fn start<S, D>(&mut self, direction: Direction, on_step: S, is_done: D)
    where
        S: FnMut(i32) -> Result<(), CollaboratorError> + 'static,
        D: Fn(i32) -> bool + 'static,
    {
        debug_assert!(
            !self.running,
            "TransitionDriver::start called while running; stop it first"
        );
        if self.running {
            tracing::warn!(
                position = self.position,
                "Transition started while running; stopping previous run"
            );
            self.stop();
        }

        self.direction = direction;
        self.on_step = Some(Box::new(on_step));
        self.is_done = Some(Box::new(is_done));
        self.last_tick = None;
        self.running = true;

        tracing::trace!(
            position = self.position,
            direction = ?direction,
            step = self.step_size,
            "Transition started"
        );
    }

    /// Halt immediately. The position keeps its last clamped value.
    pub fn stop(&mut self) {
        if self.running {
            tracing::trace!(position = self.position, "Transition stopped");
        }
        self.running = false;
        self.on_step = None;
        self.is_done = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Advance by exactly one step, regardless of cadence.
    ///
    /// A failing step callback stops the driver and the failure is returned.
    pub fn tick(&mut self) -> Result<TickOutcome, TransitionError> {
        if !self.running {
            return Ok(TickOutcome::Idle);
        }

        let candidate = self
            .position
            .saturating_add(self.step_size * self.direction.sign());
        let clamped = self.bounds.clamp(candidate);
        let done = clamped != candidate || self.is_done.as_ref().is_some_and(|f| f(clamped));

        self.position = clamped;

        if let Some(on_step) = self.on_step.as_mut() {
            if let Err(source) = on_step(clamped) {
                tracing::warn!(position = clamped, error = %source, "Transition step failed");
                self.stop();
                return Err(TransitionError::StepFailed {
                    position: clamped,
                    source,
                });
            }
        }

        if done {
            self.stop();
            tracing::trace!(position = clamped, "Transition finished");
            Ok(TickOutcome::Finished(clamped))
        } else {
            Ok(TickOutcome::Continue(clamped))
        }
    }

    /// Tick if the configured interval has elapsed since the previous tick.
    ///
    /// The first poll after `start` only arms the timer, so the first step
    /// lands one interval after the request.
    pub fn poll(&mut self, now: Instant) -> Result<TickOutcome, TransitionError> {
        if !self.running {
            return Ok(TickOutcome::Idle);
        }
        match self.last_tick {
            None => {
                self.last_tick = Some(now);
                Ok(TickOutcome::Waiting)
            }
            Some(last) if now.saturating_duration_since(last) < self.tick_interval => {
                Ok(TickOutcome::Waiting)
            }
            Some(_) => {
                self.last_tick = Some(now);
                self.tick()
            }
        }
    }

    /// How long the host may wait before the next `poll` is useful.
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        if !self.running {
            return None;
        }
        Some(match self.last_tick {
            None => Duration::ZERO,
            Some(last) => self
                .tick_interval
                .saturating_sub(now.saturating_duration_since(last)),
        })
    }
}

// =============================================================================
// TransitionSlot
// =============================================================================

/// Owner of the single driver allowed to animate one property.
#[derive(Debug, Default)]
pub struct TransitionSlot {
    current: Option<TransitionDriver>,
    generation: u64,
}

impl TransitionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop whatever driver is running, install `driver`, and start it.
    pub fn start<S, D>(
        &mut self,
        driver: TransitionDriver,
        direction: Direction,
        on_step: S,
        is_done: D,
    ) where
        S: FnMut(i32) -> Result<(), CollaboratorError> + 'static,
        D: Fn(i32) -> bool + 'static,
    {
        if let Some(old) = self.current.as_mut() {
            if old.is_running() {
                tracing::debug!(
                    position = old.position(),
                    direction = ?old.direction(),
                    "Stopping in-flight transition before replacement"
                );
                old.stop();
            }
        }
        self.generation += 1;
        self.current
            .insert(driver)
            .start(direction, on_step, is_done);
    }

    pub fn stop(&mut self) {
        if let Some(driver) = self.current.as_mut() {
            driver.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(TransitionDriver::is_running)
    }

    /// Number of drivers started through this slot so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn driver(&self) -> Option<&TransitionDriver> {
        self.current.as_ref()
    }

    pub fn tick(&mut self) -> Result<TickOutcome, TransitionError> {
        match self.current.as_mut() {
            Some(driver) => driver.tick(),
            None => Ok(TickOutcome::Idle),
        }
    }

    pub fn poll(&mut self, now: Instant) -> Result<TickOutcome, TransitionError> {
        match self.current.as_mut() {
            Some(driver) => driver.poll(now),
            None => Ok(TickOutcome::Idle),
        }
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.current
            .as_ref()
            .and_then(|d| d.time_until_next_tick(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const TICK: Duration = Duration::from_millis(16);

    fn recorder() -> (Rc<RefCell<Vec<i32>>>, impl FnMut(i32) -> Result<(), CollaboratorError>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |p| {
            sink.borrow_mut().push(p);
            Ok(())
        })
    }

    fn run_to_end(driver: &mut TransitionDriver) {
        for _ in 0..1_000 {
            if !driver.is_running() {
                return;
            }
            driver.tick().unwrap();
        }
        panic!("transition did not converge");
    }

    #[test]
    fn test_increasing_visits_each_step_then_stops() {
        let mut driver = TransitionDriver::new(Bounds::new(0, 100), 60, 10, TICK);
        let (seen, on_step) = recorder();
        driver.start(Direction::Increasing, on_step, |p| p >= 100);

        run_to_end(&mut driver);

        assert_eq!(*seen.borrow(), vec![70, 80, 90, 100]);
        assert!(!driver.is_running());
        assert_eq!(driver.position(), 100);
    }

    #[test]
    fn test_clamping_terminates_without_predicate() {
        let mut driver = TransitionDriver::new(Bounds::new(0, 100), 95, 10, TICK);
        let (seen, on_step) = recorder();
        driver.start(Direction::Increasing, on_step, |_| false);

        assert_eq!(driver.tick().unwrap(), TickOutcome::Finished(100));
        assert_eq!(*seen.borrow(), vec![100]);
        assert!(!driver.is_running());
    }

    #[test]
    fn test_decreasing_clamps_to_lower_bound() {
        let mut driver = TransitionDriver::new(Bounds::new(250, 600), 275, 10, TICK);
        let (seen, on_step) = recorder();
        driver.start(Direction::Decreasing, on_step, |p| p <= 250);

        run_to_end(&mut driver);

        assert_eq!(*seen.borrow(), vec![265, 255, 250]);
    }

    #[test]
    fn test_start_position_is_clamped() {
        let driver = TransitionDriver::new(Bounds::new(0, 100), 500, 10, TICK);
        assert_eq!(driver.position(), 100);
    }

    #[test]
    fn test_stop_keeps_last_position() {
        let mut driver = TransitionDriver::new(Bounds::new(0, 100), 0, 10, TICK);
        let (_seen, on_step) = recorder();
        driver.start(Direction::Increasing, on_step, |p| p >= 100);
        driver.tick().unwrap();
        driver.tick().unwrap();
        driver.stop();

        assert!(!driver.is_running());
        assert_eq!(driver.position(), 20);
        assert_eq!(driver.tick().unwrap(), TickOutcome::Idle);
    }

    #[test]
    fn test_step_failure_aborts_and_surfaces() {
        let mut driver = TransitionDriver::new(Bounds::new(0, 100), 0, 10, TICK);
        driver.start(
            Direction::Increasing,
            |p| {
                if p >= 30 {
                    Err(CollaboratorError::new("test_pane", "detached"))
                } else {
                    Ok(())
                }
            },
            |p| p >= 100,
        );

        driver.tick().unwrap();
        driver.tick().unwrap();
        let err = driver.tick().unwrap_err();

        assert!(matches!(err, TransitionError::StepFailed { position: 30, .. }));
        assert!(!driver.is_running());
        assert_eq!(driver.position(), 30);
    }

    #[test]
    fn test_poll_respects_interval() {
        let mut driver = TransitionDriver::new(Bounds::new(0, 100), 0, 10, TICK);
        let (seen, on_step) = recorder();
        driver.start(Direction::Increasing, on_step, |p| p >= 100);

        let t0 = Instant::now();
        assert_eq!(driver.poll(t0).unwrap(), TickOutcome::Waiting);
        assert_eq!(driver.poll(t0 + TICK / 2).unwrap(), TickOutcome::Waiting);
        assert_eq!(driver.poll(t0 + TICK).unwrap(), TickOutcome::Continue(10));
        assert_eq!(*seen.borrow(), vec![10]);
        assert!(driver.time_until_next_tick(t0 + TICK).is_some());
    }

    #[test]
    fn test_zero_step_is_raised_to_one() {
        let mut driver = TransitionDriver::new(Bounds::new(0, 3), 0, 0, TICK);
        let (seen, on_step) = recorder();
        driver.start(Direction::Increasing, on_step, |p| p >= 3);
        run_to_end(&mut driver);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "stop it first")]
    fn test_restart_without_stop_panics_in_debug() {
        let mut driver = TransitionDriver::new(Bounds::new(0, 100), 0, 10, TICK);
        driver.start(Direction::Increasing, |_| Ok(()), |_| false);
        driver.start(Direction::Decreasing, |_| Ok(()), |_| false);
    }

    #[test]
    fn test_slot_replacement_halts_previous_direction() {
        let log: Rc<RefCell<Vec<(u64, i32)>>> = Rc::new(RefCell::new(Vec::new()));
        let mut slot = TransitionSlot::new();

        let up = Rc::clone(&log);
        slot.start(
            TransitionDriver::new(Bounds::new(0, 100), 50, 10, TICK),
            Direction::Increasing,
            move |p| {
                up.borrow_mut().push((1, p));
                Ok(())
            },
            |p| p >= 100,
        );
        slot.tick().unwrap();
        let resume_from = slot.driver().map(TransitionDriver::position).unwrap();

        let down = Rc::clone(&log);
        slot.start(
            TransitionDriver::new(Bounds::new(0, 100), resume_from, 10, TICK),
            Direction::Decreasing,
            move |p| {
                down.borrow_mut().push((2, p));
                Ok(())
            },
            |p| p <= 0,
        );
        slot.tick().unwrap();

        assert_eq!(*log.borrow(), vec![(1, 60), (2, 50)]);
        assert_eq!(slot.generation(), 2);
        assert!(slot.is_running());
    }
}
