use super::dial::{self, duration_for_angle, pointer_angle};
use crate::ticker::{Scheduler, TICK_PERIOD};
use tracing::{debug, info};

/// Identifies one pointer (for the terminal, the mouse button holding it)
pub type PointerId = u8;

/// Fallback duration when nothing valid is persisted
pub const DEFAULT_TOTAL_SECONDS: u64 = 25 * 60;

/// What the timer is doing. Dragging is only reachable from idle, so a drag
/// while running cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Dragging { pointer: PointerId },
}

/// Countdown state mirrored to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub total_seconds: u64,
    pub elapsed_seconds: u64,
    pub phase: TimerPhase,
    pub dinged: bool,
}

impl TimerState {
    pub fn new(total_seconds: u64) -> Self {
        Self {
            total_seconds: total_seconds.max(1),
            elapsed_seconds: 0,
            phase: TimerPhase::Idle,
            dinged: false,
        }
    }

    pub fn running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn remaining(&self) -> u64 {
        dial::split(self.total_seconds, self.elapsed_seconds).0
    }

    pub fn overtime(&self) -> u64 {
        dial::split(self.total_seconds, self.elapsed_seconds).1
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_SECONDS)
    }
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing counted
    Ignored,
    Counted,
    /// Elapsed just reached the duration for the first time this run
    ThresholdCrossed,
}

/// Owns the countdown and its repeating tick
pub struct TimerController {
    state: TimerState,
    scheduler: Box<dyn Scheduler>,
    changed: bool,
}

impl TimerController {
    /// Build from (possibly rehydrated) state. A persisted running timer resumes.
    pub fn new(mut state: TimerState, scheduler: Box<dyn Scheduler>) -> Self {
        state.total_seconds = state.total_seconds.max(1);
        // A drag cannot survive a restart
        if matches!(state.phase, TimerPhase::Dragging { .. }) {
            state.phase = TimerPhase::Idle;
        }

        let mut controller = Self {
            state,
            scheduler,
            changed: false,
        };
        if controller.state.running() {
            info!(elapsed = controller.state.elapsed_seconds, "resuming timer");
            controller.scheduler.schedule_repeating(TICK_PERIOD);
        }
        controller
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_scheduled()
    }

    /// True once after any change since the last call
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Idle → Running. Returns false if already running or mid-drag.
    pub fn start(&mut self) -> bool {
        if self.state.phase != TimerPhase::Idle {
            return false;
        }
        self.state.phase = TimerPhase::Running;
        self.scheduler.schedule_repeating(TICK_PERIOD);
        self.changed = true;
        debug!(total = self.state.total_seconds, elapsed = self.state.elapsed_seconds, "timer started");
        true
    }

    /// Running → Idle
    pub fn pause(&mut self) -> bool {
        if !self.state.running() {
            return false;
        }
        self.scheduler.cancel();
        self.state.phase = TimerPhase::Idle;
        self.changed = true;
        debug!(elapsed = self.state.elapsed_seconds, "timer paused");
        true
    }

    /// Any → Idle with the clock cleared. Returns whether it was running.
    pub fn reset(&mut self) -> bool {
        let was_running = self.state.running();
        self.scheduler.cancel();
        self.state.phase = TimerPhase::Idle;
        self.state.elapsed_seconds = 0;
        self.state.dinged = false;
        self.changed = true;
        debug!("timer reset");
        was_running
    }

    /// Count one second
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.running() {
            return TickOutcome::Ignored;
        }
        self.state.elapsed_seconds = self.state.elapsed_seconds.saturating_add(1);
        self.changed = true;

        if !self.state.dinged && self.state.elapsed_seconds == self.state.total_seconds {
            self.state.dinged = true;
            info!(total = self.state.total_seconds, "timer reached its duration");
            TickOutcome::ThresholdCrossed
        } else {
            TickOutcome::Counted
        }
    }

    /// Run every tick the scheduler says is due; true if the threshold was crossed
    pub fn pump(&mut self) -> bool {
        let due = self.scheduler.due();
        let mut crossed = false;
        for _ in 0..due {
            if self.tick() == TickOutcome::ThresholdCrossed {
                crossed = true;
            }
        }
        crossed
    }

    /// Set the duration while not running. Changing the target restarts the face.
    pub fn set_duration(&mut self, total_seconds: u64) -> bool {
        if self.state.running() {
            return false;
        }
        self.state.total_seconds = total_seconds.max(1);
        self.state.elapsed_seconds = 0;
        self.state.dinged = false;
        self.changed = true;
        true
    }

    /// Nudge the duration by whole minutes, staying within one dial revolution.
    /// Refused while `locked`, like a drag.
    pub fn adjust_minutes(&mut self, delta: i64, locked: bool) -> bool {
        if locked {
            return false;
        }
        let minutes = (self.state.total_seconds / 60) as i64 + delta;
        let clamped = minutes.clamp(0, dial::DIAL_MINUTES as i64) as u64;
        let secs = if clamped == 0 { 60 } else { clamped * 60 };
        self.set_duration(secs)
    }

    /// Begin a drag. `locked` is true while a task session is ongoing.
    pub fn pointer_down(&mut self, pointer: PointerId, dx: f64, dy: f64, locked: bool) -> bool {
        if locked || self.state.phase != TimerPhase::Idle {
            return false;
        }
        self.state.phase = TimerPhase::Dragging { pointer };
        self.set_duration(duration_for_angle(pointer_angle(dx, dy)))
    }

    /// Update the duration from the pointer holding capture; others are ignored
    pub fn pointer_move(&mut self, pointer: PointerId, dx: f64, dy: f64) -> bool {
        match self.state.phase {
            TimerPhase::Dragging { pointer: held } if held == pointer => {
                self.set_duration(duration_for_angle(pointer_angle(dx, dy)))
            }
            _ => false,
        }
    }

    /// Release capture
    pub fn pointer_up(&mut self, pointer: PointerId) -> bool {
        match self.state.phase {
            TimerPhase::Dragging { pointer: held } if held == pointer => {
                self.state.phase = TimerPhase::Idle;
                self.changed = true;
                true
            }
            _ => false,
        }
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        self.scheduler.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::format::clock_display;
    use crate::ticker::ManualScheduler;

    fn controller(total: u64) -> (TimerController, ManualScheduler) {
        let handle = ManualScheduler::new();
        let timer = TimerController::new(TimerState::new(total), Box::new(handle.clone()));
        (timer, handle)
    }

    #[test]
    fn test_threshold_fires_once() {
        let (mut timer, _) = controller(10);
        assert!(timer.start());

        let mut crossings = 0;
        for _ in 0..10 {
            if timer.tick() == TickOutcome::ThresholdCrossed {
                crossings += 1;
            }
        }
        assert_eq!(crossings, 1);
        assert!(timer.state().dinged);

        for _ in 0..5 {
            assert_eq!(timer.tick(), TickOutcome::Counted);
        }
        let state = timer.state();
        assert_eq!(state.overtime(), 5);
        assert_eq!(state.remaining(), 0);
        assert_eq!(clock_display(state.remaining(), state.overtime()), "+00:05");
    }

    #[test]
    fn test_reset_rearms_threshold() {
        let (mut timer, _) = controller(2);
        timer.start();
        timer.tick();
        assert_eq!(timer.tick(), TickOutcome::ThresholdCrossed);

        assert!(timer.reset());
        assert_eq!(timer.state().elapsed_seconds, 0);
        assert!(!timer.state().dinged);

        timer.start();
        timer.tick();
        assert_eq!(timer.tick(), TickOutcome::ThresholdCrossed);
    }

    #[test]
    fn test_scheduler_active_only_while_running() {
        let (mut timer, handle) = controller(60);
        assert!(!handle.scheduled());

        timer.start();
        assert!(handle.scheduled());
        assert_eq!(handle.period(), Some(TICK_PERIOD));

        timer.pause();
        assert!(!handle.scheduled());

        timer.start();
        timer.reset();
        assert!(!handle.scheduled());

        timer.start();
        drop(timer);
        assert!(!handle.scheduled());
    }

    #[test]
    fn test_pump_runs_due_ticks() {
        let (mut timer, handle) = controller(3);
        handle.fire(5);
        assert!(!timer.pump());
        assert_eq!(timer.state().elapsed_seconds, 0);

        timer.start();
        handle.fire(4);
        assert!(timer.pump());
        assert_eq!(timer.state().elapsed_seconds, 4);
        assert!(!timer.pump());
    }

    #[test]
    fn test_ticks_ignored_while_idle() {
        let (mut timer, _) = controller(60);
        assert_eq!(timer.tick(), TickOutcome::Ignored);
        assert_eq!(timer.state().elapsed_seconds, 0);
    }

    #[test]
    fn test_drag_then_run_then_pause() {
        let (mut timer, _) = controller(60);
        // Straight down from centre is 30 minutes
        assert!(timer.pointer_down(0, 0.0, 40.0, false));
        assert_eq!(timer.state().total_seconds, 1800);
        // Left of centre is 15 minutes
        assert!(timer.pointer_move(0, -40.0, 0.0));
        assert!(timer.pointer_up(0));
        assert_eq!(timer.state().total_seconds, 900);
        assert_eq!(timer.state().phase, TimerPhase::Idle);

        timer.set_duration(300);
        timer.start();
        for _ in 0..3 {
            timer.tick();
        }
        timer.pause();
        assert_eq!(timer.state().elapsed_seconds, 3);
    }

    #[test]
    fn test_second_pointer_is_ignored() {
        let (mut timer, _) = controller(60);
        timer.pointer_down(0, 0.0, -40.0, false);
        assert_eq!(timer.state().total_seconds, 3600);

        assert!(!timer.pointer_down(1, 0.0, 40.0, false));
        assert!(!timer.pointer_move(1, 0.0, 40.0));
        assert!(!timer.pointer_up(1));
        assert_eq!(timer.state().total_seconds, 3600);
        assert_eq!(timer.state().phase, TimerPhase::Dragging { pointer: 0 });
    }

    #[test]
    fn test_drag_refused_when_running_or_locked() {
        let (mut timer, _) = controller(600);
        assert!(!timer.pointer_down(0, 0.0, 40.0, true));

        timer.start();
        assert!(!timer.pointer_down(0, 0.0, 40.0, false));
        assert!(!timer.set_duration(120));
        assert_eq!(timer.state().total_seconds, 600);

        // Cannot start in the middle of a drag either
        timer.pause();
        timer.pointer_down(0, 0.0, 40.0, false);
        assert!(!timer.start());
    }

    #[test]
    fn test_set_duration_restarts_face() {
        let (mut timer, _) = controller(10);
        timer.start();
        for _ in 0..10 {
            timer.tick();
        }
        timer.pause();

        assert!(timer.set_duration(0));
        let state = timer.state();
        assert_eq!(state.total_seconds, 1);
        assert_eq!(state.elapsed_seconds, 0);
        assert!(!state.dinged);
    }

    #[test]
    fn test_adjust_minutes_bounds() {
        let (mut timer, _) = controller(120);
        timer.adjust_minutes(-1, false);
        assert_eq!(timer.state().total_seconds, 60);
        timer.adjust_minutes(-1, false);
        assert_eq!(timer.state().total_seconds, 60);
        timer.adjust_minutes(100, false);
        assert_eq!(timer.state().total_seconds, 3600);

        assert!(!timer.adjust_minutes(-10, true));
        assert_eq!(timer.state().total_seconds, 3600);
    }

    #[test]
    fn test_tick_saturates_huge_elapsed() {
        let state = TimerState {
            total_seconds: 60,
            elapsed_seconds: u64::MAX,
            phase: TimerPhase::Running,
            dinged: true,
        };
        let mut timer = TimerController::new(state, Box::new(ManualScheduler::new()));
        assert_eq!(timer.tick(), TickOutcome::Counted);
        assert_eq!(timer.state().elapsed_seconds, u64::MAX);
        assert_eq!(timer.state().remaining(), 0);
    }

    #[test]
    fn test_rehydrated_running_timer_resumes() {
        let handle = ManualScheduler::new();
        let state = TimerState {
            total_seconds: 120,
            elapsed_seconds: 40,
            phase: TimerPhase::Running,
            dinged: false,
        };
        let timer = TimerController::new(state, Box::new(handle.clone()));
        assert!(timer.is_ticking());
        assert_eq!(timer.state().elapsed_seconds, 40);

        let dragging = TimerState {
            phase: TimerPhase::Dragging { pointer: 0 },
            ..state
        };
        let timer = TimerController::new(dragging, Box::new(ManualScheduler::new()));
        assert_eq!(timer.state().phase, TimerPhase::Idle);
    }

    #[test]
    fn test_take_changed() {
        let (mut timer, _) = controller(60);
        assert!(!timer.take_changed());
        timer.start();
        assert!(timer.take_changed());
        assert!(!timer.take_changed());
        timer.tick();
        assert!(timer.take_changed());
    }
}
