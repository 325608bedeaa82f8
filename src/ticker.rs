use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Event loop poll interval in milliseconds
pub const DEFAULT_POLL_MS: u64 = 250;

/// Period of the timer's repeating tick
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Get the event loop poll duration
pub fn poll_duration() -> Duration {
    Duration::from_millis(DEFAULT_POLL_MS)
}

/// A "schedule repeating callback / cancel" capability.
///
/// The owner asks `due()` how many periods have fired since the last call and
/// runs its callback that many times.
pub trait Scheduler {
    fn schedule_repeating(&mut self, period: Duration);
    fn cancel(&mut self);
    fn is_scheduled(&self) -> bool;
    fn due(&mut self) -> u32;
}

/// Wall-clock scheduler driven by `Instant`
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    period: Duration,
    next_at: Option<Instant>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count elapsed periods up to `now`, advancing the deadline past them
    pub fn due_at(&mut self, now: Instant) -> u32 {
        let Some(mut next) = self.next_at else {
            return 0;
        };
        let mut fired = 0;
        while next <= now {
            fired += 1;
            next += self.period;
        }
        self.next_at = Some(next);
        fired
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule_repeating(&mut self, period: Duration) {
        self.period = period.max(Duration::from_millis(1));
        self.next_at = Some(Instant::now() + self.period);
    }

    fn cancel(&mut self) {
        self.next_at = None;
    }

    fn is_scheduled(&self) -> bool {
        self.next_at.is_some()
    }

    fn due(&mut self) -> u32 {
        self.due_at(Instant::now())
    }
}

#[derive(Debug, Default)]
struct ManualState {
    scheduled: bool,
    pending: u32,
    period: Option<Duration>,
}

/// Test scheduler: ticks fire only when pushed through a cloned handle
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `n` ticks; dropped unless a callback is scheduled
    pub fn fire(&self, n: u32) {
        let mut state = self.state.borrow_mut();
        if state.scheduled {
            state.pending += n;
        }
    }

    pub fn scheduled(&self) -> bool {
        self.state.borrow().scheduled
    }

    pub fn period(&self) -> Option<Duration> {
        self.state.borrow().period
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, period: Duration) {
        let mut state = self.state.borrow_mut();
        state.scheduled = true;
        state.period = Some(period);
    }

    fn cancel(&mut self) {
        let mut state = self.state.borrow_mut();
        state.scheduled = false;
        state.pending = 0;
    }

    fn is_scheduled(&self) -> bool {
        self.state.borrow().scheduled
    }

    fn due(&mut self) -> u32 {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }
}
