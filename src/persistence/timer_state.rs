use super::storage::KeyValueStore;
use crate::domain::{TimerPhase, TimerState};
use anyhow::Result;

pub const KEY_TOTAL: &str = "timer_totalSeconds";
pub const KEY_ELAPSED: &str = "timer_elapsedSeconds";
pub const KEY_RUNNING: &str = "timer_running";
pub const KEY_DINGED: &str = "timer_dinged";

pub const TIMER_KEYS: [&str; 4] = [KEY_TOTAL, KEY_ELAPSED, KEY_RUNNING, KEY_DINGED];

/// Rehydrate the timer. Each field falls back on its own when missing or corrupt.
pub fn load_timer(store: &KeyValueStore, fallback_total: u64) -> TimerState {
    let total_seconds = store
        .get::<u64>(KEY_TOTAL)
        .filter(|t| *t >= 1)
        .unwrap_or(fallback_total.max(1));
    let elapsed_seconds = store.get::<u64>(KEY_ELAPSED).unwrap_or(0);
    let running = store.get::<bool>(KEY_RUNNING).unwrap_or(false);
    let dinged = store.get::<bool>(KEY_DINGED).unwrap_or(false);

    TimerState {
        total_seconds,
        elapsed_seconds,
        phase: if running {
            TimerPhase::Running
        } else {
            TimerPhase::Idle
        },
        // Only meaningful once the duration has been reached
        dinged: dinged && elapsed_seconds >= total_seconds,
    }
}

/// Mirror the timer into storage
pub fn save_timer(store: &mut KeyValueStore, state: &TimerState) -> Result<()> {
    store.set_many(vec![
        (KEY_TOTAL, serde_json::to_string(&state.total_seconds)?),
        (KEY_ELAPSED, serde_json::to_string(&state.elapsed_seconds)?),
        (KEY_RUNNING, serde_json::to_string(&state.running())?),
        (KEY_DINGED, serde_json::to_string(&state.dinged)?),
    ])
}

/// Forget the persisted timer
pub fn clear_timer(store: &mut KeyValueStore) -> Result<()> {
    store.remove(&TIMER_KEYS)
}
