use crate::domain::{DialScene, PointerId, StoreEvent, TaskId, TaskStore, TimerController};
use crate::notifications::{Interaction, NotificationManager, NotifyOptions, NotifyOutcome};
use crate::persistence::{save_tasks, save_timer, KeyValueStore};
use anyhow::Result;
use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use std::sync::mpsc::Receiver;
use std::time::Instant;
use tracing::{debug, info};

/// Window title outside of a timer-up flash
pub const APP_TITLE: &str = "tickdial";

/// Which input surface has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    AddingTask,
}

/// Input form state for adding tasks
#[derive(Debug, Clone, Default)]
pub struct InputFormState {
    pub name: String,
}

/// Main application state
pub struct AppState {
    pub timer: TimerController,
    pub store: TaskStore,
    store_events: Receiver<StoreEvent>,
    pub notifier: NotificationManager,
    storage: KeyValueStore,
    notify_options: NotifyOptions,
    /// Highlighted row in the task list (not the selected task)
    pub cursor: usize,
    pub ui_mode: UiMode,
    pub input_form: Option<InputFormState>,
    /// Where the dial canvas was last drawn, for mapping mouse cells
    pub dial_area: Option<Rect>,
    /// One-line message shown in the status bar
    pub status: Option<String>,
    pub needs_save: bool,
}

impl AppState {
    pub fn new(
        timer: TimerController,
        mut store: TaskStore,
        notifier: NotificationManager,
        storage: KeyValueStore,
        notify_options: NotifyOptions,
    ) -> Self {
        let store_events = store.subscribe();
        let cursor = store
            .selected_id()
            .and_then(|id| store.tasks().iter().position(|t| t.id == id))
            .unwrap_or(0);

        Self {
            timer,
            store,
            store_events,
            notifier,
            storage,
            notify_options,
            cursor,
            ui_mode: UiMode::Normal,
            input_form: None,
            dial_area: None,
            status: None,
            needs_save: false,
        }
    }

    /// Geometry for the current timer state
    pub fn dial_scene(&self) -> DialScene {
        let state = self.timer.state();
        DialScene::new(
            state.total_seconds,
            state.elapsed_seconds,
            !state.running(),
        )
    }

    /// The dial is locked (no drag, dimmed) while a task session is ongoing
    pub fn is_dial_locked(&self) -> bool {
        self.store.is_session_ongoing()
    }

    pub fn observe_input(&mut self, kind: Interaction) {
        self.notifier.observe_interaction(kind);
    }

    // Timer controls

    pub fn toggle_timer(&mut self) {
        if self.timer.state().running() {
            self.pause_timer(Utc::now());
        } else {
            self.start_timer(Utc::now());
        }
    }

    /// Start the countdown and open a session on the selected task
    pub fn start_timer(&mut self, now: DateTime<Utc>) {
        self.notifier.mark_user_interaction();
        if !self.timer.start() {
            return;
        }
        self.status = None;
        if let Some(id) = self.store.selected_id() {
            if self.store.start_session(id, now) {
                info!(task = id, "session started");
            }
        }
    }

    /// Pause the countdown and close the selected task's session
    pub fn pause_timer(&mut self, now: DateTime<Utc>) {
        if self.timer.pause() {
            self.end_session(now);
        }
    }

    /// Clear the clock. A run in progress also closes its session.
    pub fn reset_timer(&mut self, now: DateTime<Utc>) {
        let was_running = self.timer.reset();
        self.notifier.cancel_flash();
        if was_running || self.store.is_session_ongoing() {
            self.end_session(now);
        }
    }

    fn end_session(&mut self, now: DateTime<Utc>) {
        if let Some(id) = self.store.selected_id() {
            if self.store.end_session(id, now) {
                info!(task = id, "session ended");
            }
        }
    }

    /// Nudge the duration by whole minutes; ignored while running or locked
    pub fn nudge_duration(&mut self, delta_minutes: i64) {
        let locked = self.is_dial_locked();
        if self.timer.adjust_minutes(delta_minutes, locked) {
            return;
        }
        self.status = Some(if locked {
            "Dial is locked to the running task".to_string()
        } else {
            "Pause the timer to change its duration".to_string()
        });
    }

    /// Run due ticks and advance the title flash
    pub fn pump(&mut self, now: Instant) {
        if self.timer.pump() {
            let outcome = self.notifier.notify(&self.notify_options, now);
            info!(?outcome, "timer up");
            if outcome == NotifyOutcome::TitleFlash {
                self.status = Some(self.notify_options.title.clone());
            }
        }
        self.notifier.pump(now);
    }

    // Dial pointer (offsets from the dial centre, screen convention)

    pub fn pointer_down(&mut self, pointer: PointerId, dx: f64, dy: f64) {
        self.notifier.mark_user_interaction();
        let locked = self.is_dial_locked();
        if self.timer.pointer_down(pointer, dx, dy, locked) {
            debug!(pointer, total = self.timer.state().total_seconds, "drag started");
        }
    }

    pub fn pointer_move(&mut self, pointer: PointerId, dx: f64, dy: f64) {
        self.timer.pointer_move(pointer, dx, dy);
    }

    pub fn pointer_up(&mut self, pointer: PointerId) {
        self.timer.pointer_up(pointer);
    }

    // Task list

    fn cursor_task_id(&self) -> Option<TaskId> {
        self.store.tasks().get(self.cursor).map(|t| t.id)
    }

    fn clamp_cursor(&mut self) {
        let len = self.store.tasks().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor + 1 < self.store.tasks().len() {
            self.cursor += 1;
        }
    }

    /// Select the task under the cursor, or clear the selection if it is already selected
    pub fn toggle_select_at_cursor(&mut self) {
        let Some(id) = self.cursor_task_id() else {
            return;
        };
        let target = if self.store.selected_id() == Some(id) {
            None
        } else {
            Some(id)
        };
        if !self.store.select(target) {
            self.status = Some("Pause the timer to change tasks".to_string());
        }
    }

    fn move_task(&mut self, up: bool) {
        let len = self.store.tasks().len();
        let target = if up {
            match self.cursor.checked_sub(1) {
                Some(t) => t,
                None => return,
            }
        } else if self.cursor + 1 < len {
            self.cursor + 1
        } else {
            return;
        };

        let mut tasks = self.store.tasks().to_vec();
        tasks.swap(self.cursor, target);
        if self.store.reorder(tasks) {
            self.cursor = target;
        }
    }

    pub fn move_task_up(&mut self) {
        self.move_task(true);
    }

    pub fn move_task_down(&mut self) {
        self.move_task(false);
    }

    pub fn delete_at_cursor(&mut self) {
        if let Some(id) = self.cursor_task_id() {
            self.store.delete_task(id);
            self.clamp_cursor();
        }
    }

    pub fn start_add_task(&mut self) {
        self.input_form = Some(InputFormState::default());
        self.ui_mode = UiMode::AddingTask;
    }

    pub fn input_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.input_form {
            form.name.push(c);
        }
    }

    pub fn input_form_backspace(&mut self) {
        if let Some(form) = &mut self.input_form {
            form.name.pop();
        }
    }

    /// Add the typed task. A blank name keeps the form open.
    pub fn submit_input_form(&mut self) {
        let Some(form) = &self.input_form else {
            return;
        };
        let name = form.name.clone();
        if self.store.add_task(&name, Utc::now()).is_some() {
            self.cursor = self.store.tasks().len() - 1;
            self.cancel_input_form();
        }
    }

    pub fn cancel_input_form(&mut self) {
        self.input_form = None;
        self.ui_mode = UiMode::Normal;
    }

    /// Mirror whatever changed to storage
    pub fn save(&mut self) -> Result<()> {
        if self.timer.take_changed() {
            save_timer(&mut self.storage, self.timer.state())?;
        }

        let tasks_changed = self
            .store_events
            .try_iter()
            .filter(StoreEvent::touches_tasks)
            .count()
            > 0;
        if tasks_changed || self.needs_save {
            save_tasks(&mut self.storage, self.store.tasks())?;
        }

        self.needs_save = false;
        Ok(())
    }

    /// Release notification resources and restore the terminal title
    pub fn shutdown(&mut self) {
        self.notifier.destroy();
    }
}


#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::{seed_tasks, TimerState};
    use crate::notifications::{DesktopNotifier, NotifyError, Permission, TitleSink};
    use crate::ticker::ManualScheduler;

    pub struct NoDesktop;

    impl DesktopNotifier for NoDesktop {
        fn supported(&self) -> bool {
            false
        }

        fn permission(&self) -> Permission {
            Permission::Denied
        }

        fn request_permission(&mut self) -> Result<Permission, NotifyError> {
            Err(NotifyError::Unsupported)
        }

        fn show(&mut self, _title: &str, _body: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Unsupported)
        }
    }

    pub struct NullTitle;

    impl TitleSink for NullTitle {
        fn set_title(&mut self, _title: &str) {}
    }

    /// Seeded app with a hand-driven tick and no audio
    pub fn test_app(total: u64) -> (AppState, ManualScheduler) {
        let ticks = ManualScheduler::new();
        let app = AppState::new(
            TimerController::new(TimerState::new(total), Box::new(ticks.clone())),
            TaskStore::new(seed_tasks()),
            NotificationManager::new(APP_TITLE, None, Box::new(NoDesktop), Box::new(NullTitle)),
            KeyValueStore::in_memory(),
            NotifyOptions::default(),
        );
        (app, ticks)
    }
}
