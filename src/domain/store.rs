use super::task::{Task, TaskId};
use chrono::{DateTime, Utc};
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, warn};

/// Change notification sent to store observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    TaskAdded(TaskId),
    TaskDeleted(TaskId),
    Reordered,
    SelectionChanged(Option<TaskId>),
    SessionStarted(TaskId),
    SessionEnded(TaskId),
}

impl StoreEvent {
    /// Whether the task list itself changed (and must be persisted)
    pub fn touches_tasks(&self) -> bool {
        !matches!(self, StoreEvent::SelectionChanged(_))
    }
}

/// Single owner of the task list, the selection and the ongoing-session flag.
///
/// All mutation goes through the methods below; views observe via `subscribe`.
pub struct TaskStore {
    tasks: Vec<Task>,
    selected: Option<TaskId>,
    session_ongoing: bool,
    last_id: TaskId,
    observers: Vec<Sender<StoreEvent>>,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        // A persisted open session means a run was in progress; keep it selected
        // so the next pause closes it.
        let selected = tasks.iter().find(|t| t.has_open_session()).map(|t| t.id);
        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);

        Self {
            tasks,
            selected,
            session_ongoing: selected.is_some(),
            last_id,
            observers: Vec::new(),
        }
    }

    /// Register an observer. Dropped receivers are pruned on the next event.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = channel();
        self.observers.push(tx);
        rx
    }

    fn emit(&mut self, event: StoreEvent) {
        debug!(?event, "task store changed");
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Task> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn is_session_ongoing(&self) -> bool {
        self.session_ongoing
    }

    /// Allocate a time-derived id that never repeats within this store
    fn next_id(&mut self, now: DateTime<Utc>) -> TaskId {
        let candidate = now.timestamp_millis().max(0) as TaskId;
        let id = if candidate > self.last_id {
            candidate
        } else {
            self.last_id + 1
        };
        self.last_id = id;
        id
    }

    /// Add a task at the end of the list. Blank names are rejected.
    pub fn add_task(&mut self, name: &str, now: DateTime<Utc>) -> Option<TaskId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = self.next_id(now);
        self.tasks.push(Task::new(id, name));
        self.emit(StoreEvent::TaskAdded(id));
        Some(id)
    }

    /// Delete a task; clears the selection if it pointed at that task
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };
        let removed = self.tasks.remove(pos);
        if removed.has_open_session() {
            self.session_ongoing = false;
        }
        self.emit(StoreEvent::TaskDeleted(id));

        if self.selected == Some(id) {
            self.selected = None;
            self.emit(StoreEvent::SelectionChanged(None));
        }
        true
    }

    /// Replace the whole list with a new ordering of the same tasks.
    /// Refused unless `new_tasks` holds exactly the current ids.
    pub fn reorder(&mut self, new_tasks: Vec<Task>) -> bool {
        let mut current: Vec<TaskId> = self.tasks.iter().map(|t| t.id).collect();
        let mut proposed: Vec<TaskId> = new_tasks.iter().map(|t| t.id).collect();
        current.sort_unstable();
        proposed.sort_unstable();
        if current != proposed {
            warn!(
                current = current.len(),
                proposed = proposed.len(),
                "reorder rejected: not a permutation of the task list"
            );
            return false;
        }
        self.tasks = new_tasks;
        self.emit(StoreEvent::Reordered);
        true
    }

    /// Change the selection. Refused while a session is ongoing.
    pub fn select(&mut self, id: Option<TaskId>) -> bool {
        if self.session_ongoing {
            return false;
        }
        if let Some(id) = id {
            if self.get(id).is_none() {
                return false;
            }
        }
        if self.selected != id {
            self.selected = id;
            self.emit(StoreEvent::SelectionChanged(id));
        }
        true
    }

    /// Open a session on `id`. A second call without `end_session` is a no-op.
    pub fn start_session(&mut self, id: TaskId, now: DateTime<Utc>) -> bool {
        let opened = match self.get_mut(id) {
            Some(task) => task.open_session(now),
            None => return false,
        };
        self.session_ongoing = true;
        if opened {
            self.emit(StoreEvent::SessionStarted(id));
        }
        opened
    }

    /// Close the open session on `id`, if there is one
    pub fn end_session(&mut self, id: TaskId, now: DateTime<Utc>) -> bool {
        let closed = match self.get_mut(id) {
            Some(task) => task.close_session(now),
            None => false,
        };
        self.session_ongoing = false;
        if closed {
            self.emit(StoreEvent::SessionEnded(id));
        }
        closed
    }
}
