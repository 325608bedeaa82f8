use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Stable task identifier (creation time in epoch milliseconds, or a seed number)
pub type TaskId = u64;

/// One stretch of work on a task. `end == None` marks the open session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSession {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl TaskSession {
    pub fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Length of a closed session
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }
}

/// A to-do entry with its append-only session history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub sessions: Vec<TaskSession>,
}

impl Task {
    pub fn new(id: TaskId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sessions: Vec::new(),
        }
    }

    pub fn has_open_session(&self) -> bool {
        self.sessions.iter().any(TaskSession::is_open)
    }

    /// Append an open session. Returns false (and changes nothing) if one is already open.
    pub fn open_session(&mut self, now: DateTime<Utc>) -> bool {
        if self.has_open_session() {
            return false;
        }
        self.sessions.push(TaskSession::open(now));
        true
    }

    /// Close the most recent open session. Returns false if none is open.
    pub fn close_session(&mut self, now: DateTime<Utc>) -> bool {
        match self.sessions.iter_mut().rev().find(|s| s.is_open()) {
            Some(session) => {
                session.end = Some(now);
                true
            }
            None => false,
        }
    }
}

/// Built-in list used when nothing valid is persisted
pub fn seed_tasks() -> Vec<Task> {
    vec![
        Task::new(1, "Write down your tasks"),
        Task::new(2, "Select a task, start a working session"),
        Task::new(3, "Finish the session, repeat the above until your task is done"),
        Task::new(4, "Check off your task as done!"),
    ]
}
