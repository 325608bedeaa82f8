use super::storage::KeyValueStore;
use crate::domain::{seed_tasks, Task};
use anyhow::Result;
use tracing::info;

pub const KEY_TASKS: &str = "tasks";

/// Load the task list, or the seed list when absent or malformed
pub fn load_tasks(store: &KeyValueStore) -> Vec<Task> {
    match store.get::<Vec<Task>>(KEY_TASKS) {
        Some(tasks) => tasks,
        None => {
            info!("no stored tasks; using the built-in list");
            seed_tasks()
        }
    }
}

pub fn save_tasks(store: &mut KeyValueStore, tasks: &[Task]) -> Result<()> {
    store.set(KEY_TASKS, tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_tasks_seed() {
        let store = KeyValueStore::in_memory();
        assert_eq!(load_tasks(&store), seed_tasks());
    }

    #[test]
    fn test_malformed_tasks_seed() {
        let mut store = KeyValueStore::in_memory();
        store
            .set_raw(KEY_TASKS, r#"[{"id":1,"name":"x","sessions":[{"start":"yesterday"}]}]"#.to_string())
            .unwrap();
        assert_eq!(load_tasks(&store), seed_tasks());
    }

    #[test]
    fn test_sessions_survive_round_trip() {
        let start: DateTime<Utc> = "2024-01-01T10:00:00Z".parse().unwrap();
        let end: DateTime<Utc> = "2024-01-01T10:45:00Z".parse().unwrap();

        let mut task = Task::new(1_700_000_000_000, "Review");
        task.open_session(start);
        task.close_session(end);
        task.open_session(end);

        let mut store = KeyValueStore::in_memory();
        save_tasks(&mut store, &[task.clone()]).unwrap();

        let raw = store.get_raw(KEY_TASKS).unwrap();
        assert!(raw.contains("2024-01-01T10:45:00Z"));
        assert!(raw.contains("null"));
        assert_eq!(load_tasks(&store), vec![task]);
    }

    #[test]
    fn test_reads_browser_style_timestamps() {
        let mut store = KeyValueStore::in_memory();
        store
            .set_raw(
                KEY_TASKS,
                r#"[{"id":1712345678901,"name":"Plan","sessions":[{"start":"2024-04-05T19:34:38.901Z","end":null}]}]"#
                    .to_string(),
            )
            .unwrap();

        let tasks = load_tasks(&store);
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].has_open_session());
    }
}
