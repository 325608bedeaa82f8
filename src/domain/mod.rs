pub mod dial;
pub mod format;
pub mod store;
pub mod task;
pub mod timer;

pub use dial::DialScene;
pub use format::{clock_display, cumulative_time, format_clock};
pub use store::{StoreEvent, TaskStore};
pub use task::{seed_tasks, Task, TaskId, TaskSession};
pub use timer::{PointerId, TimerController, TimerPhase, TimerState};
