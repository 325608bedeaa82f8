pub mod files;
pub mod storage;
pub mod tasks;
pub mod timer_state;

pub use files::{
    atomic_write, config_file, ensure_data_dir, get_data_dir, init_local_dir, read_file,
    storage_file,
};
pub use storage::KeyValueStore;
pub use tasks::{load_tasks, save_tasks};
pub use timer_state::{clear_timer, load_timer, save_timer};
