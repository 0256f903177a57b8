pub mod log_event;
pub mod sync_status;
pub mod task;
pub mod timer_log;

pub use log_event::LogEvent;
pub use sync_status::{SyncStatus, TaskView};
pub use task::Task;
pub use timer_log::TimerLog;
