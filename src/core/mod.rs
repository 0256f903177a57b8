pub mod compare;
pub mod confirm;
pub mod hierarchy;
pub mod session;
pub mod sync;
pub mod tasks;
pub mod timer;

pub use compare::compare_tasks;
pub use confirm::{AutoConfirm, Confirm, PromptConfirm};
pub use sync::{DeleteOutcome, PullOutcome, RenameOutcome, SessionLoad, SyncEngine, UploadReport};
pub use tasks::TaskLogic;
pub use timer::{ActiveTimer, TimerController};
