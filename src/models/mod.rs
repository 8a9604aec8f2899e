pub mod change_log;
pub mod project;
pub mod time_entry;
pub mod work_order;

pub use change_log::ChangeLogRow;
pub use project::{Project, ProjectTask, TaskStatus};
pub use time_entry::{EntryEdit, LunchWindow, NewEntry, TimeEntry};
pub use work_order::{NewWorkOrder, Priority, WorkOrder, WorkOrderStatus};
