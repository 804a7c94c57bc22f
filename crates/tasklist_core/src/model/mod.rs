mod list;

pub use list::{COMPLETED_KEY, ListKind, PENDING_KEY, Task};
