use serde::{Deserialize, Serialize};
use std::fmt;

/// A task is its text. Duplicates are allowed; identity is position.
pub type Task = String;

pub const PENDING_KEY: &str = "tasks";
pub const COMPLETED_KEY: &str = "completedTasks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Pending,
    Completed,
}

impl ListKind {
    pub const ALL: [ListKind; 2] = [ListKind::Pending, ListKind::Completed];

    /// Durable key the list is persisted under.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Pending => PENDING_KEY,
            Self::Completed => COMPLETED_KEY,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
