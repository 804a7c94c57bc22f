//! Loading lists from key-value storage and writing them back on change.

use crate::error::AppError;
use crate::model::{ListKind, Task};
use crate::observer::ListObserver;
use crate::storage::{KeyValueStorage, codec};
use tracing::{debug, warn};

/// Where a loaded list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    /// Nothing stored under the key yet.
    Absent,
    /// Reading or decoding failed; the list starts empty.
    Fallback(AppError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLoad {
    pub kind: ListKind,
    pub tasks: Vec<Task>,
    pub source: LoadSource,
}

impl ListLoad {
    pub fn error(&self) -> Option<&AppError> {
        match &self.source {
            LoadSource::Fallback(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialLoad {
    pub pending: ListLoad,
    pub completed: ListLoad,
}

impl InitialLoad {
    pub fn is_degraded(&self) -> bool {
        self.pending.is_degraded() || self.completed.is_degraded()
    }

    pub fn errors(&self) -> impl Iterator<Item = &AppError> {
        [&self.pending, &self.completed]
            .into_iter()
            .filter_map(ListLoad::error)
    }
}

#[derive(Debug)]
pub struct PersistenceBridge<S> {
    storage: S,
}

impl<S: KeyValueStorage> PersistenceBridge<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load_initial_state(&self) -> InitialLoad {
        InitialLoad {
            pending: self.load_list(ListKind::Pending),
            completed: self.load_list(ListKind::Completed),
        }
    }

    /// Loads one list. Never fails: problems are logged and reported in
    /// [`ListLoad::source`] with an empty list.
    pub fn load_list(&self, kind: ListKind) -> ListLoad {
        let key = kind.storage_key();
        let text = match self.storage.get(key) {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => {
                debug!(key, "nothing stored");
                return ListLoad {
                    kind,
                    tasks: Vec::new(),
                    source: LoadSource::Absent,
                };
            }
            Err(err) => return fallback(kind, err),
        };

        match codec::decode(&text) {
            Ok(tasks) => {
                debug!(key, count = tasks.len(), "loaded list");
                ListLoad {
                    kind,
                    tasks,
                    source: LoadSource::Stored,
                }
            }
            Err(err) => fallback(kind, err),
        }
    }

    /// Writes the full contents of `kind` under its key.
    pub fn persist(&self, kind: ListKind, tasks: &[Task]) -> Result<(), AppError> {
        let key = kind.storage_key();
        let text = codec::encode(tasks)?;
        match self.storage.set(key, &text) {
            Ok(()) => {
                debug!(key, count = tasks.len(), "persisted list");
                Ok(())
            }
            Err(err) => {
                warn!(key, error = %err, "failed to persist list");
                Err(err)
            }
        }
    }
}

impl<S: KeyValueStorage> ListObserver for PersistenceBridge<S> {
    fn list_changed(&mut self, kind: ListKind, tasks: &[Task]) -> Result<(), AppError> {
        self.persist(kind, tasks)
    }
}

fn fallback(kind: ListKind, err: AppError) -> ListLoad {
    warn!(key = kind.storage_key(), error = %err, "failed to load list, starting empty");
    ListLoad {
        kind,
        tasks: Vec::new(),
        source: LoadSource::Fallback(err),
    }
}
