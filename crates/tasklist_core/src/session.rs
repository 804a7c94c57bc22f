use crate::config::Config;
use crate::error::AppError;
use crate::model::{ListKind, Task};
use crate::persistence::{InitialLoad, ListLoad, PersistenceBridge};
use crate::storage::{FileStorage, KeyValueStorage, store_path};
use crate::store::{Hydrate, TaskListStore};
use std::rc::Rc;
use tracing::info;

/// One application run: the store, loaded from storage and persisting back to it.
///
/// Both lists are loaded before the persistence bridge is subscribed, so no
/// mutation can precede the initial load.
#[derive(Debug)]
pub struct Session<S: KeyValueStorage + 'static> {
    loader: PersistenceBridge<Rc<S>>,
    store: TaskListStore,
    initial: InitialLoad,
}

impl<S: KeyValueStorage + 'static> Session<S> {
    pub fn open(storage: S) -> Self {
        let storage = Rc::new(storage);
        let loader = PersistenceBridge::new(Rc::clone(&storage));
        let initial = loader.load_initial_state();

        let mut store = TaskListStore::new();
        store.hydrate(ListKind::Pending, initial.pending.tasks.clone());
        store.hydrate(ListKind::Completed, initial.completed.tasks.clone());
        store.subscribe(Box::new(PersistenceBridge::new(storage)));

        info!(
            pending = store.pending().len(),
            completed = store.completed().len(),
            degraded = initial.is_degraded(),
            "session opened"
        );

        Self {
            loader,
            store,
            initial,
        }
    }

    pub fn storage(&self) -> &S {
        self.loader.storage()
    }

    pub fn initial_load(&self) -> &InitialLoad {
        &self.initial
    }

    pub fn store(&self) -> &TaskListStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskListStore {
        &mut self.store
    }

    /// Reloads the completed list for the completed view.
    ///
    /// The stored copy replaces memory only while this session has not
    /// changed the completed list; otherwise memory wins.
    pub fn show_completed(&mut self) -> (ListLoad, Hydrate) {
        let load = self.loader.load_list(ListKind::Completed);
        let outcome = if load.is_degraded() {
            Hydrate::Discarded
        } else {
            self.store.hydrate(ListKind::Completed, load.tasks.clone())
        };
        (load, outcome)
    }

    pub fn completed(&self) -> &[Task] {
        self.store.completed()
    }
}

impl Session<FileStorage> {
    /// Opens a session on the file storage resolved from `config`.
    pub fn open_default(config: &Config) -> Result<Self, AppError> {
        let path = store_path(config.store_path.as_deref())?;
        info!(path = %path.display(), "using file storage");
        Ok(Self::open(FileStorage::new(path)))
    }
}
