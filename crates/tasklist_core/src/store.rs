//! In-memory pending and completed lists and the operations that mutate them.

use crate::error::AppError;
use crate::model::{ListKind, Task};
use crate::observer::ListObserver;
use tracing::{debug, info, warn};

/// An observer that reported a failure while a change was being propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub kind: ListKind,
    pub error: AppError,
}

/// Result of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Text of the task that was added, removed or moved.
    pub task: Task,
    /// Lists touched, in notification order.
    pub lists: Vec<ListKind>,
    /// Failures reported by observers. The mutation stands regardless.
    pub failures: Vec<SyncFailure>,
}

impl Change {
    pub fn is_synced(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydrate {
    Applied,
    /// The list was mutated before the load arrived; the loaded data was dropped.
    Discarded,
}

#[derive(Default)]
pub struct TaskListStore {
    pending: Vec<Task>,
    completed: Vec<Task>,
    pending_mutated: bool,
    completed_mutated: bool,
    observers: Vec<Box<dyn ListObserver>>,
}

impl std::fmt::Debug for TaskListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskListStore")
            .field("pending", &self.pending)
            .field("completed", &self.completed)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TaskListStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn ListObserver>) {
        self.observers.push(observer);
    }

    pub fn pending(&self) -> &[Task] {
        &self.pending
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    pub fn list(&self, kind: ListKind) -> &[Task] {
        match kind {
            ListKind::Pending => &self.pending,
            ListKind::Completed => &self.completed,
        }
    }

    /// Whether `kind` has been changed by a mutation in this session.
    pub fn is_mutated(&self, kind: ListKind) -> bool {
        match kind {
            ListKind::Pending => self.pending_mutated,
            ListKind::Completed => self.completed_mutated,
        }
    }

    /// Installs a loaded list unless a mutation already touched it.
    ///
    /// Observers are not notified: loaded data is already durable.
    pub fn hydrate(&mut self, kind: ListKind, tasks: Vec<Task>) -> Hydrate {
        if self.is_mutated(kind) {
            info!(list = %kind, "discarding late load, list already changed");
            return Hydrate::Discarded;
        }

        debug!(list = %kind, count = tasks.len(), "hydrating list");
        match kind {
            ListKind::Pending => self.pending = tasks,
            ListKind::Completed => self.completed = tasks,
        }
        Hydrate::Applied
    }

    /// Appends `text` to the pending list. Blank text is ignored and yields `None`.
    pub fn add_task(&mut self, text: &str) -> Option<Change> {
        if text.trim().is_empty() {
            debug!("ignoring blank task");
            return None;
        }

        self.pending.push(text.to_string());
        Some(self.commit(text.to_string(), &[ListKind::Pending]))
    }

    pub fn delete_task(&mut self, index: usize) -> Result<Change, AppError> {
        check_index(ListKind::Pending, index, self.pending.len())?;
        let removed = self.pending.remove(index);
        Ok(self.commit(removed, &[ListKind::Pending]))
    }

    /// Moves the pending task at `index` to the end of the completed list.
    pub fn complete_task(&mut self, index: usize) -> Result<Change, AppError> {
        check_index(ListKind::Pending, index, self.pending.len())?;
        let moved = self.pending.remove(index);
        self.completed.push(moved.clone());
        Ok(self.commit(moved, &[ListKind::Pending, ListKind::Completed]))
    }

    pub fn delete_completed_task(&mut self, index: usize) -> Result<Change, AppError> {
        check_index(ListKind::Completed, index, self.completed.len())?;
        let removed = self.completed.remove(index);
        Ok(self.commit(removed, &[ListKind::Completed]))
    }

    fn commit(&mut self, task: Task, lists: &[ListKind]) -> Change {
        let mut failures = Vec::new();

        for &kind in lists {
            match kind {
                ListKind::Pending => self.pending_mutated = true,
                ListKind::Completed => self.completed_mutated = true,
            }
        }

        for &kind in lists {
            let tasks = match kind {
                ListKind::Pending => &self.pending,
                ListKind::Completed => &self.completed,
            };
            for observer in &mut self.observers {
                if let Err(error) = observer.list_changed(kind, tasks) {
                    warn!(list = %kind, %error, "change observer failed");
                    failures.push(SyncFailure { kind, error });
                }
            }
        }

        Change {
            task,
            lists: lists.to_vec(),
            failures,
        }
    }
}

fn check_index(kind: ListKind, index: usize, len: usize) -> Result<(), AppError> {
    if index < len {
        Ok(())
    } else {
        warn!(list = %kind, index, len, "rejecting out-of-range index");
        Err(AppError::invalid_index(kind, index, len))
    }
}

#[cfg(test)]
mod tests {
    use super::{Hydrate, TaskListStore};
    use crate::error::AppError;
    use crate::model::{ListKind, Task};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Seen = Rc<RefCell<Vec<(ListKind, Vec<Task>)>>>;

    fn recording_store() -> (TaskListStore, Seen) {
        let seen: Seen = Rc::default();
        let sink = Rc::clone(&seen);
        let mut store = TaskListStore::new();
        store.subscribe(Box::new(
            move |kind: ListKind, tasks: &[Task]| -> Result<(), AppError> {
                sink.borrow_mut().push((kind, tasks.to_vec()));
                Ok(())
            },
        ));
        (store, seen)
    }

    fn store_with(pending: &[&str], completed: &[&str]) -> TaskListStore {
        let mut store = TaskListStore::new();
        store.hydrate(
            ListKind::Pending,
            pending.iter().map(|s| s.to_string()).collect(),
        );
        store.hydrate(
            ListKind::Completed,
            completed.iter().map(|s| s.to_string()).collect(),
        );
        store
    }

    #[test]
    fn add_task_appends_to_pending() {
        let mut store = TaskListStore::new();

        let change = store.add_task("Buy milk").unwrap();

        assert_eq!(store.pending(), ["Buy milk"]);
        assert!(store.completed().is_empty());
        assert_eq!(change.task, "Buy milk");
        assert_eq!(change.lists, vec![ListKind::Pending]);
        assert!(change.is_synced());
    }

    #[test]
    fn add_task_keeps_text_as_typed() {
        let mut store = TaskListStore::new();
        store.add_task("  padded  ").unwrap();
        assert_eq!(store.pending(), ["  padded  "]);
    }

    #[test]
    fn add_task_allows_duplicates() {
        let mut store = TaskListStore::new();
        store.add_task("same");
        store.add_task("same");
        assert_eq!(store.pending(), ["same", "same"]);
    }

    #[test]
    fn add_task_ignores_blank_text() {
        let (mut store, seen) = recording_store();

        assert!(store.add_task("").is_none());
        assert!(store.add_task("   ").is_none());
        assert!(store.add_task("\t\n").is_none());

        assert!(store.pending().is_empty());
        assert!(seen.borrow().is_empty());
        assert!(!store.is_mutated(ListKind::Pending));
    }

    #[test]
    fn complete_task_moves_to_end_of_completed() {
        let mut store = store_with(&["Buy milk", "Walk dog"], &["Old"]);

        let change = store.complete_task(0).unwrap();

        assert_eq!(store.pending(), ["Walk dog"]);
        assert_eq!(store.completed(), ["Old", "Buy milk"]);
        assert_eq!(change.task, "Buy milk");
        assert_eq!(change.lists, vec![ListKind::Pending, ListKind::Completed]);
    }

    #[test]
    fn complete_task_notifies_both_lists_with_final_state() {
        let (mut store, seen) = recording_store();
        store.hydrate(ListKind::Pending, vec!["a".into(), "b".into()]);

        store.complete_task(1).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (ListKind::Pending, vec!["a".to_string()]));
        assert_eq!(seen[1], (ListKind::Completed, vec!["b".to_string()]));
    }

    #[test]
    fn delete_task_removes_only_from_pending() {
        let mut store = store_with(&["a", "b", "c"], &["x"]);

        let change = store.delete_task(1).unwrap();

        assert_eq!(change.task, "b");
        assert_eq!(store.pending(), ["a", "c"]);
        assert_eq!(store.completed(), ["x"]);
    }

    #[test]
    fn delete_completed_task_removes_only_from_completed() {
        let mut store = store_with(&["a"], &["Buy milk"]);

        let change = store.delete_completed_task(0).unwrap();

        assert_eq!(change.task, "Buy milk");
        assert_eq!(change.lists, vec![ListKind::Completed]);
        assert!(store.completed().is_empty());
        assert_eq!(store.pending(), ["a"]);
    }

    #[test]
    fn out_of_range_index_is_rejected_without_side_effects() {
        let (mut store, seen) = recording_store();
        store.hydrate(ListKind::Pending, vec!["a".into()]);

        let err = store.delete_task(1).unwrap_err();
        assert_eq!(
            err,
            AppError::InvalidIndex {
                list: ListKind::Pending,
                index: 1,
                len: 1
            }
        );
        assert_eq!(store.complete_task(5).unwrap_err().code(), "invalid_index");
        assert_eq!(
            store.delete_completed_task(0).unwrap_err().code(),
            "invalid_index"
        );

        assert_eq!(store.pending(), ["a"]);
        assert!(store.completed().is_empty());
        assert!(seen.borrow().is_empty());
        assert!(!store.is_mutated(ListKind::Pending));
    }

    #[test]
    fn observer_failures_are_reported_but_mutation_stands() {
        let mut store = TaskListStore::new();
        store.subscribe(Box::new(
            |kind: ListKind, _tasks: &[Task]| -> Result<(), AppError> {
                Err(AppError::storage_unavailable(format!("{kind} down")))
            },
        ));

        let change = store.add_task("Buy milk").unwrap();

        assert_eq!(store.pending(), ["Buy milk"]);
        assert!(!change.is_synced());
        assert_eq!(change.failures.len(), 1);
        assert_eq!(change.failures[0].kind, ListKind::Pending);
        assert_eq!(change.failures[0].error.code(), "storage_unavailable");
    }

    #[test]
    fn hydrate_is_discarded_after_mutation() {
        let mut store = TaskListStore::new();
        store.add_task("typed before load");

        let outcome = store.hydrate(ListKind::Pending, vec!["stored".into()]);

        assert_eq!(outcome, Hydrate::Discarded);
        assert_eq!(store.pending(), ["typed before load"]);
    }

    #[test]
    fn hydrate_of_untouched_list_still_applies() {
        let mut store = TaskListStore::new();
        store.add_task("new");

        let outcome = store.hydrate(ListKind::Completed, vec!["done".into()]);

        assert_eq!(outcome, Hydrate::Applied);
        assert_eq!(store.completed(), ["done"]);
    }

    #[test]
    fn hydrate_does_not_notify() {
        let (mut store, seen) = recording_store();
        store.hydrate(ListKind::Pending, vec!["a".into()]);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn scenario_add_complete_delete() {
        let mut store = TaskListStore::new();
        store.add_task("Buy milk");
        assert_eq!(store.pending(), ["Buy milk"]);
        assert!(store.completed().is_empty());

        store.add_task("Walk dog");
        store.complete_task(0).unwrap();
        assert_eq!(store.pending(), ["Walk dog"]);
        assert_eq!(store.completed(), ["Buy milk"]);

        store.delete_completed_task(0).unwrap();
        assert!(store.completed().is_empty());
    }

    proptest! {
        #[test]
        fn non_blank_adds_append_in_order(texts in prop::collection::vec("[a-z]{1,8}( [a-z]{1,8})?", 0..20)) {
            let mut store = TaskListStore::new();
            for text in &texts {
                prop_assert!(store.add_task(text).is_some());
            }
            prop_assert_eq!(store.pending(), texts.as_slice());
        }

        #[test]
        fn complete_moves_exactly_one_task(
            texts in prop::collection::vec("[a-z]{1,8}", 1..12),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut store = TaskListStore::new();
            for text in &texts {
                store.add_task(text);
            }
            let index = pick.index(texts.len());

            store.complete_task(index).unwrap();

            prop_assert_eq!(store.pending().len(), texts.len() - 1);
            prop_assert_eq!(store.completed().len(), 1);
            prop_assert_eq!(&store.completed()[0], &texts[index]);
            prop_assert_eq!(store.pending().len() + store.completed().len(), texts.len());
        }

        #[test]
        fn deletes_shrink_one_list_only(
            pending in prop::collection::vec("[a-z]{1,8}", 1..10),
            completed in prop::collection::vec("[a-z]{1,8}", 1..10),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut store = TaskListStore::new();
            store.hydrate(ListKind::Pending, pending.clone());
            store.hydrate(ListKind::Completed, completed.clone());

            store.delete_task(pick.index(pending.len())).unwrap();
            prop_assert_eq!(store.pending().len(), pending.len() - 1);
            prop_assert_eq!(store.completed(), completed.as_slice());

            let remaining_pending = store.pending().to_vec();
            store.delete_completed_task(pick.index(completed.len())).unwrap();
            prop_assert_eq!(store.completed().len(), completed.len() - 1);
            prop_assert_eq!(store.pending(), remaining_pending.as_slice());
        }

        #[test]
        fn out_of_range_never_changes_lists(
            pending in prop::collection::vec("[a-z]{1,8}", 0..6),
            extra in 0usize..10,
        ) {
            let mut store = TaskListStore::new();
            store.hydrate(ListKind::Pending, pending.clone());

            prop_assert!(store.delete_task(pending.len() + extra).is_err());
            prop_assert!(store.complete_task(pending.len() + extra).is_err());
            prop_assert_eq!(store.pending(), pending.as_slice());
            prop_assert!(store.completed().is_empty());
        }
    }
}
