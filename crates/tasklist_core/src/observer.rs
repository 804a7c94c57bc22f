use crate::error::AppError;
use crate::model::{ListKind, Task};

/// Receives the full contents of a list after it changes.
///
/// Called once per changed list, after every list touched by the operation
/// has reached its final state.
pub trait ListObserver {
    fn list_changed(&mut self, kind: ListKind, tasks: &[Task]) -> Result<(), AppError>;
}

pub struct NoopObserver;

impl ListObserver for NoopObserver {
    fn list_changed(&mut self, _kind: ListKind, _tasks: &[Task]) -> Result<(), AppError> {
        Ok(())
    }
}

impl<F> ListObserver for F
where
    F: FnMut(ListKind, &[Task]) -> Result<(), AppError>,
{
    fn list_changed(&mut self, kind: ListKind, tasks: &[Task]) -> Result<(), AppError> {
        self(kind, tasks)
    }
}
