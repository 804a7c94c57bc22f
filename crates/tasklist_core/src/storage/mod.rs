//! Durable key-value storage and the text encoding used for task lists.

pub mod codec;
mod file_store;
mod memory;

pub use file_store::{FileStorage, SCHEMA_VERSION, store_path};
pub use memory::MemoryStorage;

use crate::error::AppError;
use std::rc::Rc;

/// String-keyed storage of text values.
///
/// Methods take `&self`; backends that need mutation handle it internally so
/// a single storage can be shared between the loader and the persisting
/// observer of one session.
pub trait KeyValueStorage {
    /// Returns `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        (**self).set(key, value)
    }
}
