pub mod config;
pub mod error;
pub mod model;
pub mod observer;
pub mod persistence;
pub mod session;
pub mod storage;
pub mod store;
