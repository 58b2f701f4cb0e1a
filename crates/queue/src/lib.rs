//! Pending-alert queue for the dispatch pipeline.
//!
//! This crate provides:
//! - `AlertStore` trait for pluggable queue backends
//! - `MemoryAlertStore` for tests and embedding
//! - `FileAlertStore` (JSON lines) for the worker binary

pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use error::QueueError;
pub use file::FileAlertStore;
pub use memory::MemoryAlertStore;
pub use store::AlertStore;
