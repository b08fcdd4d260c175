//! Batch evaluation of interstate operations read from CSV files.

mod loader;

pub use loader::{BatchError, BatchLine, OperationLoader, OperationRecord, total_amount_due};
