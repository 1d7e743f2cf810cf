//! # Storage Module
//!
//! Persistence for students, challans and challan items behind the
//! [`StudentStorage`] and [`ChallanStorage`] traits. The domain layer only
//! sees the traits, so the SQLite store used by the application and the
//! in-memory store used by unit tests are interchangeable.
//!
//! ## Persisted formats
//!
//! - Dates: `YYYY-MM-DD` text
//! - Student status: `Active|Inactive|Withdrawn|Graduated|Passed Out`
//! - Challan status: `Unpaid|Paid`
//! - Amounts: plain non-negative numbers, no currency symbol

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryConnection;
pub use sqlite::DbConnection;
pub use traits::*;

/// Typed storage failures the domain layer reacts to. Anything else is
/// carried as an opaque `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A foreign-key or uniqueness rule rejected the write
    #[error("constraint violated: {0}")]
    Conflict(String),
    /// A stored value could not be decoded
    #[error("corrupt {column} value '{value}'")]
    Corrupt { column: &'static str, value: String },
}
