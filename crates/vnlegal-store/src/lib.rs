//! VnLegal Store: SQLite persistence for documents and their legal blocks.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteStore;
pub use types::*;
