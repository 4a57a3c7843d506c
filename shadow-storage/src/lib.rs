//! Storage layer for shadow terms.
//!
//! The engine talks to storage only through the ports in [`ports`]. Two
//! backends implement them:
//!
//! - [`MemoryStore`] keeps everything in process, for tests and embedding
//! - [`SqliteStore`] persists posts, terms, relationships and meta in SQLite

mod error;
mod memory;
pub mod ports;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use ports::{MetaStore, PostStore, RelationshipStore, ShadowStore, TermStore};
pub use sqlite::SqliteStore;
