//! Core type definitions for shadow terms.
//!
//! This crate defines the fundamental types shared by every other crate:
//! - Post and term identifiers (host integer ids)
//! - Post statuses and the single visible status
//! - Post snapshots as observed before and after a mutation
//! - Lifecycle events delivered by the host (mutation, hard delete)

mod event;
mod ids;
mod post;
mod status;

pub use event::{DeleteEvent, MutationEvent};
pub use ids::{PostId, TermId};
pub use post::Post;
pub use status::PostStatus;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid id: {0}")]
    InvalidId(#[from] std::num::ParseIntError),
}
