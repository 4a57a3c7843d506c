//! Reconciliation engine for shadow terms.
//!
//! Keeps one shadow term per published post of every participating post
//! type, and preserves the relationships pointing at a post while it is not
//! published.
//!
//! # Components
//!
//! - **Addressing**: post <-> taxonomy <-> term lookups, no side effects
//! - **Archive**: the out-of-band list of related posts kept in post meta
//! - **Transition**: the pure decision of which index action a mutation needs
//! - **Reconciler**: runs that decision against the store on every event
//! - **Associator**: relates two posts, or queues the relation while the
//!   source is unpublished
//! - **Lifecycle**: host-side saves and deletes that fire the events
//!
//! # Example
//!
//! ```
//! use shadow_model::{PostTypeDefinition, Registry};
//! use shadow_storage::MemoryStore;
//! use shadow_sync::{ShadowEngine, Transition};
//! use shadow_types::{Post, PostId, PostStatus};
//! use std::sync::Arc;
//!
//! let mut registry = Registry::new();
//! registry
//!     .register_post_type(PostTypeDefinition::new("example", "Example").with_shadow_terms(["post"]))
//!     .unwrap();
//! registry.register_taxonomies();
//!
//! let engine = ShadowEngine::new(Arc::new(registry), Arc::new(MemoryStore::new()));
//! let apple = Post::new(PostId::new(1), "example", "Apple", "apple", PostStatus::Publish);
//! let outcome = engine.lifecycle().save_post(apple).unwrap();
//! assert!(matches!(outcome, Transition::Activated { .. }));
//! ```

pub mod addressing;
pub mod archive;
pub mod associate;
mod engine;
mod error;
pub mod lifecycle;
pub mod locks;
pub mod reconciler;
pub mod transition;

pub use addressing::Addressing;
pub use archive::{meta_key, RelationshipArchive};
pub use associate::{AssociationRequest, AssociationResponse, Associator};
pub use engine::{ShadowEngine, ShadowFields};
pub use error::{SyncError, SyncResult};
pub use lifecycle::PostLifecycle;
pub use locks::EntityLocks;
pub use reconciler::{Reconciler, SkipReason, Transition};
pub use transition::Action;
