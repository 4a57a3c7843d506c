//! Storage ports.
//!
//! The reconciler never reaches storage through globals; every read and write
//! goes through one of these traits. A backend implements all four and gets
//! [`ShadowStore`] for free.

use crate::StorageResult;
use shadow_model::{NewTerm, ShadowTerm};
use shadow_types::{Post, PostId, TermId};

/// Host post lookup. Saving and deleting are host-side operations used by the
/// lifecycle driver; the reconciler itself only reads.
pub trait PostStore: Send + Sync {
    fn get_post(&self, id: PostId) -> StorageResult<Option<Post>>;

    /// Ids of posts of `post_type` whose title equals `title`, ascending.
    fn find_posts_by_title(&self, post_type: &str, title: &str) -> StorageResult<Vec<PostId>>;

    /// Inserts or replaces a post.
    fn save_post(&self, post: &Post) -> StorageResult<()>;

    /// Removes a post together with its meta and the relationships in which
    /// it is the object. Returns the removed post.
    fn delete_post(&self, id: PostId) -> StorageResult<Option<Post>>;
}

/// Shadow term CRUD.
pub trait TermStore: Send + Sync {
    fn get_term(&self, id: TermId) -> StorageResult<Option<ShadowTerm>>;

    /// First term (lowest id) in `taxonomy` named `name`.
    fn term_by_name(&self, taxonomy: &str, name: &str) -> StorageResult<Option<ShadowTerm>>;

    fn term_by_slug(&self, taxonomy: &str, slug: &str) -> StorageResult<Option<ShadowTerm>>;

    /// The term whose foreign key points at `post_id`.
    fn term_by_post(&self, taxonomy: &str, post_id: PostId) -> StorageResult<Option<ShadowTerm>>;

    /// Inserts a term. Fails with `Conflict` if the slug is taken in the
    /// taxonomy.
    fn insert_term(&self, term: &NewTerm) -> StorageResult<ShadowTerm>;

    /// Updates name and slug in place, keeping the id.
    fn update_term(&self, id: TermId, name: &str, slug: &str) -> StorageResult<ShadowTerm>;

    /// Deletes a term and every relationship pointing at it.
    fn delete_term(&self, id: TermId) -> StorageResult<bool>;
}

/// Object <-> term relationships.
pub trait RelationshipStore: Send + Sync {
    /// Relates `object` to `term`. Returns false if it already was.
    fn add_relationship(&self, object: PostId, term: TermId) -> StorageResult<bool>;

    /// Objects related to `term`, ascending.
    fn objects_in_term(&self, term: TermId) -> StorageResult<Vec<PostId>>;

    /// Terms of `taxonomy` related to `object`, ascending by id.
    fn terms_for_object(&self, object: PostId, taxonomy: &str) -> StorageResult<Vec<ShadowTerm>>;
}

/// Arbitrary per-post attachments.
pub trait MetaStore: Send + Sync {
    fn get_meta(&self, post: PostId, key: &str) -> StorageResult<Option<serde_json::Value>>;

    fn set_meta(&self, post: PostId, key: &str, value: &serde_json::Value) -> StorageResult<()>;

    fn delete_meta(&self, post: PostId, key: &str) -> StorageResult<bool>;
}

/// Everything the shadow term engine needs from storage.
pub trait ShadowStore: PostStore + TermStore + RelationshipStore + MetaStore {}

impl<T> ShadowStore for T where T: PostStore + TermStore + RelationshipStore + MetaStore {}
