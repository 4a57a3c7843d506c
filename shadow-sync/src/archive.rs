//! Relationship archive.
//!
//! While a post has no live term, the ids of posts related to it are kept in
//! the post's own meta under `<taxonomy>_associated_posts`. Deactivation
//! writes the record; pending associations append to it; activation reads it
//! back and re-links every id.

use crate::addressing::Addressing;
use crate::SyncResult;
use serde_json::Value;
use shadow_storage::ShadowStore;
use shadow_types::{Post, PostId};
use std::collections::HashSet;
use std::sync::Arc;

/// Meta key holding the archive record for `taxonomy`.
pub fn meta_key(taxonomy: &str) -> String {
    format!("{taxonomy}_associated_posts")
}

/// Normalizes a stored record into a list of ids.
///
/// Every element is coerced to an integer id; zero ids are dropped and
/// duplicates keep their first position. A scalar is read as a one-element
/// list and anything falsy as empty.
pub fn normalize(value: &Value) -> Vec<PostId> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    };

    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(PostId::coerce)
        .filter(|id| !id.is_zero() && seen.insert(*id))
        .collect()
}

/// Reads and writes archive records.
pub struct RelationshipArchive<S: ?Sized> {
    addressing: Addressing<S>,
    store: Arc<S>,
}

impl<S: ?Sized> Clone for RelationshipArchive<S> {
    fn clone(&self) -> Self {
        Self {
            addressing: self.addressing.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ShadowStore + ?Sized> RelationshipArchive<S> {
    pub fn new(addressing: Addressing<S>, store: Arc<S>) -> Self {
        Self { addressing, store }
    }

    /// The archived ids for `post`. Empty when nothing is stored or the post
    /// has no taxonomy.
    pub fn read(&self, post: &Post) -> SyncResult<Vec<PostId>> {
        match self.addressing.taxonomy_for(post) {
            Some(taxonomy) => self.read_in(&taxonomy.slug, post.id),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrites the record for `post`. No-op without a taxonomy.
    pub fn write(&self, post: &Post, ids: &[PostId]) -> SyncResult<()> {
        match self.addressing.taxonomy_for(post) {
            Some(taxonomy) => self.write_in(&taxonomy.slug, post.id, ids),
            None => Ok(()),
        }
    }

    /// Reads the record stored for an already resolved taxonomy.
    pub fn read_in(&self, taxonomy: &str, post_id: PostId) -> SyncResult<Vec<PostId>> {
        Ok(self
            .store
            .get_meta(post_id, &meta_key(taxonomy))?
            .map(|v| normalize(&v))
            .unwrap_or_default())
    }

    /// Writes the record for an already resolved taxonomy, verbatim.
    pub fn write_in(&self, taxonomy: &str, post_id: PostId, ids: &[PostId]) -> SyncResult<()> {
        let value = serde_json::to_value(ids)?;
        self.store.set_meta(post_id, &meta_key(taxonomy), &value)?;
        Ok(())
    }
}
