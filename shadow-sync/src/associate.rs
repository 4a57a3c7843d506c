//! Relating one post to another through the source post's shadow term.
//!
//! A published source gets the relationship written straight into the
//! index. An unpublished source has no term to point at, so the target is
//! parked in the source's archive record and linked on activation.

use crate::addressing::Addressing;
use crate::archive::RelationshipArchive;
use crate::locks::EntityLocks;
use crate::SyncResult;
use serde::{Deserialize, Deserializer, Serialize};
use shadow_storage::ShadowStore;
use shadow_types::{PostId, PostStatus};
use std::sync::Arc;
use tracing::{debug, info};

pub const MSG_NO_TAXONOMY: &str = "No shadow taxonomy is available for the source post.";
pub const MSG_NO_TERM: &str = "The source post has no shadow term.";
pub const MSG_INVALID_TARGET: &str = "A valid target post is required.";
pub const MSG_PENDING: &str = "Association saved and will apply once the source post is published.";
pub const MSG_ASSOCIATED: &str = "Posts associated.";

/// Reads an id leniently: numbers and numeric strings parse, anything else
/// (including `null`) becomes the zero id.
fn lenient_post_id<'de, D>(deserializer: D) -> Result<PostId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(PostId::coerce(&value))
}

/// Body of an association request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRequest {
    #[serde(default, deserialize_with = "lenient_post_id")]
    pub source_id: PostId,
    #[serde(default, deserialize_with = "lenient_post_id")]
    pub target_id: PostId,
}

/// Result of an association request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationResponse {
    pub success: bool,
    pub message: String,
    pub posts: Vec<PostId>,
}

impl AssociationResponse {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            posts: Vec::new(),
        }
    }

    fn success(message: &str, posts: Vec<PostId>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            posts,
        }
    }
}

/// Executes association requests.
pub struct Associator<S: ?Sized> {
    addressing: Addressing<S>,
    archive: RelationshipArchive<S>,
    store: Arc<S>,
    locks: Arc<EntityLocks>,
}

impl<S: ?Sized> Clone for Associator<S> {
    fn clone(&self) -> Self {
        Self {
            addressing: self.addressing.clone(),
            archive: self.archive.clone(),
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<S: ShadowStore + ?Sized> Associator<S> {
    pub fn new(
        addressing: Addressing<S>,
        archive: RelationshipArchive<S>,
        store: Arc<S>,
        locks: Arc<EntityLocks>,
    ) -> Self {
        Self {
            addressing,
            archive,
            store,
            locks,
        }
    }

    /// Relates `target` to `source`'s shadow term, or queues it while the
    /// source is not visible.
    ///
    /// Not-found conditions are reported in the response; only storage
    /// failures are errors.
    pub fn associate(&self, source: PostId, target: PostId) -> SyncResult<AssociationResponse> {
        self.locks.with_lock(source, || self.associate_locked(source, target))
    }

    /// Convenience wrapper taking the wire request.
    pub fn handle(&self, request: &AssociationRequest) -> SyncResult<AssociationResponse> {
        self.associate(request.source_id, request.target_id)
    }

    fn associate_locked(&self, source: PostId, target: PostId) -> SyncResult<AssociationResponse> {
        let Some(post) = self.store.get_post(source)? else {
            debug!("Association source {} does not exist", source);
            return Ok(AssociationResponse::failure(MSG_NO_TAXONOMY));
        };
        let Some(taxonomy) = self.addressing.taxonomy_for(&post) else {
            debug!("Association source {} has no shadow taxonomy", source);
            return Ok(AssociationResponse::failure(MSG_NO_TAXONOMY));
        };
        if target.is_zero() {
            return Ok(AssociationResponse::failure(MSG_INVALID_TARGET));
        }

        if !post.is_visible() {
            let mut pending = self.archive.read_in(&taxonomy.slug, source)?;
            if !pending.contains(&target) {
                pending.push(target);
            }
            self.archive.write_in(&taxonomy.slug, source, &pending)?;
            debug!("Queued post {} for unpublished post {}", target, source);
            return Ok(AssociationResponse::success(MSG_PENDING, pending));
        }

        let Some(term) = self.addressing.live_term(&taxonomy.slug, source, &post.title)? else {
            return Ok(AssociationResponse::failure(MSG_NO_TERM));
        };
        self.store.add_relationship(target, term.id)?;
        info!("Related post {} to shadow term {} of post {}", target, term.id, source);

        let mut related = Vec::new();
        for object in self.store.objects_in_term(term.id)? {
            let listed = self
                .store
                .get_post(object)?
                .is_some_and(|p| matches!(p.status, PostStatus::Publish | PostStatus::Draft));
            if listed {
                related.push(object);
            }
        }
        Ok(AssociationResponse::success(MSG_ASSOCIATED, related))
    }
}
