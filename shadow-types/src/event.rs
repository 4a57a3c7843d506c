//! Lifecycle events delivered by the host.
//!
//! The host fires exactly two kinds of events at the shadow index: one per
//! create/update of a post (with before and after snapshots) and one per hard
//! delete. Both are immutable once built.

use crate::{Post, PostId, PostStatus};
use serde::{Deserialize, Serialize};

/// A post was created or updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationEvent {
    pub post_id: PostId,
    /// The post after the write committed.
    pub after: Post,
    /// Whether this is an update of an existing post.
    #[serde(default)]
    pub is_update: bool,
    /// The post before the write. Absent for new posts.
    #[serde(default)]
    pub before: Option<Post>,
}

impl MutationEvent {
    /// Event for a newly inserted post.
    pub fn created(after: Post) -> Self {
        Self {
            post_id: after.id,
            after,
            is_update: false,
            before: None,
        }
    }

    /// Event for an update of an existing post.
    pub fn updated(before: Post, after: Post) -> Self {
        Self {
            post_id: after.id,
            after,
            is_update: true,
            before: Some(before),
        }
    }

    /// Status before the mutation, if the post existed.
    pub fn status_before(&self) -> Option<&PostStatus> {
        self.before.as_ref().map(|p| &p.status)
    }

    /// Title before the mutation. Empty for new posts.
    pub fn title_before(&self) -> &str {
        self.before.as_ref().map_or("", |p| p.title.as_str())
    }

    /// Slug before the mutation. Empty for new posts.
    pub fn slug_before(&self) -> &str {
        self.before.as_ref().map_or("", |p| p.slug.as_str())
    }

    /// Whether the post was visible before the mutation.
    pub fn was_visible(&self) -> bool {
        self.status_before().is_some_and(PostStatus::is_visible)
    }

    /// Whether the post is visible after the mutation.
    pub fn is_visible(&self) -> bool {
        self.after.is_visible()
    }
}

/// A post was permanently deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteEvent {
    pub post_id: PostId,
    /// The post as it was right before deletion.
    pub post: Post,
}

impl DeleteEvent {
    pub fn new(post: Post) -> Self {
        Self {
            post_id: post.id,
            post,
        }
    }
}
