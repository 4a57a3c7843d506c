use crate::{PostId, PostStatus};
use serde::{Deserialize, Serialize};

/// A snapshot of a post as seen by the host at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub post_type: String,
    #[serde(default)]
    pub title: String,
    /// URL-safe label, edited independently of the title.
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub status: PostStatus,
}

impl Post {
    /// Creates a post snapshot.
    pub fn new(
        id: PostId,
        post_type: impl Into<String>,
        title: impl Into<String>,
        slug: impl Into<String>,
        status: PostStatus,
    ) -> Self {
        Self {
            id,
            post_type: post_type.into(),
            title: title.into(),
            slug: slug.into(),
            status,
        }
    }

    /// Whether the post is currently publicly visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.status.is_visible()
    }
}
