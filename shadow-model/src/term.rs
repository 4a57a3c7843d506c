use crate::sanitize_title;
use serde::{Deserialize, Serialize};
use shadow_types::{Post, PostId, TermId};

/// A live shadow term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowTerm {
    pub id: TermId,
    pub taxonomy: String,
    /// Kept equal to the source post's title.
    pub name: String,
    /// Kept equal to the source post's slug. Unique within the taxonomy.
    pub slug: String,
    /// Source post. `None` for terms created before the foreign key existed.
    #[serde(default)]
    pub post_id: Option<PostId>,
}

impl ShadowTerm {
    /// Whether this term may stand in for `post_id`.
    ///
    /// Terms with a foreign key only match their own post; legacy terms match
    /// any post.
    pub fn may_belong_to(&self, post_id: PostId) -> bool {
        self.post_id.is_none_or(|owner| owner == post_id)
    }
}

/// Fields for inserting a new term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTerm {
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    pub post_id: Option<PostId>,
}

/// Addressable fields of a term derived from a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermKey {
    pub name: String,
    pub slug: String,
}

impl TermKey {
    /// Name = title and slug = slug at the time of the call. An empty post
    /// slug falls back to the sanitized title.
    pub fn for_post(post: &Post) -> Self {
        let slug = if post.slug.is_empty() {
            sanitize_title(&post.title)
        } else {
            post.slug.clone()
        };
        Self {
            name: post.title.clone(),
            slug,
        }
    }

    /// Turns the key into a term insert for `taxonomy`.
    pub fn into_new_term(self, taxonomy: &str, post_id: PostId) -> NewTerm {
        NewTerm {
            taxonomy: taxonomy.to_string(),
            name: self.name,
            slug: self.slug,
            post_id: Some(post_id),
        }
    }
}
