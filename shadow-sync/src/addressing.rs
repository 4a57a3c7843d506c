//! Addressing: maps a post to its shadow taxonomy and term, and back.
//!
//! Nothing here writes. Every "not found" comes back as `None`, an empty
//! string or the zero id; only storage failures are errors.

use crate::SyncResult;
use shadow_model::{Registry, ShadowTaxonomy, ShadowTerm, TermKey};
use shadow_storage::ShadowStore;
use shadow_types::{Post, PostId, TermId};
use std::sync::Arc;
use tracing::debug;

/// Lookups between posts, taxonomies and terms.
pub struct Addressing<S: ?Sized> {
    registry: Arc<Registry>,
    store: Arc<S>,
}

impl<S: ?Sized> Clone for Addressing<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ShadowStore + ?Sized> Addressing<S> {
    pub fn new(registry: Arc<Registry>, store: Arc<S>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The registered shadow taxonomy for the post's type.
    pub fn taxonomy_for(&self, post: &Post) -> Option<&ShadowTaxonomy> {
        self.registry.taxonomy_for_post_type(&post.post_type)
    }

    /// Taxonomy slug of a stored post. Empty when the post or its taxonomy
    /// does not exist.
    pub fn taxonomy_slug(&self, post_id: PostId) -> SyncResult<String> {
        let Some(post) = self.store.get_post(post_id)? else {
            return Ok(String::new());
        };
        Ok(self
            .taxonomy_for(&post)
            .map(|t| t.slug.clone())
            .unwrap_or_default())
    }

    /// Name and slug a term for this post should carry right now.
    pub fn term_key(&self, post: &Post) -> TermKey {
        TermKey::for_post(post)
    }

    /// The live term standing in for `post_id`.
    ///
    /// Joins on the term's foreign key first. Terms written before the key
    /// existed are found by name, and only if they carry no key of their own.
    pub fn live_term(&self, taxonomy: &str, post_id: PostId, title: &str) -> SyncResult<Option<ShadowTerm>> {
        if let Some(term) = self.store.term_by_post(taxonomy, post_id)? {
            return Ok(Some(term));
        }
        if title.is_empty() {
            return Ok(None);
        }
        Ok(self
            .store
            .term_by_name(taxonomy, title)?
            .filter(|t| t.post_id.is_none()))
    }

    /// Any term that already occupies `title` (or belongs to the post).
    ///
    /// Activation is skipped when this returns a term, even if the term
    /// belongs to a different post with the same title.
    pub fn occupying_term(&self, taxonomy: &str, post_id: PostId, title: &str) -> SyncResult<Option<ShadowTerm>> {
        if let Some(term) = self.store.term_by_post(taxonomy, post_id)? {
            return Ok(Some(term));
        }
        if title.is_empty() {
            return Ok(None);
        }
        Ok(self.store.term_by_name(taxonomy, title)?)
    }

    /// Live term id of a stored post, or the zero id.
    pub fn term_id(&self, post_id: PostId) -> SyncResult<TermId> {
        let Some(post) = self.store.get_post(post_id)? else {
            return Ok(TermId::default());
        };
        let Some(taxonomy) = self.taxonomy_for(&post) else {
            return Ok(TermId::default());
        };
        Ok(self
            .live_term(&taxonomy.slug, post_id, &post.title)?
            .map(|t| t.id)
            .unwrap_or_default())
    }

    /// The post a term stands in for.
    ///
    /// Uses the foreign key when present. Otherwise the post type is
    /// recovered from the taxonomy slug and the post is searched by title;
    /// no match or several matches both give `None`.
    pub fn post_id_for_term(&self, term_id: TermId) -> SyncResult<Option<PostId>> {
        let Some(term) = self.store.get_term(term_id)? else {
            return Ok(None);
        };

        if let Some(post_id) = term.post_id {
            return Ok(self.store.get_post(post_id)?.map(|p| p.id));
        }

        let Some(post_type) = self.registry.post_type_for_taxonomy(&term.taxonomy) else {
            return Ok(None);
        };
        let matches = self.store.find_posts_by_title(post_type, &term.name)?;
        match matches.as_slice() {
            [only] => Ok(Some(*only)),
            [] => Ok(None),
            _ => {
                debug!("Term {} matches {} posts by title, treating as unknown", term_id, matches.len());
                Ok(None)
            }
        }
    }

    /// Post types that may be related to `post_type`'s shadow terms.
    pub fn connected_post_types(&self, post_type: &str) -> Vec<String> {
        self.registry.connected_post_types(post_type)
    }

    /// Whether `slug` names a shadow taxonomy.
    pub fn is_shadow_taxonomy(&self, slug: &str) -> bool {
        self.registry.is_shadow_taxonomy(slug)
    }
}
