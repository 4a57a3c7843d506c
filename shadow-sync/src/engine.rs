use crate::addressing::Addressing;
use crate::archive::RelationshipArchive;
use crate::associate::Associator;
use crate::lifecycle::PostLifecycle;
use crate::locks::EntityLocks;
use crate::reconciler::Reconciler;
use crate::SyncResult;
use serde::{Deserialize, Serialize};
use shadow_model::Registry;
use shadow_storage::ShadowStore;
use shadow_types::{PostId, TermId};
use std::sync::Arc;

/// Read-only shadow fields of a post, for display and API projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowFields {
    /// Taxonomy slug of the post's type; empty if it does not participate.
    pub taxonomy: String,
    /// Live term id; zero while the post is not visible.
    pub term_id: TermId,
    /// Archived or pending associations.
    pub associated_posts: Vec<PostId>,
}

/// All shadow term components wired to one registry, store and lock table.
pub struct ShadowEngine<S: ?Sized> {
    addressing: Addressing<S>,
    archive: RelationshipArchive<S>,
    reconciler: Reconciler<S>,
    associator: Associator<S>,
    lifecycle: PostLifecycle<S>,
    store: Arc<S>,
}

impl<S: ShadowStore + ?Sized> ShadowEngine<S> {
    pub fn new(registry: Arc<Registry>, store: Arc<S>) -> Self {
        let locks = Arc::new(EntityLocks::new());
        let addressing = Addressing::new(registry, Arc::clone(&store));
        let archive = RelationshipArchive::new(addressing.clone(), Arc::clone(&store));
        let reconciler = Reconciler::new(
            addressing.clone(),
            archive.clone(),
            Arc::clone(&store),
            Arc::clone(&locks),
        );
        let associator = Associator::new(
            addressing.clone(),
            archive.clone(),
            Arc::clone(&store),
            locks,
        );
        let lifecycle = PostLifecycle::new(Arc::clone(&store), reconciler.clone());

        Self {
            addressing,
            archive,
            reconciler,
            associator,
            lifecycle,
            store,
        }
    }

    pub fn addressing(&self) -> &Addressing<S> {
        &self.addressing
    }

    pub fn archive(&self) -> &RelationshipArchive<S> {
        &self.archive
    }

    pub fn reconciler(&self) -> &Reconciler<S> {
        &self.reconciler
    }

    pub fn associator(&self) -> &Associator<S> {
        &self.associator
    }

    pub fn lifecycle(&self) -> &PostLifecycle<S> {
        &self.lifecycle
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Derived shadow fields for a stored post. `None` if the post does not
    /// exist.
    pub fn shadow_fields(&self, post_id: PostId) -> SyncResult<Option<ShadowFields>> {
        let Some(post) = self.store.get_post(post_id)? else {
            return Ok(None);
        };
        let taxonomy = self
            .addressing
            .taxonomy_for(&post)
            .map(|t| t.slug.clone())
            .unwrap_or_default();
        Ok(Some(ShadowFields {
            taxonomy,
            term_id: self.addressing.term_id(post_id)?,
            associated_posts: self.archive.read(&post)?,
        }))
    }
}
