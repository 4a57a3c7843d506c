//! Host-side post writes that fire lifecycle events.
//!
//! A host CMS saves a post and then notifies listeners with before/after
//! snapshots; a hard delete removes the post and then notifies with the last
//! snapshot. [`PostLifecycle`] does the same against a [`ShadowStore`] so a
//! whole site can be driven without a real host.

use crate::reconciler::{Reconciler, Transition};
use crate::SyncResult;
use shadow_storage::ShadowStore;
use shadow_types::{DeleteEvent, MutationEvent, Post, PostId};
use std::sync::Arc;
use tracing::debug;

/// Saves and deletes posts, reconciling the shadow index after each write.
pub struct PostLifecycle<S: ?Sized> {
    store: Arc<S>,
    reconciler: Reconciler<S>,
}

impl<S: ?Sized> Clone for PostLifecycle<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            reconciler: self.reconciler.clone(),
        }
    }
}

impl<S: ShadowStore + ?Sized> PostLifecycle<S> {
    pub fn new(store: Arc<S>, reconciler: Reconciler<S>) -> Self {
        Self { store, reconciler }
    }

    /// Inserts or updates a post, then reconciles.
    ///
    /// Errors only come from the post write itself; reconciliation failures
    /// are reported in the returned transition.
    pub fn save_post(&self, post: Post) -> SyncResult<Transition> {
        let before = self.store.get_post(post.id)?;
        self.store.save_post(&post)?;

        let event = match before {
            Some(before) => MutationEvent::updated(before, post),
            None => MutationEvent::created(post),
        };
        Ok(self.reconciler.handle_mutation(&event))
    }

    /// Permanently deletes a post, then reconciles. `None` when the post did
    /// not exist.
    pub fn delete_post(&self, id: PostId) -> SyncResult<Option<Transition>> {
        let Some(removed) = self.store.delete_post(id)? else {
            debug!("Delete of missing post {} ignored", id);
            return Ok(None);
        };
        Ok(Some(self.reconciler.handle_delete(&DeleteEvent::new(removed))))
    }

    /// Mirrors a host write described by `event` into the store, then
    /// reconciles using the event's own before/after snapshots.
    pub fn apply_mutation(&self, event: &MutationEvent) -> SyncResult<Transition> {
        self.store.save_post(&event.after)?;
        Ok(self.reconciler.handle_mutation(event))
    }

    /// Mirrors a host hard delete into the store, then reconciles.
    pub fn apply_delete(&self, event: &DeleteEvent) -> SyncResult<Transition> {
        if self.store.delete_post(event.post_id)?.is_none() {
            debug!("Delete event for unknown post {}", event.post_id);
        }
        Ok(self.reconciler.handle_delete(event))
    }
}
