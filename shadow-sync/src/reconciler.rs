//! Reconciler - applies post lifecycle events to the shadow index.
//!
//! The host calls in after a post write has already committed, so nothing
//! here may fail the write: [`Reconciler::handle_mutation`] and
//! [`Reconciler::handle_delete`] log storage failures and report them in the
//! returned [`Transition`] instead of propagating them.

use crate::addressing::Addressing;
use crate::archive::RelationshipArchive;
use crate::locks::EntityLocks;
use crate::transition::{self, Action};
use crate::SyncResult;
use serde::Serialize;
use shadow_model::{ShadowTaxonomy, ShadowTerm};
use shadow_storage::ShadowStore;
use shadow_types::{DeleteEvent, MutationEvent, PostId, TermId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why an event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Neither side of the mutation was visible.
    NotVisible,
    /// The post type does not support shadow terms.
    Unsupported,
    /// The post type's shadow taxonomy is not registered.
    NotRegistered,
}

/// What reconciling one event did to the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Transition {
    Skipped { reason: SkipReason },
    Activated { term: ShadowTerm, restored: Vec<PostId> },
    Renamed { term: ShadowTerm },
    Deactivated { term_id: TermId, archived: Vec<PostId> },
    Deleted { term_id: TermId },
    Unchanged,
    Failed { reason: String },
}

/// Keeps shadow terms in step with their posts.
pub struct Reconciler<S: ?Sized> {
    addressing: Addressing<S>,
    archive: RelationshipArchive<S>,
    store: Arc<S>,
    locks: Arc<EntityLocks>,
}

impl<S: ?Sized> Clone for Reconciler<S> {
    fn clone(&self) -> Self {
        Self {
            addressing: self.addressing.clone(),
            archive: self.archive.clone(),
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<S: ShadowStore + ?Sized> Reconciler<S> {
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

    /// Reconciles a create/update event. Never fails.
    pub fn handle_mutation(&self, event: &MutationEvent) -> Transition {
        self.try_handle_mutation(event).unwrap_or_else(|e| {
            warn!("Failed to reconcile shadow term for post {}: {}", event.post_id, e);
            Transition::Failed { reason: e.to_string() }
        })
    }

    /// Reconciles a hard delete. Never fails.
    pub fn handle_delete(&self, event: &DeleteEvent) -> Transition {
        self.try_handle_delete(event).unwrap_or_else(|e| {
            warn!("Failed to delete shadow term for post {}: {}", event.post_id, e);
            Transition::Failed { reason: e.to_string() }
        })
    }

    /// Like [`Self::handle_mutation`], but surfaces storage errors.
    pub fn try_handle_mutation(&self, event: &MutationEvent) -> SyncResult<Transition> {
        self.locks
            .with_lock(event.post_id, || self.reconcile_mutation(event))
    }

    /// Like [`Self::handle_delete`], but surfaces storage errors.
    pub fn try_handle_delete(&self, event: &DeleteEvent) -> SyncResult<Transition> {
        self.locks
            .with_lock(event.post_id, || self.reconcile_delete(event))
    }

    /// Resolves the taxonomy of a participating post type, or says why the
    /// event is skipped.
    fn participating_taxonomy(&self, post_type: &str) -> Result<&ShadowTaxonomy, SkipReason> {
        let registry = self.addressing.registry();
        if !registry.post_type_supports(post_type) {
            return Err(SkipReason::Unsupported);
        }
        registry
            .taxonomy_for_post_type(post_type)
            .ok_or(SkipReason::NotRegistered)
    }

    fn reconcile_mutation(&self, event: &MutationEvent) -> SyncResult<Transition> {
        if !transition::touches_index(event) {
            return Ok(skipped(event.post_id, SkipReason::NotVisible));
        }

        let taxonomy = match self.participating_taxonomy(&event.after.post_type) {
            Ok(taxonomy) => taxonomy,
            Err(reason) => return Ok(skipped(event.post_id, reason)),
        };

        let term_before = match event.before {
            Some(_) => self
                .addressing
                .live_term(&taxonomy.slug, event.post_id, event.title_before())?,
            None => None,
        };
        let after_occupied = self
            .addressing
            .occupying_term(&taxonomy.slug, event.post_id, &event.after.title)?
            .is_some();

        match transition::plan(event, term_before.as_ref(), after_occupied) {
            Action::Activate => self.activate(taxonomy, event),
            Action::Rename { term } => self.rename(term, event),
            Action::Deactivate { term } => self.deactivate(taxonomy, term, event.post_id),
            Action::Nothing => {
                debug!("No shadow term change for post {}", event.post_id);
                Ok(Transition::Unchanged)
            }
        }
    }

    fn activate(&self, taxonomy: &ShadowTaxonomy, event: &MutationEvent) -> SyncResult<Transition> {
        let archived = self.archive.read_in(&taxonomy.slug, event.post_id)?;

        let new_term = self
            .addressing
            .term_key(&event.after)
            .into_new_term(&taxonomy.slug, event.post_id);
        let term = self.store.insert_term(&new_term)?;
        info!(
            "Created shadow term {} ({}) in {} for post {}",
            term.id, term.slug, taxonomy.slug, event.post_id
        );

        let mut restored = Vec::with_capacity(archived.len());
        for object in archived {
            match self.store.add_relationship(object, term.id) {
                Ok(_) => restored.push(object),
                Err(e) => warn!("Failed to restore post {} onto term {}: {}", object, term.id, e),
            }
        }
        if !restored.is_empty() {
            debug!("Restored {} relationships onto term {}", restored.len(), term.id);
        }

        Ok(Transition::Activated { term, restored })
    }

    fn rename(&self, term: ShadowTerm, event: &MutationEvent) -> SyncResult<Transition> {
        let key = self.addressing.term_key(&event.after);
        let term = self.store.update_term(term.id, &key.name, &key.slug)?;
        info!(
            "Renamed shadow term {} to {:?} ({}) for post {}",
            term.id, term.name, term.slug, event.post_id
        );
        Ok(Transition::Renamed { term })
    }

    fn deactivate(&self, taxonomy: &ShadowTaxonomy, term: ShadowTerm, post_id: PostId) -> SyncResult<Transition> {
        let archived = self.store.objects_in_term(term.id)?;
        self.archive.write_in(&taxonomy.slug, post_id, &archived)?;
        self.store.delete_term(term.id)?;
        info!(
            "Removed shadow term {} for post {}, archived {} relationships",
            term.id,
            post_id,
            archived.len()
        );
        Ok(Transition::Deactivated {
            term_id: term.id,
            archived,
        })
    }

    fn reconcile_delete(&self, event: &DeleteEvent) -> SyncResult<Transition> {
        let taxonomy = match self.participating_taxonomy(&event.post.post_type) {
            Ok(taxonomy) => taxonomy,
            Err(reason) => return Ok(skipped(event.post_id, reason)),
        };

        let term = match self.store.term_by_post(&taxonomy.slug, event.post_id)? {
            Some(term) => Some(term),
            None if !event.post.slug.is_empty() => self
                .store
                .term_by_slug(&taxonomy.slug, &event.post.slug)?
                .filter(|t| t.may_belong_to(event.post_id)),
            None => None,
        };

        let Some(term) = term else {
            debug!("No shadow term to delete for post {}", event.post_id);
            return Ok(Transition::Unchanged);
        };

        self.store.delete_term(term.id)?;
        info!("Deleted shadow term {} for deleted post {}", term.id, event.post_id);
        Ok(Transition::Deleted { term_id: term.id })
    }
}

fn skipped(post_id: PostId, reason: SkipReason) -> Transition {
    debug!("Skipping shadow term sync for post {}: {:?}", post_id, reason);
    Transition::Skipped { reason }
}
