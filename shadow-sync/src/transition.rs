//! The reconciliation state machine, without side effects.
//!
//! Given a mutation and what the index currently holds, [`plan`] decides which
//! single index action applies. Rules are tried in order and the first match
//! wins:
//!
//! 1. activation: not visible -> visible with no term occupying the new title
//! 2. rename: a term exists for the post, it is visible after the write, and
//!    the title or slug changed
//! 3. deactivation: not visible after the write and a term exists
//! 4. nothing
//!
//! The guards for visibility, support and registration run before this, in
//! [`crate::Reconciler`].

use shadow_model::ShadowTerm;
use shadow_types::MutationEvent;

/// The index action a mutation calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create a term and restore archived relationships.
    Activate,
    /// Update the existing term's name and slug in place.
    Rename { term: ShadowTerm },
    /// Archive the term's relationships, then delete it.
    Deactivate { term: ShadowTerm },
    /// Leave the index alone.
    Nothing,
}

/// Whether either side of the mutation is visible. When neither is, no index
/// activity can be relevant.
pub fn touches_index(event: &MutationEvent) -> bool {
    event.was_visible() || event.is_visible()
}

/// Whether the title or slug differs between before and after.
pub fn key_changed(event: &MutationEvent) -> bool {
    event.title_before() != event.after.title || event.slug_before() != event.after.slug
}

/// Decides the index action for a mutation.
///
/// `term_before` is the live term of the post before the write;
/// `after_occupied` tells whether some term already holds the new title.
pub fn plan(event: &MutationEvent, term_before: Option<&ShadowTerm>, after_occupied: bool) -> Action {
    if !event.was_visible() && event.is_visible() && !after_occupied {
        return Action::Activate;
    }

    match term_before {
        Some(term) if event.is_visible() && key_changed(event) => Action::Rename { term: term.clone() },
        Some(term) if !event.is_visible() => Action::Deactivate { term: term.clone() },
        _ => Action::Nothing,
    }
}
