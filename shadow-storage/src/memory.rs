//! In-process storage backend.

use crate::ports::{MetaStore, PostStore, RelationshipStore, TermStore};
use crate::{StorageError, StorageResult};
use shadow_model::{NewTerm, ShadowTerm};
use shadow_types::{Post, PostId, TermId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    posts: BTreeMap<PostId, Post>,
    terms: BTreeMap<TermId, ShadowTerm>,
    /// (term, object) pairs.
    relationships: BTreeSet<(TermId, PostId)>,
    meta: HashMap<(PostId, String), serde_json::Value>,
    last_term_id: i64,
}

impl Tables {
    fn slug_taken(&self, taxonomy: &str, slug: &str, except: Option<TermId>) -> bool {
        self.terms
            .values()
            .any(|t| t.taxonomy == taxonomy && t.slug == slug && Some(t.id) != except)
    }

    fn find_term(&self, pred: impl Fn(&ShadowTerm) -> bool) -> Option<ShadowTerm> {
        self.terms.values().find(|t| pred(t)).cloned()
    }
}

/// Storage backend holding every table in memory behind one mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StorageResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Number of stored terms across all taxonomies.
    pub fn term_count(&self) -> StorageResult<usize> {
        Ok(self.tables()?.terms.len())
    }
}

impl PostStore for MemoryStore {
    fn get_post(&self, id: PostId) -> StorageResult<Option<Post>> {
        Ok(self.tables()?.posts.get(&id).cloned())
    }

    fn find_posts_by_title(&self, post_type: &str, title: &str) -> StorageResult<Vec<PostId>> {
        Ok(self
            .tables()?
            .posts
            .values()
            .filter(|p| p.post_type == post_type && p.title == title)
            .map(|p| p.id)
            .collect())
    }

    fn save_post(&self, post: &Post) -> StorageResult<()> {
        if post.id.is_zero() {
            return Err(StorageError::InvalidData("post id must not be zero".into()));
        }
        self.tables()?.posts.insert(post.id, post.clone());
        Ok(())
    }

    fn delete_post(&self, id: PostId) -> StorageResult<Option<Post>> {
        let mut tables = self.tables()?;
        let removed = tables.posts.remove(&id);
        if removed.is_some() {
            tables.relationships.retain(|(_, object)| *object != id);
            tables.meta.retain(|(post, _), _| *post != id);
        }
        Ok(removed)
    }
}

impl TermStore for MemoryStore {
    fn get_term(&self, id: TermId) -> StorageResult<Option<ShadowTerm>> {
        Ok(self.tables()?.terms.get(&id).cloned())
    }

    fn term_by_name(&self, taxonomy: &str, name: &str) -> StorageResult<Option<ShadowTerm>> {
        Ok(self
            .tables()?
            .find_term(|t| t.taxonomy == taxonomy && t.name == name))
    }

    fn term_by_slug(&self, taxonomy: &str, slug: &str) -> StorageResult<Option<ShadowTerm>> {
        Ok(self
            .tables()?
            .find_term(|t| t.taxonomy == taxonomy && t.slug == slug))
    }

    fn term_by_post(&self, taxonomy: &str, post_id: PostId) -> StorageResult<Option<ShadowTerm>> {
        Ok(self
            .tables()?
            .find_term(|t| t.taxonomy == taxonomy && t.post_id == Some(post_id)))
    }

    fn insert_term(&self, term: &NewTerm) -> StorageResult<ShadowTerm> {
        if term.slug.is_empty() {
            return Err(StorageError::InvalidData("term slug must not be empty".into()));
        }
        let mut tables = self.tables()?;
        if tables.slug_taken(&term.taxonomy, &term.slug, None) {
            return Err(StorageError::Conflict(format!(
                "term slug {} already exists in {}",
                term.slug, term.taxonomy
            )));
        }

        tables.last_term_id += 1;
        let stored = ShadowTerm {
            id: TermId::new(tables.last_term_id),
            taxonomy: term.taxonomy.clone(),
            name: term.name.clone(),
            slug: term.slug.clone(),
            post_id: term.post_id,
        };
        tables.terms.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update_term(&self, id: TermId, name: &str, slug: &str) -> StorageResult<ShadowTerm> {
        let mut tables = self.tables()?;
        let taxonomy = tables
            .terms
            .get(&id)
            .map(|t| t.taxonomy.clone())
            .ok_or_else(|| StorageError::NotFound(format!("term {id}")))?;
        if tables.slug_taken(&taxonomy, slug, Some(id)) {
            return Err(StorageError::Conflict(format!(
                "term slug {slug} already exists in {taxonomy}"
            )));
        }

        let term = tables
            .terms
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("term {id}")))?;
        term.name = name.to_string();
        term.slug = slug.to_string();
        Ok(term.clone())
    }

    fn delete_term(&self, id: TermId) -> StorageResult<bool> {
        let mut tables = self.tables()?;
        let removed = tables.terms.remove(&id).is_some();
        tables.relationships.retain(|(term, _)| *term != id);
        Ok(removed)
    }
}

impl RelationshipStore for MemoryStore {
    fn add_relationship(&self, object: PostId, term: TermId) -> StorageResult<bool> {
        let mut tables = self.tables()?;
        if !tables.terms.contains_key(&term) {
            return Err(StorageError::NotFound(format!("term {term}")));
        }
        Ok(tables.relationships.insert((term, object)))
    }

    fn objects_in_term(&self, term: TermId) -> StorageResult<Vec<PostId>> {
        Ok(self
            .tables()?
            .relationships
            .range((term, PostId::new(i64::MIN))..=(term, PostId::new(i64::MAX)))
            .map(|(_, object)| *object)
            .collect())
    }

    fn terms_for_object(&self, object: PostId, taxonomy: &str) -> StorageResult<Vec<ShadowTerm>> {
        let tables = self.tables()?;
        Ok(tables
            .relationships
            .iter()
            .filter(|(_, o)| *o == object)
            .filter_map(|(term, _)| tables.terms.get(term))
            .filter(|t| t.taxonomy == taxonomy)
            .cloned()
            .collect())
    }
}

impl MetaStore for MemoryStore {
    fn get_meta(&self, post: PostId, key: &str) -> StorageResult<Option<serde_json::Value>> {
        Ok(self.tables()?.meta.get(&(post, key.to_string())).cloned())
    }

    fn set_meta(&self, post: PostId, key: &str, value: &serde_json::Value) -> StorageResult<()> {
        self.tables()?
            .meta
            .insert((post, key.to_string()), value.clone());
        Ok(())
    }

    fn delete_meta(&self, post: PostId, key: &str) -> StorageResult<bool> {
        Ok(self
            .tables()?
            .meta
            .remove(&(post, key.to_string()))
            .is_some())
    }
}
