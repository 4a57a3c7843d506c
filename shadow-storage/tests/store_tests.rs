//! Port behavior shared by every backend.

use pretty_assertions::assert_eq;
use serde_json::json;
use shadow_model::NewTerm;
use shadow_storage::{MetaStore, PostStore, RelationshipStore, ShadowStore, StorageError, TermStore};
use shadow_types::{Post, PostId, PostStatus, TermId};

fn post(id: i64, post_type: &str, title: &str, status: PostStatus) -> Post {
    let slug = title.to_lowercase().replace(' ', "-");
    Post::new(PostId::new(id), post_type, title, slug, status)
}

fn new_term(taxonomy: &str, name: &str, slug: &str, post_id: Option<i64>) -> NewTerm {
    NewTerm {
        taxonomy: taxonomy.to_string(),
        name: name.to_string(),
        slug: slug.to_string(),
        post_id: post_id.map(PostId::new),
    }
}

// ── Posts ────────────────────────────────────────────────────────

fn save_and_get_post(store: &dyn ShadowStore) {
    let apple = post(1, "example", "Apple", PostStatus::Publish);
    store.save_post(&apple).unwrap();
    assert_eq!(store.get_post(PostId::new(1)).unwrap(), Some(apple));
    assert_eq!(store.get_post(PostId::new(2)).unwrap(), None);
}

fn save_post_replaces(store: &dyn ShadowStore) {
    store.save_post(&post(1, "example", "Apple", PostStatus::Draft)).unwrap();
    store.save_post(&post(1, "example", "Apples", PostStatus::Publish)).unwrap();
    let stored = store.get_post(PostId::new(1)).unwrap().unwrap();
    assert_eq!(stored.title, "Apples");
    assert_eq!(stored.status, PostStatus::Publish);
}

fn save_post_rejects_zero_id(store: &dyn ShadowStore) {
    let err = store.save_post(&post(0, "example", "Zero", PostStatus::Draft)).unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
}

fn find_posts_by_title_filters_type(store: &dyn ShadowStore) {
    store.save_post(&post(1, "example", "Apple", PostStatus::Publish)).unwrap();
    store.save_post(&post(2, "example", "Apple", PostStatus::Draft)).unwrap();
    store.save_post(&post(3, "post", "Apple", PostStatus::Publish)).unwrap();
    store.save_post(&post(4, "example", "Bean", PostStatus::Publish)).unwrap();

    let ids = store.find_posts_by_title("example", "Apple").unwrap();
    assert_eq!(ids, vec![PostId::new(1), PostId::new(2)]);
    assert!(store.find_posts_by_title("example", "Corn").unwrap().is_empty());
}

fn delete_post_cascades_to_meta_and_relationships(store: &dyn ShadowStore) {
    store.save_post(&post(1, "example", "Apple", PostStatus::Publish)).unwrap();
    store.save_post(&post(2, "post", "Related", PostStatus::Publish)).unwrap();
    let term = store.insert_term(&new_term("example_connect", "Apple", "apple", Some(1))).unwrap();
    store.add_relationship(PostId::new(2), term.id).unwrap();
    store.set_meta(PostId::new(2), "note", &json!("x")).unwrap();

    let removed = store.delete_post(PostId::new(2)).unwrap();
    assert_eq!(removed.map(|p| p.id), Some(PostId::new(2)));
    assert!(store.objects_in_term(term.id).unwrap().is_empty());
    assert_eq!(store.get_meta(PostId::new(2), "note").unwrap(), None);
    // The term itself belongs to post 1 and survives.
    assert!(store.get_term(term.id).unwrap().is_some());
}

fn delete_missing_post(store: &dyn ShadowStore) {
    assert_eq!(store.delete_post(PostId::new(99)).unwrap(), None);
}

// ── Terms ────────────────────────────────────────────────────────

fn insert_assigns_ids(store: &dyn ShadowStore) {
    let a = store.insert_term(&new_term("example_connect", "Apple", "apple", Some(1))).unwrap();
    let b = store.insert_term(&new_term("example_connect", "Bean", "bean", Some(2))).unwrap();
    assert!(!a.id.is_zero());
    assert_ne!(a.id, b.id);
    assert_eq!(store.get_term(a.id).unwrap(), Some(a));
}

fn insert_rejects_duplicate_slug(store: &dyn ShadowStore) {
    store.insert_term(&new_term("example_connect", "Apple", "apple", Some(1))).unwrap();
    let err = store
        .insert_term(&new_term("example_connect", "Apple Two", "apple", Some(2)))
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
    // Same slug in another taxonomy is fine.
    store.insert_term(&new_term("other_connect", "Apple", "apple", Some(3))).unwrap();
}

fn insert_rejects_empty_slug(store: &dyn ShadowStore) {
    let err = store.insert_term(&new_term("example_connect", "", "", None)).unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
}

fn lookups_by_name_slug_and_post(store: &dyn ShadowStore) {
    let apple = store.insert_term(&new_term("example_connect", "Apple", "apple", Some(1))).unwrap();
    let legacy = store.insert_term(&new_term("example_connect", "Bean", "bean", None)).unwrap();

    assert_eq!(store.term_by_name("example_connect", "Apple").unwrap(), Some(apple.clone()));
    assert_eq!(store.term_by_slug("example_connect", "bean").unwrap(), Some(legacy));
    assert_eq!(store.term_by_post("example_connect", PostId::new(1)).unwrap(), Some(apple));
    assert_eq!(store.term_by_post("example_connect", PostId::new(2)).unwrap(), None);
    assert_eq!(store.term_by_name("other_connect", "Apple").unwrap(), None);
}

fn term_by_name_returns_lowest_id(store: &dyn ShadowStore) {
    let first = store.insert_term(&new_term("example_connect", "Twin", "twin", Some(1))).unwrap();
    store.insert_term(&new_term("example_connect", "Twin", "twin-2", Some(2))).unwrap();
    assert_eq!(store.term_by_name("example_connect", "Twin").unwrap().map(|t| t.id), Some(first.id));
}

fn update_keeps_identity(store: &dyn ShadowStore) {
    let term = store.insert_term(&new_term("example_connect", "Garbanzo Bean", "garbanzo-bean", Some(1))).unwrap();
    let updated = store.update_term(term.id, "Chickpea", "chickpea").unwrap();
    assert_eq!(updated.id, term.id);
    assert_eq!(updated.name, "Chickpea");
    assert_eq!(updated.slug, "chickpea");
    assert_eq!(updated.post_id, Some(PostId::new(1)));
    assert_eq!(store.get_term(term.id).unwrap(), Some(updated));
}

fn update_same_slug_is_not_a_conflict(store: &dyn ShadowStore) {
    let term = store.insert_term(&new_term("example_connect", "Apple", "apple", Some(1))).unwrap();
    let updated = store.update_term(term.id, "Apples", "apple").unwrap();
    assert_eq!(updated.name, "Apples");
}

fn update_rejects_taken_slug(store: &dyn ShadowStore) {
    store.insert_term(&new_term("example_connect", "Apple", "apple", Some(1))).unwrap();
    let bean = store.insert_term(&new_term("example_connect", "Bean", "bean", Some(2))).unwrap();
    let err = store.update_term(bean.id, "Bean", "apple").unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

fn update_missing_term(store: &dyn ShadowStore) {
    let err = store.update_term(TermId::new(404), "x", "x").unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

fn delete_term_removes_relationships(store: &dyn ShadowStore) {
    let term = store.insert_term(&new_term("example_connect", "Apple", "apple", Some(1))).unwrap();
    store.add_relationship(PostId::new(5), term.id).unwrap();

    assert!(store.delete_term(term.id).unwrap());
    assert_eq!(store.get_term(term.id).unwrap(), None);
    assert!(store.objects_in_term(term.id).unwrap().is_empty());
    assert!(!store.delete_term(term.id).unwrap());
}

// ── Relationships ────────────────────────────────────────────────

fn add_relationship_is_idempotent(store: &dyn ShadowStore) {
    let term = store.insert_term(&new_term("example_connect", "Apple", "apple", Some(1))).unwrap();
    assert!(store.add_relationship(PostId::new(7), term.id).unwrap());
    assert!(!store.add_relationship(PostId::new(7), term.id).unwrap());
    store.add_relationship(PostId::new(3), term.id).unwrap();
    assert_eq!(store.objects_in_term(term.id).unwrap(), vec![PostId::new(3), PostId::new(7)]);
}

fn add_relationship_to_missing_term(store: &dyn ShadowStore) {
    let err = store.add_relationship(PostId::new(1), TermId::new(404)).unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

fn terms_for_object_filters_taxonomy(store: &dyn ShadowStore) {
    let apple = store.insert_term(&new_term("example_connect", "Apple", "apple", Some(1))).unwrap();
    let other = store.insert_term(&new_term("other_connect", "Thing", "thing", Some(2))).unwrap();
    store.add_relationship(PostId::new(9), apple.id).unwrap();
    store.add_relationship(PostId::new(9), other.id).unwrap();

    let terms = store.terms_for_object(PostId::new(9), "example_connect").unwrap();
    assert_eq!(terms, vec![apple]);
}

// ── Meta ─────────────────────────────────────────────────────────

fn meta_roundtrip(store: &dyn ShadowStore) {
    let key = "example_connect_associated_posts";
    assert_eq!(store.get_meta(PostId::new(1), key).unwrap(), None);

    store.set_meta(PostId::new(1), key, &json!([4, 5])).unwrap();
    assert_eq!(store.get_meta(PostId::new(1), key).unwrap(), Some(json!([4, 5])));

    store.set_meta(PostId::new(1), key, &json!([6])).unwrap();
    assert_eq!(store.get_meta(PostId::new(1), key).unwrap(), Some(json!([6])));

    assert!(store.delete_meta(PostId::new(1), key).unwrap());
    assert!(!store.delete_meta(PostId::new(1), key).unwrap());
}

macro_rules! backend_tests {
    (@cases $make:expr; $($case:ident),* $(,)?) => {
        $(
            #[test]
            fn $case() {
                let store = $make;
                super::$case(&store);
            }
        )*
    };
    ($backend:ident, $make:expr) => {
        mod $backend {
            backend_tests!(@cases $make;
                save_and_get_post,
                save_post_replaces,
                save_post_rejects_zero_id,
                find_posts_by_title_filters_type,
                delete_post_cascades_to_meta_and_relationships,
                delete_missing_post,
                insert_assigns_ids,
                insert_rejects_duplicate_slug,
                insert_rejects_empty_slug,
                lookups_by_name_slug_and_post,
                term_by_name_returns_lowest_id,
                update_keeps_identity,
                update_same_slug_is_not_a_conflict,
                update_rejects_taken_slug,
                update_missing_term,
                delete_term_removes_relationships,
                add_relationship_is_idempotent,
                add_relationship_to_missing_term,
                terms_for_object_filters_taxonomy,
                meta_roundtrip,
            );
        }
    };
}

backend_tests!(memory, shadow_storage::MemoryStore::new());
backend_tests!(sqlite, shadow_storage::SqliteStore::open_in_memory().unwrap());
