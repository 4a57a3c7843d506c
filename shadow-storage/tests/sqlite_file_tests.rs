use serde_json::json;
use shadow_model::NewTerm;
use shadow_storage::{MetaStore, PostStore, SqliteStore, TermStore};
use shadow_types::{Post, PostId, PostStatus};

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shadow.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store
            .save_post(&Post::new(PostId::new(1), "example", "Apple", "apple", PostStatus::Publish))
            .unwrap();
        store
            .insert_term(&NewTerm {
                taxonomy: "example_connect".into(),
                name: "Apple".into(),
                slug: "apple".into(),
                post_id: Some(PostId::new(1)),
            })
            .unwrap();
        store
            .set_meta(PostId::new(1), "example_connect_associated_posts", &json!([2, 3]))
            .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let post = store.get_post(PostId::new(1)).unwrap().unwrap();
    assert_eq!(post.status, PostStatus::Publish);
    let term = store.term_by_slug("example_connect", "apple").unwrap().unwrap();
    assert_eq!(term.post_id, Some(PostId::new(1)));
    assert_eq!(
        store.get_meta(PostId::new(1), "example_connect_associated_posts").unwrap(),
        Some(json!([2, 3]))
    );
}

#[test]
fn custom_status_roundtrips() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .save_post(&Post::new(PostId::new(1), "example", "Apple", "apple", PostStatus::from("archived")))
        .unwrap();
    let post = store.get_post(PostId::new(1)).unwrap().unwrap();
    assert_eq!(post.status, PostStatus::Other("archived".into()));
}

#[test]
fn term_ids_are_not_reused_after_delete() {
    let store = SqliteStore::open_in_memory().unwrap();
    let make = |slug: &str| NewTerm {
        taxonomy: "example_connect".into(),
        name: slug.into(),
        slug: slug.into(),
        post_id: None,
    };
    let first = store.insert_term(&make("a")).unwrap();
    store.delete_term(first.id).unwrap();
    let second = store.insert_term(&make("b")).unwrap();
    assert!(second.id > first.id);
}
