use shadow_types::{DeleteEvent, MutationEvent, Post, PostId, PostStatus};

fn post(status: PostStatus) -> Post {
    Post::new(PostId::new(10), "example", "Apple", "apple", status)
}

// ── PostStatus ────────────────────────────────────────────────────

#[test]
fn only_publish_is_visible() {
    assert!(PostStatus::Publish.is_visible());
    for status in ["draft", "pending", "private", "trash", "future", "auto-draft", "inherit", "archived"] {
        assert!(!PostStatus::from(status).is_visible(), "{status} must not be visible");
    }
}

#[test]
fn status_roundtrips_host_names() {
    for name in ["publish", "future", "draft", "pending", "private", "trash", "auto-draft", "inherit"] {
        assert_eq!(PostStatus::from(name).as_str(), name);
    }
}

#[test]
fn unknown_status_is_preserved() {
    let status = PostStatus::from("archived");
    assert_eq!(status, PostStatus::Other("archived".to_string()));
    assert_eq!(status.to_string(), "archived");
}

#[test]
fn status_serializes_as_string() {
    let json = serde_json::to_string(&PostStatus::AutoDraft).unwrap();
    assert_eq!(json, "\"auto-draft\"");
    let parsed: PostStatus = serde_json::from_str("\"trash\"").unwrap();
    assert_eq!(parsed, PostStatus::Trash);
}

#[test]
fn default_status_is_draft() {
    assert_eq!(PostStatus::default(), PostStatus::Draft);
}

// ── MutationEvent ─────────────────────────────────────────────────

#[test]
fn created_event_has_no_before() {
    let event = MutationEvent::created(post(PostStatus::Publish));
    assert_eq!(event.post_id, PostId::new(10));
    assert!(!event.is_update);
    assert!(event.status_before().is_none());
    assert_eq!(event.title_before(), "");
    assert_eq!(event.slug_before(), "");
    assert!(!event.was_visible());
    assert!(event.is_visible());
}

#[test]
fn updated_event_exposes_before_fields() {
    let event = MutationEvent::updated(post(PostStatus::Publish), post(PostStatus::Draft));
    assert!(event.is_update);
    assert!(event.was_visible());
    assert!(!event.is_visible());
    assert_eq!(event.title_before(), "Apple");
    assert_eq!(event.slug_before(), "apple");
}

#[test]
fn mutation_event_deserializes_without_before() {
    let json = r#"{
        "post_id": 3,
        "after": {"id": 3, "post_type": "example", "title": "Bean", "slug": "bean", "status": "publish"}
    }"#;
    let event: MutationEvent = serde_json::from_str(json).unwrap();
    assert_eq!(event.post_id, PostId::new(3));
    assert!(event.before.is_none());
    assert!(!event.is_update);
    assert_eq!(event.after.status, PostStatus::Publish);
}

#[test]
fn post_fields_default_when_missing() {
    let post: Post = serde_json::from_str(r#"{"id": 4, "post_type": "example"}"#).unwrap();
    assert_eq!(post.title, "");
    assert_eq!(post.slug, "");
    assert_eq!(post.status, PostStatus::Draft);
}

// ── DeleteEvent ───────────────────────────────────────────────────

#[test]
fn delete_event_copies_post_id() {
    let event = DeleteEvent::new(post(PostStatus::Publish));
    assert_eq!(event.post_id, PostId::new(10));
    assert_eq!(event.post.slug, "apple");
}
