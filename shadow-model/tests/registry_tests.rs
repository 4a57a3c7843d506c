use pretty_assertions::assert_eq;
use shadow_model::{PostTypeDefinition, Registry, RegistryConfig, RegistryError, ShadowTaxonomy};
use std::io::Write;

/// Mirrors a typical site: one type declaring support up front, one adding it
/// later, one never supporting shadow terms.
fn site_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_post_type(PostTypeDefinition::new("example", "Example").with_shadow_terms(["post"]))
        .unwrap();
    registry
        .register_post_type(PostTypeDefinition::new("unexample", "Example"))
        .unwrap();
    registry
        .register_post_type(PostTypeDefinition::new("another-example", "Another Example"))
        .unwrap();
    registry
        .add_post_type_support("another-example", ["post"])
        .unwrap();
    registry.register_taxonomies();
    registry
}

// ── Registration ─────────────────────────────────────────────────

#[test]
fn declared_support_registers_taxonomy() {
    let registry = site_registry();
    assert!(registry.taxonomy_exists("example_connect"));
}

#[test]
fn added_support_registers_taxonomy() {
    let registry = site_registry();
    assert!(registry.taxonomy_exists("another-example_connect"));
}

#[test]
fn no_support_has_no_taxonomy() {
    let registry = site_registry();
    assert!(!registry.taxonomy_exists("unexample_connect"));
    assert!(registry.taxonomy_for_post_type("unexample").is_none());
}

#[test]
fn register_taxonomies_is_idempotent() {
    let mut registry = site_registry();
    assert_eq!(registry.register_taxonomies(), 0);
    assert_eq!(registry.taxonomies().len(), 2);
}

#[test]
fn taxonomy_descriptor_copies_post_type_fields() {
    let registry = site_registry();
    let taxonomy = registry.taxonomy_for_post_type("example").unwrap();
    assert_eq!(
        taxonomy,
        &ShadowTaxonomy {
            slug: "example_connect".to_string(),
            post_type: "example".to_string(),
            object_types: vec!["post".to_string()],
            label: "Example".to_string(),
            description: String::new(),
            hierarchical: true,
            public: false,
            show_ui: true,
            show_in_rest: true,
        }
    );
    assert!(taxonomy.accepts("post"));
    assert!(!taxonomy.accepts("page"));
}

#[test]
fn duplicate_post_type_rejected() {
    let mut registry = site_registry();
    let err = registry
        .register_post_type(PostTypeDefinition::new("example", "Again"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicatePostType(name) if name == "example"));
}

#[test]
fn support_for_unknown_post_type_rejected() {
    let mut registry = Registry::new();
    let err = registry.add_post_type_support("ghost", ["post"]).unwrap_err();
    assert!(matches!(err, RegistryError::UnknownPostType(_)));
}

#[test]
fn unsupported_post_type_cannot_register_taxonomy() {
    let mut registry = site_registry();
    let err = registry.register_taxonomy("unexample").unwrap_err();
    assert!(matches!(err, RegistryError::Unsupported(_)));
}

#[test]
fn support_without_taxonomy_registration() {
    let mut registry = Registry::new();
    registry
        .register_post_type(PostTypeDefinition::new("late", "Late").with_shadow_terms(Vec::<String>::new()))
        .unwrap();
    assert!(registry.post_type_supports("late"));
    assert!(!registry.taxonomy_exists("late_connect"));
}

// ── Queries ──────────────────────────────────────────────────────

#[test]
fn connected_post_types_lists_declared_types() {
    let registry = site_registry();
    assert_eq!(registry.connected_post_types("example"), vec!["post".to_string()]);
    assert!(registry.connected_post_types("unexample").is_empty());
    assert!(registry.connected_post_types("missing").is_empty());
}

#[test]
fn is_shadow_taxonomy_checks_suffix_case_insensitively() {
    let registry = Registry::new();
    assert!(registry.is_shadow_taxonomy("example_connect"));
    assert!(registry.is_shadow_taxonomy("example_CONNECT"));
    assert!(!registry.is_shadow_taxonomy("category"));
    assert!(!registry.is_shadow_taxonomy("connect"));
}

#[test]
fn post_type_for_taxonomy_strips_suffix() {
    let registry = site_registry();
    assert_eq!(registry.post_type_for_taxonomy("example_connect"), Some("example"));
    // Registered post type, unregistered taxonomy.
    assert_eq!(registry.post_type_for_taxonomy("unexample_connect"), Some("unexample"));
    assert_eq!(registry.post_type_for_taxonomy("category"), None);
    assert_eq!(registry.post_type_for_taxonomy("ghost_connect"), None);
}

#[test]
fn custom_suffix_drives_slugs() {
    let mut registry = Registry::with_suffix("_shadow");
    registry
        .register_post_type(PostTypeDefinition::new("person", "People").with_shadow_terms(["post"]))
        .unwrap();
    registry.register_taxonomies();
    assert!(registry.taxonomy_exists("person_shadow"));
    assert!(registry.is_shadow_taxonomy("person_shadow"));
    assert!(!registry.is_shadow_taxonomy("person_connect"));
}

// ── Configuration ────────────────────────────────────────────────

#[test]
fn config_builds_registry() {
    let config = RegistryConfig::from_json(
        r#"{
            "post_types": [
                { "name": "example", "label": "Example", "shadow_terms": ["post"] },
                { "name": "post", "label": "Posts" }
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(config.taxonomy_suffix, "_connect");

    let registry = Registry::from_config(config).unwrap();
    assert!(registry.taxonomy_exists("example_connect"));
    assert!(!registry.taxonomy_exists("post_connect"));
    assert!(registry.post_type_exists("post"));
}

#[test]
fn config_rejects_empty_suffix() {
    let err = RegistryConfig::from_json(r#"{"taxonomy_suffix": ""}"#).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidConfig(_)));
}

#[test]
fn config_rejects_malformed_json() {
    let err = RegistryConfig::from_json("{ not json").unwrap_err();
    assert!(matches!(err, RegistryError::Parse(_)));
}

#[test]
fn config_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"post_types": [{{"name": "example", "shadow_terms": []}}]}}"#
    )
    .unwrap();

    let config = RegistryConfig::load(file.path()).unwrap();
    assert_eq!(config.post_types.len(), 1);
    assert!(config.post_types[0].supports_shadow_terms());
}

#[test]
fn config_load_missing_file_is_io_error() {
    let err = RegistryConfig::load(std::path::Path::new("/nonexistent/registry.json")).unwrap_err();
    assert!(matches!(err, RegistryError::Io(_)));
}
