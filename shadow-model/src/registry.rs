//! Explicit registry of participating post types and their shadow taxonomies.

use crate::{PostTypeDefinition, ShadowTaxonomy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Suffix appended to a post type name to build its taxonomy slug.
pub const DEFAULT_TAXONOMY_SUFFIX: &str = "_connect";

/// Errors raised while building the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("post type already registered: {0}")]
    DuplicatePostType(String),

    #[error("unknown post type: {0}")]
    UnknownPostType(String),

    #[error("post type does not support shadow terms: {0}")]
    Unsupported(String),

    #[error("invalid registry configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse registry configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read registry configuration: {0}")]
    Io(#[from] std::io::Error),
}

fn default_suffix() -> String {
    DEFAULT_TAXONOMY_SUFFIX.to_string()
}

/// On-disk registry configuration.
///
/// ```json
/// {
///   "taxonomy_suffix": "_connect",
///   "post_types": [
///     { "name": "example", "label": "Example", "shadow_terms": ["post"] },
///     { "name": "post", "label": "Posts" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_suffix")]
    pub taxonomy_suffix: String,
    #[serde(default)]
    pub post_types: Vec<PostTypeDefinition>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            taxonomy_suffix: default_suffix(),
            post_types: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let config: Self = serde_json::from_str(json)?;
        if config.taxonomy_suffix.is_empty() {
            return Err(RegistryError::InvalidConfig("taxonomy_suffix must not be empty".into()));
        }
        Ok(config)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Maps post types to their shadow taxonomies.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Registry {
    suffix: String,
    post_types: HashMap<String, PostTypeDefinition>,
    /// Registered taxonomies by slug.
    taxonomies: HashMap<String, ShadowTaxonomy>,
    /// Post type name -> taxonomy slug.
    by_post_type: HashMap<String, String>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry using the default suffix.
    pub fn new() -> Self {
        Self::with_suffix(DEFAULT_TAXONOMY_SUFFIX)
    }

    /// Creates an empty registry with a custom taxonomy slug suffix.
    pub fn with_suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            post_types: HashMap::new(),
            taxonomies: HashMap::new(),
            by_post_type: HashMap::new(),
        }
    }

    /// Builds a registry from configuration: every post type is registered,
    /// then a taxonomy is registered for each one declaring support.
    pub fn from_config(config: RegistryConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::with_suffix(config.taxonomy_suffix);
        for definition in config.post_types {
            registry.register_post_type(definition)?;
        }
        registry.register_taxonomies();
        Ok(registry)
    }

    /// The taxonomy slug suffix.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    // ── Post types ───────────────────────────────────────────────

    /// Registers a host post type.
    pub fn register_post_type(&mut self, definition: PostTypeDefinition) -> Result<(), RegistryError> {
        if definition.name.is_empty() {
            return Err(RegistryError::InvalidConfig("post type name must not be empty".into()));
        }
        if self.post_types.contains_key(&definition.name) {
            return Err(RegistryError::DuplicatePostType(definition.name));
        }
        self.post_types.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Declares shadow term support on an already registered post type.
    pub fn add_post_type_support<I, S>(&mut self, post_type: &str, connected: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let definition = self
            .post_types
            .get_mut(post_type)
            .ok_or_else(|| RegistryError::UnknownPostType(post_type.to_string()))?;
        definition.shadow_terms = Some(connected.into_iter().map(Into::into).collect());
        Ok(())
    }

    pub fn post_type(&self, name: &str) -> Option<&PostTypeDefinition> {
        self.post_types.get(name)
    }

    pub fn post_type_exists(&self, name: &str) -> bool {
        self.post_types.contains_key(name)
    }

    /// Whether `post_type` declared shadow term support.
    pub fn post_type_supports(&self, post_type: &str) -> bool {
        self.post_types
            .get(post_type)
            .is_some_and(PostTypeDefinition::supports_shadow_terms)
    }

    /// Post types that may be related to `post_type`'s shadow terms.
    pub fn connected_post_types(&self, post_type: &str) -> Vec<String> {
        self.post_types
            .get(post_type)
            .map(|d| d.connected_post_types().to_vec())
            .unwrap_or_default()
    }

    // ── Taxonomies ───────────────────────────────────────────────

    /// Registers a taxonomy for every supporting post type that does not yet
    /// have one. Returns how many were registered.
    pub fn register_taxonomies(&mut self) -> usize {
        let mut pending: Vec<String> = self
            .post_types
            .values()
            .filter(|d| d.supports_shadow_terms() && !self.by_post_type.contains_key(&d.name))
            .map(|d| d.name.clone())
            .collect();
        pending.sort();

        let mut registered = 0;
        for post_type in pending {
            if self.register_taxonomy(&post_type).is_ok() {
                registered += 1;
            }
        }
        registered
    }

    /// Registers (or re-registers) the shadow taxonomy of one post type.
    pub fn register_taxonomy(&mut self, post_type: &str) -> Result<&ShadowTaxonomy, RegistryError> {
        let definition = self
            .post_types
            .get(post_type)
            .ok_or_else(|| RegistryError::UnknownPostType(post_type.to_string()))?;
        if !definition.supports_shadow_terms() {
            return Err(RegistryError::Unsupported(post_type.to_string()));
        }

        let taxonomy = ShadowTaxonomy::for_post_type(definition, &self.suffix);
        let slug = taxonomy.slug.clone();
        debug!("Registered shadow taxonomy {} for post type {}", slug, post_type);

        self.by_post_type.insert(post_type.to_string(), slug.clone());
        Ok(self.taxonomies.entry(slug).insert_entry(taxonomy).into_mut())
    }

    /// Looks up a registered taxonomy by slug.
    pub fn taxonomy(&self, slug: &str) -> Option<&ShadowTaxonomy> {
        self.taxonomies.get(slug)
    }

    pub fn taxonomy_exists(&self, slug: &str) -> bool {
        self.taxonomies.contains_key(slug)
    }

    /// The registered taxonomy of a post type, if any.
    pub fn taxonomy_for_post_type(&self, post_type: &str) -> Option<&ShadowTaxonomy> {
        self.by_post_type
            .get(post_type)
            .and_then(|slug| self.taxonomies.get(slug))
    }

    /// All registered taxonomies, sorted by slug.
    pub fn taxonomies(&self) -> Vec<&ShadowTaxonomy> {
        let mut all: Vec<_> = self.taxonomies.values().collect();
        all.sort_by(|a, b| a.slug.cmp(&b.slug));
        all
    }

    /// Whether `slug` names a shadow taxonomy by the suffix convention.
    /// The comparison ignores ASCII case.
    pub fn is_shadow_taxonomy(&self, slug: &str) -> bool {
        let suffix_len = self.suffix.len();
        slug.len() >= suffix_len
            && slug
                .get(slug.len() - suffix_len..)
                .is_some_and(|tail| tail.eq_ignore_ascii_case(&self.suffix))
    }

    /// Recovers the mirrored post type from a taxonomy slug.
    ///
    /// Registered taxonomies answer by identity. Otherwise the suffix is
    /// stripped; `None` when the suffix is missing or the remaining name is
    /// not a registered post type.
    pub fn post_type_for_taxonomy(&self, slug: &str) -> Option<&str> {
        if let Some(taxonomy) = self.taxonomies.get(slug) {
            return Some(taxonomy.post_type.as_str());
        }
        let candidate = slug.strip_suffix(self.suffix.as_str())?;
        self.post_types.get(candidate).map(|d| d.name.as_str())
    }
}
