use crate::PostTypeDefinition;
use serde::{Deserialize, Serialize};

/// Descriptor of a shadow taxonomy (the index category of one post type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowTaxonomy {
    pub slug: String,
    /// The post type this taxonomy mirrors.
    pub post_type: String,
    /// Post types permitted to be related to terms in this taxonomy.
    pub object_types: Vec<String>,
    pub label: String,
    pub description: String,
    pub hierarchical: bool,
    pub public: bool,
    pub show_ui: bool,
    pub show_in_rest: bool,
}

impl ShadowTaxonomy {
    /// Builds the descriptor for a post type using the slug suffix rule.
    pub fn for_post_type(definition: &PostTypeDefinition, suffix: &str) -> Self {
        Self {
            slug: format!("{}{}", definition.name, suffix),
            post_type: definition.name.clone(),
            object_types: definition.connected_post_types().to_vec(),
            label: definition.label.clone(),
            description: definition.description.clone(),
            hierarchical: true,
            public: false,
            show_ui: true,
            show_in_rest: true,
        }
    }

    /// Whether posts of `post_type` may be related to this taxonomy's terms.
    pub fn accepts(&self, post_type: &str) -> bool {
        self.object_types.iter().any(|t| t == post_type)
    }
}
