use serde::{Deserialize, Serialize};

/// A host post type as seen by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTypeDefinition {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Post types whose posts may be related to this type's shadow terms.
    /// `None` means the post type does not support shadow terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_terms: Option<Vec<String>>,
}

impl PostTypeDefinition {
    /// A post type without shadow term support.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            description: String::new(),
            shadow_terms: None,
        }
    }

    /// Declares shadow term support with the given connected post types.
    pub fn with_shadow_terms<I, S>(mut self, connected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shadow_terms = Some(connected.into_iter().map(Into::into).collect());
        self
    }

    /// Whether this post type declared shadow term support.
    pub fn supports_shadow_terms(&self) -> bool {
        self.shadow_terms.is_some()
    }

    /// Connected post types; empty when support was not declared.
    pub fn connected_post_types(&self) -> &[String] {
        self.shadow_terms.as_deref().unwrap_or(&[])
    }
}
