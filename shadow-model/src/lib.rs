//! Shadow taxonomy model.
//!
//! Defines the types that describe which post types participate in shadow
//! terms and what their index looks like:
//! - [`PostTypeDefinition`]: a host post type and its declared support
//! - [`ShadowTaxonomy`]: the index category derived from one post type
//! - [`Registry`]: explicit post type -> taxonomy mapping built at startup
//! - [`ShadowTerm`]: the live stand-in for a visible post
//!
//! The registry replaces suffix inference: lookups go through the mapping,
//! and the suffix only decides how a new taxonomy slug is built.

mod post_type;
mod registry;
mod slug;
mod taxonomy;
mod term;

pub use post_type::PostTypeDefinition;
pub use registry::{Registry, RegistryConfig, RegistryError, DEFAULT_TAXONOMY_SUFFIX};
pub use slug::sanitize_title;
pub use taxonomy::ShadowTaxonomy;
pub use term::{NewTerm, ShadowTerm, TermKey};
