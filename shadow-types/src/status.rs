//! Post statuses.
//!
//! The host defines the status set. Only [`PostStatus::Publish`] is visible;
//! every other status, including ones this crate does not know about, keeps a
//! post out of the shadow index.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a post as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PostStatus {
    Publish,
    Future,
    #[default]
    Draft,
    Pending,
    Private,
    Trash,
    AutoDraft,
    Inherit,
    /// A host-defined status without special meaning here.
    Other(String),
}

impl PostStatus {
    /// Whether a post with this status has a live shadow term.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Publish)
    }

    /// The host's name for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Publish => "publish",
            Self::Future => "future",
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Private => "private",
            Self::Trash => "trash",
            Self::AutoDraft => "auto-draft",
            Self::Inherit => "inherit",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for PostStatus {
    fn from(s: &str) -> Self {
        match s {
            "publish" => Self::Publish,
            "future" => Self::Future,
            "draft" => Self::Draft,
            "pending" => Self::Pending,
            "private" => Self::Private,
            "trash" => Self::Trash,
            "auto-draft" => Self::AutoDraft,
            "inherit" => Self::Inherit,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PostStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<PostStatus> for String {
    fn from(status: PostStatus) -> Self {
        status.as_str().to_string()
    }
}

impl FromStr for PostStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
