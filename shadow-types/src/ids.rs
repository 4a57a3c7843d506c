//! Identifier types used throughout shadow terms.
//!
//! The host assigns integer ids to posts and terms. Zero is never a valid id
//! and stands for "absent" in the wire formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a post in the host content store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    /// Creates a post ID from a raw host id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw host id.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// True for the "absent" id.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Coerces an arbitrary JSON value into a post id.
    ///
    /// Integers pass through, floats truncate, numeric strings parse and
    /// booleans map to 1/0. Anything else becomes the zero id.
    #[must_use]
    pub fn coerce(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        let raw = match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .unwrap_or(0),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                    .unwrap_or(0)
            }
            Value::Bool(b) => i64::from(*b),
            _ => 0,
        };
        Self(raw)
    }
}

impl From<i64> for PostId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Identifier of a shadow term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermId(i64);

impl TermId {
    /// Creates a term ID from a raw host id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw host id.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// True for the "no term" id.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for TermId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TermId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}
