//! Realm identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An isolated configuration domain.
///
/// Opaque to this crate: only used as a cache key and handed to the
/// [`ServiceRegistry`](crate::ServiceRegistry) and
/// [`SecretStore`](crate::SecretStore).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Realm(String);

impl Realm {
    /// Create a realm from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The realm name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Realm {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Realm {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for Realm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
