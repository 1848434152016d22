//! Directory settings.
//!
//! Settings that shape how the resolution layer queries and caches. They
//! carry no connection details; those belong to the client adapter.

use serde::{Deserialize, Serialize};

/// Settings for a [`crate::Directory`] context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySettings {
    /// Search base DN (e.g. `dc=example,dc=org`).
    pub base_dn: String,

    /// Whether DN lookups are served from the entity cache.
    pub caching: bool,

    /// Maximum depth of recursive membership traversal.
    ///
    /// `None` means unbounded; cycles are still detected.
    pub max_membership_depth: Option<usize>,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            base_dn: String::new(),
            caching: true,
            max_membership_depth: None,
        }
    }
}

impl DirectorySettings {
    /// Creates settings for a search base.
    #[must_use]
    pub fn new(base_dn: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            ..Self::default()
        }
    }

    /// Sets whether DN lookups are cached.
    #[must_use]
    pub const fn caching(mut self, enabled: bool) -> Self {
        self.caching = enabled;
        self
    }

    /// Bounds recursive membership traversal.
    #[must_use]
    pub const fn max_membership_depth(mut self, depth: usize) -> Self {
        self.max_membership_depth = Some(depth);
        self
    }
}
