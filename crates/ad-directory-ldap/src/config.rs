//! LDAP client configuration.
//!
//! ## Security Requirements
//!
//! **CRITICAL**: Only LDAPS (LDAP over TLS) is supported.
//!
//! - Connection URLs MUST start with `ldaps://`
//! - STARTTLS is NOT supported (vulnerable to downgrade attacks)
//! - Plain `ldap://` is NOT supported (credentials transmitted in cleartext)
//!
//! ## File Format
//!
//! ```toml
//! connection_url = "ldaps://dc01.example.org:636"
//! bind_dn = "cn=svc-directory,ou=Service,dc=example,dc=org"
//! bind_credential = "..."
//! base_dn = "dc=example,dc=org"
//! connection_timeout = 5
//! operation_timeout = 30
//! caching = true
//! max_membership_depth = 16
//! ```

use std::path::Path;
use std::time::Duration;

use ad_directory::DirectorySettings;
use serde::{Deserialize, Serialize};

use crate::error::{LdapError, LdapResult};

/// Default connection timeout.
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Default per-operation timeout.
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

fn default_connection_timeout() -> Duration {
    DEFAULT_CONNECTION_TIMEOUT
}

fn default_operation_timeout() -> Duration {
    DEFAULT_OPERATION_TIMEOUT
}

const fn default_true() -> bool {
    true
}

// ============================================================================
// LDAP Configuration
// ============================================================================

/// LDAP client configuration.
///
/// ## Security Requirements
///
/// The `connection_url` MUST use the `ldaps://` scheme.
/// Any attempt to use `ldap://` or STARTTLS will be rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    // === Connection ===
    /// LDAP server URL (MUST be ldaps://).
    pub connection_url: String,

    /// Bind DN for service account.
    pub bind_dn: String,

    /// Bind credential (password).
    #[serde(skip_serializing, default)]
    pub bind_credential: String,

    /// Whether to validate server certificates.
    /// Should always be true in production.
    #[serde(default = "default_true")]
    pub validate_certificates: bool,

    /// Connection timeout.
    #[serde(with = "duration_secs", default = "default_connection_timeout")]
    pub connection_timeout: Duration,

    /// Timeout for each search, modify or bind.
    #[serde(with = "duration_secs", default = "default_operation_timeout")]
    pub operation_timeout: Duration,

    // === Directory ===
    /// Search base DN.
    pub base_dn: String,

    /// Whether DN lookups are served from the entity cache.
    #[serde(default = "default_true")]
    pub caching: bool,

    /// Maximum depth of recursive membership traversal.
    #[serde(default)]
    pub max_membership_depth: Option<usize>,
}

impl LdapConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> LdapConfigBuilder {
        LdapConfigBuilder::new()
    }

    /// Parses and validates a TOML configuration.
    ///
    /// ## Errors
    ///
    /// Returns an error if the document is not valid TOML, misses required
    /// keys, or names a non-LDAPS URL.
    pub fn from_toml_str(content: &str) -> LdapResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> LdapResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Returns the settings for the resolution layer.
    #[must_use]
    pub fn directory_settings(&self) -> DirectorySettings {
        DirectorySettings {
            base_dn: self.base_dn.clone(),
            caching: self.caching,
            max_membership_depth: self.max_membership_depth,
        }
    }

    /// Validates the configuration.
    ///
    /// ## Security
    ///
    /// This method enforces LDAPS-only connections.
    pub fn validate(&self) -> LdapResult<()> {
        // CRITICAL: Enforce LDAPS-only
        validate_ldaps_url(&self.connection_url)?;

        if self.bind_dn.is_empty() {
            return Err(LdapError::config("bind_dn cannot be empty"));
        }

        if self.base_dn.is_empty() {
            return Err(LdapError::config("base_dn cannot be empty"));
        }

        if self.operation_timeout.is_zero() {
            return Err(LdapError::config("operation_timeout must be positive"));
        }

        Ok(())
    }
}

/// Validates that a URL uses LDAPS.
///
/// ## Security
///
/// **CRITICAL**: Only `ldaps://` URLs are accepted.
/// - `ldap://` is rejected (cleartext credentials)
/// - STARTTLS is not supported (vulnerable to downgrade attacks)
fn validate_ldaps_url(url: &str) -> LdapResult<()> {
    const SCHEME: &str = "ldaps://";

    if !url.to_ascii_lowercase().starts_with(SCHEME) {
        return Err(LdapError::InsecureProtocol);
    }

    if url.len() <= SCHEME.len() {
        return Err(LdapError::config("Invalid LDAPS URL: missing host"));
    }

    Ok(())
}

/// Serde support for Duration as whole seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// ============================================================================
// Configuration Builder
// ============================================================================

/// Builder for LDAP configuration.
#[derive(Debug)]
pub struct LdapConfigBuilder {
    connection_url: Option<String>,
    bind_dn: Option<String>,
    bind_credential: Option<String>,
    validate_certificates: bool,
    connection_timeout: Duration,
    operation_timeout: Duration,
    base_dn: Option<String>,
    caching: bool,
    max_membership_depth: Option<usize>,
}

impl Default for LdapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LdapConfigBuilder {
    /// Creates a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connection_url: None,
            bind_dn: None,
            bind_credential: None,
            validate_certificates: true,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            base_dn: None,
            caching: true,
            max_membership_depth: None,
        }
    }

    /// Sets the connection URL (must be ldaps://).
    #[must_use]
    pub fn connection_url(mut self, url: impl Into<String>) -> Self {
        self.connection_url = Some(url.into());
        self
    }

    /// Sets the bind DN.
    #[must_use]
    pub fn bind_dn(mut self, dn: impl Into<String>) -> Self {
        self.bind_dn = Some(dn.into());
        self
    }

    /// Sets the bind credential (password).
    #[must_use]
    pub fn bind_credential(mut self, credential: impl Into<String>) -> Self {
        self.bind_credential = Some(credential.into());
        self
    }

    /// Sets whether to validate certificates.
    #[must_use]
    pub const fn validate_certificates(mut self, validate: bool) -> Self {
        self.validate_certificates = validate;
        self
    }

    /// Sets the search base DN.
    #[must_use]
    pub fn base_dn(mut self, dn: impl Into<String>) -> Self {
        self.base_dn = Some(dn.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the per-operation timeout.
    #[must_use]
    pub const fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
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

    /// Builds and validates the configuration.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing
    /// - Connection URL does not use LDAPS
    pub fn build(self) -> LdapResult<LdapConfig> {
        let config = LdapConfig {
            connection_url: self
                .connection_url
                .ok_or_else(|| LdapError::config("connection_url is required"))?,
            bind_dn: self
                .bind_dn
                .ok_or_else(|| LdapError::config("bind_dn is required"))?,
            bind_credential: self
                .bind_credential
                .ok_or_else(|| LdapError::config("bind_credential is required"))?,
            validate_certificates: self.validate_certificates,
            connection_timeout: self.connection_timeout,
            operation_timeout: self.operation_timeout,
            base_dn: self
                .base_dn
                .ok_or_else(|| LdapError::config("base_dn is required"))?,
            caching: self.caching,
            max_membership_depth: self.max_membership_depth,
        };

        // Validate configuration (includes LDAPS check)
        config.validate()?;

        Ok(config)
    }
}
