//! LDAP-specific error types.
//!
//! ## Security Note
//!
//! Error messages must not leak sensitive information like
//! passwords or bind credentials.

use ad_directory::DirectoryError;
use thiserror::Error;

/// LDAP-specific errors.
#[derive(Debug, Error)]
pub enum LdapError {
    /// Invalid configuration.
    #[error("LDAP configuration error: {0}")]
    Configuration(String),

    /// Connection URL must use LDAPS.
    #[error("Security error: Only LDAPS is supported. URL must start with 'ldaps://'. STARTTLS and plain LDAP are not allowed.")]
    InsecureProtocol,

    /// Connection failed.
    #[error("LDAP connection failed: {0}")]
    Connection(String),

    /// Bind (authentication) failed.
    #[error("LDAP bind failed: {0}")]
    Bind(String),

    /// Server answered with a non-zero result code.
    #[error("LDAP {operation} failed with result code {code}: {message}")]
    Operation {
        /// Operation name (`search`, `modify`, `modifydn`, `bind`).
        operation: &'static str,
        /// LDAP result code.
        code: u32,
        /// Diagnostic message from the server.
        message: String,
    },

    /// Configuration file could not be read.
    #[error("cannot read LDAP configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML.
    #[error("invalid LDAP configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Underlying ldap3 error.
    #[error("LDAP error: {0}")]
    Ldap3(#[from] ldap3::LdapError),
}

impl LdapError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an operation error from a server result.
    #[must_use]
    pub fn operation(operation: &'static str, code: u32, message: impl Into<String>) -> Self {
        Self::Operation {
            operation,
            code,
            message: message.into(),
        }
    }

    /// Checks if this is a connection-related error.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Ldap3(_))
    }

    /// Checks if this is a security-related error.
    #[must_use]
    pub const fn is_security_error(&self) -> bool {
        matches!(self, Self::InsecureProtocol | Self::Bind(_))
    }
}

/// Result type for LDAP operations.
pub type LdapResult<T> = Result<T, LdapError>;

impl From<LdapError> for DirectoryError {
    fn from(err: LdapError) -> Self {
        match err {
            LdapError::Operation { code, message, .. } => Self::Operation { code, message },
            LdapError::Connection(_) | LdapError::Bind(_) => Self::NotConnected,
            other => Self::Client(other.to_string()),
        }
    }
}
