//! Directory error types.
//!
//! ## Categories
//!
//! - Connectivity: the directory could not be bound. Reported as
//!   [`DirectoryError::NotConnected`] so callers can tell "not connected"
//!   apart from "connected but no matches".
//! - Operation: the directory answered with a non-zero result code.
//! - Codec: a wire value could not be transcoded.
//! - Usage: the calling code asked for something that cannot work
//!   (unknown attribute, bad finder name, arity mismatch). These are
//!   never retried.

use thiserror::Error;

/// Errors raised while transcoding attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Value is not a valid hex string.
    #[error("invalid hex value: {0}")]
    InvalidHex(String),

    /// Value is not a generalized time of the form `YYYYMMDDHHMMSS.0Z`.
    #[error("invalid generalized time: {0}")]
    InvalidDate(String),

    /// Value is not a FILETIME tick count.
    #[error("invalid FILETIME value: {0}")]
    InvalidTimestamp(String),

    /// FILETIME tick count cannot be represented as a calendar time.
    #[error("FILETIME value out of range: {0}")]
    TimestampOutOfRange(u64),

    /// SID buffer is shorter than its sub-authority count requires.
    #[error("SID buffer too short: need {expected} bytes, got {actual}")]
    SidTooShort {
        /// Bytes required by the header.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// SID header is structurally invalid.
    #[error("invalid SID: {0}")]
    InvalidSid(String),

    /// Value kind does not fit the attribute's codec.
    #[error("cannot encode {kind} value for {field} attribute")]
    UnexpectedValue {
        /// Codec name.
        field: &'static str,
        /// Kind of value supplied.
        kind: &'static str,
    },
}

/// Errors that can occur during directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory could not be bound.
    #[error("not connected to the directory")]
    NotConnected,

    /// The directory returned a non-zero result code.
    #[error("directory operation failed: {code}: {message}")]
    Operation {
        /// LDAP result code.
        code: u32,
        /// Diagnostic message from the server.
        message: String,
    },

    /// Attribute value could not be transcoded.
    #[error("codec error on {attribute}: {source}")]
    Codec {
        /// Attribute being transcoded.
        attribute: String,
        /// Underlying codec failure.
        #[source]
        source: CodecError,
    },

    /// Attribute is not present on the entity.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Attribute required by an operation is missing.
    #[error("entity has no {0} attribute")]
    MissingAttribute(String),

    /// Dynamic finder name could not be parsed.
    #[error("invalid finder: {0}")]
    InvalidFinder(String),

    /// Dynamic finder called with the wrong number of arguments.
    #[error("find: wrong number of arguments ({actual} for {expected})")]
    Arity {
        /// Attributes named by the finder.
        expected: usize,
        /// Arguments supplied.
        actual: usize,
    },

    /// Operation requires an entity that exists in the directory.
    #[error("entity has not been saved to the directory")]
    NewRecord,

    /// Failure inside the directory client adapter.
    #[error("directory client error: {0}")]
    Client(String),
}

impl DirectoryError {
    /// Creates a codec error for an attribute.
    #[must_use]
    pub fn codec(attribute: impl Into<String>, source: CodecError) -> Self {
        Self::Codec {
            attribute: attribute.into(),
            source,
        }
    }

    /// Creates an operation error.
    #[must_use]
    pub fn operation(code: u32, message: impl Into<String>) -> Self {
        Self::Operation {
            code,
            message: message.into(),
        }
    }

    /// Creates an invalid finder error.
    #[must_use]
    pub fn finder(msg: impl Into<String>) -> Self {
        Self::InvalidFinder(msg.into())
    }

    /// Creates a client error.
    #[must_use]
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    /// Checks if this error indicates a bug in the calling code.
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownAttribute(_)
                | Self::MissingAttribute(_)
                | Self::InvalidFinder(_)
                | Self::Arity { .. }
                | Self::NewRecord
        )
    }

    /// Checks if this is a connection-related error.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::NotConnected)
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
