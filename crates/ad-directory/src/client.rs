//! Directory client abstraction.
//!
//! The resolution layer never speaks a wire protocol itself. Everything it
//! needs from the directory goes through [`DirectoryClient`], so a real
//! LDAP adapter and an in-memory double can be swapped freely.

use std::fmt;

use crate::entry::RawEntry;
use crate::error::DirectoryResult;
use crate::filter::Filter;
use crate::value::WireValue;

/// Kind of attribute modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModOp {
    /// Add values to an attribute that has none.
    Add,
    /// Replace every value of an attribute.
    Replace,
    /// Remove an attribute.
    Delete,
}

impl fmt::Display for ModOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Delete => "delete",
        })
    }
}

/// A single attribute modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    /// Operation kind.
    pub op: ModOp,
    /// Attribute name.
    pub attribute: String,
    /// Encoded values (empty for deletes).
    pub values: Vec<WireValue>,
}

impl Modification {
    /// Creates an add modification.
    #[must_use]
    pub fn add(attribute: impl Into<String>, values: Vec<WireValue>) -> Self {
        Self {
            op: ModOp::Add,
            attribute: attribute.into(),
            values,
        }
    }

    /// Creates a replace modification.
    #[must_use]
    pub fn replace(attribute: impl Into<String>, values: Vec<WireValue>) -> Self {
        Self {
            op: ModOp::Replace,
            attribute: attribute.into(),
            values,
        }
    }

    /// Creates a delete modification.
    #[must_use]
    pub fn delete(attribute: impl Into<String>) -> Self {
        Self {
            op: ModOp::Delete,
            attribute: attribute.into(),
            values: Vec::new(),
        }
    }
}

/// Result code and diagnostic of the last directory operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationResult {
    /// LDAP result code (0 is success).
    pub code: u32,
    /// Diagnostic message.
    pub message: String,
}

impl OperationResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Checks whether the operation succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Directory client collaborator.
///
/// Implementations are blocking and must be shareable across threads.
/// Operations report failures both through their `Result` and through
/// [`DirectoryClient::last_result`].
pub trait DirectoryClient: Send + Sync {
    /// Binds with the service account.
    ///
    /// ## Errors
    ///
    /// Returns an error when the directory is unreachable or rejects the
    /// credentials.
    fn bind(&self) -> DirectoryResult<()>;

    /// Searches the sub-tree under `base`.
    fn search(&self, filter: &Filter, base: &str) -> DirectoryResult<Vec<RawEntry>>;

    /// Applies modifications to an entry.
    fn modify(&self, dn: &str, modifications: &[Modification]) -> DirectoryResult<()>;

    /// Renames an entry within its parent.
    fn rename(&self, dn: &str, new_rdn: &str, delete_old_rdn: bool) -> DirectoryResult<()>;

    /// Binds as the single entry matching `filter` with `password`.
    ///
    /// Returns `Ok(false)` for wrong credentials or no match.
    fn bind_as(&self, filter: &Filter, base: &str, password: &str) -> DirectoryResult<bool>;

    /// Returns the result of the last operation.
    fn last_result(&self) -> OperationResult;
}
