//! # ad-directory-ldap
//!
//! LDAPS directory client for `ad-directory`.
//!
//! This crate implements [`ad_directory::DirectoryClient`] over a blocking
//! `ldap3` connection and loads its settings from TOML.
//!
//! ## Security
//!
//! Only `ldaps://` URLs are accepted. STARTTLS and plain LDAP are rejected
//! when the configuration is built or loaded.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod connection;
pub mod error;
pub mod search;

use std::sync::Arc;

use ad_directory::Directory;

pub use config::{LdapConfig, LdapConfigBuilder};
pub use connection::LdapDirectoryClient;
pub use error::{LdapError, LdapResult};

/// Creates a directory context backed by an LDAPS client.
///
/// The connection is opened on the first query.
///
/// ## Errors
///
/// Returns an error if the configuration is invalid or not LDAPS.
pub fn open_directory(config: LdapConfig) -> LdapResult<Directory> {
    let settings = config.directory_settings();
    let client = LdapDirectoryClient::new(config)?;
    Ok(Directory::new(Arc::new(client), settings))
}
