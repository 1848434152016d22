//! # ad-directory
//!
//! Typed attribute, query and resolution layer for Active Directory.
//!
//! This crate turns raw directory entries into typed entities, compiles
//! attribute queries into search filters, caches resolved entities by DN
//! and walks group membership. It does not speak LDAP itself; a
//! [`DirectoryClient`] implementation (see `ad-directory-ldap`) does.
//!
//! ## Example
//!
//! ```ignore
//! use ad_directory::{Directory, DirectorySettings, EntityClass, Query};
//!
//! let directory = Directory::new(client, DirectorySettings::new("dc=example,dc=org"));
//! let users = directory.find_all(EntityClass::User, &Query::new().any("sn", ["Hunt", "Smith"]))?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod attributes;
pub mod cache;
pub mod class;
pub mod client;
pub mod codec;
pub mod config;
pub mod directory;
pub mod entity;
pub mod entry;
pub mod error;
pub mod filter;
pub mod finder;
pub mod membership;
pub mod query;
pub mod registry;
pub mod sid;
pub mod value;

pub use cache::EntityCache;
pub use class::EntityClass;
pub use client::{DirectoryClient, ModOp, Modification, OperationResult};
pub use codec::{RawValues, ReferenceResolver};
pub use config::DirectorySettings;
pub use directory::Directory;
pub use entity::Entity;
pub use entry::RawEntry;
pub use error::{CodecError, CodecResult, DirectoryError, DirectoryResult};
pub use filter::{Filter, FilterBuilder};
pub use finder::{Cardinality, FinderSpec, Found};
pub use query::{Query, Term};
pub use registry::FieldType;
pub use sid::Sid;
pub use value::{Value, WireValue};
