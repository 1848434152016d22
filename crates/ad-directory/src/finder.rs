//! Dynamic finders.
//!
//! A finder name such as `find_first_by_sn_and_givenname` describes a
//! query: a cardinality and an ordered list of attributes. Arguments are
//! matched to attributes positionally.
//!
//! ```text
//! find_by_<attr>[_and_<attr>...]              -> first
//! find_<all|first>_by_<attr>[_and_<attr>...]
//! ```

use std::fmt;
use std::str::FromStr;

use crate::entity::Entity;
use crate::error::{DirectoryError, DirectoryResult};
use crate::query::Query;
use crate::value::Value;

/// How many results a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Every match.
    All,
    /// The first match, if any.
    First,
}

impl Cardinality {
    /// Returns the keyword for this cardinality.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::First => "first",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cardinality {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "first" => Ok(Self::First),
            other => Err(DirectoryError::finder(format!(
                "unknown cardinality '{other}' (expected all or first)"
            ))),
        }
    }
}

/// Result of a query, shaped by its cardinality.
#[derive(Debug, Clone, PartialEq)]
pub enum Found {
    /// Every match.
    All(Vec<Entity>),
    /// The first match.
    First(Option<Entity>),
}

impl Found {
    /// Returns the matches as a list.
    #[must_use]
    pub fn into_vec(self) -> Vec<Entity> {
        match self {
            Self::All(entities) => entities,
            Self::First(entity) => entity.into_iter().collect(),
        }
    }

    /// Returns the first match.
    #[must_use]
    pub fn into_first(self) -> Option<Entity> {
        match self {
            Self::All(entities) => entities.into_iter().next(),
            Self::First(entity) => entity,
        }
    }

    /// Checks whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::All(entities) => entities.is_empty(),
            Self::First(entity) => entity.is_none(),
        }
    }
}

/// A parsed finder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderSpec {
    /// Result cardinality.
    pub cardinality: Cardinality,
    /// Attributes, in argument order.
    pub attributes: Vec<String>,
}

impl FinderSpec {
    /// Parses a finder name.
    ///
    /// ## Errors
    ///
    /// Returns [`DirectoryError::InvalidFinder`] for a missing `find_`
    /// prefix, an unknown cardinality word or an empty attribute list.
    pub fn parse(name: &str) -> DirectoryResult<Self> {
        let rest = name.strip_prefix("find_").ok_or_else(|| {
            DirectoryError::finder(format!("'{name}' does not start with find_"))
        })?;

        let (cardinality, attributes) = match rest.strip_prefix("by_") {
            Some(attributes) => (Cardinality::First, attributes),
            None => {
                let (word, attributes) = rest.split_once("_by_").ok_or_else(|| {
                    DirectoryError::finder(format!("'{name}' does not name any attributes"))
                })?;
                (word.parse()?, attributes)
            }
        };

        let attributes: Vec<String> = attributes
            .split("_and_")
            .filter(|attr| !attr.is_empty())
            .map(str::to_string)
            .collect();

        if attributes.is_empty() {
            return Err(DirectoryError::finder(format!(
                "'{name}' does not name any attributes"
            )));
        }

        Ok(Self {
            cardinality,
            attributes,
        })
    }

    /// Builds the query for a call with `args`.
    ///
    /// ## Errors
    ///
    /// Returns [`DirectoryError::Arity`] when the argument count differs
    /// from the attribute count.
    pub fn query(&self, args: Vec<Value>) -> DirectoryResult<Query> {
        if args.len() != self.attributes.len() {
            return Err(DirectoryError::Arity {
                expected: self.attributes.len(),
                actual: args.len(),
            });
        }

        Ok(self
            .attributes
            .iter()
            .zip(args)
            .fold(Query::new(), |query, (attribute, value)| {
                query.eq(attribute.as_str(), value)
            }))
    }
}

impl FromStr for FinderSpec {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
