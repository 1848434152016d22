//! Entity classes.
//!
//! Every object read from the directory is resolved as one of these
//! classes. `Base` is the un-specialised fallback schema; the other
//! classes inherit its field types and add their own.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::Filter;

/// Class of a directory entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    /// Any directory object.
    Base,
    /// User accounts (excluding computer accounts).
    User,
    /// Security and distribution groups.
    Group,
    /// Computer accounts.
    Computer,
}

impl EntityClass {
    /// All classes, Base first.
    pub const ALL: [Self; 4] = [Self::Base, Self::User, Self::Group, Self::Computer];

    /// Returns the class name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "Base",
            Self::User => "User",
            Self::Group => "Group",
            Self::Computer => "Computer",
        }
    }

    /// Returns the existence filter that restricts a search to this class.
    ///
    /// `Base` returns the neutral filter.
    #[must_use]
    pub fn filter(&self) -> Filter {
        match self {
            Self::Base => Filter::neutral(),
            Self::User => {
                Filter::eq("objectClass", "user") & !Filter::eq("objectClass", "computer")
            }
            Self::Group => Filter::eq("objectClass", "group"),
            Self::Computer => Filter::eq("objectClass", "computer"),
        }
    }

    /// Returns the object classes a new entry of this class must carry.
    #[must_use]
    pub const fn required_object_classes(&self) -> &'static [&'static str] {
        match self {
            Self::Base => &[],
            Self::User => &["top", "organizationalPerson", "person", "user"],
            Self::Group => &["top", "group"],
            Self::Computer => &["top", "person", "organizationalPerson", "user", "computer"],
        }
    }

    /// Checks whether an entity of this class satisfies a query for `expected`.
    ///
    /// Every class satisfies a `Base` query.
    #[must_use]
    pub fn is_a(&self, expected: Self) -> bool {
        expected == Self::Base || *self == expected
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
