//! Search filter expressions.
//!
//! A [`Filter`] is an immutable boolean tree over equality and presence
//! leaves. Combinators (`&`, `|`, `!`) build new trees. The `Display`
//! implementation renders RFC 4515 filter strings for the directory client.
//!
//! Text values are escaped for RFC 4515 when rendered (`\`, `(`, `)` and
//! NUL), so DNs such as `CN=Doe\, John` or `CN=Doe (Contractor)` survive
//! the trip. Wildcards (`*`) are passed through unescaped so callers can
//! issue substring searches; escaping literal `*` in user supplied data is
//! the caller's responsibility.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use crate::class::EntityClass;
use crate::error::{DirectoryError, DirectoryResult};
use crate::query::{Query, Term};
use crate::registry;
use crate::value::{Value, WireValue};

/// Attribute whose presence the neutral filter tests.
const NEUTRAL_ATTRIBUTE: &str = "cn";

/// A search filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `(attr=*)`
    Present(String),
    /// `(attr=value)`
    Equal(String, WireValue),
    /// `(&...)`
    And(Vec<Filter>),
    /// `(|...)`
    Or(Vec<Filter>),
    /// `(!...)`
    Not(Box<Filter>),
}

impl Filter {
    /// Returns the filter that matches every object (`(cn=*)`).
    #[must_use]
    pub fn neutral() -> Self {
        Self::Present(NEUTRAL_ATTRIBUTE.to_string())
    }

    /// Checks whether this is the neutral filter.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        matches!(self, Self::Present(attr) if attr == NEUTRAL_ATTRIBUTE)
    }

    /// Creates a text equality leaf.
    #[must_use]
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equal(attribute.into(), WireValue::Text(value.into()))
    }

    /// Creates a presence leaf.
    #[must_use]
    pub fn present(attribute: impl Into<String>) -> Self {
        Self::Present(attribute.into())
    }

    /// Joins `other` onto this filter with AND.
    ///
    /// The neutral filter is absorbed, so `neutral & x == x`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        if self.is_neutral() {
            return other;
        }
        if other.is_neutral() {
            return self;
        }
        match (self, other) {
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), right) => {
                left.push(right);
                Self::And(left)
            }
            (left, Self::And(mut right)) => {
                right.insert(0, left);
                Self::And(right)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }

    /// Joins `other` onto this filter with OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), right) => {
                left.push(right);
                Self::Or(left)
            }
            (left, Self::Or(mut right)) => {
                right.insert(0, left);
                Self::Or(right)
            }
            (left, right) => Self::Or(vec![left, right]),
        }
    }

    /// Negates this filter.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// ORs together a list of filters.
    ///
    /// An empty list yields `!(cn=*)`, which matches nothing.
    #[must_use]
    pub fn any_of(filters: Vec<Self>) -> Self {
        let mut iter = filters.into_iter();
        match iter.next() {
            None => Self::neutral().negate(),
            Some(first) => iter.fold(first, Self::or),
        }
    }
}

impl BitAnd for Filter {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl BitOr for Filter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl Not for Filter {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(attr) => write!(f, "({attr}=*)"),
            Self::Equal(attr, WireValue::Text(value)) => {
                write!(f, "({attr}={})", escape_value(value))
            }
            Self::Equal(attr, WireValue::Binary(bytes)) => {
                write!(f, "({attr}=")?;
                for byte in bytes {
                    write!(f, "\\{byte:02x}")?;
                }
                f.write_str(")")
            }
            Self::And(filters) => {
                f.write_str("(&")?;
                for filter in filters {
                    write!(f, "{filter}")?;
                }
                f.write_str(")")
            }
            Self::Or(filters) => {
                f.write_str("(|")?;
                for filter in filters {
                    write!(f, "{filter}")?;
                }
                f.write_str(")")
            }
            Self::Not(inner) => write!(f, "(!{inner})"),
        }
    }
}

/// Escapes a text value for an RFC 4515 filter, keeping `*` as a wildcard.
#[must_use]
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\5c"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\0' => escaped.push_str("\\00"),
            other => escaped.push(other),
        }
    }
    escaped
}

// ============================================================================
// Filter Builder
// ============================================================================

/// Compiles attribute queries into filters for one entity class.
///
/// Every value is passed through the attribute's codec before it is
/// embedded in an equality leaf.
#[derive(Debug, Clone, Copy)]
pub struct FilterBuilder {
    class: EntityClass,
}

impl FilterBuilder {
    /// Creates a builder that encodes values with `class`'s field types.
    #[must_use]
    pub const fn new(class: EntityClass) -> Self {
        Self { class }
    }

    /// Builds the attribute filter for a query.
    ///
    /// An absent or empty query yields exactly the neutral filter.
    pub fn build(&self, query: Option<&Query>) -> DirectoryResult<Filter> {
        let Some(query) = query else {
            return Ok(Filter::neutral());
        };

        query
            .terms()
            .iter()
            .try_fold(Filter::neutral(), |acc, (attribute, term)| {
                Ok(acc & self.term_filter(attribute, term)?)
            })
    }

    /// Builds the attribute filter and ANDs in the class filter.
    pub fn build_for_class(&self, query: Option<&Query>) -> DirectoryResult<Filter> {
        let filter = self.build(query)?;
        let class_filter = self.class.filter();
        if class_filter.is_neutral() {
            Ok(filter)
        } else {
            Ok(filter & class_filter)
        }
    }

    fn term_filter(&self, attribute: &str, term: &Term) -> DirectoryResult<Filter> {
        match term {
            // A scalar may still encode to several wire values (an entity list).
            Term::One(value) => Ok(Filter::any_of(self.leaves(attribute, value)?)),
            Term::Any(values) => {
                let mut leaves = Vec::with_capacity(values.len());
                for value in values {
                    leaves.extend(self.leaves(attribute, value)?);
                }
                Ok(Filter::any_of(leaves))
            }
        }
    }

    fn leaves(&self, attribute: &str, value: &Value) -> DirectoryResult<Vec<Filter>> {
        let encoded = match registry::type_of(self.class, attribute) {
            Some(field_type) => field_type
                .encode(value)
                .map_err(|e| DirectoryError::codec(attribute, e))?,
            None => value.to_wire(),
        };

        Ok(encoded
            .into_iter()
            .map(|wire| Filter::Equal(attribute.to_string(), wire))
            .collect())
    }
}
