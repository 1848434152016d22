//! Attribute queries.
//!
//! A [`Query`] is an ordered attribute → value(s) map, optionally scoped
//! to a sub-tree below the configured search base.

use crate::value::Value;

/// Attribute that identifies an entry by its DN.
pub const DN_ATTRIBUTE: &str = "distinguishedName";

/// Value(s) an attribute must match.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Attribute equals this value.
    One(Value),
    /// Attribute equals any of these values.
    Any(Vec<Value>),
}

/// An attribute query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    terms: Vec<(String, Term)>,
    within: Option<String>,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query that looks up a single DN.
    #[must_use]
    pub fn dn(dn: impl Into<String>) -> Self {
        Self::new().eq(DN_ATTRIBUTE, Value::Text(dn.into()))
    }

    /// Creates a query that looks up a list of DNs.
    #[must_use]
    pub fn dns<I, S>(dns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().any(DN_ATTRIBUTE, dns.into_iter().map(|dn| Value::Text(dn.into())))
    }

    /// Requires `attribute` to equal `value`.
    #[must_use]
    pub fn eq(self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_term(attribute, Term::One(value.into()))
    }

    /// Requires `attribute` to equal any of `values`.
    #[must_use]
    pub fn any<I, V>(self, attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.with_term(attribute, Term::Any(values))
    }

    /// Adds a term, replacing any earlier term on the same attribute.
    #[must_use]
    pub fn with_term(mut self, attribute: impl Into<String>, term: Term) -> Self {
        let attribute = attribute.into();
        match self
            .terms
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&attribute))
        {
            Some(slot) => slot.1 = term,
            None => self.terms.push((attribute, term)),
        }
        self
    }

    /// Restricts the search to a sub-tree, relative to the search base.
    #[must_use]
    pub fn within(mut self, sub_base: impl Into<String>) -> Self {
        self.within = Some(sub_base.into());
        self
    }

    /// Returns the terms in insertion order.
    #[must_use]
    pub fn terms(&self) -> &[(String, Term)] {
        &self.terms
    }

    /// Returns the sub-tree this query is scoped to.
    #[must_use]
    pub fn sub_base(&self) -> Option<&str> {
        self.within.as_deref()
    }

    /// Checks whether the query has no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the search base for this query under `base`.
    ///
    /// Empty components are dropped: `("ou=x", "dc=a")` → `"ou=x,dc=a"`.
    #[must_use]
    pub fn search_base(&self, base: &str) -> String {
        [self.within.as_deref().unwrap_or(""), base]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Returns the DNs of a pure DN lookup.
    ///
    /// A query is a DN lookup when its only term is on `distinguishedName`
    /// and every value is a literal DN (text without wildcards). The flag
    /// is `true` when the term was a list.
    #[must_use]
    pub fn dn_lookup(&self) -> Option<(Vec<&str>, bool)> {
        let [(attribute, term)] = self.terms.as_slice() else {
            return None;
        };
        if !attribute.eq_ignore_ascii_case(DN_ATTRIBUTE) {
            return None;
        }

        fn literal(value: &Value) -> Option<&str> {
            match value {
                Value::Text(dn) if !dn.contains('*') => Some(dn.as_str()),
                _ => None,
            }
        }

        match term {
            Term::One(value) => literal(value).map(|dn| (vec![dn], false)),
            Term::Any(values) => values
                .iter()
                .map(literal)
                .collect::<Option<Vec<_>>>()
                .map(|dns| (dns, true)),
        }
    }
}
