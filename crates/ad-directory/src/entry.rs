//! Raw directory entries.

use std::collections::HashMap;

use crate::codec::RawValues;

/// An entry as returned by the directory client.
///
/// Attribute names are stored lowercased; lookups are case-insensitive.
/// Attributes the registry tags as binary arrive in `binary_attributes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// Distinguished Name.
    pub dn: String,

    /// Text attributes (all values are multi-valued).
    pub attributes: HashMap<String, Vec<String>>,

    /// Binary attributes.
    pub binary_attributes: HashMap<String, Vec<Vec<u8>>>,
}

impl RawEntry {
    /// Creates an empty entry.
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            ..Self::default()
        }
    }

    /// Adds text values to an attribute.
    ///
    /// An empty value list leaves the attribute absent.
    #[must_use]
    pub fn with_attr<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.attributes
                .entry(name.to_ascii_lowercase())
                .or_default()
                .extend(values);
        }
        self
    }

    /// Adds a binary value to an attribute.
    #[must_use]
    pub fn with_binary_attr(mut self, name: &str, value: Vec<u8>) -> Self {
        self.binary_attributes
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value);
        self
    }

    /// Gets a single-valued text attribute.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.get_attrs(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Gets a multi-valued text attribute.
    #[must_use]
    pub fn get_attrs(&self, name: &str) -> Option<&[String]> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    /// Gets a binary attribute.
    #[must_use]
    pub fn get_binary_attr(&self, name: &str) -> Option<&[u8]> {
        self.binary_attributes
            .get(&name.to_ascii_lowercase())
            .and_then(|v| v.first())
            .map(Vec::as_slice)
    }

    /// Returns the raw values of an attribute, binary values first.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<RawValues<'_>> {
        let key = name.to_ascii_lowercase();
        if let Some(values) = self.binary_attributes.get(&key) {
            return Some(RawValues::Binary(values));
        }
        self.attributes.get(&key).map(|values| RawValues::Text(values))
    }

    /// Checks if the entry has an attribute.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        let key = name.to_ascii_lowercase();
        self.attributes.contains_key(&key) || self.binary_attributes.contains_key(&key)
    }

    /// Returns the object classes of the entry.
    #[must_use]
    pub fn object_classes(&self) -> &[String] {
        self.get_attrs("objectclass").unwrap_or_default()
    }

    /// Checks whether the entry carries an object class.
    #[must_use]
    pub fn has_object_class(&self, class: &str) -> bool {
        self.object_classes()
            .iter()
            .any(|c| c.eq_ignore_ascii_case(class))
    }
}
