//! Attribute values.
//!
//! [`Value`] is the domain-side representation callers read and write;
//! [`WireValue`] is what travels to the directory after encoding.

use chrono::{DateTime, Utc};

use crate::entity::Entity;

/// Generalized-time layout used by `whenCreated` and friends.
pub(crate) const GENERALIZED_TIME_FORMAT: &str = "%Y%m%d%H%M%S.0Z";

/// An encoded attribute value as sent to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireValue {
    /// UTF-8 text.
    Text(String),
    /// Raw octets.
    Binary(Vec<u8>),
}

impl WireValue {
    /// Returns the octets of this value.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    /// Consumes the value, returning its octets.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value (unset, "never", or write-only).
    Absent,
    /// A single text value.
    Text(String),
    /// Several text values.
    List(Vec<String>),
    /// A point in time.
    Time(DateTime<Utc>),
    /// Resolved DN references.
    Entities(Vec<Entity>),
}

impl Value {
    /// Checks if this is [`Value::Absent`].
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns a short name for the kind of value.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Time(_) => "time",
            Self::Entities(_) => "entity",
        }
    }

    /// Checks whether the value is absent or empty.
    ///
    /// Updating an attribute to an empty value deletes it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Time(_) => false,
            Self::Entities(entities) => entities.is_empty(),
        }
    }

    /// Returns the text of a single-valued attribute.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the time of a date attribute.
    #[must_use]
    pub const fn as_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Time(time) => Some(time),
            _ => None,
        }
    }

    /// Returns the resolved entities of a reference attribute.
    #[must_use]
    pub fn as_entities(&self) -> Option<&[Entity]> {
        match self {
            Self::Entities(entities) => Some(entities),
            _ => None,
        }
    }

    /// Returns every text value, whether single or multi-valued.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.as_str()],
            Self::List(items) => items.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Encodes the value without a field codec.
    ///
    /// Used for attributes the registry does not know about.
    #[must_use]
    pub fn to_wire(&self) -> Vec<WireValue> {
        match self {
            Self::Absent => Vec::new(),
            Self::Text(text) => vec![WireValue::Text(text.clone())],
            Self::List(items) => items.iter().cloned().map(WireValue::Text).collect(),
            Self::Time(time) => vec![WireValue::Text(
                time.format(GENERALIZED_TIME_FORMAT).to_string(),
            )],
            Self::Entities(entities) => entities
                .iter()
                .map(|entity| WireValue::Text(entity.dn().to_string()))
                .collect(),
        }
    }

    /// Shapes raw text values the way attribute reads expose them.
    ///
    /// One value → `Text`, several → `List`, none → empty `Text`.
    #[must_use]
    pub fn from_texts(mut values: Vec<String>) -> Self {
        match values.len() {
            0 => Self::Text(String::new()),
            1 => Self::Text(values.remove(0)),
            _ => Self::List(values),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Time(value)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Self::Entities(vec![entity])
    }
}

impl From<&Entity> for Value {
    fn from(entity: &Entity) -> Self {
        Self::Entities(vec![entity.clone()])
    }
}

impl From<Vec<Entity>> for Value {
    fn from(entities: Vec<Entity>) -> Self {
        Self::Entities(entities)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}
