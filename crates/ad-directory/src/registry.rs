//! Field type registry.
//!
//! Maps `(entity class, attribute name)` to the semantic type of the
//! attribute. Attributes not listed here are opaque text and pass through
//! the codec layer untouched.

use std::collections::BTreeSet;
use std::fmt;

use crate::class::EntityClass;

/// Semantic type of an attribute that needs special encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Raw bytes, exposed as a lowercase hex string.
    Binary,
    /// Generalized time (`YYYYMMDDHHMMSS.0Z`).
    Date,
    /// Windows FILETIME tick count.
    Timestamp,
    /// Write-only quoted UTF-16LE password.
    Password,
    /// DN references to any object.
    DnArray,
    /// DN references to users.
    UserDnArray,
    /// DN references to groups.
    GroupDnArray,
    /// DN references to users and groups.
    MemberDnArray,
}

impl FieldType {
    /// Returns the type name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "Binary",
            Self::Date => "Date",
            Self::Timestamp => "Timestamp",
            Self::Password => "Password",
            Self::DnArray => "DnArray",
            Self::UserDnArray => "UserDnArray",
            Self::GroupDnArray => "GroupDnArray",
            Self::MemberDnArray => "MemberDnArray",
        }
    }

    /// Checks if values of this type are DN references.
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(
            self,
            Self::DnArray | Self::UserDnArray | Self::GroupDnArray | Self::MemberDnArray
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const BASE_FIELDS: &[(&str, FieldType)] = &[
    ("objectguid", FieldType::Binary),
    ("whencreated", FieldType::Date),
    ("whenchanged", FieldType::Date),
    ("memberof", FieldType::DnArray),
];

const USER_FIELDS: &[(&str, FieldType)] = &[
    ("objectguid", FieldType::Binary),
    ("objectsid", FieldType::Binary),
    ("msexchmailboxguid", FieldType::Binary),
    ("msexchmailboxsecuritydescriptor", FieldType::Binary),
    ("whencreated", FieldType::Date),
    ("whenchanged", FieldType::Date),
    ("lastlogontimestamp", FieldType::Timestamp),
    ("pwdlastset", FieldType::Timestamp),
    ("accountexpires", FieldType::Timestamp),
    ("unicodepwd", FieldType::Password),
    ("memberof", FieldType::MemberDnArray),
];

const GROUP_FIELDS: &[(&str, FieldType)] = &[
    ("objectguid", FieldType::Binary),
    ("objectsid", FieldType::Binary),
    ("whencreated", FieldType::Date),
    ("whenchanged", FieldType::Date),
    ("memberof", FieldType::GroupDnArray),
    ("member", FieldType::MemberDnArray),
];

const COMPUTER_FIELDS: &[(&str, FieldType)] = &[
    ("objectguid", FieldType::Binary),
    ("objectsid", FieldType::Binary),
    ("whencreated", FieldType::Date),
    ("whenchanged", FieldType::Date),
    ("memberof", FieldType::GroupDnArray),
    ("member", FieldType::MemberDnArray),
];

const fn fields_of(class: EntityClass) -> &'static [(&'static str, FieldType)] {
    match class {
        EntityClass::Base => BASE_FIELDS,
        EntityClass::User => USER_FIELDS,
        EntityClass::Group => GROUP_FIELDS,
        EntityClass::Computer => COMPUTER_FIELDS,
    }
}

fn lookup(table: &[(&str, FieldType)], name: &str) -> Option<FieldType> {
    table
        .iter()
        .find(|(field, _)| field.eq_ignore_ascii_case(name))
        .map(|(_, ty)| *ty)
}

/// Returns the field type of an attribute for a class.
///
/// The class's own table is tried first, then the Base table.
#[must_use]
pub fn type_of(class: EntityClass, name: &str) -> Option<FieldType> {
    lookup(fields_of(class), name).or_else(|| lookup(BASE_FIELDS, name))
}

/// Returns every attribute tagged `Binary` in any class, lowercased.
#[must_use]
pub fn binary_attribute_names() -> BTreeSet<&'static str> {
    EntityClass::ALL
        .iter()
        .flat_map(|class| fields_of(*class).iter())
        .filter(|(_, ty)| *ty == FieldType::Binary)
        .map(|(name, _)| *name)
        .collect()
}

/// Checks whether an attribute carries binary values in any class.
#[must_use]
pub fn is_binary_attribute(name: &str) -> bool {
    EntityClass::ALL
        .iter()
        .any(|class| lookup(fields_of(*class), name) == Some(FieldType::Binary))
}
