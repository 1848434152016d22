//! Typed directory entities.
//!
//! An [`Entity`] wraps either a [`RawEntry`] read from the directory or a
//! pending attribute map for an object that has not been created yet.
//! Attributes are decoded lazily: [`Entity::attribute`] applies codecs
//! that need no directory access, while reference attributes are resolved
//! through [`crate::Directory::get_attr`].
//!
//! Two entities are equal when they carry the same `objectGUID`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::attributes::{has_flag, parse_flags, user_account_control};
use crate::class::EntityClass;
use crate::codec::RawValues;
use crate::entry::RawEntry;
use crate::error::{DirectoryError, DirectoryResult};
use crate::registry::{self, FieldType};
use crate::sid::Sid;
use crate::value::Value;

/// A directory object of a known class.
#[derive(Debug, Clone)]
pub struct Entity {
    class: EntityClass,
    dn: String,
    entry: Option<Arc<RawEntry>>,
    pending: BTreeMap<String, Value>,
}

impl Entity {
    /// Wraps an entry read from the directory.
    #[must_use]
    pub fn from_entry(class: EntityClass, entry: RawEntry) -> Self {
        Self {
            class,
            dn: entry.dn.clone(),
            entry: Some(Arc::new(entry)),
            pending: BTreeMap::new(),
        }
    }

    /// Creates a pending entity that does not exist in the directory yet.
    #[must_use]
    pub fn pending(class: EntityClass, dn: impl Into<String>) -> Self {
        Self {
            class,
            dn: dn.into(),
            entry: None,
            pending: BTreeMap::new(),
        }
    }

    /// Sets a pending attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.pending.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Returns the entity class.
    #[must_use]
    pub const fn class(&self) -> EntityClass {
        self.class
    }

    /// Returns the Distinguished Name.
    #[must_use]
    pub fn dn(&self) -> &str {
        &self.dn
    }

    /// Compares a DN with this entity's DN, ignoring case.
    #[must_use]
    pub fn dn_matches(&self, dn: &str) -> bool {
        self.dn.eq_ignore_ascii_case(dn)
    }

    /// Returns the parent DN (everything after the first RDN).
    #[must_use]
    pub fn parent_dn(&self) -> &str {
        split_rdn(&self.dn).1
    }

    /// Checks whether the entity has not been created in the directory.
    #[must_use]
    pub fn new_record(&self) -> bool {
        self.entry.is_none()
    }

    /// Returns the underlying entry, if the entity was read from the directory.
    #[must_use]
    pub fn entry(&self) -> Option<&RawEntry> {
        self.entry.as_deref()
    }

    /// Returns the pending attributes.
    #[must_use]
    pub fn pending_attributes(&self) -> &BTreeMap<String, Value> {
        &self.pending
    }

    /// Returns the field type of an attribute for this entity's class.
    #[must_use]
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        registry::type_of(self.class, name)
    }

    /// Checks whether the entity holds a value for an attribute.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.pending.contains_key(&name.to_ascii_lowercase())
            || self.entry.as_ref().is_some_and(|e| e.has_attr(name))
    }

    /// Returns the raw values of an attribute, without decoding.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<RawValues<'_>> {
        self.entry.as_ref().and_then(|e| e.values(name))
    }

    /// Returns the raw values of an attribute as text.
    ///
    /// Binary values are hex-encoded; a missing attribute yields nothing.
    #[must_use]
    pub fn raw_texts(&self, name: &str) -> Vec<String> {
        self.raw(name).map(|r| r.to_texts()).unwrap_or_default()
    }

    /// Returns the first raw value of an attribute as octets.
    ///
    /// Text values are hex-decoded, since some clients hand binary
    /// attributes over already hex-encoded.
    #[must_use]
    pub fn raw_bytes(&self, name: &str) -> Option<Vec<u8>> {
        match self.raw(name)? {
            RawValues::Binary(values) => values.first().cloned(),
            RawValues::Text(values) => values.first().and_then(|v| hex::decode(v).ok()),
        }
    }

    /// Reads an attribute, decoding it when its codec needs no lookups.
    ///
    /// Reference attributes are returned as their DNs; pending values are
    /// returned as they were set.
    ///
    /// ## Errors
    ///
    /// Returns [`DirectoryError::UnknownAttribute`] when the entity has no
    /// such attribute and [`DirectoryError::Codec`] for malformed values.
    pub fn attribute(&self, name: &str) -> DirectoryResult<Value> {
        if let Some(value) = self.pending.get(&name.to_ascii_lowercase()) {
            return Ok(value.clone());
        }

        let raw = self
            .raw(name)
            .ok_or_else(|| DirectoryError::UnknownAttribute(name.to_string()))?;

        match self.field_type(name) {
            Some(field_type) => field_type
                .decode_local(raw)
                .map_err(|e| DirectoryError::codec(name, e)),
            None => Ok(Value::from_texts(raw.to_texts())),
        }
    }

    /// Returns the `objectGUID` as a UUID.
    ///
    /// AD stores the first three GUID fields little-endian.
    #[must_use]
    pub fn object_guid(&self) -> Option<Uuid> {
        let bytes = self.raw_bytes("objectguid")?;
        let bytes: [u8; 16] = bytes.try_into().ok()?;
        Some(Uuid::from_bytes_le(bytes))
    }

    /// Returns the canonical `S-…` form of the `objectSid`.
    ///
    /// ## Errors
    ///
    /// Returns [`DirectoryError::MissingAttribute`] when the entity has no
    /// SID and [`DirectoryError::Codec`] when it cannot be decoded.
    pub fn sid(&self) -> DirectoryResult<String> {
        let sid = match self.raw("objectsid") {
            Some(RawValues::Binary(values)) => values.first().map(|b| Sid::from_bytes(b)),
            Some(RawValues::Text(values)) => values.first().map(|t| Sid::from_hex(t)),
            None => None,
        }
        .ok_or_else(|| DirectoryError::MissingAttribute("objectSid".to_string()))?
        .map_err(|e| DirectoryError::codec("objectsid", e))?;

        Ok(sid.to_string())
    }

    /// Returns the DNs listed in `memberOf`.
    #[must_use]
    pub fn member_of_dns(&self) -> Vec<String> {
        self.raw_texts("memberof")
    }

    /// Returns the DNs listed in `member`.
    #[must_use]
    pub fn member_dns(&self) -> Vec<String> {
        self.raw_texts("member")
    }

    // ========================================================================
    // Account state
    // ========================================================================

    fn flags(&self, name: &str) -> u32 {
        self.raw_texts(name)
            .first()
            .and_then(|v| parse_flags(v))
            .unwrap_or(0)
    }

    /// Returns the `userAccountControl` flags, or 0 when unset.
    #[must_use]
    pub fn user_account_control(&self) -> u32 {
        self.flags("useraccountcontrol")
    }

    /// Checks whether the account is locked out (`lockoutTime` non-zero).
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.raw_texts("lockouttime")
            .first()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .is_some_and(|ticks| ticks != 0)
    }

    /// Checks whether the account is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        has_flag(
            self.user_account_control(),
            user_account_control::ACCOUNT_DISABLED,
        )
    }

    /// Checks whether `accountExpires` lies in the past.
    ///
    /// "Never" sentinels and malformed values count as not expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        match self.attribute("accountexpires") {
            Ok(Value::Time(expires)) => expires <= Utc::now(),
            _ => false,
        }
    }

    /// Checks whether the password is exempt from expiry.
    #[must_use]
    pub fn password_never_expires(&self) -> bool {
        has_flag(
            self.user_account_control(),
            user_account_control::PASSWORD_NEVER_EXPIRES,
        )
    }

    /// Checks whether the account may log in.
    #[must_use]
    pub fn can_login(&self) -> bool {
        !self.is_disabled() && !self.is_locked() && !self.is_expired()
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        match (self.object_guid(), other.object_guid()) {
            (Some(a), Some(b)) => a == b,
            // Pending entities have no GUID yet.
            (None, None) => self.class == other.class && self.dn_matches(&other.dn),
            _ => false,
        }
    }
}

/// Splits a DN into its first RDN and the parent DN.
///
/// Escaped commas (`\,`) inside the RDN are honoured.
#[must_use]
pub fn split_rdn(dn: &str) -> (&str, &str) {
    let bytes = dn.as_bytes();
    let mut escaped = false;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'\\' if !escaped => escaped = true,
            b',' if !escaped => return (&dn[..i], &dn[i + 1..]),
            _ => escaped = false,
        }
    }
    (dn, "")
}
