//! Field codecs.
//!
//! Each [`FieldType`] has an encode/decode pair that converts between
//! domain [`Value`]s and Active Directory wire formats:
//!
//! | Type        | Domain                | Wire                               |
//! |-------------|-----------------------|------------------------------------|
//! | Binary      | lowercase hex string  | raw octets                         |
//! | Date        | UTC time              | `YYYYMMDDHHMMSS.0Z`                |
//! | Timestamp   | UTC time or absent    | FILETIME ticks since 1601-01-01Z   |
//! | Password    | plaintext (write-only)| quoted UTF-16LE                    |
//! | *DnArray    | entities              | DNs                                |

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::class::EntityClass;
use crate::entity::Entity;
use crate::error::{CodecError, CodecResult, DirectoryError, DirectoryResult};
use crate::registry::FieldType;
use crate::value::{Value, WireValue, GENERALIZED_TIME_FORMAT};

/// 100 ns intervals per second.
const TICKS_PER_SECOND: u64 = 10_000_000;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_OFFSET: i64 = 11_644_473_600;

/// Raw values of one attribute as held by an entry.
#[derive(Debug, Clone, Copy)]
pub enum RawValues<'a> {
    /// Text values (binary attributes may arrive here hex-encoded).
    Text(&'a [String]),
    /// Octet values.
    Binary(&'a [Vec<u8>]),
}

impl<'a> RawValues<'a> {
    /// Returns the text values; octet values are hex-encoded.
    #[must_use]
    pub fn to_texts(&self) -> Vec<String> {
        match self {
            Self::Text(values) => values.to_vec(),
            Self::Binary(values) => values.iter().map(hex::encode).collect(),
        }
    }

    fn first_text(&self) -> Option<String> {
        match self {
            Self::Text(values) => values.first().cloned(),
            Self::Binary(values) => values
                .first()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// Resolves DN references while decoding reference attributes.
pub trait ReferenceResolver {
    /// Finds every entity of `class` whose DN is in `dns`.
    fn resolve_dns(&self, class: EntityClass, dns: &[String]) -> DirectoryResult<Vec<Entity>>;
}

impl FieldType {
    /// Returns the classes a reference type resolves against.
    #[must_use]
    pub const fn target_classes(&self) -> &'static [EntityClass] {
        match self {
            Self::DnArray => &[EntityClass::Base],
            Self::UserDnArray => &[EntityClass::User],
            Self::GroupDnArray => &[EntityClass::Group],
            Self::MemberDnArray => &[EntityClass::User, EntityClass::Group],
            _ => &[],
        }
    }

    /// Encodes a domain value into wire values.
    pub fn encode(&self, value: &Value) -> CodecResult<Vec<WireValue>> {
        match self {
            Self::Binary => encode_each(value, self.as_str(), |text| {
                hex::decode(text)
                    .map(WireValue::Binary)
                    .map_err(|_| CodecError::InvalidHex(text.to_string()))
            }),
            Self::Date => match value {
                Value::Time(time) => Ok(vec![WireValue::Text(encode_date(time))]),
                other => encode_each(other, self.as_str(), |text| {
                    Ok(WireValue::Text(text.to_string()))
                }),
            },
            Self::Timestamp => match value {
                Value::Time(time) => Ok(vec![WireValue::Text(encode_filetime(time)?.to_string())]),
                Value::Absent => Ok(vec![WireValue::Text("0".to_string())]),
                other => encode_each(other, self.as_str(), |text| {
                    Ok(WireValue::Text(text.to_string()))
                }),
            },
            Self::Password => match value {
                Value::Text(password) => Ok(vec![WireValue::Binary(encode_password(password))]),
                other => Err(unexpected(self.as_str(), other)),
            },
            Self::DnArray | Self::UserDnArray | Self::GroupDnArray | Self::MemberDnArray => {
                match value {
                    Value::Entities(entities) => Ok(entities
                        .iter()
                        .map(|entity| WireValue::Text(entity.dn().to_string()))
                        .collect()),
                    other => encode_each(other, self.as_str(), |dn| {
                        Ok(WireValue::Text(dn.to_string()))
                    }),
                }
            }
        }
    }

    /// Decodes raw values that need no directory access.
    ///
    /// Reference types return their DNs as text; use [`FieldType::decode`]
    /// to resolve them into entities.
    pub fn decode_local(&self, raw: RawValues<'_>) -> CodecResult<Value> {
        match self {
            Self::Binary => Ok(Value::from_texts(raw.to_texts())),
            Self::Date => raw
                .first_text()
                .map_or(Ok(Value::Absent), |text| decode_date(&text).map(Value::Time)),
            Self::Timestamp => raw.first_text().map_or(Ok(Value::Absent), |text| {
                Ok(decode_filetime(&text)?.map_or(Value::Absent, Value::Time))
            }),
            Self::Password => Ok(Value::Absent),
            Self::DnArray | Self::UserDnArray | Self::GroupDnArray | Self::MemberDnArray => {
                Ok(Value::from_texts(raw.to_texts()))
            }
        }
    }

    /// Decodes raw values, resolving DN references through `resolver`.
    ///
    /// Mixed-member references query users then groups and keep the first
    /// entity seen for each DN.
    pub fn decode(
        &self,
        attribute: &str,
        raw: RawValues<'_>,
        resolver: &dyn ReferenceResolver,
    ) -> DirectoryResult<Value> {
        if !self.is_reference() {
            return self
                .decode_local(raw)
                .map_err(|e| DirectoryError::codec(attribute, e));
        }

        let dns = raw.to_texts();
        if dns.is_empty() {
            return Ok(Value::Entities(Vec::new()));
        }

        let mut entities: Vec<Entity> = Vec::new();
        for class in self.target_classes() {
            for entity in resolver.resolve_dns(*class, &dns)? {
                if !entities.iter().any(|seen| seen.dn_matches(entity.dn())) {
                    entities.push(entity);
                }
            }
        }
        Ok(Value::Entities(entities))
    }
}

fn unexpected(field: &'static str, value: &Value) -> CodecError {
    CodecError::UnexpectedValue {
        field,
        kind: value.kind(),
    }
}

fn encode_each<F>(value: &Value, field: &'static str, encode: F) -> CodecResult<Vec<WireValue>>
where
    F: Fn(&str) -> CodecResult<WireValue>,
{
    match value {
        Value::Absent => Ok(Vec::new()),
        Value::Text(text) => Ok(vec![encode(text)?]),
        Value::List(items) => items.iter().map(|item| encode(item)).collect(),
        other => Err(unexpected(field, other)),
    }
}

/// Formats a time as AD generalized time.
#[must_use]
pub fn encode_date(time: &DateTime<Utc>) -> String {
    time.format(GENERALIZED_TIME_FORMAT).to_string()
}

/// Parses AD generalized time (`YYYYMMDDHHMMSS[.f]Z`).
pub fn decode_date(text: &str) -> CodecResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), "%Y%m%d%H%M%S%.fZ")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| CodecError::InvalidDate(text.to_string()))
}

/// Converts a time to FILETIME ticks.
pub fn encode_filetime(time: &DateTime<Utc>) -> CodecResult<u64> {
    let seconds = u64::try_from(time.timestamp() + FILETIME_UNIX_OFFSET)
        .map_err(|_| CodecError::InvalidTimestamp(time.to_rfc3339()))?;
    seconds
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|ticks| ticks.checked_add(u64::from(time.timestamp_subsec_nanos() / 100)))
        .ok_or_else(|| CodecError::InvalidTimestamp(time.to_rfc3339()))
}

/// Converts FILETIME ticks to a time.
///
/// `0`, `i64::MAX` and `u64::MAX` mean "never" and decode to `None`.
pub fn decode_filetime(text: &str) -> CodecResult<Option<DateTime<Utc>>> {
    let ticks: u64 = text
        .trim()
        .parse()
        .map_err(|_| CodecError::InvalidTimestamp(text.to_string()))?;

    if ticks == 0 || ticks == u64::MAX || ticks == i64::MAX as u64 {
        return Ok(None);
    }

    let seconds = (ticks / TICKS_PER_SECOND) as i64 - FILETIME_UNIX_OFFSET;
    let nanos = ((ticks % TICKS_PER_SECOND) * 100) as u32;
    Utc.timestamp_opt(seconds, nanos)
        .single()
        .map(Some)
        .ok_or(CodecError::TimestampOutOfRange(ticks))
}

/// Encodes a plaintext password for `unicodePwd`.
#[must_use]
pub fn encode_password(password: &str) -> Vec<u8> {
    format!("\"{password}\"")
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect()
}
