//! Security identifier decoding.
//!
//! Binary layout (as stored in `objectSid`):
//!
//! ```text
//! 0       revision
//! 1       sub-authority count N
//! 2..8    identifier authority, 48-bit big-endian
//! 8..12   first sub-authority (domain identifier), little-endian
//! 12..    N - 1 further sub-authorities, little-endian u32 each
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{CodecError, CodecResult};

const HEADER_LEN: usize = 8;

/// A decoded security identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sid {
    /// SID revision (always 1 in practice).
    pub revision: u8,
    /// Identifier authority.
    pub authority: u64,
    /// Domain identifier (first sub-authority).
    pub domain_id: u32,
    /// Remaining sub-authorities, ending with the RID.
    pub sub_authorities: Vec<u32>,
}

impl Sid {
    /// Parses a binary SID.
    ///
    /// ## Errors
    ///
    /// Returns [`CodecError::SidTooShort`] if the buffer does not hold the
    /// header and every sub-authority the count field announces.
    pub fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::SidTooShort {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }

        let revision = bytes[0];
        let count = usize::from(bytes[1]);
        if count == 0 {
            return Err(CodecError::InvalidSid(
                "sub-authority count is zero".to_string(),
            ));
        }

        // The count covers the domain identifier as well.
        let expected = HEADER_LEN + 4 * count;
        if bytes.len() < expected {
            return Err(CodecError::SidTooShort {
                expected,
                actual: bytes.len(),
            });
        }

        let authority = bytes[2..HEADER_LEN]
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));

        let mut values = bytes[HEADER_LEN..expected]
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));

        let domain_id = values.next().unwrap_or_default();
        let sub_authorities = values.collect();

        Ok(Self {
            revision,
            authority,
            domain_id,
            sub_authorities,
        })
    }

    /// Parses a hex-encoded binary SID.
    ///
    /// Directory clients sometimes hand binary attributes over hex-encoded.
    pub fn from_hex(hex_str: &str) -> CodecResult<Self> {
        let bytes =
            hex::decode(hex_str.trim()).map_err(|_| CodecError::InvalidHex(hex_str.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Returns the relative identifier (last sub-authority).
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.sub_authorities
            .last()
            .copied()
            .unwrap_or(self.domain_id)
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-{}-{}", self.revision, self.authority, self.domain_id)?;
        for sub in &self.sub_authorities {
            write!(f, "-{sub}")?;
        }
        Ok(())
    }
}

impl FromStr for Sid {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
