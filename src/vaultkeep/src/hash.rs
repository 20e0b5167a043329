//! Definition hash normalization.
//!
//! The remote API hands out definition hashes in two shapes: unsigned 32-bit
//! values in JSON payloads and signed 32-bit values in its own SQLite dumps
//! and some component maps. Everything in this crate keys on the unsigned
//! form; [`DefinitionHash`] is the one conversion point.

use serde::{Deserialize, Serialize};

const HASH_SPACE: i64 = 1 << 32;

/// Canonical unsigned 32-bit definition hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionHash(u32);

impl DefinitionHash {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Unsigned value used as the storage key
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Signed representation (`value - 2^32` for values above `i32::MAX`)
    pub const fn as_signed(self) -> i32 {
        self.0 as i32
    }

    /// Normalize any integer the remote API might produce.
    ///
    /// Negative values are treated as the signed representation and mapped to
    /// `value + 2^32`. Values outside `[-2^31, 2^32)` are not hashes.
    pub fn from_i64(value: i64) -> Option<Self> {
        normalize(value).map(Self)
    }
}

/// Map a signed or unsigned hash value onto the unsigned key space
pub fn normalize(value: i64) -> Option<u32> {
    if value < -(HASH_SPACE / 2) || value >= HASH_SPACE {
        return None;
    }
    let unsigned = if value < 0 { value + HASH_SPACE } else { value };
    u32::try_from(unsigned).ok()
}

impl From<u32> for DefinitionHash {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<i32> for DefinitionHash {
    fn from(value: i32) -> Self {
        Self(value as u32)
    }
}

impl From<DefinitionHash> for u32 {
    fn from(hash: DefinitionHash) -> Self {
        hash.0
    }
}

impl TryFrom<i64> for DefinitionHash {
    type Error = HashError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_i64(value).ok_or(HashError::OutOfRange(value))
    }
}

impl std::fmt::Display for DefinitionHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for DefinitionHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| HashError::Invalid(s.to_string()))?;
        Self::try_from(value)
    }
}

/// Errors converting raw values into hashes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    #[error("Hash value out of 32-bit range: {0}")]
    OutOfRange(i64),
    #[error("Not a hash: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_negative() {
        assert_eq!(normalize(-1), Some(u32::MAX));
        assert_eq!(normalize(-2_147_483_648), Some(2_147_483_648));
    }

    #[test]
    fn test_normalize_positive_passthrough() {
        assert_eq!(normalize(0), Some(0));
        assert_eq!(normalize(1001), Some(1001));
        assert_eq!(normalize(u32::MAX as i64), Some(u32::MAX));
    }

    #[test]
    fn test_normalize_out_of_range() {
        assert_eq!(normalize(HASH_SPACE), None);
        assert_eq!(normalize(-(HASH_SPACE / 2) - 1), None);
    }

    #[test]
    fn test_signed_unsigned_pair_agree() {
        let unsigned: u32 = 3_260_753_130;
        let signed = unsigned as i64 - HASH_SPACE;
        assert_eq!(DefinitionHash::from_i64(signed), Some(DefinitionHash::new(unsigned)));
        assert_eq!(DefinitionHash::from(signed as i32), DefinitionHash::new(unsigned));
        assert_eq!(DefinitionHash::new(unsigned).as_signed() as i64, signed);
    }

    #[test]
    fn test_parse() {
        assert_eq!("1001".parse::<DefinitionHash>().unwrap().get(), 1001);
        assert_eq!("-1".parse::<DefinitionHash>().unwrap().get(), u32::MAX);
        assert!("ace".parse::<DefinitionHash>().is_err());
        assert!("99999999999".parse::<DefinitionHash>().is_err());
    }
}
