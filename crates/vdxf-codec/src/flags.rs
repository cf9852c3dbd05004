//! Bitflag capability fields negotiated by request/response messages.
//!
//! The wire value is an arbitrary-precision bit set; mutual exclusivity of
//! flag combinations (such as FULL_DATA with PARTIAL_DATA) is a protocol
//! convention enforced by applications, never by the codec.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::buffer::var_int_length;

/// The message carries the full requested data set.
pub const FLAG_FULL_DATA: u64 = 1 << 0;
/// The message carries a partial data set.
pub const FLAG_PARTIAL_DATA: u64 = 1 << 1;
/// The message carries an attestation.
pub const FLAG_ATTESTATION: u64 = 1 << 2;
/// A signer record follows the search data on the wire.
pub const FLAG_HAS_SIGNER: u64 = 1 << 3;
/// A requested-keys list follows on the wire (possibly empty).
pub const FLAG_HAS_REQUESTED_KEYS: u64 = 1 << 4;
/// A request identifier follows on the wire.
pub const FLAG_HAS_REQUEST_ID: u64 = 1 << 5;

/// Combinable capability bit set, varint-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilityFlags(BigUint);

impl CapabilityFlags {
    #[must_use]
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    #[must_use]
    pub fn from_mask(mask: u64) -> Self {
        Self(BigUint::from(mask))
    }

    #[must_use]
    pub fn from_value(value: BigUint) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(&self) -> &BigUint {
        &self.0
    }

    #[must_use]
    pub fn or(&self, other: &Self) -> Self {
        Self(&self.0 | &other.0)
    }

    #[must_use]
    pub fn or_mask(&self, mask: u64) -> Self {
        Self(&self.0 | BigUint::from(mask))
    }

    #[must_use]
    pub fn contains(&self, mask: u64) -> bool {
        let mask = BigUint::from(mask);
        (&self.0 & &mask) == mask
    }

    /// Returns a copy with the masked bits forced to `set`.
    #[must_use]
    pub fn with_bit(&self, mask: u64, set: bool) -> Self {
        let mask = BigUint::from(mask);
        let cleared = &self.0 - (&self.0 & &mask);
        if set {
            Self(cleared | mask)
        } else {
            Self(cleared)
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Exact varint-encoded length of the flag value.
    #[must_use]
    pub fn byte_length(&self) -> usize {
        var_int_length(&self.0)
    }
}

impl From<u64> for CapabilityFlags {
    fn from(mask: u64) -> Self {
        Self::from_mask(mask)
    }
}

// The JSON view surfaces flags as a plain decimal integer. The wire keeps
// full precision; a flag value past 64 bits fails JSON serialization
// explicitly instead of truncating.
impl Serialize for CapabilityFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.to_u64() {
            Some(value) => serializer.serialize_u64(value),
            None => Err(serde::ser::Error::custom(
                "capability flags exceed the 64-bit JSON view",
            )),
        }
    }
}

struct CapabilityFlagsVisitor;

impl Visitor<'_> for CapabilityFlagsVisitor {
    type Value = CapabilityFlags;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a non-negative integer flag value")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        Ok(CapabilityFlags::from_mask(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        u64::try_from(v)
            .map(CapabilityFlags::from_mask)
            .map_err(|_| E::custom("flag value must be non-negative"))
    }
}

impl<'de> Deserialize<'de> for CapabilityFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_u64(CapabilityFlagsVisitor)
    }
}
