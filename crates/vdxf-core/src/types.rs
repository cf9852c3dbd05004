use std::fmt;
use std::str::FromStr;

use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::{from_base58_check, to_base58_check};
use crate::error::AddressError;
use crate::hash::hash160;
use crate::util::to_lowercase_c_locale;

/// Length of the HASH160 digest backing every protocol identifier.
pub const HASH160_LEN: usize = 20;

/// Version byte of the identity ("i-address") family, shared by VDXF keys.
pub const I_ADDR_VERSION: u8 = 102;
/// Version byte of the transparent ("r-address") family.
pub const R_ADDR_VERSION: u8 = 60;

/// Opaque 20-byte hash identifying a protocol-level VDXF key.
///
/// Surfaced to users as a base58-check i-address string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VdxfKey([u8; HASH160_LEN]);

impl VdxfKey {
    #[must_use]
    pub const fn new(bytes: [u8; HASH160_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; HASH160_LEN] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; HASH160_LEN] =
            bytes.try_into().map_err(|_| AddressError::InvalidLength {
                expected: HASH160_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Derives a key from a fully qualified, case-insensitive name.
    ///
    /// The name is folded with the C-locale helper before hashing, so
    /// `"VRSC::a"` and `"vrsc::a"` derive the same key.
    #[must_use]
    pub fn from_qualified_name(name: &str) -> Self {
        Self(hash160(to_lowercase_c_locale(name).as_bytes()))
    }

    /// Encodes the key as an i-address string.
    #[must_use]
    pub fn to_address(&self) -> String {
        to_base58_check(&self.0, I_ADDR_VERSION)
    }

    /// Parses an i-address string, rejecting other address families.
    pub fn from_address(input: &str) -> Result<Self, AddressError> {
        let (version, payload) = from_base58_check(input)?;
        if version != I_ADDR_VERSION {
            return Err(AddressError::UnexpectedVersion {
                expected: I_ADDR_VERSION,
                actual: version,
            });
        }
        Self::from_slice(&payload)
    }
}

impl fmt::Display for VdxfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

impl FromStr for VdxfKey {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_address(s)
    }
}

impl Serialize for VdxfKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_address())
    }
}

struct VdxfKeyVisitor;

impl Visitor<'_> for VdxfKeyVisitor {
    type Value = VdxfKey;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a base58-check i-address string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        VdxfKey::from_address(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for VdxfKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(VdxfKeyVisitor)
    }
}

/// The 20-byte HASH160 payload of an identity i-address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityHash([u8; HASH160_LEN]);

impl IdentityHash {
    #[must_use]
    pub const fn new(bytes: [u8; HASH160_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; HASH160_LEN] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; HASH160_LEN] =
            bytes.try_into().map_err(|_| AddressError::InvalidLength {
                expected: HASH160_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Encodes the hash as an identity i-address string.
    #[must_use]
    pub fn to_address(&self) -> String {
        to_base58_check(&self.0, I_ADDR_VERSION)
    }

    /// Parses an identity i-address string, rejecting other families.
    pub fn from_address(input: &str) -> Result<Self, AddressError> {
        let (version, payload) = from_base58_check(input)?;
        if version != I_ADDR_VERSION {
            return Err(AddressError::UnexpectedVersion {
                expected: I_ADDR_VERSION,
                actual: version,
            });
        }
        Self::from_slice(&payload)
    }
}

impl fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

impl FromStr for IdentityHash {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_address(s)
    }
}

impl Serialize for IdentityHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_address())
    }
}

struct IdentityHashVisitor;

impl Visitor<'_> for IdentityHashVisitor {
    type Value = IdentityHash;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a base58-check identity i-address string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        IdentityHash::from_address(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for IdentityHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(IdentityHashVisitor)
    }
}
