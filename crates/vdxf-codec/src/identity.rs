//! Compact identity addresses: a tagged value holding either a raw identity
//! hash or a friendly (human-readable) name, plus a root-system qualifier.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use vdxf_core::address::to_base58_check;
use vdxf_core::hash::hash160;
use vdxf_core::util::to_lowercase_c_locale;
use vdxf_core::{IdentityHash, HASH160_LEN, I_ADDR_VERSION};

use crate::buffer::{
    compact_size_length, var_slice_length, BufferReader, BufferWriter,
};
use crate::error::CodecError;

/// Current compact identity address version.
pub const COMPACT_ID_VERSION: u64 = 1;

/// Discriminant written before the variant payload on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompactAddressKind {
    /// Raw 20-byte identity hash.
    IdentityId = 1,
    /// Fully qualified friendly name.
    Fqn = 2,
}

impl CompactAddressKind {
    fn from_u8(value: u8) -> Result<Self, CodecError> {
        match value {
            1 => Ok(Self::IdentityId),
            2 => Ok(Self::Fqn),
            _ => Err(CodecError::InvalidMessage(
                "unknown compact address discriminant",
            )),
        }
    }
}

/// Variant payload of a compact identity address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompactAddressValue {
    Hash(IdentityHash),
    Name(String),
}

/// Tagged identity reference carrying its root-system context.
///
/// The discriminant determines which variant is populated; constructing a
/// value whose discriminant and payload disagree is a [`CodecError::TypeMismatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactIdentityAddress {
    pub version: u64,
    kind: CompactAddressKind,
    value: CompactAddressValue,
    pub root_system_name: String,
}

impl CompactIdentityAddress {
    /// Builds a value from explicit parts, enforcing discriminant/payload
    /// agreement.
    pub fn new(
        version: u64,
        kind: CompactAddressKind,
        value: CompactAddressValue,
        root_system_name: &str,
    ) -> Result<Self, CodecError> {
        match (kind, &value) {
            (CompactAddressKind::IdentityId, CompactAddressValue::Hash(_))
            | (CompactAddressKind::Fqn, CompactAddressValue::Name(_)) => Ok(Self {
                version,
                kind,
                value,
                root_system_name: to_lowercase_c_locale(root_system_name),
            }),
            _ => Err(CodecError::TypeMismatch(
                "compact address discriminant does not match its payload variant",
            )),
        }
    }

    /// Builds an identity-hash form from an i-address string.
    pub fn from_address(address: &str, root_system_name: &str) -> Result<Self, CodecError> {
        let hash = IdentityHash::from_address(address)?;
        Ok(Self {
            version: COMPACT_ID_VERSION,
            kind: CompactAddressKind::IdentityId,
            value: CompactAddressValue::Hash(hash),
            root_system_name: to_lowercase_c_locale(root_system_name),
        })
    }

    /// Builds a friendly-name form. A trailing `@` style qualifier is kept
    /// as supplied; the name is folded with the C-locale helper.
    #[must_use]
    pub fn from_name(name: &str, root_system_name: &str) -> Self {
        Self {
            version: COMPACT_ID_VERSION,
            kind: CompactAddressKind::Fqn,
            value: CompactAddressValue::Name(to_lowercase_c_locale(name)),
            root_system_name: to_lowercase_c_locale(root_system_name),
        }
    }

    #[must_use]
    pub fn kind(&self) -> CompactAddressKind {
        self.kind
    }

    #[must_use]
    pub fn value(&self) -> &CompactAddressValue {
        &self.value
    }

    /// The fully qualified name used for address derivation, without the
    /// trailing `@` sentinel. A bare name is qualified by the root system
    /// carried in this value.
    fn qualified_name(&self, name: &str) -> String {
        let bare = name.strip_suffix('@').unwrap_or(name);
        if bare.contains('.') || self.root_system_name.is_empty() {
            bare.to_string()
        } else {
            format!("{bare}.{}", self.root_system_name)
        }
    }

    /// Resolves the value back to a canonical identity i-address string.
    pub fn to_address(&self) -> Result<String, CodecError> {
        match &self.value {
            CompactAddressValue::Hash(hash) => Ok(hash.to_address()),
            CompactAddressValue::Name(name) => {
                if name.is_empty() {
                    return Err(CodecError::InvalidMessage(
                        "cannot resolve an empty friendly name",
                    ));
                }
                let qualified = self.qualified_name(name);
                Ok(to_base58_check(
                    &hash160(qualified.as_bytes()),
                    I_ADDR_VERSION,
                ))
            }
        }
    }

    /// Exact serialized length of this value.
    #[must_use]
    pub fn byte_length(&self) -> usize {
        let payload = match &self.value {
            CompactAddressValue::Hash(_) => HASH160_LEN,
            CompactAddressValue::Name(name) => var_slice_length(name.as_bytes()),
        };
        compact_size_length(self.version) + 1 + payload
            + var_slice_length(self.root_system_name.as_bytes())
    }

    /// Writes `compact_size(version) || kind || payload || root_system_name`.
    pub fn write(&self, writer: &mut BufferWriter) {
        writer.write_compact_size(self.version);
        writer.write_u8(self.kind as u8);
        match &self.value {
            CompactAddressValue::Hash(hash) => writer.write_slice(hash.as_bytes()),
            CompactAddressValue::Name(name) => writer.write_var_slice(name.as_bytes()),
        }
        writer.write_var_slice(self.root_system_name.as_bytes());
    }

    #[must_use]
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut writer = BufferWriter::new(self.byte_length());
        self.write(&mut writer);
        writer.finish()
    }

    /// Reads one value at the reader's cursor. The discriminant is read
    /// first and fully determines the payload shape.
    pub fn read(reader: &mut BufferReader<'_>) -> Result<Self, CodecError> {
        let version = reader.read_compact_size()?;
        let kind = CompactAddressKind::from_u8(reader.read_u8()?)?;
        let value = match kind {
            CompactAddressKind::IdentityId => CompactAddressValue::Hash(
                IdentityHash::from_slice(reader.read_slice(HASH160_LEN)?)?,
            ),
            CompactAddressKind::Fqn => {
                let raw = reader.read_var_slice()?;
                let name = std::str::from_utf8(raw)
                    .map_err(|_| CodecError::InvalidMessage("name is not valid utf-8"))?;
                CompactAddressValue::Name(name.to_string())
            }
        };
        let raw = reader.read_var_slice()?;
        let root_system_name = std::str::from_utf8(raw)
            .map_err(|_| CodecError::InvalidMessage("root system name is not valid utf-8"))?
            .to_string();
        Ok(Self {
            version,
            kind,
            value,
            root_system_name,
        })
    }

    /// Decodes one value starting at `offset`, returning the value and the
    /// offset just past the consumed bytes.
    pub fn from_buffer(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let mut reader = BufferReader::with_offset(bytes, offset);
        let value = Self::read(&mut reader)?;
        Ok((value, reader.offset()))
    }
}

impl Default for CompactIdentityAddress {
    fn default() -> Self {
        Self::from_name("", "")
    }
}

impl fmt::Display for CompactIdentityAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            CompactAddressValue::Hash(hash) => write!(f, "{hash}"),
            CompactAddressValue::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CompactIdentityAddressJson {
    version: u64,
    #[serde(rename = "type")]
    kind: u8,
    value: String,
    rootsystemname: String,
}

impl Serialize for CompactIdentityAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = match &self.value {
            CompactAddressValue::Hash(hash) => hash.to_address(),
            CompactAddressValue::Name(name) => name.clone(),
        };
        CompactIdentityAddressJson {
            version: self.version,
            kind: self.kind as u8,
            value,
            rootsystemname: self.root_system_name.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CompactIdentityAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = CompactIdentityAddressJson::deserialize(deserializer)?;
        let kind = CompactAddressKind::from_u8(raw.kind).map_err(D::Error::custom)?;
        let value = match kind {
            CompactAddressKind::IdentityId => CompactAddressValue::Hash(
                IdentityHash::from_address(&raw.value).map_err(D::Error::custom)?,
            ),
            CompactAddressKind::Fqn => CompactAddressValue::Name(to_lowercase_c_locale(&raw.value)),
        };
        CompactIdentityAddress::new(raw.version, kind, value, &raw.rootsystemname)
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CompactAddressKind, CompactAddressValue, CompactIdentityAddress, COMPACT_ID_VERSION,
    };
    use crate::error::CodecError;
    use vdxf_core::{IdentityHash, HASH160_LEN};

    #[test]
    fn identity_id_form_round_trips() {
        let hash = IdentityHash::new([0x5a_u8; HASH160_LEN]);
        let original = CompactIdentityAddress::from_address(&hash.to_address(), "VRSC")
            .expect("address should parse");
        assert_eq!(original.kind(), CompactAddressKind::IdentityId);

        let bytes = original.to_buffer();
        assert_eq!(bytes.len(), original.byte_length());
        let (decoded, consumed) =
            CompactIdentityAddress::from_buffer(&bytes, 0).expect("decode should succeed");
        assert_eq!(decoded, original);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn fqn_form_round_trips_and_folds_case() {
        let original = CompactIdentityAddress::from_name("Bob@", "VRSC");
        assert_eq!(original.kind(), CompactAddressKind::Fqn);
        assert_eq!(
            original.value(),
            &CompactAddressValue::Name("bob@".to_string())
        );
        assert_eq!(original.root_system_name, "vrsc");

        let bytes = original.to_buffer();
        let (decoded, consumed) =
            CompactIdentityAddress::from_buffer(&bytes, 0).expect("decode should succeed");
        assert_eq!(decoded, original);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn mismatched_discriminant_is_rejected() {
        let err = CompactIdentityAddress::new(
            COMPACT_ID_VERSION,
            CompactAddressKind::IdentityId,
            CompactAddressValue::Name("bob@".to_string()),
            "vrsc",
        )
        .expect_err("mismatched variant should fail");
        assert!(matches!(err, CodecError::TypeMismatch(_)));
    }

    #[test]
    fn unknown_discriminant_byte_fails_decode() {
        let mut bytes = CompactIdentityAddress::from_name("bob@", "vrsc").to_buffer();
        bytes[1] = 0x7e;
        let err = CompactIdentityAddress::from_buffer(&bytes, 0)
            .expect_err("unknown discriminant should fail");
        assert!(matches!(err, CodecError::InvalidMessage(_)));
    }

    #[test]
    fn fqn_resolution_qualifies_bare_names() {
        let bare = CompactIdentityAddress::from_name("bob@", "vrsc");
        let qualified = CompactIdentityAddress::from_name("bob.vrsc@", "vrsc");
        assert_eq!(
            bare.to_address().expect("bare name should resolve"),
            qualified.to_address().expect("qualified name should resolve")
        );
    }

    #[test]
    fn hash_and_name_forms_resolve_independently() {
        let fqn = CompactIdentityAddress::from_name("alice@", "vrsc");
        let address = fqn.to_address().expect("name should resolve");
        let id = CompactIdentityAddress::from_address(&address, "vrsc")
            .expect("resolved address should parse");
        assert_eq!(
            id.to_address().expect("hash form should resolve"),
            address
        );
    }

    #[test]
    fn json_round_trip_preserves_both_forms() {
        for original in [
            CompactIdentityAddress::from_name("bob@", "vrsc"),
            CompactIdentityAddress::from_address(
                &IdentityHash::new([0x33_u8; HASH160_LEN]).to_address(),
                "vrsc",
            )
            .expect("address should parse"),
        ] {
            let json = serde_json::to_value(&original).expect("value should serialize");
            let parsed: CompactIdentityAddress =
                serde_json::from_value(json).expect("value should deserialize");
            assert_eq!(parsed.to_buffer(), original.to_buffer());
        }
    }
}
