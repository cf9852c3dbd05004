//! User-data exchange records.
//!
//! [`RequestUserData`] and [`UserDataRequest`] are near-duplicates in the
//! protocol; both are instantiations of one shared codec routine so the two
//! wire layouts cannot drift. Presence bits (HAS_SIGNER, HAS_REQUESTED_KEYS,
//! HAS_REQUEST_ID) are recomputed from the actual fields at encode time,
//! which keeps a present-but-empty requested-keys list distinguishable from
//! an absent one.

use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::buffer::{
    compact_size_length, var_int_length, var_int_length_u64, var_slice_length, BufferReader,
    BufferWriter,
};
use crate::error::CodecError;
use crate::flags::{
    CapabilityFlags, FLAG_HAS_REQUESTED_KEYS, FLAG_HAS_REQUEST_ID, FLAG_HAS_SIGNER,
};

/// Current user-data record version.
pub const USER_DATA_VERSION: u64 = 1;

fn default_version() -> u64 {
    USER_DATA_VERSION
}

/// Signer discriminant. The wire and the JSON view carry the numeric form;
/// the JSON view additionally accepts the enumerated names, and either input
/// form serializes to the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignerType {
    IdentityId,
    Fqn,
}

impl SignerType {
    #[must_use]
    pub fn as_u64(self) -> u64 {
        match self {
            Self::IdentityId => 1,
            Self::Fqn => 2,
        }
    }

    pub fn from_u64(value: u64) -> Result<Self, CodecError> {
        match value {
            1 => Ok(Self::IdentityId),
            2 => Ok(Self::Fqn),
            _ => Err(CodecError::InvalidMessage("unknown signer type")),
        }
    }
}

impl Serialize for SignerType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.as_u64())
    }
}

struct SignerTypeVisitor;

impl Visitor<'_> for SignerTypeVisitor {
    type Value = SignerType;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a numeric or enumerated signer type discriminant")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        SignerType::from_u64(v).map_err(E::custom)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        u64::try_from(v)
            .map_err(|_| E::custom("signer type must be non-negative"))
            .and_then(|v| SignerType::from_u64(v).map_err(E::custom))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: DeError,
    {
        match v {
            "IS_IDENTITYID" => Ok(SignerType::IdentityId),
            "IS_FQN" => Ok(SignerType::Fqn),
            _ => Err(E::custom("unknown signer type name")),
        }
    }
}

impl<'de> Deserialize<'de> for SignerType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SignerTypeVisitor)
    }
}

/// Identity that will sign the returned user data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSigner {
    #[serde(default = "default_version")]
    pub version: u64,
    #[serde(rename = "type")]
    pub signer_type: SignerType,
    pub address: String,
    #[serde(rename = "rootsystemname")]
    pub root_system_name: String,
}

impl DataSigner {
    fn byte_length(&self) -> usize {
        var_int_length_u64(self.version)
            + var_int_length_u64(self.signer_type.as_u64())
            + var_slice_length(self.address.as_bytes())
            + var_slice_length(self.root_system_name.as_bytes())
    }

    fn write(&self, writer: &mut BufferWriter) {
        writer.write_var_int_u64(self.version);
        writer.write_var_int_u64(self.signer_type.as_u64());
        writer.write_var_slice(self.address.as_bytes());
        writer.write_var_slice(self.root_system_name.as_bytes());
    }

    fn read(reader: &mut BufferReader<'_>) -> Result<Self, CodecError> {
        let version = reader.read_var_int_u64()?;
        let signer_type = SignerType::from_u64(reader.read_var_int_u64()?)?;
        let address = read_string(reader)?;
        let root_system_name = read_string(reader)?;
        Ok(Self {
            version,
            signer_type,
            address,
            root_system_name,
        })
    }
}

fn read_string(reader: &mut BufferReader<'_>) -> Result<String, CodecError> {
    let raw = reader.read_var_slice()?;
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|_| CodecError::InvalidMessage("string field is not valid utf-8"))
}

/// Guards a decoded element count against the bytes actually remaining, so a
/// lying count fails as truncated input instead of a giant allocation.
fn read_count(reader: &mut BufferReader<'_>) -> Result<usize, CodecError> {
    let count = reader.read_compact_size()?;
    let remaining = reader.remaining() as u64;
    if count > remaining {
        return Err(CodecError::TruncatedInput {
            needed: count as usize,
            available: reader.remaining(),
        });
    }
    Ok(count as usize)
}

// Shared codec routine for both user-data record types. Field order:
// version, flags, search pairs, then flag-gated signer, requested keys, and
// request id.

#[derive(Debug, Default)]
struct UserDataFields {
    version: u64,
    flags: CapabilityFlags,
    search_data_key: Vec<(String, String)>,
    signer: Option<DataSigner>,
    requested_keys: Option<Vec<String>>,
    request_id: Option<String>,
}

fn effective_flags(
    flags: &CapabilityFlags,
    signer: bool,
    requested_keys: bool,
    request_id: bool,
) -> CapabilityFlags {
    flags
        .with_bit(FLAG_HAS_SIGNER, signer)
        .with_bit(FLAG_HAS_REQUESTED_KEYS, requested_keys)
        .with_bit(FLAG_HAS_REQUEST_ID, request_id)
}

fn user_data_length(fields: &UserDataFields) -> usize {
    let flags = effective_flags(
        &fields.flags,
        fields.signer.is_some(),
        fields.requested_keys.is_some(),
        fields.request_id.is_some(),
    );
    let mut len = var_int_length_u64(fields.version) + var_int_length(flags.value());
    len += compact_size_length(fields.search_data_key.len() as u64);
    for (key, value) in &fields.search_data_key {
        len += var_slice_length(key.as_bytes()) + var_slice_length(value.as_bytes());
    }
    if let Some(signer) = &fields.signer {
        len += signer.byte_length();
    }
    if let Some(keys) = &fields.requested_keys {
        len += compact_size_length(keys.len() as u64);
        for key in keys {
            len += var_slice_length(key.as_bytes());
        }
    }
    if let Some(request_id) = &fields.request_id {
        len += var_slice_length(request_id.as_bytes());
    }
    len
}

fn write_user_data(fields: &UserDataFields, writer: &mut BufferWriter) {
    let flags = effective_flags(
        &fields.flags,
        fields.signer.is_some(),
        fields.requested_keys.is_some(),
        fields.request_id.is_some(),
    );
    writer.write_var_int_u64(fields.version);
    writer.write_var_int(flags.value());
    writer.write_compact_size(fields.search_data_key.len() as u64);
    for (key, value) in &fields.search_data_key {
        writer.write_var_slice(key.as_bytes());
        writer.write_var_slice(value.as_bytes());
    }
    if let Some(signer) = &fields.signer {
        signer.write(writer);
    }
    if let Some(keys) = &fields.requested_keys {
        writer.write_compact_size(keys.len() as u64);
        for key in keys {
            writer.write_var_slice(key.as_bytes());
        }
    }
    if let Some(request_id) = &fields.request_id {
        writer.write_var_slice(request_id.as_bytes());
    }
}

fn read_user_data(
    reader: &mut BufferReader<'_>,
    allow_request_id: bool,
) -> Result<UserDataFields, CodecError> {
    let version = reader.read_var_int_u64()?;
    let flags = CapabilityFlags::from_value(reader.read_var_int()?);

    let pair_count = read_count(reader)?;
    let mut search_data_key = Vec::with_capacity(pair_count);
    for _ in 0..pair_count {
        let key = read_string(reader)?;
        let value = read_string(reader)?;
        search_data_key.push((key, value));
    }

    let signer = if flags.contains(FLAG_HAS_SIGNER) {
        Some(DataSigner::read(reader)?)
    } else {
        None
    };

    let requested_keys = if flags.contains(FLAG_HAS_REQUESTED_KEYS) {
        let count = read_count(reader)?;
        let mut keys = Vec::with_capacity(count);
        for _ in 0..count {
            keys.push(read_string(reader)?);
        }
        Some(keys)
    } else {
        None
    };

    let request_id = if flags.contains(FLAG_HAS_REQUEST_ID) {
        if !allow_request_id {
            return Err(CodecError::InvalidMessage(
                "request identifier is not part of this record",
            ));
        }
        Some(read_string(reader)?)
    } else {
        None
    };

    Ok(UserDataFields {
        version,
        flags,
        search_data_key,
        signer,
        requested_keys,
        request_id,
    })
}

mod kv_pairs {
    //! Serde view of `search_data_key`: an ordered sequence of single-entry
    //! mappings.

    use std::collections::BTreeMap;

    use serde::de::Error as DeError;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(pairs: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(pairs.len()))?;
        for (key, value) in pairs {
            let mut entry = BTreeMap::new();
            entry.insert(key, value);
            seq.serialize_element(&entry)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<BTreeMap<String, String>> = Vec::deserialize(deserializer)?;
        raw.into_iter()
            .map(|mut entry| {
                if entry.len() != 1 {
                    return Err(D::Error::custom(
                        "search data entries must be single-entry mappings",
                    ));
                }
                Ok(entry.pop_first().expect("length checked"))
            })
            .collect()
    }
}

/// User-data request without a request identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestUserData {
    #[serde(default = "default_version")]
    pub version: u64,
    #[serde(default)]
    pub flags: CapabilityFlags,
    #[serde(rename = "searchdatakey", with = "kv_pairs", default)]
    pub search_data_key: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<DataSigner>,
    #[serde(
        rename = "requestedkeys",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub requested_keys: Option<Vec<String>>,
}

impl Default for RequestUserData {
    fn default() -> Self {
        Self {
            version: USER_DATA_VERSION,
            flags: CapabilityFlags::zero(),
            search_data_key: Vec::new(),
            signer: None,
            requested_keys: None,
        }
    }
}

impl RequestUserData {
    fn fields(&self) -> UserDataFields {
        UserDataFields {
            version: self.version,
            flags: self.flags.clone(),
            search_data_key: self.search_data_key.clone(),
            signer: self.signer.clone(),
            requested_keys: self.requested_keys.clone(),
            request_id: None,
        }
    }

    /// The flag value actually written, with presence bits recomputed from
    /// the fields.
    #[must_use]
    pub fn effective_flags(&self) -> CapabilityFlags {
        effective_flags(
            &self.flags,
            self.signer.is_some(),
            self.requested_keys.is_some(),
            false,
        )
    }

    #[must_use]
    pub fn byte_length(&self) -> usize {
        user_data_length(&self.fields())
    }

    #[must_use]
    pub fn to_buffer(&self) -> Vec<u8> {
        let fields = self.fields();
        let mut writer = BufferWriter::new(user_data_length(&fields));
        write_user_data(&fields, &mut writer);
        writer.finish()
    }

    /// Decodes one record starting at `offset`, returning it and the offset
    /// just past the consumed bytes.
    pub fn from_buffer(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let mut reader = BufferReader::with_offset(bytes, offset);
        let fields = read_user_data(&mut reader, false)?;
        Ok((
            Self {
                version: fields.version,
                flags: fields.flags,
                search_data_key: fields.search_data_key,
                signer: fields.signer,
                requested_keys: fields.requested_keys,
            },
            reader.offset(),
        ))
    }

    pub fn to_json(&self) -> Result<serde_json::Value, CodecError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, CodecError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// User-data request carrying a request identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDataRequest {
    #[serde(default = "default_version")]
    pub version: u64,
    #[serde(default)]
    pub flags: CapabilityFlags,
    #[serde(rename = "searchdatakey", with = "kv_pairs", default)]
    pub search_data_key: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<DataSigner>,
    #[serde(
        rename = "requestedkeys",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub requested_keys: Option<Vec<String>>,
    #[serde(
        rename = "requestid",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub request_id: Option<String>,
}

impl Default for UserDataRequest {
    fn default() -> Self {
        Self {
            version: USER_DATA_VERSION,
            flags: CapabilityFlags::zero(),
            search_data_key: Vec::new(),
            signer: None,
            requested_keys: None,
            request_id: None,
        }
    }
}

impl UserDataRequest {
    fn fields(&self) -> UserDataFields {
        UserDataFields {
            version: self.version,
            flags: self.flags.clone(),
            search_data_key: self.search_data_key.clone(),
            signer: self.signer.clone(),
            requested_keys: self.requested_keys.clone(),
            request_id: self.request_id.clone(),
        }
    }

    /// The flag value actually written, with presence bits recomputed from
    /// the fields.
    #[must_use]
    pub fn effective_flags(&self) -> CapabilityFlags {
        effective_flags(
            &self.flags,
            self.signer.is_some(),
            self.requested_keys.is_some(),
            self.request_id.is_some(),
        )
    }

    #[must_use]
    pub fn byte_length(&self) -> usize {
        user_data_length(&self.fields())
    }

    #[must_use]
    pub fn to_buffer(&self) -> Vec<u8> {
        let fields = self.fields();
        let mut writer = BufferWriter::new(user_data_length(&fields));
        write_user_data(&fields, &mut writer);
        writer.finish()
    }

    /// Decodes one record starting at `offset`, returning it and the offset
    /// just past the consumed bytes.
    pub fn from_buffer(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let mut reader = BufferReader::with_offset(bytes, offset);
        let fields = read_user_data(&mut reader, true)?;
        Ok((
            Self {
                version: fields.version,
                flags: fields.flags,
                search_data_key: fields.search_data_key,
                signer: fields.signer,
                requested_keys: fields.requested_keys,
                request_id: fields.request_id,
            },
            reader.offset(),
        ))
    }

    pub fn to_json(&self) -> Result<serde_json::Value, CodecError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, CodecError> {
        Ok(serde_json::from_value(value)?)
    }
}
