//! Authentication response details. Structurally parallel to the login
//! response, but the challenge identifier is a compact identity address so
//! both identity-hash and friendly-name forms are supported.

use serde::{Deserialize, Serialize};
use vdxf_core::hash::sha256;

use crate::buffer::{BufferReader, BufferWriter};
use crate::error::CodecError;
use crate::flags::CapabilityFlags;
use crate::identity::CompactIdentityAddress;

/// Canonical wire form: `varint(flags) || compact_identity_address`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthenticationResponseDetails {
    #[serde(default)]
    pub flags: CapabilityFlags,
    #[serde(rename = "requestid", default)]
    pub request_id: CompactIdentityAddress,
}

impl AuthenticationResponseDetails {
    #[must_use]
    pub fn new(flags: CapabilityFlags, request_id: CompactIdentityAddress) -> Self {
        Self { flags, request_id }
    }

    #[must_use]
    pub fn byte_length(&self) -> usize {
        self.flags.byte_length() + self.request_id.byte_length()
    }

    #[must_use]
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut writer = BufferWriter::new(self.byte_length());
        writer.write_var_int(self.flags.value());
        self.request_id.write(&mut writer);
        writer.finish()
    }

    /// Decodes one record starting at `offset`, returning it and the offset
    /// just past the consumed bytes.
    pub fn from_buffer(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let mut reader = BufferReader::with_offset(bytes, offset);
        let flags = CapabilityFlags::from_value(reader.read_var_int()?);
        let request_id = CompactIdentityAddress::read(&mut reader)?;
        Ok((Self { flags, request_id }, reader.offset()))
    }

    /// Commitment hash over the canonical encoding; the value a private key
    /// signs. No domain-separation prefix.
    #[must_use]
    pub fn to_sha256(&self) -> [u8; 32] {
        sha256(&self.to_buffer())
    }

    pub fn to_json(&self) -> Result<serde_json::Value, CodecError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, CodecError> {
        Ok(serde_json::from_value(value)?)
    }
}
