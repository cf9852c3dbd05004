//! Login response details: the flag set and request identifier a wallet
//! commits to when answering a login challenge.

use serde::{Deserialize, Serialize};
use vdxf_core::hash::sha256;
use vdxf_core::{IdentityHash, HASH160_LEN};

use crate::buffer::{BufferReader, BufferWriter};
use crate::error::CodecError;
use crate::flags::CapabilityFlags;

/// Canonical wire form: `varint(flags) || hash160(request_id)`.
///
/// The request identifier is carried as an i-address string in memory and in
/// JSON; only its 20-byte hash payload hits the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoginResponseDetails {
    #[serde(default)]
    pub flags: CapabilityFlags,
    #[serde(rename = "requestid", default)]
    pub request_id: String,
}

impl LoginResponseDetails {
    #[must_use]
    pub fn new(flags: CapabilityFlags, request_id: impl Into<String>) -> Self {
        Self {
            flags,
            request_id: request_id.into(),
        }
    }

    /// Exact serialized length; must match what [`Self::to_buffer`] writes.
    #[must_use]
    pub fn byte_length(&self) -> usize {
        self.flags.byte_length() + HASH160_LEN
    }

    pub fn to_buffer(&self) -> Result<Vec<u8>, CodecError> {
        let hash = IdentityHash::from_address(&self.request_id)?;
        let mut writer = BufferWriter::new(self.byte_length());
        writer.write_var_int(self.flags.value());
        writer.write_slice(hash.as_bytes());
        Ok(writer.finish())
    }

    /// Decodes one record starting at `offset`, returning it and the offset
    /// just past the consumed bytes.
    pub fn from_buffer(bytes: &[u8], offset: usize) -> Result<(Self, usize), CodecError> {
        let mut reader = BufferReader::with_offset(bytes, offset);
        let flags = CapabilityFlags::from_value(reader.read_var_int()?);
        let hash = IdentityHash::from_slice(reader.read_slice(HASH160_LEN)?)?;
        Ok((
            Self {
                flags,
                request_id: hash.to_address(),
            },
            reader.offset(),
        ))
    }

    /// Commitment hash over the canonical encoding; the value a private key
    /// signs. No domain-separation prefix.
    pub fn to_sha256(&self) -> Result<[u8; 32], CodecError> {
        Ok(sha256(&self.to_buffer()?))
    }

    pub fn to_json(&self) -> Result<serde_json::Value, CodecError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, CodecError> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::LoginResponseDetails;
    use crate::error::CodecError;
    use crate::flags::{CapabilityFlags, FLAG_ATTESTATION, FLAG_FULL_DATA};
    use vdxf_core::hash::sha256;
    use vdxf_core::{IdentityHash, HASH160_LEN};

    fn sample() -> LoginResponseDetails {
        LoginResponseDetails::new(
            CapabilityFlags::from_mask(FLAG_FULL_DATA | FLAG_ATTESTATION),
            IdentityHash::new([0x2b_u8; HASH160_LEN]).to_address(),
        )
    }

    #[test]
    fn buffer_round_trip_is_byte_identical() {
        let original = sample();
        let bytes = original.to_buffer().expect("encode should succeed");
        assert_eq!(bytes.len(), original.byte_length());

        let (decoded, consumed) =
            LoginResponseDetails::from_buffer(&bytes, 0).expect("decode should succeed");
        assert_eq!(consumed, bytes.len());
        assert_eq!(
            decoded.to_buffer().expect("re-encode should succeed"),
            bytes
        );
        assert_eq!(decoded, original);
    }

    #[test]
    fn json_round_trip_reproduces_the_same_bytes() {
        let original = sample();
        let json = original.to_json().expect("json view should build");
        assert_eq!(json["flags"], 5);
        let parsed = LoginResponseDetails::from_json(json).expect("json should parse");
        assert_eq!(
            parsed.to_buffer().expect("encode should succeed"),
            original.to_buffer().expect("encode should succeed")
        );
    }

    #[test]
    fn commitment_hash_covers_the_canonical_bytes() {
        let original = sample();
        let expected = sha256(&original.to_buffer().expect("encode should succeed"));
        assert_eq!(
            original.to_sha256().expect("commitment should build"),
            expected
        );
    }

    #[test]
    fn default_request_id_cannot_encode() {
        let details = LoginResponseDetails::default();
        assert!(matches!(
            details.to_buffer(),
            Err(CodecError::Address(_))
        ));
    }

    #[test]
    fn truncated_hash_fails_decode() {
        let bytes = sample().to_buffer().expect("encode should succeed");
        let err = LoginResponseDetails::from_buffer(&bytes[..bytes.len() - 1], 0)
            .expect_err("truncated input should fail");
        assert!(matches!(err, CodecError::TruncatedInput { .. }));
    }
}
