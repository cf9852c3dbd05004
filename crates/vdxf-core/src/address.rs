//! Base58-check encoding for version-tagged 20-byte hash identifiers.
//!
//! The checksum is the first four bytes of double SHA-256 over
//! `version || payload`; decoding fails on any corruption rather than
//! auto-correcting.

use crate::error::AddressError;
use crate::hash::sha256d;

/// Checksum length appended to every base58-check string.
pub const CHECKSUM_LEN: usize = 4;

/// Encodes `payload` under the given version byte as a base58-check string.
pub fn to_base58_check(payload: &[u8], version: u8) -> String {
    let mut raw = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    raw.push(version);
    raw.extend_from_slice(payload);
    let checksum = sha256d(&raw);
    raw.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    bs58::encode(raw).into_string()
}

/// Decodes a base58-check string into its version byte and payload.
pub fn from_base58_check(input: &str) -> Result<(u8, Vec<u8>), AddressError> {
    let raw = bs58::decode(input)
        .into_vec()
        .map_err(|_| AddressError::InvalidCharacter)?;
    if raw.len() < 1 + CHECKSUM_LEN {
        return Err(AddressError::InvalidLength {
            expected: 1 + CHECKSUM_LEN,
            actual: raw.len(),
        });
    }
    let (body, checksum) = raw.split_at(raw.len() - CHECKSUM_LEN);
    let expected = sha256d(body);
    if checksum != &expected[..CHECKSUM_LEN] {
        return Err(AddressError::ChecksumMismatch);
    }
    Ok((body[0], body[1..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::{from_base58_check, to_base58_check};
    use crate::error::AddressError;

    #[test]
    fn round_trip_preserves_version_and_payload() {
        let payload = [0xAB_u8; 20];
        let encoded = to_base58_check(&payload, 102);
        let (version, decoded) = from_base58_check(&encoded).expect("decode should succeed");
        assert_eq!(version, 102);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn corrupted_character_fails_checksum() {
        let encoded = to_base58_check(&[0x11_u8; 20], 102);
        let mut chars: Vec<char> = encoded.chars().collect();
        chars[0] = if chars[0] == '2' { '3' } else { '2' };
        let corrupted: String = chars.into_iter().collect();
        assert_eq!(
            from_base58_check(&corrupted),
            Err(AddressError::ChecksumMismatch)
        );
    }

    #[test]
    fn non_alphabet_character_is_rejected() {
        // '0' is not part of the base58 alphabet.
        assert_eq!(
            from_base58_check("0000"),
            Err(AddressError::InvalidCharacter)
        );
    }

    #[test]
    fn short_input_is_rejected() {
        assert_eq!(
            from_base58_check("2g"),
            Err(AddressError::InvalidLength {
                expected: 5,
                actual: 1,
            })
        );
    }
}
