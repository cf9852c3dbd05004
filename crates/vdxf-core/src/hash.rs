use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes SHA-256 and returns the 32-byte digest.
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(input);
    digest
        .as_slice()
        .try_into()
        .expect("digest should be 32 bytes")
}

/// Double SHA-256, the base58-check checksum digest.
pub fn sha256d(input: &[u8]) -> [u8; 32] {
    sha256(&sha256(input))
}

/// RIPEMD-160 over SHA-256, the 20-byte address digest.
pub fn hash160(input: &[u8]) -> [u8; 20] {
    let digest = Ripemd160::digest(sha256(input));
    digest
        .as_slice()
        .try_into()
        .expect("digest should be 20 bytes")
}
