use thiserror::Error;

/// Errors surfaced by address encoding/decoding and fixed-size identifiers.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// Base58-check checksum did not match the payload.
    #[error("base58-check checksum mismatch")]
    ChecksumMismatch,
    /// Input contained a character outside the base58 alphabet.
    #[error("invalid base58 character")]
    InvalidCharacter,
    /// Payload had the wrong byte length.
    #[error("invalid payload length: expected {expected} bytes, found {actual}")]
    InvalidLength { expected: usize, actual: usize },
    /// Version byte did not match the expected address family.
    #[error("unexpected version byte: expected {expected}, found {actual}")]
    UnexpectedVersion { expected: u8, actual: u8 },
}
