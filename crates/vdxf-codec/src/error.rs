use thiserror::Error;
use vdxf_core::error::AddressError;

/// Errors returned by codec, registry, and message operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Buffer shorter than the field being read.
    #[error("truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },
    /// Invalid or non-minimal variable-length integer encoding.
    #[error("malformed varint: {0}")]
    MalformedVarint(&'static str),
    /// Base58-check or identifier failure.
    #[error("address error: {0}")]
    Address(#[from] AddressError),
    /// Duplicate ordinal or key registration under the reject policy.
    #[error("registry conflict: ordinal {ordinal} or its key is already registered")]
    RegistryConflict { ordinal: u32 },
    /// Compact identity address discriminant and payload variant disagree.
    #[error("type mismatch: {0}")]
    TypeMismatch(&'static str),
    /// Message-level schema validation failure.
    #[error("invalid message: {0}")]
    InvalidMessage(&'static str),
    /// JSON view serialization/deserialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
