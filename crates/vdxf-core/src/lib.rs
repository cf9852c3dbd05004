//! Core VDXF primitives shared across crates.
//!
//! Includes fixed-size identifier types, hash helpers, the base58-check
//! address codec, and base errors.

pub mod address;
pub mod error;
pub mod hash;
pub mod types;
pub mod util;

pub use types::{
    IdentityHash, VdxfKey, HASH160_LEN, I_ADDR_VERSION, R_ADDR_VERSION,
};
