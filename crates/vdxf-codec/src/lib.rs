//! VDXF wire codec and protocol message model.
//!
//! Defines the canonical byte encoding for login, authentication, and
//! user-data exchange messages, the ordinal registry that compacts
//! well-known VDXF keys on the wire, and the JSON views of each message.

pub mod auth;
pub mod buffer;
pub mod error;
pub mod flags;
pub mod identity;
pub mod login;
pub mod message;
pub mod registry;
pub mod userdata;

pub use auth::AuthenticationResponseDetails;
pub use error::CodecError;
pub use flags::CapabilityFlags;
pub use identity::{CompactAddressKind, CompactAddressValue, CompactIdentityAddress};
pub use login::LoginResponseDetails;
pub use message::{Message, MessageKind};
pub use registry::{DuplicatePolicy, OrdinalRegistry, RegistryEntry};
pub use userdata::{DataSigner, RequestUserData, SignerType, UserDataRequest};
