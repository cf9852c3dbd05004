//! Polymorphic message dispatch.
//!
//! The registry maps an ordinal found on the wire to a [`MessageKind`];
//! [`Message::decode`] turns that tag plus the payload bytes into the typed
//! message, without any dynamic class lookup.

use crate::auth::AuthenticationResponseDetails;
use crate::error::CodecError;
use crate::login::LoginResponseDetails;
use crate::userdata::{RequestUserData, UserDataRequest};

/// Decoder tag associating a registered VDXF key with its message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    LoginResponse,
    AuthenticationResponse,
    RequestUserData,
    UserDataRequest,
}

/// A decoded protocol message of any supported kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    LoginResponse(LoginResponseDetails),
    AuthenticationResponse(AuthenticationResponseDetails),
    RequestUserData(RequestUserData),
    UserDataRequest(UserDataRequest),
}

impl Message {
    /// Decodes one message of the given kind starting at `offset`, returning
    /// it and the offset just past the consumed bytes.
    pub fn decode(
        kind: MessageKind,
        bytes: &[u8],
        offset: usize,
    ) -> Result<(Self, usize), CodecError> {
        match kind {
            MessageKind::LoginResponse => LoginResponseDetails::from_buffer(bytes, offset)
                .map(|(m, next)| (Self::LoginResponse(m), next)),
            MessageKind::AuthenticationResponse => {
                AuthenticationResponseDetails::from_buffer(bytes, offset)
                    .map(|(m, next)| (Self::AuthenticationResponse(m), next))
            }
            MessageKind::RequestUserData => RequestUserData::from_buffer(bytes, offset)
                .map(|(m, next)| (Self::RequestUserData(m), next)),
            MessageKind::UserDataRequest => UserDataRequest::from_buffer(bytes, offset)
                .map(|(m, next)| (Self::UserDataRequest(m), next)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::LoginResponse(_) => MessageKind::LoginResponse,
            Self::AuthenticationResponse(_) => MessageKind::AuthenticationResponse,
            Self::RequestUserData(_) => MessageKind::RequestUserData,
            Self::UserDataRequest(_) => MessageKind::UserDataRequest,
        }
    }

    #[must_use]
    pub fn byte_length(&self) -> usize {
        match self {
            Self::LoginResponse(m) => m.byte_length(),
            Self::AuthenticationResponse(m) => m.byte_length(),
            Self::RequestUserData(m) => m.byte_length(),
            Self::UserDataRequest(m) => m.byte_length(),
        }
    }

    pub fn to_buffer(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::LoginResponse(m) => m.to_buffer(),
            Self::AuthenticationResponse(m) => Ok(m.to_buffer()),
            Self::RequestUserData(m) => Ok(m.to_buffer()),
            Self::UserDataRequest(m) => Ok(m.to_buffer()),
        }
    }
}
