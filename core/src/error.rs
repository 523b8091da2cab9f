use thiserror::Error;
use wlbridge_common::device::{SessionId, UnknownValue};
use wlbridge_common::link::LinkError;
use wlbridge_common::network::ssid::SsidTooLong;
use wlbridge_protocols::PayloadError;
use wlbridge_protocols::command::{DescriptorError, Opcode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The session is stopped; nothing was sent.
    #[error("{session}: driver is not loaded")]
    NotLoaded { session: SessionId },
    #[error("{session}: {opcode} failed with code {code}")]
    IoFailure {
        session: SessionId,
        opcode: Opcode,
        code: i32,
    },
    /// The failure that pushed the session over the consecutive-error threshold.
    #[error("{session}: device hung, {opcode} crossed the error threshold")]
    Hung { session: SessionId, opcode: Opcode },
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("own hardware address unavailable")]
    AddressUnavailable(#[source] TransportError),
    #[error(transparent)]
    InvalidArgument(#[from] PayloadError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid scan request: {0}")]
    InvalidArgument(#[from] PayloadError),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Everything the driver-operations surface can fail with.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("malformed device reply: {0}")]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0}: no link")]
    NoLink(SessionId),
    #[error("{0}: association deferred until real scan results arrive")]
    AssociationDeferred(SessionId),
}

impl DriverError {
    pub fn is_not_loaded(&self) -> bool {
        matches!(
            self,
            DriverError::Transport(TransportError::NotLoaded { .. })
                | DriverError::Scan(ScanError::Transport(TransportError::NotLoaded { .. }))
        )
    }
}

impl From<UnknownValue> for DriverError {
    fn from(err: UnknownValue) -> Self {
        DriverError::InvalidArgument(err.to_string())
    }
}

impl From<SsidTooLong> for DriverError {
    fn from(err: SsidTooLong) -> Self {
        DriverError::InvalidArgument(err.to_string())
    }
}
