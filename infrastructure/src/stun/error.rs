//! Error types for the STUN adapter

use extip_domain::PeerError;
use thiserror::Error;

/// Result type alias for STUN operations
pub type Result<T> = std::result::Result<T, StunError>;

/// Errors that can occur while talking to a STUN server
#[derive(Error, Debug)]
pub enum StunError {
    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Message too short: {0} bytes")]
    TooShort(usize),

    #[error("Not a STUN message")]
    NotStun,

    #[error("Declared length {declared} does not fit {available} bytes")]
    LengthMismatch { declared: usize, available: usize },

    #[error("Transaction id does not match the request")]
    TransactionMismatch,

    #[error("Unexpected message type 0x{0:04x}")]
    UnexpectedType(u16),

    #[error("Truncated attribute 0x{0:04x}")]
    TruncatedAttribute(u16),

    #[error("Unknown address family 0x{0:02x}")]
    UnknownFamily(u8),

    #[error("Response carries no mapped address")]
    NoMappedAddress,

    #[error("Error response ({code}): {reason}")]
    ErrorResponse { code: u16, reason: String },
}

impl From<StunError> for PeerError {
    fn from(e: StunError) -> Self {
        match e {
            StunError::Io(io) => PeerError::Transport(io.to_string()),
            StunError::ErrorResponse { code, reason } => PeerError::Rejected { code, reason },
            other => PeerError::Malformed(other.to_string()),
        }
    }
}
