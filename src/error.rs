use std::fmt;

use uuid::Uuid;

/// Reasons the coordinator rejects a client action.
///
/// Every variant is recoverable at the session level: the sender gets one
/// `error` notification carrying [`CoordinatorError::code`] and the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// The referenced game or connection no longer exists
    NotFound(String),
    /// The caller is not the side to move
    NotYourTurn,
    /// The move breaks the rules of chess
    IllegalMove(String),
    /// A required earlier step has not happened yet
    NotReady(String),
    /// The caller is already engaged in a conflicting session
    Busy(String),
    /// The connection died without saying goodbye (detected by the reaper)
    TransportLost(Uuid),
    /// The inbound frame could not be decoded
    InvalidPayload(String),
}

impl CoordinatorError {
    /// Stable machine-readable code sent to clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::IllegalMove(_) => "ILLEGAL_MOVE",
            Self::NotReady(_) => "NOT_READY",
            Self::Busy(_) => "BUSY",
            Self::TransportLost(_) => "TRANSPORT_LOST",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
        }
    }
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::NotYourTurn => write!(f, "It is not your turn"),
            Self::IllegalMove(msg) => write!(f, "Illegal move: {msg}"),
            Self::NotReady(msg) => write!(f, "Not ready: {msg}"),
            Self::Busy(msg) => write!(f, "Busy: {msg}"),
            Self::TransportLost(id) => write!(f, "Transport lost for connection {id}"),
            Self::InvalidPayload(msg) => write!(f, "Invalid payload: {msg}"),
        }
    }
}

impl std::error::Error for CoordinatorError {}
