//! JSON frames exchanged over the `WebSocket`.
//!
//! Every frame has the shape `{"type": "<event>", "payload": {...}}`. Event
//! names are kebab-case, payload fields camelCase. Events without a payload
//! may omit it.

use serde::{Deserialize, Serialize};

use crate::chess::Color;
use crate::coordinator::{GameResult, Pool};
use crate::error::CoordinatorError;
use crate::hub::ConnectionId;

/// Client → coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    Announce {
        peer_id: String,
    },
    RequestVideoMatch,
    RequestChessMatch,
    LeavePool,
    RelayMessage {
        #[serde(alias = "message")]
        text: String,
    },
    RequestNext,
    SubmitMove(MoveRequest),
    Resign {
        game_id: String,
    },
    OfferDraw {
        game_id: String,
    },
    AcceptDraw {
        game_id: String,
    },
    DeclineDraw {
        game_id: String,
    },
}

/// A move submission. `claimed_state` is the mover's own idea of the
/// resulting position; it is logged when it disagrees and never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub game_id: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub promotion: Option<String>,
    #[serde(default, alias = "fen")]
    pub claimed_state: Option<String>,
}

impl ClientEvent {
    /// Decode one inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::InvalidPayload`] for unparseable JSON,
    /// unknown event types, or missing fields.
    pub fn decode(frame: &str) -> Result<Self, CoordinatorError> {
        serde_json::from_str(frame).map_err(|e| CoordinatorError::InvalidPayload(e.to_string()))
    }

    /// Event name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Announce { .. } => "announce",
            Self::RequestVideoMatch => "request-video-match",
            Self::RequestChessMatch => "request-chess-match",
            Self::LeavePool => "leave-pool",
            Self::RelayMessage { .. } => "relay-message",
            Self::RequestNext => "request-next",
            Self::SubmitMove(_) => "submit-move",
            Self::Resign { .. } => "resign",
            Self::OfferDraw { .. } => "offer-draw",
            Self::AcceptDraw { .. } => "accept-draw",
            Self::DeclineDraw { .. } => "decline-draw",
        }
    }
}

/// Coordinator → client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    Connected {
        connection_id: ConnectionId,
    },
    Waiting {
        pool: Pool,
    },
    /// Video pairing established; `partner_id` is the partner's peer identifier.
    MatchFound {
        partner_id: String,
    },
    /// Chess pairing established.
    GameStart {
        game_id: String,
        color: Color,
        opponent_id: String,
    },
    RelayedMessage {
        text: String,
        sender: String,
        /// Unix epoch milliseconds
        timestamp: i64,
    },
    PartnerDisconnected {
        partner_id: String,
    },
    MoveRelayed {
        game_id: String,
        from: String,
        to: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        promotion: Option<String>,
        state: String,
    },
    DrawOffered {
        game_id: String,
    },
    DrawDeclined {
        game_id: String,
    },
    GameEnded {
        game_id: String,
        result: GameResult,
        reason: String,
    },
    Error {
        code: String,
        message: String,
    },
}

impl From<&CoordinatorError> for ServerEvent {
    fn from(err: &CoordinatorError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
