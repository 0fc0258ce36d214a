use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chess::{Color, Outcome, PieceKind, Position, Square};
use crate::hub::ConnectionId;

/// Game lifecycle status. Ended games are removed from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Active,
    Ended,
}

/// Result from one participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Checkmate,
    Resignation,
    Stalemate,
    ThreefoldRepetition,
    InsufficientMaterial,
    Agreement,
    OpponentDisconnected,
}

impl EndReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkmate => "checkmate",
            Self::Resignation => "resignation",
            Self::Stalemate => "stalemate",
            Self::ThreefoldRepetition => "threefold repetition",
            Self::InsufficientMaterial => "insufficient material",
            Self::Agreement => "agreement",
            Self::OpponentDisconnected => "opponent disconnected",
        }
    }
}

/// How a game finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conclusion {
    Decisive { winner: Color, reason: EndReason },
    Drawn { reason: EndReason },
}

impl Conclusion {
    #[must_use]
    pub const fn reason(self) -> EndReason {
        match self {
            Self::Decisive { reason, .. } | Self::Drawn { reason } => reason,
        }
    }

    #[must_use]
    pub fn result_for(self, side: Color) -> GameResult {
        match self {
            Self::Decisive { winner, .. } if winner == side => GameResult::Win,
            Self::Decisive { .. } => GameResult::Loss,
            Self::Drawn { .. } => GameResult::Draw,
        }
    }
}

/// One accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
    pub played_at: DateTime<Utc>,
}

/// Authoritative record of one chess pairing.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: String,
    pub white: ConnectionId,
    pub black: ConnectionId,
    pub status: GameStatus,
    position: Position,
    moves: Vec<MoveRecord>,
    repetitions: HashMap<String, u32>,
    draw_offer: Option<Color>,
    pub started_at: DateTime<Utc>,
}

impl GameSession {
    #[must_use]
    pub fn new(id: String, white: ConnectionId, black: ConnectionId) -> Self {
        Self::with_position(id, white, black, Position::starting())
    }

    fn with_position(id: String, white: ConnectionId, black: ConnectionId, position: Position) -> Self {
        let repetitions = HashMap::from([(position.repetition_key(), 1)]);
        Self {
            id,
            white,
            black,
            status: GameStatus::Active,
            position,
            moves: Vec::new(),
            repetitions,
            draw_offer: None,
            started_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn side_of(&self, id: ConnectionId) -> Option<Color> {
        if id == self.white {
            Some(Color::White)
        } else if id == self.black {
            Some(Color::Black)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn player(&self, side: Color) -> ConnectionId {
        match side {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// Side to move according to the canonical position.
    #[must_use]
    pub const fn turn(&self) -> Color {
        self.position.turn()
    }

    /// Canonical position as FEN.
    #[must_use]
    pub fn state(&self) -> String {
        self.position.to_fen()
    }

    #[must_use]
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    #[must_use]
    pub const fn draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    pub const fn set_draw_offer(&mut self, offer: Option<Color>) {
        self.draw_offer = offer;
    }

    /// Apply a move for the side to move. Returns the logged move and, if the
    /// game is over afterwards, how it ended. `None` means illegal.
    pub fn play(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Option<(MoveRecord, Option<Conclusion>)> {
        let played = self.position.play(from, to, promotion)?;

        let record = MoveRecord {
            from: played.from.to_string(),
            to: played.to.to_string(),
            promotion: played.promotion.map(|kind| kind.letter().to_string()),
            played_at: Utc::now(),
        };
        self.moves.push(record.clone());
        self.draw_offer = None;

        let seen = self
            .repetitions
            .entry(self.position.repetition_key())
            .or_insert(0);
        *seen += 1;
        let repeated = *seen >= 3;

        let conclusion = match self.position.outcome() {
            Some(Outcome::Checkmate { winner }) => Some(Conclusion::Decisive {
                winner,
                reason: EndReason::Checkmate,
            }),
            Some(Outcome::Stalemate) => Some(Conclusion::Drawn {
                reason: EndReason::Stalemate,
            }),
            Some(Outcome::InsufficientMaterial) => Some(Conclusion::Drawn {
                reason: EndReason::InsufficientMaterial,
            }),
            None if repeated => Some(Conclusion::Drawn {
                reason: EndReason::ThreefoldRepetition,
            }),
            None => None,
        };

        Some((record, conclusion))
    }
}

/// Active games by id, with a participant index.
#[derive(Debug, Default)]
pub struct GameTable {
    games: HashMap<String, GameSession>,
    by_participant: HashMap<ConnectionId, String>,
}

impl GameTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, game: GameSession) {
        self.by_participant.insert(game.white, game.id.clone());
        self.by_participant.insert(game.black, game.id.clone());
        self.games.insert(game.id.clone(), game);
    }

    /// Remove a game and its participant index entries.
    pub fn remove(&mut self, game_id: &str) -> Option<GameSession> {
        let game = self.games.remove(game_id)?;
        for id in [game.white, game.black] {
            if self.by_participant.get(&id).is_some_and(|g| g == game_id) {
                self.by_participant.remove(&id);
            }
        }
        Some(game)
    }

    #[must_use]
    pub fn get(&self, game_id: &str) -> Option<&GameSession> {
        self.games.get(game_id)
    }

    pub fn get_mut(&mut self, game_id: &str) -> Option<&mut GameSession> {
        self.games.get_mut(game_id)
    }

    #[must_use]
    pub fn contains(&self, game_id: &str) -> bool {
        self.games.contains_key(game_id)
    }

    /// The active game `id` plays in, if any.
    #[must_use]
    pub fn game_of(&self, id: ConnectionId) -> Option<&str> {
        self.by_participant.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn participants(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.by_participant.keys().copied()
    }
}
