//! Matchmaking and session broker.
//!
//! All shared tables (connections, waiting pools, pair sessions, games) sit
//! behind one mutex. Every client event and every reaper tick takes the lock
//! once, validates, mutates, and collects its notifications in an outbox.
//! The outbox is queued on the [`ConnectionHub`] before the lock is released,
//! so every connection sees events in commit order. Queuing never waits.

mod games;
mod pairs;
mod pool;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub use games::{
    Conclusion, EndReason, GameResult, GameSession, GameStatus, GameTable, MoveRecord,
};
pub use pairs::PairTable;
pub use pool::{Pool, WaitingPool};

use crate::chess::{Color, PieceKind, Square};
use crate::error::CoordinatorError;
use crate::hub::{ConnectionHub, ConnectionId, WsTx};
use crate::protocol::{ClientEvent, MoveRequest, ServerEvent};
use crate::utils::{generate_game_id, is_valid_game_id};

const MAX_PEER_ID_LENGTH: usize = 128;
const MAX_MESSAGE_LENGTH: usize = 4096;

/// Notifications produced inside one atomic step.
type Outbox = Vec<(ConnectionId, ServerEvent)>;

#[derive(Debug)]
struct Connection {
    peer_id: Option<String>,
    connected_at: DateTime<Utc>,
}

/// What a match request led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// No partner was available; the caller is now in the pool.
    Waiting,
    /// The caller was paired with this connection.
    Paired(ConnectionId),
}

/// Diagnostic counters for the status endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorStats {
    pub waiting_video: usize,
    pub waiting_chess: usize,
    pub pair_sessions: usize,
    pub game_sessions: usize,
    pub connections: usize,
    pub uptime_secs: u64,
}

/// Read-only copy of an active game.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub id: String,
    pub white: ConnectionId,
    pub black: ConnectionId,
    pub status: GameStatus,
    pub turn: Color,
    pub state: String,
    pub moves: Vec<MoveRecord>,
    pub started_at: DateTime<Utc>,
}

impl From<&GameSession> for GameSnapshot {
    fn from(game: &GameSession) -> Self {
        Self {
            id: game.id.clone(),
            white: game.white,
            black: game.black,
            status: game.status,
            turn: game.turn(),
            state: game.state(),
            moves: game.moves().to_vec(),
            started_at: game.started_at,
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    connections: HashMap<ConnectionId, Connection>,
    video_pool: WaitingPool,
    chess_pool: WaitingPool,
    pairs: PairTable,
    games: GameTable,
}

impl Tables {
    fn pool_mut(&mut self, pool: Pool) -> &mut WaitingPool {
        match pool {
            Pool::Video => &mut self.video_pool,
            Pool::Chess => &mut self.chess_pool,
        }
    }

    /// Identifier shown to a partner: the announced peer id, else the
    /// connection id.
    fn label(&self, id: ConnectionId) -> String {
        self.connections
            .get(&id)
            .and_then(|c| c.peer_id.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn is_registered(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Attach a peer identifier. `None` for unknown connections, `Some(true)`
    /// on the first announce, `Some(false)` on repeats (which keep the first).
    fn announce(&mut self, id: ConnectionId, peer_id: &str) -> Option<bool> {
        let conn = self.connections.get_mut(&id)?;
        if conn.peer_id.is_some() {
            return Some(false);
        }
        conn.peer_id = Some(peer_id.to_string());
        tracing::info!(connection_id = %id, peer_id, "peer identifier announced");
        Some(true)
    }

    fn request_match(
        &mut self,
        id: ConnectionId,
        pool: Pool,
        out: &mut Outbox,
    ) -> Result<MatchOutcome, CoordinatorError> {
        let Some(conn) = self.connections.get(&id) else {
            return Err(CoordinatorError::NotFound(format!(
                "connection {id} is no longer registered"
            )));
        };
        let announced = conn.peer_id.is_some();

        if let Some(game_id) = self.games.game_of(id) {
            return Err(CoordinatorError::Busy(format!(
                "already playing game {game_id}"
            )));
        }

        match pool {
            Pool::Video => {
                if !announced {
                    return Err(CoordinatorError::NotReady(
                        "announce a peer identifier before requesting a video match".to_string(),
                    ));
                }
                // Asking for a new video partner while paired means "next".
                let label = self.label(id);
                self.end_pair(id, &label, out);
            }
            Pool::Chess => {
                if self.pairs.partner_of(id).is_some() {
                    return Err(CoordinatorError::Busy(
                        "already in a video session".to_string(),
                    ));
                }
            }
        }

        self.pool_mut(pool.other()).remove(id);

        let Some(partner) = self.pool_mut(pool).take_other(id) else {
            self.pool_mut(pool).insert(id);
            out.push((id, ServerEvent::Waiting { pool }));
            tracing::debug!(connection_id = %id, %pool, "waiting for a partner");
            return Ok(MatchOutcome::Waiting);
        };
        // A duplicate request may have left the caller waiting already.
        self.pool_mut(pool).remove(id);

        match pool {
            Pool::Video => self.start_pair(id, partner, out)?,
            Pool::Chess => self.start_game(id, partner, out),
        }
        Ok(MatchOutcome::Paired(partner))
    }

    fn leave_pools(&mut self, id: ConnectionId) -> bool {
        let left_video = self.video_pool.remove(id);
        let left_chess = self.chess_pool.remove(id);
        left_video || left_chess
    }

    fn start_pair(
        &mut self,
        a: ConnectionId,
        b: ConnectionId,
        out: &mut Outbox,
    ) -> Result<(), CoordinatorError> {
        if !self.pairs.link(a, b) {
            tracing::error!(connection_id = %a, partner_id = %b, "refusing inconsistent pairing");
            self.video_pool.insert(b);
            return Err(CoordinatorError::Busy(
                "partner is no longer available".to_string(),
            ));
        }

        let (label_a, label_b) = (self.label(a), self.label(b));
        tracing::info!(peer_a = %label_a, peer_b = %label_b, "video match created");
        out.push((a, ServerEvent::MatchFound { partner_id: label_b }));
        out.push((b, ServerEvent::MatchFound { partner_id: label_a }));
        Ok(())
    }

    fn start_game(&mut self, a: ConnectionId, b: ConnectionId, out: &mut Outbox) {
        let (white, black) = if rand::random::<bool>() { (a, b) } else { (b, a) };

        let mut game_id = generate_game_id();
        while self.games.contains(&game_id) {
            game_id = generate_game_id();
        }

        self.games
            .insert(GameSession::new(game_id.clone(), white, black));
        tracing::info!(%game_id, white = %white, black = %black, "chess game started");

        out.push((
            white,
            ServerEvent::GameStart {
                game_id: game_id.clone(),
                color: Color::White,
                opponent_id: self.label(black),
            },
        ));
        out.push((
            black,
            ServerEvent::GameStart {
                game_id,
                color: Color::Black,
                opponent_id: self.label(white),
            },
        ));
    }

    /// Dissolve `id`'s pairing, telling the partner who left.
    fn end_pair(&mut self, id: ConnectionId, label: &str, out: &mut Outbox) -> Option<ConnectionId> {
        let partner = self.pairs.unlink(id)?;
        if self.is_registered(partner) {
            out.push((
                partner,
                ServerEvent::PartnerDisconnected {
                    partner_id: label.to_string(),
                },
            ));
        }
        tracing::info!(connection_id = %id, partner_id = %partner, "video session ended");
        Some(partner)
    }

    fn relay(&self, id: ConnectionId, text: String, out: &mut Outbox) {
        let Some(partner) = self.pairs.partner_of(id) else {
            tracing::debug!(connection_id = %id, "no partner to relay to");
            return;
        };
        if !self.is_registered(partner) {
            return;
        }
        out.push((
            partner,
            ServerEvent::RelayedMessage {
                text,
                sender: self.label(id),
                timestamp: Utc::now().timestamp_millis(),
            },
        ));
    }

    /// Look up a game the caller plays in, with the caller's side.
    fn participant(
        &mut self,
        id: ConnectionId,
        game_id: &str,
    ) -> Result<(&mut GameSession, Color), CoordinatorError> {
        if !is_valid_game_id(game_id) {
            return Err(CoordinatorError::NotFound(format!(
                "{game_id} is not a game identifier"
            )));
        }
        let game = self
            .games
            .get_mut(game_id)
            .ok_or_else(|| CoordinatorError::NotFound(format!("game {game_id} does not exist")))?;
        let side = game.side_of(id).ok_or_else(|| {
            CoordinatorError::NotFound(format!("you are not playing game {game_id}"))
        })?;
        Ok((game, side))
    }

    fn submit_move(
        &mut self,
        id: ConnectionId,
        request: &MoveRequest,
        out: &mut Outbox,
    ) -> Result<(), CoordinatorError> {
        let (game, side) = self.participant(id, &request.game_id)?;
        if game.turn() != side {
            return Err(CoordinatorError::NotYourTurn);
        }

        let from = parse_square(&request.from)?;
        let to = parse_square(&request.to)?;
        let promotion = match request.promotion.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(piece) => Some(PieceKind::from_promotion(piece).ok_or_else(|| {
                CoordinatorError::IllegalMove(format!("unknown promotion piece {piece}"))
            })?),
        };

        let (record, conclusion) = game.play(from, to, promotion).ok_or_else(|| {
            CoordinatorError::IllegalMove(format!("{from}{to} is not legal in this position"))
        })?;

        let state = game.state();
        if let Some(claimed) = &request.claimed_state
            && *claimed != state
        {
            tracing::debug!(
                game_id = %request.game_id,
                claimed = %claimed,
                canonical = %state,
                "client-reported position differs from canonical state"
            );
        }

        out.push((
            game.player(side.opponent()),
            ServerEvent::MoveRelayed {
                game_id: request.game_id.clone(),
                from: record.from,
                to: record.to,
                promotion: record.promotion,
                state,
            },
        ));

        if let Some(conclusion) = conclusion {
            self.end_game(&request.game_id, conclusion, out);
        }
        Ok(())
    }

    fn resign(&mut self, id: ConnectionId, game_id: &str, out: &mut Outbox) -> Result<(), CoordinatorError> {
        let (_, side) = self.participant(id, game_id)?;
        self.end_game(
            game_id,
            Conclusion::Decisive {
                winner: side.opponent(),
                reason: EndReason::Resignation,
            },
            out,
        );
        Ok(())
    }

    fn offer_draw(&mut self, id: ConnectionId, game_id: &str, out: &mut Outbox) -> Result<(), CoordinatorError> {
        let (game, side) = self.participant(id, game_id)?;
        game.set_draw_offer(Some(side));
        out.push((
            game.player(side.opponent()),
            ServerEvent::DrawOffered {
                game_id: game_id.to_string(),
            },
        ));
        Ok(())
    }

    /// Answer the opponent's pending draw offer.
    fn answer_draw(
        &mut self,
        id: ConnectionId,
        game_id: &str,
        accept: bool,
        out: &mut Outbox,
    ) -> Result<(), CoordinatorError> {
        let (game, side) = self.participant(id, game_id)?;
        if game.draw_offer() != Some(side.opponent()) {
            return Err(CoordinatorError::NotReady(
                "there is no draw offer to answer".to_string(),
            ));
        }

        if accept {
            self.end_game(
                game_id,
                Conclusion::Drawn {
                    reason: EndReason::Agreement,
                },
                out,
            );
        } else {
            game.set_draw_offer(None);
            out.push((
                game.player(side.opponent()),
                ServerEvent::DrawDeclined {
                    game_id: game_id.to_string(),
                },
            ));
        }
        Ok(())
    }

    /// Finish a game: notify whichever participants are still registered and
    /// drop the record.
    fn end_game(&mut self, game_id: &str, conclusion: Conclusion, out: &mut Outbox) {
        let Some(mut game) = self.games.remove(game_id) else {
            return;
        };
        game.status = GameStatus::Ended;

        let reason = conclusion.reason().as_str();
        for side in [Color::White, Color::Black] {
            let player = game.player(side);
            if self.is_registered(player) {
                out.push((
                    player,
                    ServerEvent::GameEnded {
                        game_id: game.id.clone(),
                        result: conclusion.result_for(side),
                        reason: reason.to_string(),
                    },
                ));
            }
        }
        tracing::info!(
            game_id = %game.id,
            reason,
            moves = game.moves().len(),
            "chess game ended"
        );
    }

    /// Cascading cleanup for a departed connection. Returns whether anything
    /// was removed; a second call for the same id is a no-op.
    fn deregister(&mut self, id: ConnectionId, out: &mut Outbox) -> bool {
        let label = self.label(id);
        let registered = self.connections.remove(&id).is_some();
        let waiting = self.leave_pools(id);
        let partner = self.end_pair(id, &label, out);

        let mut ended_games = 0;
        while let Some(game_id) = self.games.game_of(id).map(str::to_owned) {
            let side = self
                .games
                .get(&game_id)
                .and_then(|game| game.side_of(id))
                .unwrap_or(Color::White);
            self.end_game(
                &game_id,
                Conclusion::Decisive {
                    winner: side.opponent(),
                    reason: EndReason::OpponentDisconnected,
                },
                out,
            );
            ended_games += 1;
        }

        registered || waiting || partner.is_some() || ended_games > 0
    }

    /// Every connection id referenced anywhere in the tables.
    fn known_ids(&self) -> HashSet<ConnectionId> {
        self.connections
            .keys()
            .copied()
            .chain(self.pairs.participants())
            .chain(self.games.participants())
            .chain(self.video_pool.iter())
            .chain(self.chess_pool.iter())
            .collect()
    }

    fn pool_of(&self, id: ConnectionId) -> Option<Pool> {
        if self.video_pool.contains(id) {
            Some(Pool::Video)
        } else if self.chess_pool.contains(id) {
            Some(Pool::Chess)
        } else {
            None
        }
    }
}

fn parse_square(s: &str) -> Result<Square, CoordinatorError> {
    Square::parse(s).ok_or_else(|| CoordinatorError::IllegalMove(format!("invalid square {s}")))
}

/// Process-wide coordinator handle. Cheap to clone; clones share the tables.
#[derive(Debug, Clone)]
pub struct Coordinator {
    tables: Arc<Mutex<Tables>>,
    hub: ConnectionHub,
    started_at: Instant,
    match_on_announce: bool,
}

impl Coordinator {
    /// Create a coordinator delivering through `hub`.
    ///
    /// With `match_on_announce`, a connection's first `announce` also enters
    /// the video pool.
    #[must_use]
    pub fn new(hub: ConnectionHub, match_on_announce: bool) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            hub,
            started_at: Instant::now(),
            match_on_announce,
        }
    }

    /// Run one atomic step against the tables and queue its outbox while
    /// still holding the lock.
    ///
    /// A panic inside a previous step poisons the mutex; the tables are still
    /// consistent because every step validates before it writes, so the guard
    /// is recovered rather than propagated.
    fn with_tables<T>(&self, op: impl FnOnce(&mut Tables, &mut Outbox) -> T) -> T {
        let mut outbox = Outbox::new();
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let result = op(&mut *tables, &mut outbox);
        for (id, event) in &outbox {
            self.hub.send(*id, event);
        }
        drop(tables);
        result
    }

    /// Register a new live connection whose frames go out through `tx`.
    pub fn register(&self, tx: WsTx) -> ConnectionId {
        let id = Uuid::new_v4();
        self.hub.insert(id, tx);
        self.with_tables(|tables, out| {
            tables.connections.insert(
                id,
                Connection {
                    peer_id: None,
                    connected_at: Utc::now(),
                },
            );
            out.push((id, ServerEvent::Connected { connection_id: id }));
        });
        tracing::info!(connection_id = %id, "client connected");
        id
    }

    /// Attach the client-chosen peer identifier. Unknown connections are
    /// ignored; repeats keep the first identifier.
    ///
    /// # Errors
    ///
    /// `InvalidPayload` for an empty or oversized identifier from a
    /// registered connection, or whatever the implicit video match request
    /// returns.
    pub fn announce(&self, id: ConnectionId, peer_id: &str) -> Result<(), CoordinatorError> {
        let peer_id = peer_id.trim();
        let match_on_announce = self.match_on_announce;

        self.with_tables(|tables, out| {
            if !tables.is_registered(id) {
                return Ok(());
            }
            if peer_id.is_empty() || peer_id.len() > MAX_PEER_ID_LENGTH {
                return Err(CoordinatorError::InvalidPayload(format!(
                    "peer identifier must be between 1 and {MAX_PEER_ID_LENGTH} characters"
                )));
            }
            match tables.announce(id, peer_id) {
                Some(true) if match_on_announce => {
                    tables.request_match(id, Pool::Video, out).map(|_| ())
                }
                _ => Ok(()),
            }
        })
    }

    /// Whether the transport still reports the connection as open.
    #[must_use]
    pub fn is_live(&self, id: ConnectionId) -> bool {
        self.hub.is_live(id)
    }

    /// Remove a connection and everything that referenced it: pool entry,
    /// pairing (partner is told), active games (opponent wins).
    pub fn deregister(&self, id: ConnectionId) -> bool {
        let removed = self.with_tables(|tables, out| tables.deregister(id, out));
        self.hub.remove(id);
        if removed {
            tracing::info!(connection_id = %id, "client disconnected");
        }
        removed
    }

    /// Enter `pool`, or pair with someone already waiting there.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unregistered connection, `NotReady` for a video
    /// request before `announce`, `Busy` when a conflicting session exists.
    pub fn request_match(&self, id: ConnectionId, pool: Pool) -> Result<MatchOutcome, CoordinatorError> {
        self.with_tables(|tables, out| tables.request_match(id, pool, out))
    }

    /// Cancel a pending match request. Returns whether the caller was waiting.
    pub fn leave_pool(&self, id: ConnectionId) -> bool {
        self.with_tables(|tables, _| tables.leave_pools(id))
    }

    /// Forward text to the caller's video partner. Without a partner this is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// `InvalidPayload` for oversized messages.
    pub fn relay(&self, id: ConnectionId, text: &str) -> Result<(), CoordinatorError> {
        if text.len() > MAX_MESSAGE_LENGTH {
            return Err(CoordinatorError::InvalidPayload(format!(
                "messages are limited to {MAX_MESSAGE_LENGTH} bytes"
            )));
        }
        self.with_tables(|tables, out| tables.relay(id, text.to_string(), out));
        Ok(())
    }

    /// Leave the current video partner and look for another. The former
    /// partner is told but not re-queued.
    ///
    /// # Errors
    ///
    /// Same as [`Coordinator::request_match`] for the video pool.
    pub fn request_next(&self, id: ConnectionId) -> Result<MatchOutcome, CoordinatorError> {
        self.with_tables(|tables, out| tables.request_match(id, Pool::Video, out))
    }

    /// Validate a move against the canonical position and relay it.
    ///
    /// # Errors
    ///
    /// `NotFound` if the game is gone or the caller does not play in it,
    /// `NotYourTurn` if the other side is to move, `IllegalMove` otherwise
    /// invalid.
    pub fn submit_move(&self, id: ConnectionId, request: &MoveRequest) -> Result<(), CoordinatorError> {
        self.with_tables(|tables, out| tables.submit_move(id, request, out))
    }

    /// # Errors
    ///
    /// `NotFound` if the game is gone or the caller does not play in it.
    pub fn resign(&self, id: ConnectionId, game_id: &str) -> Result<(), CoordinatorError> {
        self.with_tables(|tables, out| tables.resign(id, game_id, out))
    }

    /// # Errors
    ///
    /// `NotFound` if the game is gone or the caller does not play in it.
    pub fn offer_draw(&self, id: ConnectionId, game_id: &str) -> Result<(), CoordinatorError> {
        self.with_tables(|tables, out| tables.offer_draw(id, game_id, out))
    }

    /// # Errors
    ///
    /// `NotFound` as for [`Coordinator::offer_draw`]; `NotReady` without a
    /// pending offer from the opponent.
    pub fn accept_draw(&self, id: ConnectionId, game_id: &str) -> Result<(), CoordinatorError> {
        self.with_tables(|tables, out| tables.answer_draw(id, game_id, true, out))
    }

    /// # Errors
    ///
    /// Same as [`Coordinator::accept_draw`].
    pub fn decline_draw(&self, id: ConnectionId, game_id: &str) -> Result<(), CoordinatorError> {
        self.with_tables(|tables, out| tables.answer_draw(id, game_id, false, out))
    }

    /// Reap every connection the tables still reference but whose transport
    /// is gone. Returns how many were reaped; running it again right away
    /// reaps nothing.
    pub fn sweep(&self) -> usize {
        let known = self.with_tables(|tables, _| tables.known_ids());
        let dead: Vec<ConnectionId> = known
            .into_iter()
            .filter(|id| !self.hub.is_live(*id))
            .collect();

        for id in &dead {
            tracing::warn!(
                connection_id = %id,
                error = %CoordinatorError::TransportLost(*id),
                "reaping dead connection"
            );
            self.deregister(*id);
        }
        dead.len()
    }

    /// Decode and handle one inbound text frame. Rejections are reported to
    /// the sender as a single `error` event.
    pub fn handle_frame(&self, id: ConnectionId, frame: &str) {
        match ClientEvent::decode(frame) {
            Ok(event) => self.handle_event(id, event),
            Err(err) => {
                tracing::warn!(connection_id = %id, "malformed frame: {err}");
                self.reject(id, &err);
            }
        }
    }

    pub fn handle_event(&self, id: ConnectionId, event: ClientEvent) {
        tracing::debug!(connection_id = %id, event = event.name(), "client event");

        let result = match event {
            ClientEvent::Announce { peer_id } => self.announce(id, &peer_id),
            ClientEvent::RequestVideoMatch => self.request_match(id, Pool::Video).map(|_| ()),
            ClientEvent::RequestChessMatch => self.request_match(id, Pool::Chess).map(|_| ()),
            ClientEvent::LeavePool => {
                self.leave_pool(id);
                Ok(())
            }
            ClientEvent::RelayMessage { text } => self.relay(id, &text),
            ClientEvent::RequestNext => self.request_next(id).map(|_| ()),
            ClientEvent::SubmitMove(request) => self.submit_move(id, &request),
            ClientEvent::Resign { game_id } => self.resign(id, &game_id),
            ClientEvent::OfferDraw { game_id } => self.offer_draw(id, &game_id),
            ClientEvent::AcceptDraw { game_id } => self.accept_draw(id, &game_id),
            ClientEvent::DeclineDraw { game_id } => self.decline_draw(id, &game_id),
        };

        if let Err(err) = result {
            self.reject(id, &err);
        }
    }

    fn reject(&self, id: ConnectionId, err: &CoordinatorError) {
        tracing::debug!(connection_id = %id, code = err.code(), "rejected: {err}");
        self.hub.send(id, &ServerEvent::from(err));
    }

    #[must_use]
    pub fn stats(&self) -> CoordinatorStats {
        let uptime_secs = self.started_at.elapsed().as_secs();
        self.with_tables(|tables, _| CoordinatorStats {
            waiting_video: tables.video_pool.len(),
            waiting_chess: tables.chess_pool.len(),
            pair_sessions: tables.pairs.len(),
            game_sessions: tables.games.len(),
            connections: tables.connections.len(),
            uptime_secs,
        })
    }

    #[must_use]
    pub fn partner_of(&self, id: ConnectionId) -> Option<ConnectionId> {
        self.with_tables(|tables, _| tables.pairs.partner_of(id))
    }

    #[must_use]
    pub fn pool_of(&self, id: ConnectionId) -> Option<Pool> {
        self.with_tables(|tables, _| tables.pool_of(id))
    }

    #[must_use]
    pub fn game_of(&self, id: ConnectionId) -> Option<String> {
        self.with_tables(|tables, _| tables.games.game_of(id).map(str::to_owned))
    }

    #[must_use]
    pub fn game_snapshot(&self, game_id: &str) -> Option<GameSnapshot> {
        self.with_tables(|tables, _| tables.games.get(game_id).map(GameSnapshot::from))
    }

    /// When the connection registered, if it still is.
    #[must_use]
    pub fn connected_at(&self, id: ConnectionId) -> Option<DateTime<Utc>> {
        self.with_tables(|tables, _| tables.connections.get(&id).map(|c| c.connected_at))
    }
}
