use std::fmt;

use super::movegen::{Move, MoveKind};
use super::{Color, Piece, PieceKind, Square};

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Castling availability, cleared as kings and rooks leave their squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct CastlingRights {
    pub(super) white_king: bool,
    pub(super) white_queen: bool,
    pub(super) black_king: bool,
    pub(super) black_queen: bool,
}

impl CastlingRights {
    const ALL: Self = Self {
        white_king: true,
        white_queen: true,
        black_king: true,
        black_queen: true,
    };

    const NONE: Self = Self {
        white_king: false,
        white_queen: false,
        black_king: false,
        black_queen: false,
    };

    pub(super) const fn kingside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    pub(super) const fn queenside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_queen,
            Color::Black => self.black_queen,
        }
    }

    fn clear(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_king = false;
                self.white_queen = false;
            }
            Color::Black => {
                self.black_king = false;
                self.black_queen = false;
            }
        }
    }

    /// A rook leaving or being captured on a corner loses that side's right.
    fn touch(&mut self, square: Square) {
        match (square.file(), square.rank()) {
            (0, 0) => self.white_queen = false,
            (7, 0) => self.white_king = false,
            (0, 7) => self.black_queen = false,
            (7, 7) => self.black_king = false,
            _ => {}
        }
    }

    fn to_fen(self) -> String {
        let mut s = String::new();
        if self.white_king {
            s.push('K');
        }
        if self.white_queen {
            s.push('Q');
        }
        if self.black_king {
            s.push('k');
        }
        if self.black_queen {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }
}

/// Terminal state detectable from the position alone.
///
/// Threefold repetition needs the game history and is tracked by the game
/// session instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
}

/// Reasons a FEN string is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    MissingField(&'static str),
    InvalidPlacement(String),
    InvalidTurn(String),
    InvalidCastling(String),
    InvalidEnPassant(String),
    InvalidCounter(String),
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "FEN is missing the {field} field"),
            Self::InvalidPlacement(msg) => write!(f, "Invalid piece placement: {msg}"),
            Self::InvalidTurn(value) => write!(f, "Invalid side to move: {value}"),
            Self::InvalidCastling(value) => write!(f, "Invalid castling field: {value}"),
            Self::InvalidEnPassant(value) => write!(f, "Invalid en passant square: {value}"),
            Self::InvalidCounter(value) => write!(f, "Invalid move counter: {value}"),
        }
    }
}

impl std::error::Error for FenError {}

/// A full chess position: placement, side to move, castling and en passant
/// state, and the move counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub(super) board: [Option<Piece>; 64],
    pub(super) turn: Color,
    pub(super) castling: CastlingRights,
    pub(super) en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl Position {
    /// The standard initial position.
    #[must_use]
    pub fn starting() -> Self {
        let mut board = [None; 64];
        for (file, kind) in (0u8..).zip(BACK_RANK) {
            for (color, pawn_rank) in [(Color::White, 1), (Color::Black, 6)] {
                if let Some(sq) = Square::new(file, color.back_rank()) {
                    board[sq.index()] = Some(Piece::new(color, kind));
                }
                if let Some(sq) = Square::new(file, pawn_rank) {
                    board[sq.index()] = Some(Piece::new(color, PieceKind::Pawn));
                }
            }
        }

        Self {
            board,
            turn: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parse a position from Forsyth-Edwards Notation.
    ///
    /// The halfmove and fullmove counters may be omitted.
    ///
    /// # Errors
    ///
    /// Returns a [`FenError`] naming the first malformed field.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(FenError::MissingField("placement"))?;
        let turn = fields.next().ok_or(FenError::MissingField("side to move"))?;
        let castling = fields.next().ok_or(FenError::MissingField("castling"))?;
        let en_passant = fields.next().ok_or(FenError::MissingField("en passant"))?;
        let halfmove = fields.next().unwrap_or("0");
        let fullmove = fields.next().unwrap_or("1");

        Ok(Self {
            board: parse_placement(placement)?,
            turn: match turn {
                "w" => Color::White,
                "b" => Color::Black,
                other => return Err(FenError::InvalidTurn(other.to_string())),
            },
            castling: parse_castling(castling)?,
            en_passant: match en_passant {
                "-" => None,
                sq => Some(
                    Square::parse(sq).ok_or_else(|| FenError::InvalidEnPassant(sq.to_string()))?,
                ),
            },
            halfmove_clock: halfmove
                .parse()
                .map_err(|_| FenError::InvalidCounter(halfmove.to_string()))?,
            fullmove_number: fullmove
                .parse()
                .map_err(|_| FenError::InvalidCounter(fullmove.to_string()))?,
        })
    }

    /// Serialize to Forsyth-Edwards Notation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.placement(),
            self.turn_letter(),
            self.castling.to_fen(),
            self.en_passant.map_or_else(|| "-".to_string(), |sq| sq.to_string()),
            self.halfmove_clock,
            self.fullmove_number,
        )
    }

    /// Identity of the position for repetition counting.
    ///
    /// The en passant square only counts when a capture onto it is legal, so
    /// a double pawn push that nobody can take does not make the position
    /// distinct.
    #[must_use]
    pub fn repetition_key(&self) -> String {
        let capturable = self
            .legal_moves()
            .iter()
            .any(|mv| mv.kind == MoveKind::EnPassant);
        let en_passant = match self.en_passant {
            Some(sq) if capturable => sq.to_string(),
            _ => "-".to_string(),
        };
        format!(
            "{} {} {} {}",
            self.placement(),
            self.turn_letter(),
            self.castling.to_fen(),
            en_passant
        )
    }

    #[must_use]
    pub const fn turn(&self) -> Color {
        self.turn
    }

    #[must_use]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.index()]
    }

    /// Play `from`→`to` if it is legal for the side to move.
    ///
    /// `promotion` is required when a pawn reaches the last rank and ignored
    /// otherwise. Returns the move actually played, or `None` when illegal
    /// (the position is left untouched).
    pub fn play(&mut self, from: Square, to: Square, promotion: Option<PieceKind>) -> Option<Move> {
        let candidates: Vec<Move> = self
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.from == from && mv.to == to)
            .collect();

        let chosen = match candidates.first() {
            None => return None,
            Some(mv) if mv.promotion.is_none() => *mv,
            Some(_) => *candidates
                .iter()
                .find(|mv| promotion.is_some() && mv.promotion == promotion)?,
        };

        self.apply(chosen);
        Some(chosen)
    }

    /// Terminal state of this position, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        if self.legal_moves().is_empty() {
            return Some(if self.is_check() {
                Outcome::Checkmate {
                    winner: self.turn.opponent(),
                }
            } else {
                Outcome::Stalemate
            });
        }

        self.has_insufficient_material()
            .then_some(Outcome::InsufficientMaterial)
    }

    /// Neither side can possibly deliver mate: bare kings, a single minor
    /// piece, or only bishops all standing on one square color.
    #[must_use]
    pub fn has_insufficient_material(&self) -> bool {
        let mut minors = Vec::new();
        for sq in Square::all() {
            match self.piece_at(sq).map(|p| p.kind) {
                None | Some(PieceKind::King) => {}
                Some(PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen) => return false,
                Some(kind) => minors.push((kind, sq)),
            }
        }

        match minors.as_slice() {
            [] | [_] => true,
            [(_, first), ..] => minors
                .iter()
                .all(|(kind, sq)| *kind == PieceKind::Bishop && sq.is_light() == first.is_light()),
        }
    }

    /// Apply a move already known to be legal.
    pub(super) fn apply(&mut self, mv: Move) {
        let Some(piece) = self.board[mv.from.index()].take() else {
            return;
        };
        let captured = self.board[mv.to.index()];
        let rank = mv.from.rank();

        match mv.kind {
            MoveKind::EnPassant => {
                if let Some(victim) = Square::new(mv.to.file(), rank) {
                    self.board[victim.index()] = None;
                }
            }
            MoveKind::CastleKingside => self.shift_rook(7, 5, rank),
            MoveKind::CastleQueenside => self.shift_rook(0, 3, rank),
            MoveKind::Normal | MoveKind::DoublePush => {}
        }

        self.board[mv.to.index()] = Some(
            mv.promotion
                .map_or(piece, |kind| Piece::new(piece.color, kind)),
        );

        self.en_passant = if mv.kind == MoveKind::DoublePush {
            Square::new(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2)
        } else {
            None
        };

        if piece.kind == PieceKind::King {
            self.castling.clear(piece.color);
        }
        self.castling.touch(mv.from);
        self.castling.touch(mv.to);

        let resets_clock = piece.kind == PieceKind::Pawn || captured.is_some();
        self.halfmove_clock = if resets_clock {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        if self.turn == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.turn = self.turn.opponent();
    }

    fn shift_rook(&mut self, from_file: u8, to_file: u8, rank: u8) {
        if let (Some(from), Some(to)) = (Square::new(from_file, rank), Square::new(to_file, rank)) {
            self.board[to.index()] = self.board[from.index()].take();
        }
    }

    fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match Square::new(file, rank).and_then(|sq| self.piece_at(sq)) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    const fn turn_letter(&self) -> char {
        match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

fn parse_placement(placement: &str) -> Result<[Option<Piece>; 64], FenError> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(FenError::InvalidPlacement(format!(
            "expected 8 ranks, found {}",
            rows.len()
        )));
    }

    let mut board = [None; 64];
    for (row, rank) in rows.iter().zip((0u8..8).rev()) {
        let mut file: u8 = 0;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10) {
                if !(1..=8).contains(&skip) {
                    return Err(FenError::InvalidPlacement(format!("bad empty count {c}")));
                }
                file = file.saturating_add(u8::try_from(skip).unwrap_or(8));
            } else {
                let piece = Piece::from_fen_char(c)
                    .ok_or_else(|| FenError::InvalidPlacement(format!("unknown piece {c}")))?;
                let sq = Square::new(file, rank).ok_or_else(|| {
                    FenError::InvalidPlacement(format!("rank {} is too long", rank + 1))
                })?;
                board[sq.index()] = Some(piece);
                file += 1;
            }
        }
        if file != 8 {
            return Err(FenError::InvalidPlacement(format!(
                "rank {} does not cover 8 files",
                rank + 1
            )));
        }
    }
    Ok(board)
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights::NONE;
    if field == "-" {
        return Ok(rights);
    }
    for c in field.chars() {
        match c {
            'K' => rights.white_king = true,
            'Q' => rights.white_queen = true,
            'k' => rights.black_king = true,
            'q' => rights.black_queen = true,
            _ => return Err(FenError::InvalidCastling(field.to_string())),
        }
    }
    Ok(rights)
}
