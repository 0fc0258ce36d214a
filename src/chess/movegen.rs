use super::board::Position;
use super::{Color, Piece, PieceKind, Square};

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const ROOK_RAYS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_RAYS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const PROMOTIONS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MoveKind {
    Normal,
    DoublePush,
    EnPassant,
    CastleKingside,
    CastleQueenside,
}

/// A move as generated for the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    pub(super) kind: MoveKind,
}

impl Move {
    const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self {
            from,
            to,
            promotion: None,
            kind,
        }
    }
}

impl Position {
    /// Every move the side to move may legally play.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Move> {
        let mover = self.turn;
        self.pseudo_legal_moves()
            .into_iter()
            .filter(|mv| {
                let mut next = self.clone();
                next.apply(*mv);
                !next.king_attacked(mover)
            })
            .collect()
    }

    /// Whether the side to move is in check.
    #[must_use]
    pub fn is_check(&self) -> bool {
        self.king_attacked(self.turn)
    }

    fn king_attacked(&self, color: Color) -> bool {
        let king = Piece::new(color, PieceKind::King);
        Square::all()
            .find(|sq| self.board[sq.index()] == Some(king))
            .is_some_and(|sq| self.is_attacked(sq, color.opponent()))
    }

    /// Whether any piece of `by` attacks `target`.
    fn is_attacked(&self, target: Square, by: Color) -> bool {
        let behind = -by.forward();
        if self.holds(target.offset(-1, behind), by, &[PieceKind::Pawn])
            || self.holds(target.offset(1, behind), by, &[PieceKind::Pawn])
        {
            return true;
        }

        if KNIGHT_JUMPS
            .iter()
            .any(|&(df, dr)| self.holds(target.offset(df, dr), by, &[PieceKind::Knight]))
        {
            return true;
        }

        if KING_STEPS
            .iter()
            .any(|&(df, dr)| self.holds(target.offset(df, dr), by, &[PieceKind::King]))
        {
            return true;
        }

        let straight = [PieceKind::Rook, PieceKind::Queen];
        let diagonal = [PieceKind::Bishop, PieceKind::Queen];
        ROOK_RAYS
            .iter()
            .any(|&ray| self.holds(self.first_piece_along(target, ray), by, &straight))
            || BISHOP_RAYS
                .iter()
                .any(|&ray| self.holds(self.first_piece_along(target, ray), by, &diagonal))
    }

    fn holds(&self, sq: Option<Square>, by: Color, kinds: &[PieceKind]) -> bool {
        sq.and_then(|sq| self.board[sq.index()])
            .is_some_and(|p| p.color == by && kinds.contains(&p.kind))
    }

    /// The first occupied square walking from `from` (exclusive) along `ray`.
    fn first_piece_along(&self, from: Square, (df, dr): (i8, i8)) -> Option<Square> {
        let mut current = from;
        while let Some(next) = current.offset(df, dr) {
            if self.board[next.index()].is_some() {
                return Some(next);
            }
            current = next;
        }
        None
    }

    fn pseudo_legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(48);
        for from in Square::all() {
            let Some(piece) = self.board[from.index()] else {
                continue;
            };
            if piece.color != self.turn {
                continue;
            }
            match piece.kind {
                PieceKind::Pawn => self.pawn_moves(from, &mut moves),
                PieceKind::Knight => self.step_moves(from, &KNIGHT_JUMPS, &mut moves),
                PieceKind::King => {
                    self.step_moves(from, &KING_STEPS, &mut moves);
                    self.castling_moves(from, &mut moves);
                }
                PieceKind::Bishop => self.slide_moves(from, &BISHOP_RAYS, &mut moves),
                PieceKind::Rook => self.slide_moves(from, &ROOK_RAYS, &mut moves),
                PieceKind::Queen => {
                    self.slide_moves(from, &BISHOP_RAYS, &mut moves);
                    self.slide_moves(from, &ROOK_RAYS, &mut moves);
                }
            }
        }
        moves
    }

    fn is_vacant(&self, sq: Square) -> bool {
        self.board[sq.index()].is_none()
    }

    fn holds_enemy(&self, sq: Square) -> bool {
        self.board[sq.index()].is_some_and(|p| p.color != self.turn)
    }

    fn pawn_moves(&self, from: Square, moves: &mut Vec<Move>) {
        let forward = self.turn.forward();
        let start_rank = match self.turn {
            Color::White => 1,
            Color::Black => 6,
        };
        let last_rank = self.turn.opponent().back_rank();

        let mut push = |to: Square, kind: MoveKind| {
            if to.rank() == last_rank {
                moves.extend(PROMOTIONS.iter().map(|&promo| Move {
                    promotion: Some(promo),
                    ..Move::new(from, to, kind)
                }));
            } else {
                moves.push(Move::new(from, to, kind));
            }
        };

        if let Some(one) = from.offset(0, forward)
            && self.is_vacant(one)
        {
            push(one, MoveKind::Normal);
            if from.rank() == start_rank
                && let Some(two) = one.offset(0, forward)
                && self.is_vacant(two)
            {
                push(two, MoveKind::DoublePush);
            }
        }

        for df in [-1, 1] {
            let Some(to) = from.offset(df, forward) else {
                continue;
            };
            if self.holds_enemy(to) {
                push(to, MoveKind::Normal);
            } else if self.en_passant == Some(to) {
                push(to, MoveKind::EnPassant);
            }
        }
    }

    fn step_moves(&self, from: Square, steps: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(df, dr) in steps {
            if let Some(to) = from.offset(df, dr)
                && (self.is_vacant(to) || self.holds_enemy(to))
            {
                moves.push(Move::new(from, to, MoveKind::Normal));
            }
        }
    }

    fn slide_moves(&self, from: Square, rays: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(df, dr) in rays {
            let mut current = from;
            while let Some(to) = current.offset(df, dr) {
                if self.is_vacant(to) {
                    moves.push(Move::new(from, to, MoveKind::Normal));
                    current = to;
                    continue;
                }
                if self.holds_enemy(to) {
                    moves.push(Move::new(from, to, MoveKind::Normal));
                }
                break;
            }
        }
    }

    /// Castling: king and rook on their home squares, the squares between
    /// them empty, and the king neither in check nor passing through or
    /// landing on an attacked square.
    fn castling_moves(&self, from: Square, moves: &mut Vec<Move>) {
        let color = self.turn;
        let rank = color.back_rank();
        if Square::new(4, rank) != Some(from) {
            return;
        }
        let enemy = color.opponent();
        let rook = Some(Piece::new(color, PieceKind::Rook));
        let at = |file: u8| Square::new(file, rank);
        let rook_on = |file: u8| at(file).is_some_and(|sq| self.board[sq.index()] == rook);
        let empty = |files: &[u8]| files.iter().all(|&f| at(f).is_some_and(|sq| self.is_vacant(sq)));
        let safe = |files: &[u8]| {
            files
                .iter()
                .all(|&f| at(f).is_some_and(|sq| !self.is_attacked(sq, enemy)))
        };

        if self.castling.kingside(color)
            && rook_on(7)
            && empty(&[5, 6])
            && safe(&[4, 5, 6])
            && let Some(to) = at(6)
        {
            moves.push(Move::new(from, to, MoveKind::CastleKingside));
        }

        if self.castling.queenside(color)
            && rook_on(0)
            && empty(&[1, 2, 3])
            && safe(&[4, 3, 2])
            && let Some(to) = at(2)
        {
            moves.push(Move::new(from, to, MoveKind::CastleQueenside));
        }
    }
}
