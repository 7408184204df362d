//! Game state and move application.
//!
//! `GameState` bundles the board with everything else a position needs:
//! side to move, castling rights, en-passant target and the two move
//! counters. [`GameState::apply_move`] is a pure function returning the
//! successor state; move generation uses the infallible in-place
//! [`GameState::play_unchecked`] on scratch copies.

use rand::Rng;

use crate::engine::board::Board;
use crate::engine::error::EngineError;
use crate::engine::movegen;
use crate::engine::types::{CastlingRights, Color, Move, MoveKind, Piece, PieceType, Square};

// ---------------------------------------------------------------------------
// PositionSignature
// ---------------------------------------------------------------------------

/// The parts of a state that define "the same position" for repetition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PositionSignature {
    pub board: Board,
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// A complete chess position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,

    /// Whose turn it is.
    pub side_to_move: Color,

    /// Castling availability (K/Q/k/q).
    pub castling_rights: CastlingRights,

    /// En-passant target square (the square *behind* the double-pushed pawn).
    pub en_passant: Option<Square>,

    /// Plies since the last capture or pawn move.
    pub halfmove_clock: u32,

    /// Full-move number (starts at 1, incremented after Black moves).
    pub fullmove_number: u32,
}

impl GameState {
    /// Standard starting position.
    pub fn starting() -> Self {
        GameState {
            board: Board::standard(),
            side_to_move: Color::White,
            castling_rights: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// A Fischer-random (Chess960) starting position drawn from `rng`.
    ///
    /// Castling rights are granted only for a king and rook that stand on
    /// their standard home squares.
    pub fn fischer<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let board = Board::fischer(rng);
        let castling_rights = home_castling_rights(&board);
        GameState {
            board,
            side_to_move: Color::White,
            castling_rights,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Snapshot of the repetition-relevant fields.
    pub fn signature(&self) -> PositionSignature {
        PositionSignature {
            board: self.board.clone(),
            side_to_move: self.side_to_move,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
        }
    }

    /// Is the side-to-move's king currently attacked?
    #[inline]
    pub fn is_in_check(&self) -> bool {
        self.board.is_in_check(self.side_to_move)
    }

    /// Whether a pawn move from `from` to `to` reaches the last rank.
    pub fn is_promoting(&self, from: Square, to: Square) -> bool {
        match self.board.piece_at(from) {
            Some(Piece {
                kind: PieceType::Pawn,
                color,
            }) => to.rank() == (!color).back_rank(),
            _ => false,
        }
    }

    /// Whether `mv` takes a piece (including en passant).
    pub fn is_capture(&self, mv: Move) -> bool {
        mv.kind == MoveKind::EnPassant || !self.board.is_empty(mv.to)
    }

    // -----------------------------------------------------------------------
    // Move application
    // -----------------------------------------------------------------------

    /// Return the state after playing `mv`.
    ///
    /// Rejects moves of the wrong colour, a missing or impossible promotion
    /// ([`EngineError::InvalidPromotion`]), and anything that is not one of
    /// this state's legal moves.
    pub fn apply_move(&self, mv: Move) -> Result<GameState, EngineError> {
        let text = mv.to_string();
        let piece = self
            .board
            .piece_at(mv.from)
            .ok_or_else(|| EngineError::illegal(&text, format!("no piece on {}", mv.from)))?;
        if piece.color != self.side_to_move {
            return Err(EngineError::illegal(
                &text,
                format!("{} is not {}'s piece", mv.from, self.side_to_move),
            ));
        }
        if let Some(Piece { color, .. }) = self.board.piece_at(mv.to) {
            if color == piece.color {
                return Err(EngineError::illegal(&text, "destination holds own piece"));
            }
        }

        let promoting = self.is_promoting(mv.from, mv.to);
        match (promoting, mv.promotion) {
            (true, None) => {
                return Err(EngineError::promotion(&text, "promotion piece required"));
            }
            (false, Some(_)) => {
                return Err(EngineError::promotion(&text, "move does not promote"));
            }
            (true, Some(kind)) if !kind.is_promotion_target() => {
                return Err(EngineError::promotion(
                    &text,
                    format!("cannot promote to {kind}"),
                ));
            }
            _ => {}
        }

        if !movegen::legal_moves(self).contains(&mv) {
            return Err(EngineError::illegal(&text, "not a legal move in this position"));
        }

        let mut next = self.clone();
        next.play_unchecked(mv);
        Ok(next)
    }

    /// Apply `mv` in place without validation.
    ///
    /// The move must come from the move generator for this state.
    pub(crate) fn play_unchecked(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = !us;

        let Some(moving) = self.board.remove(mv.from) else {
            debug_assert!(false, "no piece on {} for move {mv}", mv.from);
            return;
        };

        // ---- Captures ----
        let mut captured = self.board.remove(mv.to);
        if mv.kind == MoveKind::EnPassant {
            if let Some(cap_sq) = mv.to.offset(0, -us.forward()) {
                captured = self.board.remove(cap_sq);
            }
        }

        // ---- Land the piece (promotion replaces the pawn) ----
        let landing = match mv.promotion {
            Some(kind) => Piece::new(us, kind),
            None => moving,
        };
        self.board.put(mv.to, landing);

        // ---- Castling: move the rook ----
        if mv.is_castle() {
            let (rook_from, rook_to) = castling_rook_squares(us, mv.kind);
            if let Some(rook) = self.board.remove(rook_from) {
                self.board.put(rook_to, rook);
            }
        }

        // ---- Castling rights ----
        // Moving the king or a rook, or capturing on a rook's home square.
        if moving.kind == PieceType::King {
            self.castling_rights.clear_color(us);
        }
        self.castling_rights.0 &= CASTLING_MASK[mv.from.index()];
        self.castling_rights.0 &= CASTLING_MASK[mv.to.index()];

        // ---- En passant target: only right after a double push ----
        self.en_passant = if mv.kind == MoveKind::DoublePawnPush {
            mv.from.offset(0, us.forward())
        } else {
            None
        };

        // ---- Counters ----
        if moving.kind == PieceType::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.side_to_move = them;
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::starting()
    }
}

// ---------------------------------------------------------------------------
// Castling helpers
// ---------------------------------------------------------------------------

/// King and rook home squares and destinations for one castling move.
pub(crate) struct CastlingGeometry {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

pub(crate) fn castling_geometry(color: Color, kind: MoveKind) -> CastlingGeometry {
    let base = color.back_rank() * 8;
    let (king_to, rook_from, rook_to) = match kind {
        MoveKind::CastleKingside => (6, 7, 5),
        MoveKind::CastleQueenside => (2, 0, 3),
        _ => unreachable!("not a castling move: {kind:?}"),
    };
    CastlingGeometry {
        king_from: Square(base + 4),
        king_to: Square(base + king_to),
        rook_from: Square(base + rook_from),
        rook_to: Square(base + rook_to),
    }
}

/// Rights for every king and rook pair standing on its home squares.
pub(crate) fn home_castling_rights(board: &Board) -> CastlingRights {
    let mut rights = CastlingRights::NONE;
    for color in [Color::White, Color::Black] {
        for (kind, flag) in [
            (MoveKind::CastleKingside, CastlingRights::kingside_flag(color)),
            (MoveKind::CastleQueenside, CastlingRights::queenside_flag(color)),
        ] {
            let g = castling_geometry(color, kind);
            if board.piece_at(g.king_from) == Some(Piece::new(color, PieceType::King))
                && board.piece_at(g.rook_from) == Some(Piece::new(color, PieceType::Rook))
            {
                rights.0 |= flag;
            }
        }
    }
    rights
}

fn castling_rook_squares(color: Color, kind: MoveKind) -> (Square, Square) {
    let g = castling_geometry(color, kind);
    (g.rook_from, g.rook_to)
}

/// Mask table indexed by square index. When a move touches a square, AND the
/// castling rights with this mask.
#[rustfmt::skip]
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    mask[0]  = 0b1111 & !CastlingRights::WHITE_QUEENSIDE;
    mask[4]  = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
    mask[7]  = 0b1111 & !CastlingRights::WHITE_KINGSIDE;
    mask[56] = 0b1111 & !CastlingRights::BLACK_QUEENSIDE;
    mask[60] = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
    mask[63] = 0b1111 & !CastlingRights::BLACK_KINGSIDE;
    mask
};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
