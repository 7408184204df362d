//! Attack patterns for every piece type.
//!
//! Leaper patterns (knight, king, pawn captures) are pre-computed once via
//! `OnceLock`. Sliding pieces walk their rays square by square and stop at
//! the first occupied square, which is itself included as a capture target.
//! [`piece_attacks`] dispatches through a fixed table indexed by
//! [`PieceType::index`].

use std::sync::OnceLock;

use crate::engine::types::{Bitboard, Color, Piece, PieceType, Square};

// =========================================================================
// Public API
// =========================================================================

/// Attack pattern of one piece type: (colour, origin, occupancy) -> targets.
pub type AttackFn = fn(Color, Square, Bitboard) -> Bitboard;

/// Per-variant attack functions, indexed by `PieceType::index()`.
const ATTACK_FNS: [AttackFn; PieceType::COUNT] = [
    pawn_attacks,
    knight_attacks,
    bishop_attacks,
    rook_attacks,
    queen_attacks,
    king_attacks,
];

/// Squares attacked by `piece` standing on `sq`, given board occupancy.
#[inline]
pub fn piece_attacks(piece: Piece, sq: Square, occupied: Bitboard) -> Bitboard {
    ATTACK_FNS[piece.kind.index()](piece.color, sq, occupied)
}

/// Diagonal capture squares of a pawn. Pushes are not attacks.
#[inline]
pub fn pawn_attacks(color: Color, sq: Square, _occupied: Bitboard) -> Bitboard {
    tables().pawn[color.index()][sq.index()]
}

#[inline]
pub fn knight_attacks(_color: Color, sq: Square, _occupied: Bitboard) -> Bitboard {
    tables().knight[sq.index()]
}

#[inline]
pub fn king_attacks(_color: Color, sq: Square, _occupied: Bitboard) -> Bitboard {
    tables().king[sq.index()]
}

#[inline]
pub fn bishop_attacks(_color: Color, sq: Square, occupied: Bitboard) -> Bitboard {
    sliding_attacks(sq, occupied, &BISHOP_DELTAS)
}

#[inline]
pub fn rook_attacks(_color: Color, sq: Square, occupied: Bitboard) -> Bitboard {
    sliding_attacks(sq, occupied, &ROOK_DELTAS)
}

#[inline]
pub fn queen_attacks(color: Color, sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(color, sq, occupied) | bishop_attacks(color, sq, occupied)
}

// =========================================================================
// Leaper tables
// =========================================================================

struct LeaperTables {
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    /// `pawn[color][square]`: squares a pawn on `square` attacks.
    pawn: [[Bitboard; 64]; 2],
}

fn tables() -> &'static LeaperTables {
    static TABLES: OnceLock<LeaperTables> = OnceLock::new();
    TABLES.get_or_init(|| LeaperTables {
        knight: leaper_table(&KNIGHT_DELTAS),
        king: leaper_table(&KING_DELTAS),
        pawn: [
            leaper_table(&[(-1, 1), (1, 1)]),
            leaper_table(&[(-1, -1), (1, -1)]),
        ],
    })
}

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Build a 64-entry table from (file, rank) jump offsets.
fn leaper_table(deltas: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    for sq in Square::all() {
        let mut bb = Bitboard::EMPTY;
        for &(df, dr) in deltas {
            if let Some(to) = sq.offset(df, dr) {
                bb.set(to);
            }
        }
        table[sq.index()] = bb;
    }
    table
}

// =========================================================================
// Sliding rays
// =========================================================================

const ROOK_DELTAS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_DELTAS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Walk each ray from `sq` until the board edge or the first blocker.
fn sliding_attacks(sq: Square, occupied: Bitboard, deltas: &[(i8, i8)]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(df, dr) in deltas {
        let mut cur = sq;
        while let Some(next) = cur.offset(df, dr) {
            attacks.set(next);
            if occupied.is_set(next) {
                break;
            }
            cur = next;
        }
    }
    attacks
}

// =========================================================================
// Tests
// =========================================================================
