//! Legal move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal moves (ignoring pins / check evasion).
//!   2. Filter: play the move on a scratch copy, keep it only if the mover's
//!      king is not attacked afterwards.
//!
//! Output order is deterministic: pieces are visited in ascending square
//! order (a1 first), each piece emits its candidates in a fixed order, and
//! castling moves come last (kingside before queenside).

use crate::engine::state::{castling_geometry, GameState};
use crate::engine::types::{Color, Move, MoveKind, Piece, PieceType, Square};

// =========================================================================
// Public API
// =========================================================================

/// Generate all legal moves for the side to move.
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    let mut pseudo = Vec::with_capacity(64);
    generate_pseudo_legal(state, &mut pseudo);

    pseudo
        .into_iter()
        .filter(|&mv| keeps_king_safe(state, mv))
        .collect()
}

/// Generate all legal moves originating from a specific square.
pub fn legal_moves_from(state: &GameState, from: Square) -> Vec<Move> {
    legal_moves(state)
        .into_iter()
        .filter(|m| m.from == from)
        .collect()
}

/// Whether the side to move has at least one legal move.
///
/// Stops at the first pseudo-legal move that survives the filter.
pub fn has_legal_move(state: &GameState) -> bool {
    let mut pseudo = Vec::with_capacity(64);
    generate_pseudo_legal(state, &mut pseudo);
    pseudo.into_iter().any(|mv| keeps_king_safe(state, mv))
}

/// Play `mv` on a scratch copy and check the mover's king afterwards.
fn keeps_king_safe(state: &GameState, mv: Move) -> bool {
    let mut scratch = state.clone();
    scratch.play_unchecked(mv);
    !scratch.board.is_in_check(state.side_to_move)
}

/// Count leaf nodes of the legal move tree to `depth` plies.
pub fn perft(state: &GameState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal_moves(state);
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .into_iter()
        .map(|mv| {
            let mut next = state.clone();
            next.play_unchecked(mv);
            perft(&next, depth - 1)
        })
        .sum()
}

/// Per-move breakdown of [`perft`], in generation order.
pub fn perft_divide(state: &GameState, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    legal_moves(state)
        .into_iter()
        .map(|mv| {
            let mut next = state.clone();
            next.play_unchecked(mv);
            (mv, perft(&next, depth - 1))
        })
        .collect()
}

// =========================================================================
// Pseudo-legal generation (internal)
// =========================================================================

fn generate_pseudo_legal(state: &GameState, moves: &mut Vec<Move>) {
    let us = state.side_to_move;
    for (from, piece) in state.board.pieces(us) {
        match piece.kind {
            PieceType::Pawn => generate_pawn_moves(state, us, from, moves),
            _ => generate_piece_moves(state, piece, from, moves),
        }
    }
    generate_castling_moves(state, us, moves);
}

// =========================================================================
// Pawn moves
// =========================================================================

fn generate_pawn_moves(state: &GameState, us: Color, from: Square, moves: &mut Vec<Move>) {
    let board = &state.board;
    let forward = us.forward();
    let start_rank = if us == Color::White { 1 } else { 6 };
    let last_rank = (!us).back_rank();

    // --- Pushes ---
    if let Some(one) = from.offset(0, forward).filter(|&sq| board.is_empty(sq)) {
        push_pawn_move(from, one, last_rank, moves);

        if from.rank() == start_rank {
            if let Some(two) = one.offset(0, forward).filter(|&sq| board.is_empty(sq)) {
                moves.push(Move::with_kind(from, two, MoveKind::DoublePawnPush));
            }
        }
    }

    // --- Captures, west then east ---
    for df in [-1, 1] {
        let Some(to) = from.offset(df, forward) else {
            continue;
        };
        if matches!(board.piece_at(to), Some(p) if p.color != us) {
            push_pawn_move(from, to, last_rank, moves);
        }
    }

    // --- En passant ---
    if let Some(ep) = state.en_passant {
        let diagonal = [-1, 1].iter().any(|&df| from.offset(df, forward) == Some(ep));
        if diagonal {
            moves.push(Move::with_kind(from, ep, MoveKind::EnPassant));
        }
    }
}

/// Push a pawn move, expanding to all four promotions on the last rank.
fn push_pawn_move(from: Square, to: Square, last_rank: u8, moves: &mut Vec<Move>) {
    if to.rank() == last_rank {
        for promo in PieceType::PROMOTIONS {
            moves.push(Move::with_promotion(from, to, promo));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

// =========================================================================
// Knight, bishop, rook, queen and king (non-castling) moves
// =========================================================================

fn generate_piece_moves(state: &GameState, piece: Piece, from: Square, moves: &mut Vec<Move>) {
    let friendly = state.board.occupied_by(piece.color);
    let targets = state.board.attacks_from(from) & !friendly;
    moves.extend(targets.iter().map(|to| Move::new(from, to)));
}

// =========================================================================
// Castling
// =========================================================================

fn generate_castling_moves(state: &GameState, us: Color, moves: &mut Vec<Move>) {
    let them = !us;
    let board = &state.board;
    let rights = state.castling_rights;

    if !rights.can_castle_kingside(us) && !rights.can_castle_queenside(us) {
        return;
    }

    // Can't castle while in check.
    if board.is_in_check(us) {
        return;
    }

    for (allowed, kind) in [
        (rights.can_castle_kingside(us), MoveKind::CastleKingside),
        (rights.can_castle_queenside(us), MoveKind::CastleQueenside),
    ] {
        if !allowed {
            continue;
        }
        let g = castling_geometry(us, kind);
        if board.piece_at(g.king_from) != Some(Piece::new(us, PieceType::King))
            || board.piece_at(g.rook_from) != Some(Piece::new(us, PieceType::Rook))
        {
            continue;
        }

        // Every square strictly between king and rook must be empty.
        let (lo, hi) = if g.king_from < g.rook_from {
            (g.king_from.0, g.rook_from.0)
        } else {
            (g.rook_from.0, g.king_from.0)
        };
        let path_clear = (lo + 1..hi).all(|i| board.is_empty(Square(i)));

        // The king may not pass through or land on an attacked square.
        let (lo, hi) = if g.king_from < g.king_to {
            (g.king_from.0, g.king_to.0)
        } else {
            (g.king_to.0, g.king_from.0)
        };
        let path_safe = (lo..=hi)
            .filter(|&i| i != g.king_from.0)
            .all(|i| !board.is_square_attacked(Square(i), them));

        if path_clear && path_safe {
            moves.push(Move::with_kind(g.king_from, g.king_to, kind));
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
