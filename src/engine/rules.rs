//! Termination detection and position history.

use crate::engine::movegen;
use crate::engine::state::{GameState, PositionSignature};
use crate::engine::types::{Color, GameResult, PieceType};

/// Half-move clock value at which the fifty-move rule applies.
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// Occurrences of one position that make a repetition draw.
pub const REPETITION_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// PositionHistory
// ---------------------------------------------------------------------------

/// Append-only record of every position reached in a game, the starting
/// position included.
#[derive(Clone, Debug, Default)]
pub struct PositionHistory {
    entries: Vec<PositionSignature>,
}

impl PositionHistory {
    /// History seeded with one position.
    pub fn starting_from(state: &GameState) -> Self {
        let mut history = Self::default();
        history.push(state.signature());
        history
    }

    pub fn push(&mut self, signature: PositionSignature) {
        self.entries.push(signature);
    }

    /// How many times `signature` has been recorded.
    pub fn occurrences(&self, signature: &PositionSignature) -> usize {
        self.iter().filter(|s| *s == signature).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionSignature> {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Classify `state`, whose signature is expected to be the last entry of
/// `history`.
///
/// Precedence: checkmate, stalemate, fifty-move rule, repetition,
/// insufficient material, then check / ongoing.
pub fn evaluate(state: &GameState, history: &PositionHistory) -> GameResult {
    debug_assert!(!history.is_empty(), "history must include the evaluated position");
    let in_check = state.is_in_check();

    if !movegen::has_legal_move(state) {
        return if in_check {
            GameResult::Checkmate {
                winner: !state.side_to_move,
            }
        } else {
            GameResult::Stalemate
        };
    }

    if state.halfmove_clock >= FIFTY_MOVE_PLIES {
        return GameResult::DrawByFiftyMove;
    }

    if history.occurrences(&state.signature()) >= REPETITION_COUNT {
        return GameResult::DrawByRepetition;
    }

    if is_insufficient_material(state) {
        return GameResult::DrawByInsufficientMaterial;
    }

    if in_check {
        GameResult::Check
    } else {
        GameResult::Ongoing
    }
}

/// Neither side can ever deliver mate.
///
/// Recognised: bare kings, king and one minor piece against a bare king,
/// and king and bishop against king and bishop with both bishops on the
/// same square colour.
pub fn is_insufficient_material(state: &GameState) -> bool {
    let board = &state.board;

    let mut minors: [Vec<(PieceType, bool)>; 2] = [Vec::new(), Vec::new()];
    for color in [Color::White, Color::Black] {
        for (sq, piece) in board.pieces(color) {
            match piece.kind {
                PieceType::King => {}
                kind if kind.is_minor() => minors[color.index()].push((kind, sq.is_light())),
                _ => return false,
            }
        }
    }

    match (minors[0].as_slice(), minors[1].as_slice()) {
        ([], []) => true,
        ([_], []) | ([], [_]) => true,
        ([(PieceType::Bishop, a)], [(PieceType::Bishop, b)]) => a == b,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
