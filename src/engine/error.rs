//! Error types returned by the engine.
//!
//! Every failure is recoverable and leaves session state untouched, except
//! [`EngineError::InvariantViolation`], which marks the session as corrupted.

use crate::engine::types::{Color, GameResult};

/// Which part of a text record a [`NotationError`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotationField {
    FieldCount,
    Placement,
    SideToMove,
    CastlingRights,
    EnPassant,
    HalfmoveClock,
    FullmoveNumber,
    Counters,
    MoveText,
}

/// Malformed state or move text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("expected 6 whitespace-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("placement: expected 8 ranks, found {found}")]
    RankCount { found: usize },

    #[error("placement: rank {rank} describes {files} files instead of 8")]
    RankWidth { rank: u8, files: u8 },

    #[error("placement: illegal piece character '{ch}'")]
    PieceChar { ch: char },

    #[error("placement: {color} has {count} kings (expected 1)")]
    KingCount { color: Color, count: u32 },

    #[error("placement: pawn on back rank at {square}")]
    PawnOnBackRank { square: String },

    #[error("side to move: expected 'w' or 'b', found '{found}'")]
    SideToMove { found: String },

    #[error("castling rights: malformed field '{found}'")]
    CastlingRights { found: String },

    #[error("castling rights: '{right}' claimed but king or rook is not on its home square")]
    CastlingInconsistent { right: char },

    #[error("en passant target: '{found}' is not a valid target square")]
    EnPassant { found: String },

    #[error("half-move clock: '{found}' is not a non-negative integer")]
    HalfmoveClock { found: String },

    #[error("full-move number: '{found}' is not a positive integer")]
    FullmoveNumber { found: String },

    #[error("counters: half-move clock {halfmove} exceeds the plies played before move {fullmove}")]
    InconsistentCounters { halfmove: u32, fullmove: u32 },

    #[error("placement: the side not to move is in check")]
    OpponentInCheck,

    #[error("move text is empty")]
    EmptyMove,

    #[error("malformed move text '{text}'")]
    MalformedMove { text: String },

    #[error("move text '{text}' names a square off the board")]
    SquareOutOfRange { text: String },

    #[error("ambiguous move '{text}': {candidates} legal moves match")]
    AmbiguousMove { text: String, candidates: usize },
}

impl NotationError {
    /// The field the error was found in.
    pub fn field(&self) -> NotationField {
        match self {
            NotationError::FieldCount { .. } => NotationField::FieldCount,
            NotationError::RankCount { .. }
            | NotationError::RankWidth { .. }
            | NotationError::PieceChar { .. }
            | NotationError::KingCount { .. }
            | NotationError::PawnOnBackRank { .. }
            | NotationError::OpponentInCheck => NotationField::Placement,
            NotationError::SideToMove { .. } => NotationField::SideToMove,
            NotationError::CastlingRights { .. } | NotationError::CastlingInconsistent { .. } => {
                NotationField::CastlingRights
            }
            NotationError::EnPassant { .. } => NotationField::EnPassant,
            NotationError::HalfmoveClock { .. } => NotationField::HalfmoveClock,
            NotationError::FullmoveNumber { .. } => NotationField::FullmoveNumber,
            NotationError::InconsistentCounters { .. } => NotationField::Counters,
            NotationError::EmptyMove
            | NotationError::MalformedMove { .. }
            | NotationError::SquareOutOfRange { .. }
            | NotationError::AmbiguousMove { .. } => NotationField::MoveText,
        }
    }
}

/// Errors returned by move application and the session API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Notation(#[from] NotationError),

    #[error("illegal move '{text}': {reason}")]
    IllegalMove { text: String, reason: String },

    #[error("session already terminated: {result}")]
    SessionTerminated { result: GameResult },

    #[error("invalid promotion in '{text}': {reason}")]
    InvalidPromotion { text: String, reason: String },

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

/// A move list replay stopped at `index` (zero-based).
///
/// Moves before `index` remain committed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("move {} ('{text}') rejected: {source}", .index + 1)]
pub struct ReplayError {
    pub index: usize,
    pub text: String,
    #[source]
    pub source: EngineError,
}

impl EngineError {
    pub(crate) fn illegal(text: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::IllegalMove {
            text: text.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn promotion(text: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidPromotion {
            text: text.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notation_errors_name_their_field() {
        assert_eq!(
            NotationError::FieldCount { found: 3 }.field(),
            NotationField::FieldCount
        );
        assert_eq!(
            NotationError::PieceChar { ch: 'x' }.field(),
            NotationField::Placement
        );
        assert_eq!(
            NotationError::EnPassant { found: "e5".into() }.field(),
            NotationField::EnPassant
        );
        assert_eq!(
            NotationError::InconsistentCounters {
                halfmove: 9,
                fullmove: 1
            }
            .field(),
            NotationField::Counters
        );
        assert_eq!(NotationError::EmptyMove.field(), NotationField::MoveText);
    }

    #[test]
    fn engine_error_messages() {
        let err: EngineError = NotationError::PieceChar { ch: 'x' }.into();
        assert_eq!(err.to_string(), "placement: illegal piece character 'x'");

        let err = EngineError::SessionTerminated {
            result: GameResult::Stalemate,
        };
        assert_eq!(err.to_string(), "session already terminated: stalemate");
    }
}
