//! Single-line state notation (FEN).
//!
//! `encode` and `decode` are exact inverses for every state reachable in
//! play. Decoding validates each field in order and reports the first
//! problem as a [`NotationError`] naming the offending field.

use crate::engine::board::Board;
use crate::engine::error::NotationError;
use crate::engine::state::GameState;
use crate::engine::types::{CastlingRights, Color, Piece, PieceType, Square};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// =========================================================================
// Encode
// =========================================================================

/// Serialize a state to its six-field text form.
pub fn encode(state: &GameState) -> String {
    let mut fen = placement(&state.board);

    fen.push(' ');
    fen.push(state.side_to_move.to_char());

    fen.push(' ');
    fen.push_str(&state.castling_rights.to_fen());

    fen.push(' ');
    match state.en_passant {
        Some(sq) => fen.push_str(&sq.to_algebraic()),
        None => fen.push('-'),
    }

    fen.push_str(&format!(
        " {} {}",
        state.halfmove_clock, state.fullmove_number
    ));
    fen
}

/// The placement field alone.
pub fn placement(board: &Board) -> String {
    let mut out = String::with_capacity(72);
    for rank in (0..8u8).rev() {
        let mut empty = 0u8;
        for file in 0..8u8 {
            match Square::from_file_rank(file, rank).and_then(|sq| board.piece_at(sq)) {
                Some(piece) => {
                    if empty > 0 {
                        out.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    out.push(piece.to_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push((b'0' + empty) as char);
        }
        if rank > 0 {
            out.push('/');
        }
    }
    out
}

// =========================================================================
// Decode
// =========================================================================

/// Parse a six-field text record into a state.
pub fn decode(text: &str) -> Result<GameState, NotationError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(NotationError::FieldCount {
            found: fields.len(),
        });
    }

    // ----- Field 1: Piece placement -----
    let board = decode_placement(fields[0])?;

    // ----- Field 2: Side to move -----
    let side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => {
            return Err(NotationError::SideToMove {
                found: other.to_string(),
            })
        }
    };

    // ----- Field 3: Castling availability -----
    let castling_rights =
        CastlingRights::from_fen(fields[2]).ok_or_else(|| NotationError::CastlingRights {
            found: fields[2].to_string(),
        })?;
    check_castling_consistency(&board, castling_rights)?;

    // ----- Field 4: En passant target square -----
    let en_passant = decode_en_passant(fields[3], &board, side_to_move)?;

    // ----- Fields 5 and 6: counters -----
    let halfmove_clock: u32 = fields[4]
        .parse()
        .map_err(|_| NotationError::HalfmoveClock {
            found: fields[4].to_string(),
        })?;
    let fullmove_number: u32 = fields[5]
        .parse()
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| NotationError::FullmoveNumber {
            found: fields[5].to_string(),
        })?;

    // The clock cannot exceed the number of plies played so far.
    let plies_played = u64::from(fullmove_number - 1) * 2
        + u64::from(side_to_move == Color::Black);
    if u64::from(halfmove_clock) > plies_played {
        return Err(NotationError::InconsistentCounters {
            halfmove: halfmove_clock,
            fullmove: fullmove_number,
        });
    }

    // The side that just moved cannot have left its king attacked.
    if board.is_in_check(!side_to_move) {
        return Err(NotationError::OpponentInCheck);
    }

    Ok(GameState {
        board,
        side_to_move,
        castling_rights,
        en_passant,
        halfmove_clock,
        fullmove_number,
    })
}

fn decode_placement(field: &str) -> Result<Board, NotationError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(NotationError::RankCount { found: ranks.len() });
    }

    let mut board = Board::empty();
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_idx as u8; // rank 8 comes first
        let mut file: u8 = 0;
        for ch in rank_str.chars() {
            match ch {
                '1'..='8' => {
                    file += ch as u8 - b'0';
                    if file > 8 {
                        return Err(NotationError::RankWidth {
                            rank: rank + 1,
                            files: file,
                        });
                    }
                }
                _ => {
                    let piece = Piece::from_char(ch).ok_or(NotationError::PieceChar { ch })?;
                    let sq = Square::from_file_rank(file, rank).ok_or(
                        NotationError::RankWidth {
                            rank: rank + 1,
                            files: file + 1,
                        },
                    )?;
                    board.put(sq, piece);
                    file += 1;
                }
            }
        }
        if file != 8 {
            return Err(NotationError::RankWidth {
                rank: rank + 1,
                files: file,
            });
        }
    }

    for color in [Color::White, Color::Black] {
        let count = board.count(color, PieceType::King) as u32;
        if count != 1 {
            return Err(NotationError::KingCount { color, count });
        }
    }

    for color in [Color::White, Color::Black] {
        let pawn = Piece::new(color, PieceType::Pawn);
        if let Some(sq) = board
            .squares_of(pawn)
            .find(|sq| sq.rank() == 0 || sq.rank() == 7)
        {
            return Err(NotationError::PawnOnBackRank {
                square: sq.to_algebraic(),
            });
        }
    }

    Ok(board)
}

/// Each claimed right needs its king and rook on their home squares.
fn check_castling_consistency(board: &Board, rights: CastlingRights) -> Result<(), NotationError> {
    for (flag, letter, color, rook_file) in [
        (CastlingRights::WHITE_KINGSIDE, 'K', Color::White, 7u8),
        (CastlingRights::WHITE_QUEENSIDE, 'Q', Color::White, 0),
        (CastlingRights::BLACK_KINGSIDE, 'k', Color::Black, 7),
        (CastlingRights::BLACK_QUEENSIDE, 'q', Color::Black, 0),
    ] {
        if !rights.has(flag) {
            continue;
        }
        let rank = color.back_rank();
        let on = |file: u8, kind: PieceType| {
            Square::from_file_rank(file, rank).and_then(|sq| board.piece_at(sq))
                == Some(Piece::new(color, kind))
        };
        if !on(4, PieceType::King) || !on(rook_file, PieceType::Rook) {
            return Err(NotationError::CastlingInconsistent { right: letter });
        }
    }
    Ok(())
}

/// The target must sit behind an enemy pawn that could just have
/// double-pushed: rank 6 with White to move, rank 3 with Black to move.
fn decode_en_passant(
    field: &str,
    board: &Board,
    side_to_move: Color,
) -> Result<Option<Square>, NotationError> {
    if field == "-" {
        return Ok(None);
    }
    let invalid = || NotationError::EnPassant {
        found: field.to_string(),
    };
    let target = Square::from_algebraic(field).ok_or_else(invalid)?;

    let them = !side_to_move;
    let expected_rank = if side_to_move == Color::White { 5 } else { 2 };
    if target.rank() != expected_rank {
        return Err(invalid());
    }
    // Pawn one step past the target, origin one step before it.
    let pawn_sq = target.offset(0, them.forward()).ok_or_else(invalid)?;
    let origin = target.offset(0, -them.forward()).ok_or_else(invalid)?;
    if board.piece_at(pawn_sq) != Some(Piece::new(them, PieceType::Pawn))
        || !board.is_empty(target)
        || !board.is_empty(origin)
    {
        return Err(invalid());
    }
    Ok(Some(target))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::NotationField;
    use crate::engine::movegen;

    fn field_of(fen: &str) -> NotationField {
        decode(fen).unwrap_err().field()
    }

    #[test]
    fn starting_position_round_trip() {
        let s = decode(STARTING_FEN).unwrap();
        assert_eq!(s, GameState::starting());
        assert_eq!(encode(&s), STARTING_FEN);
    }

    #[test]
    fn known_positions_round_trip() {
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ] {
            assert_eq!(encode(&decode(fen).unwrap()), fen);
        }
    }

    #[test]
    fn states_reached_in_play_round_trip() {
        let mut s = GameState::starting();
        for _ in 0..40 {
            let moves = movegen::legal_moves(&s);
            let Some(&mv) = moves.get(moves.len() / 2) else {
                break;
            };
            s = s.apply_move(mv).unwrap();
            assert_eq!(decode(&encode(&s)).unwrap(), s);
        }
    }

    #[test]
    fn field_count() {
        assert_eq!(
            decode("8/8/8/8/8/8/8/8 w - -"),
            Err(NotationError::FieldCount { found: 4 })
        );
        assert_eq!(decode(""), Err(NotationError::FieldCount { found: 0 }));
    }

    #[test]
    fn placement_errors() {
        assert_eq!(
            decode("rnbqkbnr/pppppppp/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(NotationError::RankCount { found: 7 })
        );
        assert_eq!(
            decode("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRR w KQkq - 0 1"),
            Err(NotationError::RankWidth { rank: 1, files: 9 })
        );
        assert_eq!(
            decode("rnbqkbnr/pppppppp/7/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(NotationError::RankWidth { rank: 6, files: 7 })
        );
        assert_eq!(
            decode("rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(NotationError::PieceChar { ch: 'x' })
        );
        assert_eq!(
            decode("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(NotationError::KingCount {
                color: Color::Black,
                count: 0
            })
        );
        assert_eq!(
            decode("4k3/8/8/8/8/8/8/3KK3 w - - 0 1"),
            Err(NotationError::KingCount {
                color: Color::White,
                count: 2
            })
        );
        assert_eq!(
            decode("4k2P/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(NotationError::PawnOnBackRank {
                square: "h8".into()
            })
        );
    }

    #[test]
    fn side_and_castling_errors() {
        assert_eq!(
            field_of("4k3/8/8/8/8/8/8/4K3 x - - 0 1"),
            NotationField::SideToMove
        );
        assert_eq!(
            decode("4k3/8/8/8/8/8/8/4K3 w KX - 0 1"),
            Err(NotationError::CastlingRights { found: "KX".into() })
        );
        assert_eq!(
            decode("4k3/8/8/8/8/8/8/4K3 w K - 0 1"),
            Err(NotationError::CastlingInconsistent { right: 'K' })
        );
        assert_eq!(
            decode("r3k3/8/8/8/8/8/8/4K3 w q - 0 1").map(|s| s.castling_rights.to_fen()),
            Ok("q".to_string())
        );
    }

    #[test]
    fn en_passant_errors() {
        // Wrong rank for the side to move.
        assert_eq!(
            field_of("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e3 0 1"),
            NotationField::EnPassant
        );
        // No pawn in front of the target.
        assert_eq!(
            field_of("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq e3 0 1"),
            NotationField::EnPassant
        );
        // Off-board text.
        assert_eq!(
            field_of("4k3/8/8/8/8/8/8/4K3 w - z9 0 1"),
            NotationField::EnPassant
        );
    }

    #[test]
    fn counter_errors() {
        assert_eq!(
            field_of("4k3/8/8/8/8/8/8/4K3 w - - -1 1"),
            NotationField::HalfmoveClock
        );
        assert_eq!(
            field_of("4k3/8/8/8/8/8/8/4K3 w - - 0 0"),
            NotationField::FullmoveNumber
        );
        assert_eq!(
            field_of("4k3/8/8/8/8/8/8/4K3 w - - 0 x"),
            NotationField::FullmoveNumber
        );
        assert_eq!(
            decode("4k3/8/8/8/8/8/8/4KR2 w - - 5 2"),
            Err(NotationError::InconsistentCounters {
                halfmove: 5,
                fullmove: 2
            })
        );
        assert!(decode("4k3/8/8/8/8/8/8/4KR2 b - - 3 2").is_ok());
    }

    #[test]
    fn side_not_to_move_in_check_is_rejected() {
        assert!(decode("4k3/8/8/8/8/8/8/4KR2 w - - 0 1").is_ok());
        assert_eq!(
            decode("4k3/8/8/8/8/8/8/4R1K1 w - - 0 1"),
            Err(NotationError::OpponentInCheck)
        );
    }

    #[test]
    fn placement_field_alone() {
        assert_eq!(
            placement(&Board::standard()),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }
}
