//! Move text: Standard Algebraic Notation (SAN) and long algebraic.
//!
//! SAN examples: `e4`, `Nf3`, `Bxe5`, `O-O`, `e8=Q+`, `Raxd1#`.
//! Long algebraic examples: `e2e4`, `e2-e4`, `e7e8q`, `e7e8=Q`.
//!
//! Move text only means something relative to a position, so parsing always
//! resolves against the legal moves of a [`GameState`].

use crate::engine::error::{EngineError, NotationError};
use crate::engine::movegen;
use crate::engine::state::GameState;
use crate::engine::types::{Move, MoveKind, PieceType, Square};

// =========================================================================
// SAN generation
// =========================================================================

/// Convert a legal move to SAN, including a `+` or `#` suffix.
///
/// `legal_moves` must be the full legal move list of `state`.
pub fn move_to_san(state: &GameState, mv: Move, legal_moves: &[Move]) -> String {
    let mut san = match mv.kind {
        MoveKind::CastleKingside => "O-O".to_string(),
        MoveKind::CastleQueenside => "O-O-O".to_string(),
        _ => move_body(state, mv, legal_moves),
    };

    let mut next = state.clone();
    next.play_unchecked(mv);
    if next.is_in_check() {
        san.push(if movegen::has_legal_move(&next) { '+' } else { '#' });
    }
    san
}

/// SAN for `mv`, generating the legal move list itself.
pub fn to_san(state: &GameState, mv: Move) -> String {
    move_to_san(state, mv, &movegen::legal_moves(state))
}

fn move_body(state: &GameState, mv: Move, legal_moves: &[Move]) -> String {
    let kind = state
        .board
        .piece_at(mv.from)
        .map_or(PieceType::Pawn, |p| p.kind);
    let capture = state.is_capture(mv);

    let mut san = String::with_capacity(8);
    if kind == PieceType::Pawn {
        if capture {
            // Departure file on captures: "exd5".
            san.push(mv.from.file_char());
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());
        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(promo.letter());
        }
    } else {
        san.push(kind.letter());
        san.push_str(&disambiguation(state, mv, kind, legal_moves));
        if capture {
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());
    }
    san
}

/// The shortest origin hint that tells `mv` apart from other moves of the
/// same piece type to the same square: file, else rank, else both.
fn disambiguation(state: &GameState, mv: Move, kind: PieceType, legal_moves: &[Move]) -> String {
    let rivals: Vec<Square> = legal_moves
        .iter()
        .filter(|m| m.to == mv.to && m.from != mv.from && !m.is_castle())
        .filter(|m| state.board.piece_at(m.from).map(|p| p.kind) == Some(kind))
        .map(|m| m.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let same_file = rivals.iter().any(|r| r.file() == mv.from.file());
    let same_rank = rivals.iter().any(|r| r.rank() == mv.from.rank());
    match (same_file, same_rank) {
        (false, _) => mv.from.file_char().to_string(),
        (true, false) => mv.from.rank_char().to_string(),
        (true, true) => mv.from.to_algebraic(),
    }
}

// =========================================================================
// Parsing
// =========================================================================

/// Resolve move text (SAN or long algebraic) to a legal move of `state`.
///
/// Malformed text is a [`NotationError`]; well-formed text that matches no
/// legal move is [`EngineError::IllegalMove`]; a missing or impossible
/// promotion is [`EngineError::InvalidPromotion`].
pub fn parse_move(state: &GameState, text: &str) -> Result<Move, EngineError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(NotationError::EmptyMove.into());
    }
    let legal = movegen::legal_moves(state);
    let body = text.trim_end_matches(['+', '#', '!', '?']);

    if let Some(kind) = castling_kind(body) {
        return legal
            .iter()
            .find(|m| m.kind == kind)
            .copied()
            .ok_or_else(|| EngineError::illegal(text, "castling is not available"));
    }

    match parse_coordinates(text, body)? {
        Some((from, to, promotion)) => resolve_long(text, &legal, from, to, promotion),
        None => parse_san_body(state, &legal, text, body),
    }
}

/// Split a comma-separated move list, dropping empty entries.
pub fn parse_move_list(text: &str) -> Vec<&str> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn castling_kind(body: &str) -> Option<MoveKind> {
    match body {
        "O-O" | "0-0" => Some(MoveKind::CastleKingside),
        "O-O-O" | "0-0-0" => Some(MoveKind::CastleQueenside),
        _ => None,
    }
}

/// Whether `(file, rank)` is shaped like a square, in range or not.
fn coordinate_shaped(file: char, rank: char) -> bool {
    file.is_ascii_lowercase() && file != 'x' && rank.is_ascii_digit()
}

fn square(text: &str, file: char, rank: char) -> Result<Square, NotationError> {
    Square::from_algebraic(&format!("{file}{rank}")).ok_or_else(|| {
        NotationError::SquareOutOfRange {
            text: text.to_string(),
        }
    })
}

fn promotion_piece(text: &str, c: char) -> Result<PieceType, EngineError> {
    match PieceType::from_promotion_char(c) {
        Some(kind) => Ok(kind),
        None if matches!(c, 'k' | 'K' | 'p' | 'P') => Err(EngineError::promotion(
            text,
            format!("cannot promote to '{c}'"),
        )),
        None => Err(NotationError::MalformedMove {
            text: text.to_string(),
        }
        .into()),
    }
}

type Coordinates = (Square, Square, Option<PieceType>);

/// Recognise long algebraic `e2e4`, `e2-e4`, `e7e8q`, `e7e8=Q`.
///
/// Returns `Ok(None)` when the text is not in that form.
fn parse_coordinates(text: &str, body: &str) -> Result<Option<Coordinates>, EngineError> {
    let mut chars: Vec<char> = body.chars().collect();
    if chars.len() >= 5 && chars[2] == '-' {
        chars.remove(2);
    }
    if chars.len() < 4 || !coordinate_shaped(chars[0], chars[1]) || !coordinate_shaped(chars[2], chars[3])
    {
        return Ok(None);
    }

    let from = square(text, chars[0], chars[1])?;
    let to = square(text, chars[2], chars[3])?;
    let promotion = match &chars[4..] {
        [] => None,
        ['=', c] | [c] => Some(promotion_piece(text, *c)?),
        _ => {
            return Err(NotationError::MalformedMove {
                text: text.to_string(),
            }
            .into())
        }
    };
    Ok(Some((from, to, promotion)))
}

fn resolve_long(
    text: &str,
    legal: &[Move],
    from: Square,
    to: Square,
    promotion: Option<PieceType>,
) -> Result<Move, EngineError> {
    let candidates: Vec<Move> = legal
        .iter()
        .filter(|m| m.from == from && m.to == to)
        .copied()
        .collect();
    select(text, candidates, promotion)
}

/// Narrow same-square candidates by promotion piece.
fn select(
    text: &str,
    candidates: Vec<Move>,
    promotion: Option<PieceType>,
) -> Result<Move, EngineError> {
    if candidates.is_empty() {
        return Err(EngineError::illegal(text, "no legal move matches"));
    }
    let promoting = candidates.iter().any(|m| m.promotion.is_some());
    match (promoting, promotion) {
        (true, None) => return Err(EngineError::promotion(text, "promotion piece required")),
        (false, Some(_)) => return Err(EngineError::promotion(text, "move does not promote")),
        _ => {}
    }

    let matching: Vec<Move> = candidates
        .into_iter()
        .filter(|m| m.promotion == promotion)
        .collect();
    match matching.as_slice() {
        [] => Err(EngineError::illegal(text, "no legal move matches")),
        [mv] => Ok(*mv),
        many => Err(NotationError::AmbiguousMove {
            text: text.to_string(),
            candidates: many.len(),
        }
        .into()),
    }
}

/// Parse the SAN body (suffixes already stripped).
fn parse_san_body(
    state: &GameState,
    legal: &[Move],
    text: &str,
    body: &str,
) -> Result<Move, EngineError> {
    let malformed = || -> EngineError {
        NotationError::MalformedMove {
            text: text.to_string(),
        }
        .into()
    };
    let chars: Vec<char> = body.chars().collect();

    // Promotion: "e8=Q" or "e8Q".
    let (chars, promotion) = match chars.as_slice() {
        [rest @ .., '=', c] => (rest, Some(promotion_piece(text, *c)?)),
        [rest @ .., r, c] if r.is_ascii_digit() && c.is_ascii_alphabetic() => {
            let mut head = rest.to_vec();
            head.push(*r);
            return parse_san_parts(state, legal, text, &head, Some(promotion_piece(text, *c)?));
        }
        all => (all, None),
    };
    if chars.is_empty() {
        return Err(malformed());
    }
    parse_san_parts(state, legal, text, chars, promotion)
}

fn parse_san_parts(
    state: &GameState,
    legal: &[Move],
    text: &str,
    chars: &[char],
    promotion: Option<PieceType>,
) -> Result<Move, EngineError> {
    let malformed = || -> EngineError {
        NotationError::MalformedMove {
            text: text.to_string(),
        }
        .into()
    };

    // Piece letter, absent for pawns.
    let (kind, rest) = match chars.split_first() {
        Some((&c, rest)) if c.is_ascii_uppercase() => {
            let kind = match c {
                'N' => PieceType::Knight,
                'B' => PieceType::Bishop,
                'R' => PieceType::Rook,
                'Q' => PieceType::Queen,
                'K' => PieceType::King,
                _ => return Err(malformed()),
            };
            (kind, rest)
        }
        Some(_) => (PieceType::Pawn, chars),
        None => return Err(malformed()),
    };
    if promotion.is_some() && kind != PieceType::Pawn {
        return Err(EngineError::promotion(text, "only pawns promote"));
    }

    // Capture marker carries no information once matched against legal moves.
    let rest: Vec<char> = rest.iter().copied().filter(|&c| c != 'x').collect();
    let [hint @ .., file, rank] = rest.as_slice() else {
        return Err(malformed());
    };
    if !coordinate_shaped(*file, *rank) {
        return Err(malformed());
    }
    let dest = square(text, *file, *rank)?;

    // Origin hint: optional file, optional rank, in that order.
    let (hint_file, hint_rank) = match hint {
        [] => (None, None),
        [f] if ('a'..='h').contains(f) => (Some(*f as u8 - b'a'), None),
        [r] if ('1'..='8').contains(r) => (None, Some(*r as u8 - b'1')),
        [f, r] if ('a'..='h').contains(f) && ('1'..='8').contains(r) => {
            (Some(*f as u8 - b'a'), Some(*r as u8 - b'1'))
        }
        _ => return Err(malformed()),
    };

    let candidates: Vec<Move> = legal
        .iter()
        .filter(|m| m.to == dest && !m.is_castle())
        .filter(|m| state.board.piece_at(m.from).map(|p| p.kind) == Some(kind))
        .filter(|m| hint_file.map_or(true, |f| m.from.file() == f))
        .filter(|m| hint_rank.map_or(true, |r| m.from.rank() == r))
        .copied()
        .collect();
    select(text, candidates, promotion)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::notation;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn state(fen: &str) -> GameState {
        notation::decode(fen).unwrap()
    }

    fn san(fen: &str, mv: Move) -> String {
        to_san(&state(fen), mv)
    }

    // -------------------------------------------------------------------
    // SAN generation
    // -------------------------------------------------------------------

    #[test]
    fn san_pawn_push() {
        assert_eq!(
            san(
                notation::STARTING_FEN,
                Move::with_kind(sq("e2"), sq("e4"), MoveKind::DoublePawnPush)
            ),
            "e4"
        );
    }

    #[test]
    fn san_pawn_capture() {
        assert_eq!(
            san(
                "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
                Move::new(sq("e4"), sq("d5"))
            ),
            "exd5"
        );
    }

    #[test]
    fn san_pawn_promotion() {
        assert_eq!(
            san(
                "7k/4P3/8/8/8/8/8/4K3 w - - 0 1",
                Move::with_promotion(sq("e7"), sq("e8"), PieceType::Queen)
            ),
            "e8=Q+"
        );
        assert_eq!(
            san(
                "7k/4P3/8/8/8/8/8/4K3 w - - 0 1",
                Move::with_promotion(sq("e7"), sq("e8"), PieceType::Knight)
            ),
            "e8=N"
        );
    }

    #[test]
    fn san_en_passant() {
        assert_eq!(
            san(
                "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
                Move::with_kind(sq("e5"), sq("f6"), MoveKind::EnPassant)
            ),
            "exf6"
        );
    }

    #[test]
    fn san_piece_moves() {
        assert_eq!(
            san(notation::STARTING_FEN, Move::new(sq("g1"), sq("f3"))),
            "Nf3"
        );
        assert_eq!(
            san(
                "rnbqk1nr/pppp1ppp/4p3/8/1b6/2N5/PPPPPPPP/R1BQKBNR b KQkq - 2 2",
                Move::new(sq("b4"), sq("c3"))
            ),
            "Bxc3"
        );
    }

    #[test]
    fn san_castling() {
        let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
        assert_eq!(
            san(fen, Move::with_kind(sq("e1"), sq("g1"), MoveKind::CastleKingside)),
            "O-O"
        );
        assert_eq!(
            san(fen, Move::with_kind(sq("e1"), sq("c1"), MoveKind::CastleQueenside)),
            "O-O-O"
        );
    }

    #[test]
    fn san_disambiguation() {
        // File is enough.
        assert_eq!(
            san("4k3/8/8/8/8/4K3/8/R6R w - - 0 1", Move::new(sq("a1"), sq("e1"))),
            "Rae1"
        );
        // Same file: rank.
        assert_eq!(
            san("R3k3/8/8/8/8/8/8/R3K3 w - - 0 1", Move::new(sq("a1"), sq("a4"))),
            "R1a4"
        );
        // Three queens: both.
        assert_eq!(
            san(
                "1k6/8/8/8/4Q2Q/8/K7/7Q w - - 0 1",
                Move::new(sq("h4"), sq("e1"))
            ),
            "Qh4e1"
        );
    }

    #[test]
    fn san_check_and_mate_suffixes() {
        // 1. f3 e5 2. g4, Black to mate.
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2";
        assert_eq!(san(fen, Move::new(sq("d8"), sq("h4"))), "Qh4#");
        assert_eq!(
            san(
                "4k3/8/8/8/8/8/8/R3K3 w Q - 0 1",
                Move::new(sq("a1"), sq("a8"))
            ),
            "Ra8+"
        );
    }

    // -------------------------------------------------------------------
    // Parsing
    // -------------------------------------------------------------------

    #[test]
    fn parse_san_moves() {
        let s = GameState::starting();
        assert_eq!(
            parse_move(&s, "e4").unwrap(),
            Move::with_kind(sq("e2"), sq("e4"), MoveKind::DoublePawnPush)
        );
        assert_eq!(parse_move(&s, "Nf3").unwrap(), Move::new(sq("g1"), sq("f3")));
        assert_eq!(parse_move(&s, "Nf3!?").unwrap(), Move::new(sq("g1"), sq("f3")));
    }

    #[test]
    fn parse_long_algebraic() {
        let s = GameState::starting();
        let expected = Move::with_kind(sq("e2"), sq("e4"), MoveKind::DoublePawnPush);
        assert_eq!(parse_move(&s, "e2e4").unwrap(), expected);
        assert_eq!(parse_move(&s, "e2-e4").unwrap(), expected);
        assert_eq!(parse_move(&s, " e2e4 ").unwrap(), expected);
    }

    #[test]
    fn parse_castling_forms() {
        let s = state("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let short = Move::with_kind(sq("e1"), sq("g1"), MoveKind::CastleKingside);
        let long = Move::with_kind(sq("e1"), sq("c1"), MoveKind::CastleQueenside);
        assert_eq!(parse_move(&s, "O-O").unwrap(), short);
        assert_eq!(parse_move(&s, "0-0").unwrap(), short);
        assert_eq!(parse_move(&s, "e1g1").unwrap(), short);
        assert_eq!(parse_move(&s, "O-O-O").unwrap(), long);
        assert_eq!(parse_move(&s, "0-0-0+").unwrap(), long);
        assert!(matches!(
            parse_move(&GameState::starting(), "O-O"),
            Err(EngineError::IllegalMove { .. })
        ));
    }

    #[test]
    fn parse_promotion_forms() {
        let s = state("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let queen = Move::with_promotion(sq("e7"), sq("e8"), PieceType::Queen);
        for text in ["e8=Q", "e8Q", "e8=Q+", "e7e8q", "e7e8=Q", "e7e8Q"] {
            assert_eq!(parse_move(&s, text).unwrap(), queen, "{text}");
        }
        assert_eq!(
            parse_move(&s, "e7e8n").unwrap(),
            Move::with_promotion(sq("e7"), sq("e8"), PieceType::Knight)
        );
    }

    #[test]
    fn promotion_errors() {
        let s = state("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        for text in ["e8", "e7e8", "e8=K", "e7e8k", "e8=P"] {
            assert!(
                matches!(parse_move(&s, text), Err(EngineError::InvalidPromotion { .. })),
                "{text}"
            );
        }
        assert!(matches!(
            parse_move(&s, "e1e2q"),
            Err(EngineError::InvalidPromotion { .. })
        ));
        assert!(matches!(
            parse_move(&s, "Ke2=Q"),
            Err(EngineError::InvalidPromotion { .. })
        ));
    }

    #[test]
    fn parse_disambiguated_san() {
        let s = state("4k3/8/8/8/8/4K3/8/R6R w - - 0 1");
        assert_eq!(parse_move(&s, "Rae1").unwrap(), Move::new(sq("a1"), sq("e1")));
        assert_eq!(parse_move(&s, "Rhe1").unwrap(), Move::new(sq("h1"), sq("e1")));
        assert_eq!(
            parse_move(&s, "Re1"),
            Err(NotationError::AmbiguousMove {
                text: "Re1".into(),
                candidates: 2
            }
            .into())
        );
    }

    #[test]
    fn malformed_and_illegal_text() {
        let s = GameState::starting();
        assert_eq!(parse_move(&s, "  "), Err(NotationError::EmptyMove.into()));
        for text in ["Zf3", "hello", "N", "e4e", "Nf3x3"] {
            assert!(
                matches!(parse_move(&s, text), Err(EngineError::Notation(_))),
                "{text}"
            );
        }
        assert!(matches!(
            parse_move(&s, "e2e9"),
            Err(EngineError::Notation(NotationError::SquareOutOfRange { .. }))
        ));
        assert!(matches!(
            parse_move(&s, "Qh5"),
            Err(EngineError::IllegalMove { .. })
        ));
        assert!(matches!(
            parse_move(&s, "e2e5"),
            Err(EngineError::IllegalMove { .. })
        ));
    }

    #[test]
    fn move_list_splits_on_commas() {
        assert_eq!(
            parse_move_list("e2e4, e7e5,,g1f3 "),
            vec!["e2e4", "e7e5", "g1f3"]
        );
        assert!(parse_move_list("").is_empty());
    }

    // -------------------------------------------------------------------
    // Round-trip: generate SAN then parse it back
    // -------------------------------------------------------------------

    #[test]
    fn san_resolves_to_the_same_move() {
        for fen in [
            notation::STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        ] {
            let s = state(fen);
            let legal = movegen::legal_moves(&s);
            for &mv in &legal {
                let text = move_to_san(&s, mv, &legal);
                assert_eq!(parse_move(&s, &text).unwrap(), mv, "{fen}: {text}");
                assert_eq!(parse_move(&s, &mv.to_string()).unwrap(), mv, "{fen}: {mv}");
            }
        }
    }
}
