//! PGN (Portable Game Notation) export.
//!
//! Produces PGN with the Seven Tag Roster and numbered SAN move text.

use crate::engine::session::GameSession;
use crate::engine::types::Color;

/// Maximum movetext line width.
const LINE_WIDTH: usize = 80;

// =========================================================================
// PGN generation
// =========================================================================

/// Export a session as a PGN string.
pub fn to_pgn(session: &GameSession) -> String {
    let mut pgn = String::with_capacity(512);

    // Seven Tag Roster.
    let date = session.created_at.format("%Y.%m.%d");
    let result = session.result().pgn_token();

    pgn.push_str("[Event \"Casual Game\"]\n");
    pgn.push_str("[Site \"grandmastery\"]\n");
    pgn.push_str(&format!("[Date \"{date}\"]\n"));
    pgn.push_str("[Round \"-\"]\n");
    pgn.push_str("[White \"?\"]\n");
    pgn.push_str("[Black \"?\"]\n");
    pgn.push_str(&format!("[Result \"{result}\"]\n"));

    // Resumed and Fischer-random games carry their starting position.
    if session.has_custom_start() {
        pgn.push_str("[SetUp \"1\"]\n");
        pgn.push_str(&format!("[FEN \"{}\"]\n", session.starting_notation()));
    }

    pgn.push('\n');

    let start = session.starting_state();
    let mut move_num = start.fullmove_number;
    let mut white_turn = start.side_to_move == Color::White;

    let mut tokens = Vec::with_capacity(session.moves().len() + 1);
    for (i, record) in session.moves().iter().enumerate() {
        let token = if white_turn {
            format!("{move_num}. {}", record.san)
        } else if i == 0 {
            // Game resumed with Black to move: "N... move".
            format!("{move_num}... {}", record.san)
        } else {
            record.san.clone()
        };
        tokens.push(token);

        if !white_turn {
            move_num += 1;
        }
        white_turn = !white_turn;
    }
    tokens.push(result.to_string());

    // Line wrapping.
    let mut line = String::new();
    for token in tokens {
        if !line.is_empty() && line.len() + token.len() + 1 > LINE_WIDTH {
            pgn.push_str(&line);
            pgn.push('\n');
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&token);
    }
    pgn.push_str(&line);
    pgn.push('\n');

    pgn
}

// =========================================================================
// Tests
// =========================================================================
