//! Session-level scenarios: full games through the public text contract.

use std::collections::HashSet;

use grandmastery::engine::movegen;
use grandmastery::engine::notation;
use grandmastery::engine::{
    Color, EngineError, GameResult, GameSession, GameState, Move, NotationError, PositionSignature,
};

// =====================================================================
// Helpers
// =====================================================================

fn play(moves: &str) -> GameSession {
    let mut session = GameSession::new();
    session.play_moves(moves).unwrap();
    session
}

// =====================================================================
// Basic contract
// =====================================================================

#[test]
fn initial_position_has_20_legal_moves() {
    assert_eq!(GameSession::new().legal_moves().len(), 20);
}

#[test]
fn every_state_reached_in_play_round_trips() {
    let mut session = GameSession::new();
    for ply in 0..150 {
        let moves = session.legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[(ply * 7 + 3) % moves.len()];
        let outcome = session.apply(mv).unwrap();

        let decoded = notation::decode(&outcome.notation).unwrap();
        assert_eq!(&decoded, session.state());
        assert_eq!(notation::encode(&decoded), outcome.notation);
    }
    for snapshot in session.snapshots() {
        assert_eq!(notation::encode(&notation::decode(snapshot).unwrap()), snapshot);
    }
}

#[test]
fn equivalent_texts_resolve_to_the_same_move() {
    let forms = ["Nf3", "g1f3", "g1-f3", "Ngf3", "Nf3!"];
    let outcomes: Vec<_> = forms
        .iter()
        .map(|text| GameSession::new().propose_move(text).unwrap())
        .collect();
    for outcome in &outcomes[1..] {
        assert_eq!(outcome.mv, outcomes[0].mv);
        assert_eq!(outcome.notation, outcomes[0].notation);
    }
}

// =====================================================================
// Termination scenarios
// =====================================================================

#[test]
fn fools_mate() {
    let session = play("f3,e5,g4,Qh4#");
    assert_eq!(
        session.result(),
        GameResult::Checkmate {
            winner: Color::Black
        }
    );
    assert!(session.legal_moves().is_empty());
    assert_eq!(session.moves().last().unwrap().san, "Qh4#");
}

#[test]
fn stalemate_from_constructed_position() {
    let mut session = GameSession::create(Some("k7/2K5/8/8/8/8/8/1Q6 w - - 0 1")).unwrap();
    let outcome = session.propose_move("Qb6").unwrap();
    assert_eq!(outcome.result, GameResult::Stalemate);
    assert!(session.legal_moves().is_empty());
}

#[test]
fn threefold_repetition() {
    let mut session = play("Nf3,Nf6,Ng1,Ng8,Nf3,Nf6,Ng1");
    assert_eq!(session.result(), GameResult::Ongoing);
    let outcome = session.propose_move("Ng8").unwrap();
    assert_eq!(outcome.result, GameResult::DrawByRepetition);
    assert_eq!(
        session.history().occurrences(&GameState::starting().signature()),
        3
    );
}

/// Depth-first search for `plies` quiet moves that never revisit a position.
fn quiet_walk(
    state: &GameState,
    seen: &mut HashSet<PositionSignature>,
    path: &mut Vec<Move>,
    plies: usize,
) -> bool {
    if path.len() == plies {
        return true;
    }
    for mv in movegen::legal_moves(state) {
        if state.is_capture(mv) {
            continue;
        }
        let next = state.apply_move(mv).unwrap();
        let signature = next.signature();
        if !seen.insert(signature.clone()) {
            continue;
        }
        path.push(mv);
        if quiet_walk(&next, seen, path, plies) {
            return true;
        }
        path.pop();
        seen.remove(&signature);
    }
    false
}

#[test]
fn fifty_move_rule_after_100_quiet_plies() {
    // Locked pawns: only the kings can move, and neither can reach a pawn.
    let mut session =
        GameSession::create(Some("4k3/8/8/p1p1p1p1/P1P1P1P1/8/8/4K3 w - - 0 1")).unwrap();
    let mut seen = HashSet::from([session.state().signature()]);
    let mut path = Vec::new();
    assert!(quiet_walk(session.state(), &mut seen, &mut path, 100));

    for (i, mv) in path.into_iter().enumerate() {
        let outcome = session.apply(mv).unwrap();
        if i < 99 {
            assert!(!outcome.result.is_terminal(), "ply {}: {}", i + 1, outcome.result);
        } else {
            assert_eq!(outcome.result, GameResult::DrawByFiftyMove);
        }
    }
    assert_eq!(session.state().halfmove_clock, 100);
}

#[test]
fn insufficient_material_after_last_capture() {
    // Kxe2 leaves king against king and bishop.
    let mut session = GameSession::create(Some("4k3/8/8/8/8/8/4r3/3BK3 w - - 0 1")).unwrap();
    let outcome = session.propose_move("Kxe2").unwrap();
    assert_eq!(outcome.result, GameResult::DrawByInsufficientMaterial);
}

// =====================================================================
// Rejection and terminal behaviour
// =====================================================================

#[test]
fn rejected_moves_leave_the_session_unchanged() {
    let mut session = play("e4,e5");
    let before_state = session.state().clone();
    let before_history = session.history().len();
    let before_moves = session.moves().len();

    for text in ["e5", "Ke3", "Qxf7", "xyz", "", "e7e8q", "O-O"] {
        assert!(session.propose_move(text).is_err(), "{text}");
        assert_eq!(session.state(), &before_state);
        assert_eq!(session.history().len(), before_history);
        assert_eq!(session.moves().len(), before_moves);
        assert_eq!(session.result(), GameResult::Ongoing);
    }
}

#[test]
fn error_kinds() {
    let mut session = GameSession::new();
    assert!(matches!(
        session.propose_move("e5"),
        Err(EngineError::IllegalMove { .. })
    ));
    assert!(matches!(
        session.propose_move("e2e4e5"),
        Err(EngineError::Notation(NotationError::MalformedMove { .. }))
    ));

    let mut session = GameSession::create(Some("7k/4P3/8/8/8/8/8/4K3 w - - 0 1")).unwrap();
    assert!(matches!(
        session.propose_move("e8"),
        Err(EngineError::InvalidPromotion { .. })
    ));
    let outcome = session.propose_move("e8=R+").unwrap();
    assert_eq!(outcome.san, "e8=R+");
}

#[test]
fn terminated_sessions_refuse_every_proposal() {
    let mut session = play("f3,e5,g4,Qh4#");
    let result = session.result();
    for text in ["e4", "Kf2", "a2a3", "", "garbage", "O-O"] {
        assert_eq!(
            session.propose_move(text),
            Err(EngineError::SessionTerminated { result }),
            "{text}"
        );
    }
    assert!(matches!(
        session.resign(Color::White),
        Err(EngineError::SessionTerminated { .. })
    ));
    assert!(matches!(
        session.flag_timeout(Color::White),
        Err(EngineError::SessionTerminated { .. })
    ));
}

#[test]
fn resignation_ends_the_game() {
    let mut session = play("e4");
    assert_eq!(
        session.resign(Color::Black).unwrap(),
        GameResult::Resigned {
            winner: Color::White
        }
    );
    assert!(matches!(
        session.propose_move("e5"),
        Err(EngineError::SessionTerminated { .. })
    ));
}

// =====================================================================
// Wire shape
// =====================================================================

#[test]
fn results_serialize_as_tagged_objects() {
    let mate = GameResult::Checkmate {
        winner: Color::Black,
    };
    assert_eq!(
        serde_json::to_value(mate).unwrap(),
        serde_json::json!({ "status": "checkmate", "winner": "black" })
    );
    assert_eq!(
        serde_json::to_value(GameResult::DrawByFiftyMove).unwrap(),
        serde_json::json!({ "status": "draw_by_fifty_move" })
    );
    let back: GameResult =
        serde_json::from_value(serde_json::json!({ "status": "timed_out", "winner": "white" }))
            .unwrap();
    assert_eq!(
        back,
        GameResult::TimedOut {
            winner: Color::White
        }
    );
}

#[test]
fn move_outcome_wire_shape() {
    let outcome = GameSession::new().propose_move("e4").unwrap();
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "notation": "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "result": { "status": "ongoing" },
            "san": "e4",
            "move": {
                "from": "e2",
                "to": "e4",
                "promotion": null,
                "kind": "double_pawn_push"
            }
        })
    );
}

// =====================================================================
// Independence
// =====================================================================

#[test]
fn sessions_run_in_parallel() {
    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| play("f3,e5,g4,Qh4#").result()))
        .collect();
    for handle in handles {
        assert_eq!(
            handle.join().unwrap(),
            GameResult::Checkmate {
                winner: Color::Black
            }
        );
    }
}
