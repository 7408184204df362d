//! Game sessions: the public contract of the engine.
//!
//! A `GameSession` owns one game's state, position history, move records
//! and optional clock. Moves enter as text (or as typed [`Move`]s), are
//! resolved against the legal move set, committed, and the position is
//! re-evaluated. Once a terminal result is reached every mutating call
//! fails with [`EngineError::SessionTerminated`].
//!
//! Sessions share nothing; any number of them can live side by side on
//! different threads.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::engine::clock::Clock;
use crate::engine::error::{EngineError, NotationError, ReplayError};
use crate::engine::movegen;
use crate::engine::notation;
use crate::engine::rules::{self, PositionHistory};
use crate::engine::san;
use crate::engine::state::GameState;
use crate::engine::types::{Color, GameResult, Move, PieceType};

// =========================================================================
// MoveRecord / MoveOutcome
// =========================================================================

/// A committed ply.
#[derive(Clone, Debug)]
pub struct MoveRecord {
    /// The move that was played.
    pub mv: Move,
    /// SAN, including any check or mate suffix.
    pub san: String,
    /// Encoded state after the move.
    pub snapshot: String,
    /// Evaluation of the position after the move.
    pub result: GameResult,
}

/// What a successful proposal reports back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    /// Encoded state after the move.
    pub notation: String,
    pub result: GameResult,
    pub san: String,
    #[serde(rename = "move")]
    pub mv: Move,
}

// =========================================================================
// GameSession
// =========================================================================

/// One game from its starting position to its result.
#[derive(Clone, Debug)]
pub struct GameSession {
    // Core state
    state: GameState,
    history: PositionHistory,
    records: Vec<MoveRecord>,

    // Status
    result: GameResult,
    corrupted: bool,

    // Optional advisory clock
    clock: Option<Clock>,

    // Metadata
    pub id: String,
    pub created_at: DateTime<Utc>,

    // Starting position tracking
    custom_start: bool,
    starting_state: GameState,
}

impl GameSession {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// A session at the standard starting position.
    pub fn new() -> Self {
        Self::from_state(GameState::starting(), false)
    }

    /// A session at the standard position, or at a decoded one when
    /// `starting_notation` is given.
    pub fn create(starting_notation: Option<&str>) -> Result<Self, NotationError> {
        match starting_notation {
            Some(text) => Ok(Self::from_state(notation::decode(text)?, true)),
            None => Ok(Self::new()),
        }
    }

    /// A session at a Fischer-random (Chess960) starting position.
    pub fn fischer<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_state(GameState::fischer(rng), true)
    }

    /// Attach a clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    fn from_state(state: GameState, custom_start: bool) -> Self {
        let history = PositionHistory::starting_from(&state);
        let result = rules::evaluate(&state, &history);
        let session = GameSession {
            starting_state: state.clone(),
            state,
            history,
            records: Vec::new(),
            result,
            corrupted: false,
            clock: None,
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            custom_start,
        };
        debug!(
            session = %session.id,
            notation = %notation::encode(&session.state),
            result = %session.result,
            "session created"
        );
        session
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Current evaluation; terminal once the game is over.
    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_terminated(&self) -> bool {
        self.result.is_terminal()
    }

    /// Whether an internal invariant failed. A corrupted session refuses
    /// every mutating call.
    pub fn is_corrupted(&self) -> bool {
        self.corrupted
    }

    pub fn side_to_move(&self) -> Color {
        self.state.side_to_move
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    /// Committed plies, oldest first.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.records
    }

    /// Encoded state after each committed ply.
    pub fn snapshots(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.snapshot.as_str())
    }

    pub fn clock(&self) -> Option<&Clock> {
        self.clock.as_ref()
    }

    /// Whether the session started anywhere but the standard position
    /// (resumed from notation, or a Fischer-random array).
    pub fn has_custom_start(&self) -> bool {
        self.custom_start
    }

    /// The position the session started from.
    pub fn starting_state(&self) -> &GameState {
        &self.starting_state
    }

    /// Encoded starting position.
    pub fn starting_notation(&self) -> String {
        notation::encode(&self.starting_state)
    }

    /// Encoded current position.
    pub fn export_notation(&self) -> String {
        notation::encode(&self.state)
    }

    /// Legal moves for the side to move; empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.corrupted || self.is_terminated() {
            return Vec::new();
        }
        movegen::legal_moves(&self.state)
    }

    // -----------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------

    /// Resolve `text` against the legal moves and commit it.
    ///
    /// A rejected proposal leaves the session unchanged.
    pub fn propose_move(&mut self, text: &str) -> Result<MoveOutcome, EngineError> {
        self.ensure_mutable()?;
        let mv = san::parse_move(&self.state, text).map_err(|err| {
            warn!(session = %self.id, text, error = %err, "move rejected");
            err
        })?;
        self.commit(mv)
    }

    /// As [`propose_move`](Self::propose_move), then charge `elapsed` to the
    /// mover's clock.
    pub fn propose_move_timed(
        &mut self,
        text: &str,
        elapsed: Duration,
    ) -> Result<MoveOutcome, EngineError> {
        let mover = self.state.side_to_move;
        let outcome = self.propose_move(text)?;
        if let Some(clock) = self.clock.as_mut() {
            clock.on_move_committed(mover, elapsed);
            if clock.is_expired(mover) {
                debug!(session = %self.id, color = %mover, "clock expired");
            }
        }
        Ok(outcome)
    }

    /// Commit a typed move. It must equal one of the current legal moves.
    pub fn apply(&mut self, mv: Move) -> Result<MoveOutcome, EngineError> {
        self.ensure_mutable()?;
        self.commit(mv)
    }

    /// Propose each move of a comma-separated list in turn, stopping at the
    /// first rejection.
    pub fn play_moves(&mut self, list: &str) -> Result<Vec<MoveOutcome>, ReplayError> {
        san::parse_move_list(list)
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                self.propose_move(text).map_err(|source| ReplayError {
                    index,
                    text: text.to_string(),
                    source,
                })
            })
            .collect()
    }

    // -----------------------------------------------------------------
    // Out-of-band transitions
    // -----------------------------------------------------------------

    /// `color` resigns; the opponent wins.
    pub fn resign(&mut self, color: Color) -> Result<GameResult, EngineError> {
        self.terminate(GameResult::Resigned { winner: !color })
    }

    /// `color` ran out of time; the opponent wins.
    pub fn flag_timeout(&mut self, color: Color) -> Result<GameResult, EngineError> {
        self.terminate(GameResult::TimedOut { winner: !color })
    }

    /// Both players agreed to a draw.
    pub fn agree_draw(&mut self) -> Result<GameResult, EngineError> {
        self.terminate(GameResult::DrawByAgreement)
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn ensure_mutable(&self) -> Result<(), EngineError> {
        if self.corrupted {
            return Err(EngineError::InvariantViolation(format!(
                "session {} is corrupted",
                self.id
            )));
        }
        if self.is_terminated() {
            return Err(EngineError::SessionTerminated {
                result: self.result,
            });
        }
        Ok(())
    }

    fn terminate(&mut self, result: GameResult) -> Result<GameResult, EngineError> {
        self.ensure_mutable()?;
        self.result = result;
        info!(session = %self.id, result = %result, "game over");
        Ok(result)
    }

    /// Apply a legal move, record it and re-evaluate.
    fn commit(&mut self, mv: Move) -> Result<MoveOutcome, EngineError> {
        let next = self.state.apply_move(mv).map_err(|err| {
            warn!(session = %self.id, mv = %mv, error = %err, "move rejected");
            err
        })?;
        let legal = movegen::legal_moves(&self.state);
        let san = san::move_to_san(&self.state, mv, &legal);

        for color in [Color::White, Color::Black] {
            let kings = next.board.count(color, PieceType::King);
            if kings != 1 {
                self.corrupted = true;
                let reason = format!("{color} has {kings} kings after {mv}");
                error!(session = %self.id, mv = %mv, %reason, "invariant violated");
                return Err(EngineError::InvariantViolation(reason));
            }
        }

        self.state = next;
        self.history.push(self.state.signature());
        self.result = rules::evaluate(&self.state, &self.history);

        let snapshot = notation::encode(&self.state);
        self.records.push(MoveRecord {
            mv,
            san: san.clone(),
            snapshot: snapshot.clone(),
            result: self.result,
        });

        debug!(
            session = %self.id,
            mv = %mv,
            san = %san,
            result = %self.result,
            "move committed"
        );
        if self.result.is_terminal() {
            info!(session = %self.id, result = %self.result, "game over");
        }

        Ok(MoveOutcome {
            notation: snapshot,
            result: self.result,
            san,
            mv,
        })
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
