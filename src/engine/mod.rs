pub mod attacks;
pub mod board;
pub mod clock;
pub mod error;
pub mod movegen;
pub mod notation;
pub mod pgn;
pub mod rules;
pub mod san;
pub mod session;
pub mod state;
pub mod types;

pub use board::Board;
pub use clock::Clock;
pub use error::{EngineError, NotationError, NotationField, ReplayError};
pub use movegen::{legal_moves, legal_moves_from, perft};
pub use rules::PositionHistory;
pub use session::{GameSession, MoveOutcome, MoveRecord};
pub use state::{GameState, PositionSignature};
pub use types::*;
