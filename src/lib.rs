//! Chess rules engine shared by the game server, bot players and front-ends.
//!
//! Everything interesting lives in [`engine`]: board representation, legal
//! move generation, termination detection and the FEN/SAN text interchange.
//! Each [`engine::GameSession`] is an independent, single-threaded value;
//! callers that run many games in parallel simply own one session per task.

pub mod config;
pub mod engine;
