//! HTTP backend for the chess web client.
//!
//! Moves submitted by the player are checked against the game carried in a
//! signed cookie; engine replies come from a Stockfish process started per
//! request.

pub mod api;
pub mod codec;
pub mod config;
pub mod routes;
pub mod state;

pub use codec::{CodecError, SessionCodec, GAME_COOKIE, MAX_HISTORY_PLIES};
pub use config::{ConfigError, ServerConfig};
pub use routes::create_app;
pub use state::AppState;
