pub mod converters;
pub mod fen;
pub mod game;
pub mod san;
pub mod uci;

pub use converters::*;
pub use fen::{format_fen, parse_fen, FenError, STARTING_FEN};
pub use game::{Game, GameError, HistoryEntry, StartPosition};
pub use san::{format_san, parse_san, SanError};
pub use uci::{
    convert_cozy_castling_to_uci, convert_uci_castling_to_cozy, format_uci_move, parse_uci_move,
};
