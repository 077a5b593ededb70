use cozy_chess::{Board, Color, GameStatus, Move, Piece};

use crate::san::{format_san, parse_san, SanError};
use crate::uci::{convert_cozy_castling_to_uci, format_uci_move};

/// Main game state wrapper around cozy-chess Board
#[derive(Debug, Clone)]
pub struct Game {
    position: Board,
    history: Vec<HistoryEntry>,
    start_position: StartPosition,
}

/// One applied move together with what it looked like when played
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub mv: Move,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub san: String, // Standard Algebraic Notation
    pub uci: String, // Standard UCI, castling as e1g1
    pub fen: String, // FEN after this move
}

/// Starting position of the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartPosition {
    Standard,
    Fen(String),
}

impl Game {
    /// Create a new game from the standard starting position
    pub fn new() -> Self {
        Self {
            position: Board::default(),
            history: Vec::new(),
            start_position: StartPosition::Standard,
        }
    }

    /// Create a game from a FEN string
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let position = crate::fen::parse_fen(fen)?;
        Ok(Self {
            position,
            history: Vec::new(),
            start_position: StartPosition::Fen(fen.trim().to_string()),
        })
    }

    /// Get the current board position
    pub fn position(&self) -> &Board {
        &self.position
    }

    /// Get the move history
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn start_position(&self) -> &StartPosition {
        &self.start_position
    }

    /// Make a move on the board
    pub fn make_move(&mut self, mv: Move) -> Result<&HistoryEntry, GameError> {
        if !self.position.is_legal(mv) {
            return Err(GameError::IllegalMove(format_uci_move(mv)));
        }

        let piece = self
            .position
            .piece_on(mv.from)
            .ok_or_else(|| GameError::IllegalMove(format_uci_move(mv)))?;
        let captured = if crate::uci::is_castle(&self.position, mv) {
            None
        } else {
            self.position.piece_on(mv.to)
        };

        // Notation is relative to the position before the move
        let san = format_san(&self.position, mv);
        let uci = format_uci_move(convert_cozy_castling_to_uci(&self.position, mv));

        self.position.play_unchecked(mv);

        self.history.push(HistoryEntry {
            mv,
            piece,
            captured,
            san,
            uci,
            fen: self.to_fen(),
        });

        Ok(&self.history[self.history.len() - 1])
    }

    /// Resolve a SAN string against the current position and play it.
    pub fn make_san_move(&mut self, san: &str) -> Result<&HistoryEntry, GameError> {
        let mv = parse_san(&self.position, san)?;
        self.make_move(mv)
    }

    /// Play a SAN move on a copy of this game, leaving `self` untouched.
    pub fn apply_san(&self, san: &str) -> Result<Game, GameError> {
        let mut next = self.clone();
        next.make_san_move(san)?;
        Ok(next)
    }

    /// Play a move given in standard UCI notation (castling as e1g1).
    pub fn make_uci_move(&mut self, uci: &str) -> Result<&HistoryEntry, GameError> {
        let mv: Move = crate::parse_uci_move(uci)
            .ok_or_else(|| GameError::IllegalMove(uci.to_string()))?;
        let mv = crate::uci::convert_uci_castling_to_cozy(&self.position, mv);
        self.make_move(mv)
    }

    /// Fold the oldest plies into the start position so that at most
    /// `max_plies` history entries remain.
    pub fn trim_history(&mut self, max_plies: usize) {
        if self.history.len() <= max_plies {
            return;
        }
        let excess = self.history.len() - max_plies;
        let anchor = self.history[excess - 1].fen.clone();
        self.history.drain(..excess);
        self.start_position = StartPosition::Fen(anchor);
    }

    /// Get all legal moves for the current position
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.position.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    /// Get the current game status
    pub fn status(&self) -> GameStatus {
        self.position.status()
    }

    /// Get the side to move
    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    /// Export position to FEN string
    pub fn to_fen(&self) -> String {
        crate::fen::format_fen(&self.position)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{0}")]
    InvalidMove(#[from] SanError),
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("FEN parse error: {0}")]
    FenError(#[from] crate::fen::FenError),
}
