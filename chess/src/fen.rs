use cozy_chess::Board;

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN string into a Board
///
/// The halfmove clock and fullmove number may be left off; they default to
/// `0` and `1`.
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let full = match fields.len() {
        0 => return Err(FenError::Empty),
        1..=3 => return Err(FenError::MissingFields),
        4 => format!("{} 0 1", fields.join(" ")),
        5 => format!("{} 1", fields.join(" ")),
        6 => fields.join(" "),
        _ => return Err(FenError::InvalidFormat),
    };

    full.parse().map_err(|_| FenError::InvalidFormat)
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum FenError {
    #[error("Empty FEN string")]
    Empty,
    #[error("FEN is missing required fields")]
    MissingFields,
    #[error("Invalid FEN format")]
    InvalidFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_fen_roundtrip() {
        let board = parse_fen(STARTING_FEN).unwrap();
        assert_eq!(format_fen(&board), STARTING_FEN);
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(parse_fen("   "), Err(FenError::Empty)));
    }

    #[test]
    fn test_rejects_truncated() {
        assert!(matches!(
            parse_fen("rnbqkbnr/pppppppp/8/8"),
            Err(FenError::MissingFields)
        ));
    }

    #[test]
    fn test_move_counters_are_optional() {
        let four = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").unwrap();
        assert_eq!(format_fen(&four), STARTING_FEN);
        let five = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0").unwrap();
        assert_eq!(format_fen(&five), STARTING_FEN);
    }

    #[test]
    fn test_rejects_extra_fields() {
        assert!(matches!(
            parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 extra"),
            Err(FenError::InvalidFormat)
        ));
    }

    #[test]
    fn test_rejects_bad_placement() {
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1").is_err());
    }
}
