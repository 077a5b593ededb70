//! UCI (Universal Chess Interface) utilities

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::converters::{format_piece, format_square, parse_piece, parse_square};

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI uses standard notation (king moves 2 squares): e1g1, e1c1, e8g8, e8c8
/// cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8
///
/// Only a king move is rewritten, and only when the king-to-rook form is
/// legal on `board`. A rook or queen going e1-g1 is left alone.
pub fn convert_uci_castling_to_cozy(board: &Board, mv: Move) -> Move {
    if board.piece_on(mv.from) != Some(Piece::King) || mv.promotion.is_some() {
        return mv;
    }
    if mv.from.file() != File::E || !matches!(mv.from.rank(), Rank::First | Rank::Eighth) {
        return mv;
    }

    let rook_file = match mv.to.file() {
        File::G => File::H,
        File::C => File::A,
        _ => return mv,
    };
    if mv.to.rank() != mv.from.rank() {
        return mv;
    }

    let converted = Move {
        from: mv.from,
        to: Square::new(rook_file, mv.from.rank()),
        promotion: None,
    };
    if board.is_legal(converted) {
        converted
    } else {
        mv
    }
}

/// Convert a cozy_chess castling move (king takes own rook) back to the
/// standard UCI form where the king lands on the g- or c-file.
///
/// Non-castling moves are returned unchanged.
pub fn convert_cozy_castling_to_uci(board: &Board, mv: Move) -> Move {
    if !is_castle(board, mv) {
        return mv;
    }
    let file = if mv.to.file() as u8 > mv.from.file() as u8 {
        File::G
    } else {
        File::C
    };
    Move {
        from: mv.from,
        to: Square::new(file, mv.from.rank()),
        promotion: None,
    }
}

/// True if `mv` is a castling move in cozy_chess notation on `board`.
pub fn is_castle(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move())
}

/// Parse a UCI move string ("e2e4", "e7e8q"). Castling stays in whatever
/// form it was given; see [`convert_uci_castling_to_cozy`].
pub fn parse_uci_move(s: &str) -> Option<Move> {
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return None;
    }
    let from = parse_square(&s[0..2])?;
    let to = parse_square(&s[2..4])?;
    let promotion = match s[4..].chars().next() {
        Some(c) => Some(parse_piece(c).filter(|p| !matches!(p, Piece::Pawn | Piece::King))?),
        None => None,
    };
    Some(Move {
        from,
        to,
        promotion,
    })
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q")
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uci_move() {
        let mv = Move {
            from: Square::new(File::E, Rank::Second),
            to: Square::new(File::E, Rank::Fourth),
            promotion: None,
        };
        assert_eq!(format_uci_move(mv), "e2e4");
    }

    #[test]
    fn test_format_uci_move_with_promotion() {
        let mv = Move {
            from: Square::new(File::E, Rank::Seventh),
            to: Square::new(File::E, Rank::Eighth),
            promotion: Some(Piece::Queen),
        };
        assert_eq!(format_uci_move(mv), "e7e8q");
    }

    #[test]
    fn test_parse_uci_move() {
        let mv = parse_uci_move("e7e8q").unwrap();
        assert_eq!(mv.promotion, Some(Piece::Queen));
        assert_eq!(format_uci_move(mv), "e7e8q");
        assert!(parse_uci_move("e7e8k").is_none());
        assert!(parse_uci_move("e2").is_none());
        assert!(parse_uci_move("(none)").is_none());
    }

    #[test]
    fn test_castling_conversion_both_ways() {
        let board: Board = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();

        let uci = Move {
            from: Square::new(File::E, Rank::First),
            to: Square::new(File::G, Rank::First),
            promotion: None,
        };
        let cozy = convert_uci_castling_to_cozy(&board, uci);
        assert_eq!(cozy.to, Square::new(File::H, Rank::First));
        assert!(is_castle(&board, cozy));
        assert_eq!(convert_cozy_castling_to_uci(&board, cozy), uci);
    }

    #[test]
    fn test_rook_on_e_file_is_not_castling() {
        // Rook on e1, king on h1: e1c1 and e1g1 are plain rook moves
        let board: Board = "4r2k/8/8/8/8/8/8/4R2K w - - 0 1".parse().unwrap();
        for to in [File::C, File::G] {
            let mv = Move {
                from: Square::new(File::E, Rank::First),
                to: Square::new(to, Rank::First),
                promotion: None,
            };
            assert!(board.is_legal(mv));
            assert_eq!(convert_uci_castling_to_cozy(&board, mv), mv);
        }
    }

    #[test]
    fn test_non_castling_king_move_untouched() {
        let board: Board = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let mv = Move {
            from: Square::new(File::E, Rank::First),
            to: Square::new(File::F, Rank::First),
            promotion: None,
        };
        assert!(!is_castle(&board, mv));
        assert_eq!(convert_cozy_castling_to_uci(&board, mv), mv);
    }
}
