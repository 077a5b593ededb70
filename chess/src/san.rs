//! Standard Algebraic Notation (SAN) parsing and formatting.
//!
//! Parsing never decides legality on its own: the text is reduced to a
//! pattern (piece, optional origin file/rank, target, promotion) and matched
//! against the legal moves cozy-chess generates for the position.

use cozy_chess::{Board, File, GameStatus, Move, Piece, Rank, Square};

use crate::converters::{file_to_char, parse_file, parse_piece, parse_rank, parse_square};
use crate::uci::is_castle;

/// Parse Standard Algebraic Notation (SAN) move
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let text = san
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    if text.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let candidates: Vec<Move> = match text {
        "O-O" | "0-0" => castling_moves(board, true),
        "O-O-O" | "0-0-0" => castling_moves(board, false),
        _ => {
            let pattern = SanPattern::parse(text)?;
            legal_moves(board)
                .into_iter()
                .filter(|mv| pattern.matches(board, *mv))
                .collect()
        }
    };

    match candidates.as_slice() {
        [] => Err(SanError::NoLegalMove(san.trim().to_string())),
        [mv] => Ok(*mv),
        _ => Err(SanError::AmbiguousMove(san.trim().to_string())),
    }
}

/// Format a legal move as SAN, with disambiguation and check/mate suffix.
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = String::new();

    if is_castle(board, mv) {
        let short = mv.to.file() as u8 > mv.from.file() as u8;
        san.push_str(if short { "O-O" } else { "O-O-O" });
    } else {
        let Some(piece) = board.piece_on(mv.from) else {
            return crate::uci::format_uci_move(mv);
        };
        let capture = board.piece_on(mv.to).is_some()
            || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

        if piece == Piece::Pawn {
            if capture {
                san.push(file_to_char(mv.from.file()));
            }
        } else {
            san.push(piece_letter(piece));
            san.push_str(&disambiguation(board, mv, piece));
        }

        if capture {
            san.push('x');
        }
        san.push_str(&crate::converters::format_square(mv.to));

        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(piece_letter(promo));
        }
    }

    let mut after = board.clone();
    if after.try_play(mv).is_ok() {
        if after.status() == GameStatus::Won {
            san.push('#');
        } else if !after.checkers().is_empty() {
            san.push('+');
        }
    }

    san
}

/// Reduced form of a non-castling SAN string.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SanPattern {
    piece: Piece,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<Piece>,
}

impl SanPattern {
    fn parse(text: &str) -> Result<Self, SanError> {
        let invalid = || SanError::InvalidFormat(text.to_string());

        let (body, promotion) = split_promotion(text)?;

        let mut chars: Vec<char> = body.chars().collect();
        let piece = match chars.first() {
            Some(&c) if c.is_ascii_uppercase() => {
                let piece = parse_piece(c).ok_or_else(invalid)?;
                if piece == Piece::Pawn {
                    return Err(invalid());
                }
                chars.remove(0);
                piece
            }
            Some(_) => Piece::Pawn,
            None => return Err(invalid()),
        };

        if promotion.is_some() && piece != Piece::Pawn {
            return Err(SanError::InvalidPromotion(text.to_string()));
        }

        if chars.len() < 2 {
            return Err(invalid());
        }
        let target: String = chars[chars.len() - 2..].iter().collect();
        let to = parse_square(&target).ok_or_else(|| SanError::InvalidSquare(target.clone()))?;

        let mut from_file = None;
        let mut from_rank = None;
        for &c in &chars[..chars.len() - 2] {
            if c == 'x' || c == ':' || c == '-' {
                continue;
            }
            if let Some(file) = parse_file(c) {
                if from_file.replace(file).is_some() {
                    return Err(invalid());
                }
            } else if let Some(rank) = parse_rank(c) {
                if from_rank.replace(rank).is_some() {
                    return Err(invalid());
                }
            } else {
                return Err(invalid());
            }
        }

        Ok(Self {
            piece,
            from_file,
            from_rank,
            to,
            promotion,
        })
    }

    fn matches(&self, board: &Board, mv: Move) -> bool {
        if mv.to != self.to || mv.promotion != self.promotion {
            return false;
        }
        if board.piece_on(mv.from) != Some(self.piece) || is_castle(board, mv) {
            return false;
        }
        if let Some(file) = self.from_file {
            if mv.from.file() != file {
                return false;
            }
        } else if self.piece == Piece::Pawn && mv.from.file() != mv.to.file() {
            // A pawn capture must name its origin file
            return false;
        }
        if let Some(rank) = self.from_rank {
            if mv.from.rank() != rank {
                return false;
            }
        }
        true
    }
}

fn split_promotion(text: &str) -> Result<(&str, Option<Piece>), SanError> {
    if let Some((body, promo)) = text.split_once('=') {
        let mut promo_chars = promo.chars();
        let piece = match (promo_chars.next(), promo_chars.next()) {
            (Some(c), None) => parse_piece(c),
            _ => None,
        };
        return match piece {
            Some(p) if is_promotion_piece(p) => Ok((body, Some(p))),
            _ => Err(SanError::InvalidPromotion(text.to_string())),
        };
    }

    // "e8Q" without the '='
    let mut chars = text.chars();
    if let (Some(last), Some(before)) = (chars.next_back(), chars.next_back()) {
        if before.is_ascii_digit() && last.is_ascii_uppercase() {
            let piece = parse_piece(last)
                .filter(|p| is_promotion_piece(*p))
                .ok_or_else(|| SanError::InvalidPromotion(text.to_string()))?;
            return Ok((&text[..text.len() - 1], Some(piece)));
        }
    }

    Ok((text, None))
}

fn is_promotion_piece(piece: Piece) -> bool {
    matches!(
        piece,
        Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen
    )
}

fn castling_moves(board: &Board, short: bool) -> Vec<Move> {
    legal_moves(board)
        .into_iter()
        .filter(|mv| is_castle(board, *mv))
        .filter(|mv| (mv.to.file() as u8 > mv.from.file() as u8) == short)
        .collect()
}

fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let rivals: Vec<Square> = legal_moves(board)
        .into_iter()
        .filter(|other| {
            other.to == mv.to
                && other.from != mv.from
                && board.piece_on(other.from) == Some(piece)
                && !is_castle(board, *other)
        })
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let from = crate::converters::format_square(mv.from);
    if rivals.iter().all(|sq| sq.file() != mv.from.file()) {
        from[..1].to_string()
    } else if rivals.iter().all(|sq| sq.rank() != mv.from.rank()) {
        from[1..].to_string()
    } else {
        from
    }
}

fn piece_letter(piece: Piece) -> char {
    crate::converters::format_piece(piece).to_ascii_uppercase()
}

fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

#[derive(Debug, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::format_uci_move;

    fn board(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    fn uci(board: &Board, san: &str) -> String {
        format_uci_move(parse_san(board, san).unwrap())
    }

    #[test]
    fn test_pawn_push_and_double_push() {
        let b = Board::default();
        assert_eq!(uci(&b, "e4"), "e2e4");
        assert_eq!(uci(&b, "e3"), "e2e3");
    }

    #[test]
    fn test_pawn_cannot_reach_e5() {
        let b = Board::default();
        assert!(matches!(parse_san(&b, "e5"), Err(SanError::NoLegalMove(_))));
    }

    #[test]
    fn test_knight_move_with_suffixes() {
        let b = Board::default();
        assert_eq!(uci(&b, "Nf3"), "g1f3");
        assert_eq!(uci(&b, "Nf3+"), "g1f3");
        assert_eq!(uci(&b, "Nc3!?"), "b1c3");
    }

    #[test]
    fn test_pawn_capture_requires_file() {
        let b = board("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        assert_eq!(uci(&b, "exd5"), "e4d5");
        assert_eq!(uci(&b, "ed5"), "e4d5");
        assert!(parse_san(&b, "d5").is_err());
    }

    #[test]
    fn test_en_passant() {
        let b = board("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        assert_eq!(uci(&b, "exf6"), "e5f6");
    }

    #[test]
    fn test_disambiguation_by_file_and_rank() {
        // Knights on b1 and f1 can both reach d2
        let b = board("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1");
        assert!(matches!(
            parse_san(&b, "Nd2"),
            Err(SanError::AmbiguousMove(_))
        ));
        assert_eq!(uci(&b, "Nbd2"), "b1d2");
        assert_eq!(uci(&b, "Nfd2"), "f1d2");

        // Rooks on a1 and a5 can both reach a3
        let b = board("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1");
        assert_eq!(uci(&b, "R1a3"), "a1a3");
        assert_eq!(uci(&b, "R5a3"), "a5a3");
    }

    #[test]
    fn test_castling() {
        let b = board("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let short = parse_san(&b, "O-O").unwrap();
        let long = parse_san(&b, "0-0-0").unwrap();
        assert!(is_castle(&b, short));
        assert!(is_castle(&b, long));
        assert_eq!(format_san(&b, short), "O-O");
        assert_eq!(format_san(&b, long), "O-O-O");
    }

    #[test]
    fn test_castling_unavailable() {
        let b = Board::default();
        assert!(matches!(parse_san(&b, "O-O"), Err(SanError::NoLegalMove(_))));
    }

    #[test]
    fn test_promotion() {
        let b = board("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        assert_eq!(uci(&b, "e8=Q"), "e7e8q");
        assert_eq!(uci(&b, "e8N"), "e7e8n");
        assert!(matches!(
            parse_san(&b, "e8=K"),
            Err(SanError::InvalidPromotion(_))
        ));
        // Promotion piece is mandatory on the last rank
        assert!(parse_san(&b, "e8").is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let b = Board::default();
        assert!(matches!(parse_san(&b, ""), Err(SanError::InvalidFormat(_))));
        assert!(parse_san(&b, "hello").is_err());
        assert!(parse_san(&b, "Zf3").is_err());
        assert!(parse_san(&b, "Pe4").is_err());
    }

    #[test]
    fn test_format_san_basic() {
        let b = Board::default();
        let mv = parse_san(&b, "Nf3").unwrap();
        assert_eq!(format_san(&b, mv), "Nf3");
        let mv = parse_san(&b, "e4").unwrap();
        assert_eq!(format_san(&b, mv), "e4");
    }

    #[test]
    fn test_format_san_check_and_mate() {
        // Fool's mate: 1. f3 e5 2. g4 Qh4#
        let b = board("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2");
        let mv = parse_san(&b, "Qh4").unwrap();
        assert_eq!(format_san(&b, mv), "Qh4#");

        let b = board("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let mv = parse_san(&b, "Ra8").unwrap();
        assert_eq!(format_san(&b, mv), "Ra8+");
    }

    #[test]
    fn test_format_san_disambiguates() {
        let b = board("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1");
        let mv = parse_san(&b, "Nbd2").unwrap();
        assert_eq!(format_san(&b, mv), "Nbd2");
    }
}
