//! Property tests: every legal move formats to SAN that parses back to the
//! same move, along random playouts from the starting position.

use chess::{format_san, parse_san, Game};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn san_roundtrips_along_random_games(choices in prop::collection::vec(any::<prop::sample::Index>(), 1..60)) {
        let mut game = Game::new();
        for choice in choices {
            let moves = game.legal_moves();
            if moves.is_empty() {
                break;
            }
            for mv in &moves {
                let san = format_san(game.position(), *mv);
                let parsed = parse_san(game.position(), &san);
                prop_assert!(parsed.is_ok(), "{} failed to parse in {}", san, game.to_fen());
                prop_assert_eq!(parsed.unwrap(), *mv);
            }
            let mv = moves[choice.index(moves.len())];
            game.make_move(mv).unwrap();
        }
    }
}
