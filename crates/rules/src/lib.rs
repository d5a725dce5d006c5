//! The sole authority on chess legality in this workspace. Wraps `shakmaty`
//! so no other crate re-implements move generation or check detection.

mod error;
mod game;
mod pgn;
mod position;

pub use error::RulesError;
pub use game::Game;
pub use position::Position;

#[cfg(test)]
mod tests {
    use super::*;
    use wall_e_types::{GameResult, Side, UciMove};

    #[test]
    fn starting_position_round_trips_fen() {
        let pos = Position::start();
        let fen = pos.to_fen();
        let reparsed = Position::from_fen(&fen).unwrap();
        assert_eq!(fen, reparsed.to_fen());
    }

    #[test]
    fn starting_position_has_twenty_legal_moves() {
        let pos = Position::start();
        assert_eq!(pos.legal_moves().len(), 20);
    }

    #[test]
    fn white_moves_first() {
        assert_eq!(Position::start().side_to_move(), Side::White);
    }

    #[test]
    fn illegal_move_is_rejected() {
        let pos = Position::start();
        let bad = UciMove::parse("e2e5").unwrap();
        assert!(matches!(pos.apply(&bad), Err(RulesError::Legality)));
    }

    #[test]
    fn legal_pawn_push_flips_side_to_move() {
        let pos = Position::start();
        let mv = UciMove::parse("e2e4").unwrap();
        let next = pos.apply(&mv).unwrap();
        assert_eq!(next.side_to_move(), Side::Black);
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut game = Game::new();
        for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.make_move(UciMove::parse(mv).unwrap()).unwrap();
        }
        assert!(game.current().is_checkmate());
        assert_eq!(game.result(), GameResult::BlackWins);
    }

    #[test]
    fn pgn_round_trips_through_best_effort_parser() {
        let mut game = Game::new();
        for mv in ["e2e4", "e7e5", "g1f3"] {
            game.make_move(UciMove::parse(mv).unwrap()).unwrap();
        }
        let pgn = game.to_pgn();
        let replayed = Game::from_pgn_best_effort(&pgn);
        assert_eq!(replayed.moves().len(), 3);
        assert_eq!(replayed.current().to_fen(), game.current().to_fen());
    }

    #[test]
    fn position_history_grows_by_exactly_one_per_move() {
        let mut game = Game::new();
        assert_eq!(game.moves().len(), 0);
        game.make_move(UciMove::parse("e2e4").unwrap()).unwrap();
        assert_eq!(game.moves().len(), 1);
        game.make_move(UciMove::parse("e7e5").unwrap()).unwrap();
        assert_eq!(game.moves().len(), 2);
    }
}
