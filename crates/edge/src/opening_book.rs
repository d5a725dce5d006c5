//! A deliberately tiny opening book: a handful of named lines keyed by exact
//! FEN, just deep enough to steer the first couple of plies away from
//! random-looking development without pretending to be a real book engine.

use std::sync::OnceLock;
use std::collections::HashMap;
use wall_e_rules::Position;
use wall_e_types::UciMove;

const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

struct BookEntry {
    fen: &'static str,
    reply: &'static str,
    line: &'static str,
}

/// Six named openings, identified only well enough to pick White's first
/// reply to each of Black's common first moves (plus White's own opener).
const BOOK: &[BookEntry] = &[
    BookEntry {
        fen: STARTING_FEN,
        reply: "e2e4",
        line: "king's pawn opening",
    },
    BookEntry {
        fen: "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
        reply: "g1f3",
        line: "italian / ruy lopez setup",
    },
    BookEntry {
        fen: "rnbqkbnr/pppp1ppp/4p3/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
        reply: "d2d4",
        line: "french defense",
    },
    BookEntry {
        fen: "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
        reply: "g1f3",
        line: "sicilian defense",
    },
    BookEntry {
        fen: "rnbqkbnr/ppp1pppp/8/3p4/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 2",
        reply: "c2c4",
        line: "queen's gambit",
    },
    BookEntry {
        fen: "rnbqkb1r/pppppppp/5n2/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 2 2",
        reply: "c2c4",
        line: "english / indian systems",
    },
];

fn index() -> &'static HashMap<&'static str, (&'static str, &'static str)> {
    static INDEX: OnceLock<HashMap<&'static str, (&'static str, &'static str)>> = OnceLock::new();
    INDEX.get_or_init(|| {
        BOOK.iter()
            .map(|entry| (entry.fen, (entry.reply, entry.line)))
            .collect()
    })
}

/// A book move for this exact position, if one is known. Returns `None` for
/// anything outside the handful of lines above, including the same line
/// reached by transposition through a different move order.
pub fn lookup(position: &Position) -> Option<(UciMove, &'static str)> {
    let (reply, line) = index().get(position.to_fen().as_str())?;
    UciMove::parse(reply).ok().map(|mv| (mv, *line))
}
