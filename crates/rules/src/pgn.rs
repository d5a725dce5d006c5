//! PGN movetext rendering and best-effort parsing. Parsing never errors —
//! tokens it can't resolve to a legal move are dropped by the caller.

use crate::position::{move_to_uci, Position};
use shakmaty::Position as ShakPosition;
use wall_e_types::{GameResult, UciMove};

pub fn render(sans: &[String], result: GameResult) -> String {
    let mut out = String::new();
    for (i, san) in sans.iter().enumerate() {
        if i % 2 == 0 {
            out.push_str(&format!("{}. ", i / 2 + 1));
        }
        out.push_str(san);
        out.push(' ');
    }
    out.push_str(result_tag(result));
    out.trim_end().to_string()
}

fn result_tag(result: GameResult) -> &'static str {
    match result {
        GameResult::WhiteWins => "1-0",
        GameResult::BlackWins => "0-1",
        GameResult::Draw | GameResult::Stalemate => "1/2-1/2",
        GameResult::Ongoing => "*",
    }
}

/// Split PGN movetext into SAN-ish tokens, discarding move numbers,
/// comments and result tags. Deliberately forgiving: unrecognized tokens
/// are simply skipped by the caller rather than causing a parse error.
pub fn move_tokens(pgn: &str) -> Vec<&str> {
    pgn.split_whitespace()
        .filter(|tok| {
            let trimmed = tok.trim_end_matches(|c: char| c == '.');
            !trimmed.is_empty()
                && !trimmed.chars().all(|c| c.is_ascii_digit())
                && !matches!(*tok, "1-0" | "0-1" | "1/2-1/2" | "*")
        })
        .map(|tok| tok.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.'))
        .filter(|tok| !tok.is_empty())
        .collect()
}

/// Resolve one SAN token against the current position. Returns `None`
/// instead of an error on anything unparseable, matching the best-effort
/// contract above.
pub fn resolve_san(position: &Position, token: &str) -> Option<UciMove> {
    let san: shakmaty::san::San = token.parse().ok()?;
    let mv = san.to_move(position.inner()).ok()?;
    Some(move_to_uci(&mv))
}
