//! An immutable, FEN-identified chess position.
//!
//! `Position` is a thin, cloneable wrapper over `shakmaty::Chess`. Every
//! mutation-looking method (`apply`) returns a brand new `Position` instead
//! of mutating in place, so callers can keep the previous position around
//! for optimistic UI updates or undo.

use crate::error::RulesError;
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Outcome, Position as ShakPosition, Role};
use wall_e_types::{GameResult, Side, UciMove};

#[derive(Clone)]
pub struct Position {
    inner: Chess,
}

impl Position {
    /// The standard chess starting position.
    pub fn start() -> Self {
        Position {
            inner: Chess::default(),
        }
    }

    /// Parse a 6-field FEN string into a position.
    ///
    /// Validated by `shakmaty`'s own parser, which is stricter than the
    /// cheap field-count/rank-count check the gateway runs first at the
    /// wire boundary — this is the authoritative check.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let parsed = Fen::from_ascii(fen.as_bytes()).map_err(|e| RulesError::InvalidFen {
            reason: e.to_string(),
        })?;
        let inner: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidFen {
                reason: e.to_string(),
            })?;
        Ok(Position { inner })
    }

    /// Render this position back to FEN. Round-trips to an identical FEN
    /// for any position reachable via `from_fen`.
    pub fn to_fen(&self) -> String {
        Fen::from_position(self.inner.clone(), EnPassantMode::Legal).to_string()
    }

    pub fn side_to_move(&self) -> Side {
        match self.inner.turn() {
            shakmaty::Color::White => Side::White,
            shakmaty::Color::Black => Side::Black,
        }
    }

    /// All legal moves from this position, in UCI form.
    pub fn legal_moves(&self) -> Vec<UciMove> {
        self.inner
            .legal_moves()
            .iter()
            .map(|m| move_to_uci(m))
            .collect()
    }

    /// Apply a move, returning a new position. Never mutates `self`.
    /// Returns `RulesError::Legality` for any move that isn't in
    /// `legal_moves()`.
    pub fn apply(&self, uci: &UciMove) -> Result<Position, RulesError> {
        let legal = self.inner.legal_moves();
        let chosen = legal
            .iter()
            .find(|m| &move_to_uci(m) == uci)
            .ok_or(RulesError::Legality)?;
        let next = self
            .inner
            .clone()
            .play(chosen)
            .map_err(|_| RulesError::Legality)?;
        Ok(Position { inner: next })
    }

    /// SAN for a legal move in this position.
    pub fn to_san(&self, uci: &UciMove) -> Result<String, RulesError> {
        let legal = self.inner.legal_moves();
        let chosen = legal
            .iter()
            .find(|m| &move_to_uci(m) == uci)
            .ok_or(RulesError::Legality)?;
        Ok(shakmaty::san::San::from_move(&self.inner, chosen).to_string())
    }

    /// Resolve a UCI string to a move and apply it in one step.
    pub fn apply_uci_str(&self, uci: &str) -> Result<Position, RulesError> {
        let mv = UciMove::parse(uci).map_err(|_| RulesError::MalformedUci)?;
        self.apply(&mv)
    }

    pub fn is_check(&self) -> bool {
        self.inner.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.inner.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.inner.is_stalemate()
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.inner.is_insufficient_material()
    }

    pub fn is_terminal(&self) -> bool {
        self.inner.is_game_over()
    }

    /// Final result for a terminal position, `Ongoing` otherwise.
    pub fn game_result(&self) -> GameResult {
        match self.inner.outcome() {
            Some(Outcome::Decisive { winner }) => match winner {
                shakmaty::Color::White => GameResult::WhiteWins,
                shakmaty::Color::Black => GameResult::BlackWins,
            },
            Some(Outcome::Draw) => {
                if self.inner.is_stalemate() {
                    GameResult::Stalemate
                } else {
                    GameResult::Draw
                }
            }
            None => GameResult::Ongoing,
        }
    }

    /// Material balance in centipawns from White's perspective, derived
    /// from the FEN piece-placement field. Lets the tactical micro-engine
    /// and evaluation function share one source of truth instead of each
    /// walking their own board representation.
    pub fn material_balance(&self) -> i32 {
        let placement = self.to_fen();
        let placement = placement.split(' ').next().unwrap_or_default();
        placement.chars().map(piece_value).sum()
    }

    pub(crate) fn inner(&self) -> &Chess {
        &self.inner
    }
}

fn piece_value(c: char) -> i32 {
    let value = match c.to_ascii_lowercase() {
        'p' => 100,
        'n' | 'b' => 300,
        'r' => 500,
        'q' => 900,
        _ => 0,
    };
    if c.is_ascii_uppercase() {
        value
    } else {
        -value
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

pub(crate) fn move_to_uci(m: &shakmaty::Move) -> UciMove {
    let from = m
        .from()
        .map(|sq| sq.to_string())
        .unwrap_or_else(|| "@@".to_string());
    let mut s = format!("{from}{}", m.to());
    if let Some(role) = m.promotion() {
        s.push(role_to_uci_char(role));
    }
    // `Move`s generated by shakmaty's own legal_moves() are always encodable
    // as UCI; a panic here indicates an adapter bug, not bad external input.
    UciMove::parse(&s).expect("shakmaty move must encode to valid UCI")
}

fn role_to_uci_char(role: Role) -> char {
    match role {
        Role::Queen => 'q',
        Role::Rook => 'r',
        Role::Bishop => 'b',
        Role::Knight => 'n',
        _ => ' ',
    }
}
