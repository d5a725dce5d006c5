//! Shared wire types for the Wall-E chess opponent & coach.
//!
//! Every crate in the workspace that crosses a process or serialization
//! boundary depends on this crate instead of each other, so the dependency
//! graph between `engine`, `edge`, `telemetry`, `learning` and `storage`
//! stays acyclic — they reference each other's records by ID, never by
//! pointer.

mod envelope;
mod error_code;
mod ids;
mod uci;

pub use envelope::ErrorEnvelope;
pub use error_code::ErrorCode;
pub use ids::{GameId, RequestId, SignatureId, TrainingGameId, UserId};
pub use uci::UciMove;

/// Side to move / piece color, shared across rules, engine and telemetry
/// crates so none of them needs to depend on `shakmaty` just to say "white".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Side::White => "white",
            Side::Black => "black",
        })
    }
}

/// The CPU strength dial, 1..=8 inclusive. A newtype rather than a bare
/// `u8` so an out-of-range level is caught at the API boundary instead of
/// inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Level(u8);

impl Level {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(value: u8) -> Result<Self, ErrorCode> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Level(value))
        } else {
            Err(ErrorCode::InvalidRequest)
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Outcome of a finished or in-progress game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Stalemate,
    Ongoing,
}
