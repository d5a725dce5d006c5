use thiserror::Error;

/// Errors this crate can surface. As the sole authority on legality, every
/// other component treats these as terminal, not something to retry or
/// reinterpret.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("fen does not describe a valid position: {reason}")]
    InvalidFen { reason: String },

    #[error("move is not legal in this position")]
    Legality,

    #[error("uci string is malformed")]
    MalformedUci,

    #[error("san string could not be parsed in this position")]
    MalformedSan,
}
