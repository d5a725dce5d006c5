use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated UCI move string, e.g. `e2e4` or `e7e8q`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UciMove(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid UCI move")]
pub struct InvalidUci(());

impl UciMove {
    pub fn parse(s: &str) -> Result<Self, InvalidUci> {
        if is_valid_uci(s) {
            Ok(UciMove(s.to_string()))
        } else {
            Err(InvalidUci(()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_square(&self) -> &str {
        &self.0[0..2]
    }

    pub fn to_square(&self) -> &str {
        &self.0[2..4]
    }

    pub fn promotion(&self) -> Option<char> {
        self.0.chars().nth(4)
    }
}

fn is_valid_uci(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 4 && bytes.len() != 5 {
        return false;
    }
    let file_ok = |b: u8| (b'a'..=b'h').contains(&b);
    let rank_ok = |b: u8| (b'1'..=b'8').contains(&b);
    if !(file_ok(bytes[0]) && rank_ok(bytes[1]) && file_ok(bytes[2]) && rank_ok(bytes[3])) {
        return false;
    }
    if bytes.len() == 5 {
        matches!(bytes[4], b'q' | b'r' | b'b' | b'n')
    } else {
        true
    }
}

impl TryFrom<String> for UciMove {
    type Error = InvalidUci;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UciMove::parse(&value)
    }
}

impl From<UciMove> for String {
    fn from(value: UciMove) -> Self {
        value.0
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_move() {
        assert!(UciMove::parse("e2e4").is_ok());
    }

    #[test]
    fn accepts_promotion() {
        assert!(UciMove::parse("e7e8q").is_ok());
    }

    #[test]
    fn rejects_bad_file() {
        assert!(UciMove::parse("i2e4").is_err());
    }

    #[test]
    fn rejects_bad_promotion_piece() {
        assert!(UciMove::parse("e7e8k").is_err());
    }

    #[test]
    fn rejects_short_string() {
        assert!(UciMove::parse("e2e").is_err());
    }
}
