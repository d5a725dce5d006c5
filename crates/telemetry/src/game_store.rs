//! Application-level state for one game in progress: current game, selected
//! level, last error, last AI response summary, chat log, and persistent
//! diagnostics log. Split deliberately: `level` is meant to persist across
//! sessions for a user, `current_game` is not — callers own that decision,
//! this struct just models the shape.

use crate::record::CpuTelemetryRecord;
use chrono::{DateTime, Utc};
use wall_e_rules::Game;
use wall_e_types::Level;

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub from_user: bool,
    pub text: String,
    pub at: DateTime<Utc>,
}

pub struct GameStore {
    pub current_game: Option<Game>,
    pub selected_level: Level,
    pub last_error: Option<String>,
    pub last_ai_response: Option<CpuTelemetryRecord>,
    pub chat: Vec<ChatMessage>,
    pub logs: Vec<CpuTelemetryRecord>,
    board_version: u64,
}

impl GameStore {
    pub fn new(selected_level: Level) -> Self {
        GameStore {
            current_game: None,
            selected_level,
            last_error: None,
            last_ai_response: None,
            chat: Vec::new(),
            logs: Vec::new(),
            board_version: 0,
        }
    }

    pub fn board_version(&self) -> u64 {
        self.board_version
    }

    /// Start a fresh game, clearing everything that doesn't survive a
    /// `newGame` command. `selected_level` is untouched.
    pub fn new_game(&mut self) {
        self.current_game = Some(Game::new());
        self.last_error = None;
        self.last_ai_response = None;
        self.board_version = 0;
    }

    /// Record a successfully committed move and bump `board_version`. The
    /// caller has already applied the move to `current_game`.
    pub fn commit_move(&mut self) {
        self.board_version += 1;
    }

    pub fn record_ai_telemetry(&mut self, record: CpuTelemetryRecord) {
        self.last_ai_response = Some(record.clone());
        self.logs.push(record);
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_resets_board_version() {
        let mut store = GameStore::new(Level::new(5).unwrap());
        store.new_game();
        store.commit_move();
        store.commit_move();
        assert_eq!(store.board_version(), 2);
        store.new_game();
        assert_eq!(store.board_version(), 0);
    }

    #[test]
    fn new_game_preserves_selected_level() {
        let mut store = GameStore::new(Level::new(7).unwrap());
        store.new_game();
        assert_eq!(store.selected_level.get(), 7);
    }
}
