//! `TrainingGame` repository: one append per ingested game, indexed by
//! `(user_id, game_index)` for ordered replay.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use wall_e_learning::TrainingGame;
use wall_e_types::{GameId, TrainingGameId, UserId};

use crate::error::StorageError;

pub struct TrainingGameRepository<'a> {
    pool: &'a Pool<Sqlite>,
}

impl<'a> TrainingGameRepository<'a> {
    pub fn new(pool: &'a Pool<Sqlite>) -> Self {
        TrainingGameRepository { pool }
    }

    pub async fn insert(&self, game: &TrainingGame) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO training_games (
                training_game_id, user_id, game_id, game_index, timestamp, pgn, analysis, metrics
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(game.training_game_id.to_string())
        .bind(game.user_id.to_string())
        .bind(game.game_id.map(|id| id.to_string()))
        .bind(game.game_index as i64)
        .bind(game.timestamp.to_rfc3339())
        .bind(&game.pgn)
        .bind(serde_json::to_string(&game.analysis).unwrap_or_default())
        .bind(serde_json::to_string(&game.metrics).unwrap_or_default())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn already_ingested(&self, user_id: UserId, game_id: GameId) -> Result<bool, StorageError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM training_games WHERE user_id = ? AND game_id = ? LIMIT 1",
        )
        .bind(user_id.to_string())
        .bind(game_id.to_string())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.is_some())
    }

    pub async fn count_for_user(&self, user_id: UserId) -> Result<u32, StorageError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM training_games WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(self.pool)
            .await?;
        Ok(row.0 as u32)
    }

    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<TrainingGame>, StorageError> {
        let rows: Vec<Row> = sqlx::query_as(
            "SELECT training_game_id, user_id, game_id, game_index, timestamp, pgn, analysis, metrics
             FROM training_games WHERE user_id = ? ORDER BY game_index ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Row::into_model).collect())
    }
}

#[derive(sqlx::FromRow)]
struct Row {
    training_game_id: String,
    user_id: String,
    game_id: Option<String>,
    game_index: i64,
    timestamp: String,
    pgn: String,
    analysis: String,
    metrics: String,
}

impl Row {
    fn into_model(self) -> TrainingGame {
        TrainingGame {
            training_game_id: self.training_game_id.parse::<TrainingGameId>().unwrap_or_default(),
            user_id: self.user_id.parse::<UserId>().unwrap_or_default(),
            game_id: self.game_id.and_then(|id| id.parse::<GameId>().ok()),
            game_index: self.game_index as u32,
            timestamp: self.timestamp.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
            pgn: self.pgn,
            analysis: serde_json::from_str(&self.analysis).unwrap_or(serde_json::Value::Null),
            metrics: serde_json::from_str(&self.metrics).unwrap_or(serde_json::Value::Null),
        }
    }
}
