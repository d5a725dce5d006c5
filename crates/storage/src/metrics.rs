//! `LearningMetric` repository: one row per session, a time series keyed
//! by `(user_id, session_start)`.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use wall_e_learning::LearningMetric;
use wall_e_types::UserId;

use crate::error::StorageError;

pub struct MetricRepository<'a> {
    pool: &'a Pool<Sqlite>,
}

impl<'a> MetricRepository<'a> {
    pub fn new(pool: &'a Pool<Sqlite>) -> Self {
        MetricRepository { pool }
    }

    pub async fn insert(&self, metric: &LearningMetric) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO learning_metrics (
                user_id, session_start, session_end, game_count, mistakes_identified,
                mistakes_corrected, total_moves, insights, progress
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(metric.user_id.to_string())
        .bind(metric.session_start.to_rfc3339())
        .bind(metric.session_end.to_rfc3339())
        .bind(metric.game_count as i64)
        .bind(metric.mistakes_identified as i64)
        .bind(metric.mistakes_corrected as i64)
        .bind(metric.total_moves as i64)
        .bind(serde_json::to_string(&metric.insights).unwrap_or_default())
        .bind(metric.progress)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<LearningMetric>, StorageError> {
        let rows: Vec<Row> = sqlx::query_as(
            "SELECT user_id, session_start, session_end, game_count, mistakes_identified,
                    mistakes_corrected, total_moves, insights, progress
             FROM learning_metrics WHERE user_id = ? ORDER BY session_start ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Row::into_model).collect())
    }
}

#[derive(sqlx::FromRow)]
struct Row {
    user_id: String,
    session_start: String,
    session_end: String,
    game_count: i64,
    mistakes_identified: i64,
    mistakes_corrected: i64,
    total_moves: i64,
    insights: String,
    progress: f64,
}

impl Row {
    fn into_model(self) -> LearningMetric {
        LearningMetric {
            user_id: self.user_id.parse::<UserId>().unwrap_or_default(),
            session_start: self.session_start.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
            session_end: self.session_end.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
            game_count: self.game_count as u32,
            mistakes_identified: self.mistakes_identified as u32,
            mistakes_corrected: self.mistakes_corrected as u32,
            total_moves: self.total_moves as u32,
            insights: serde_json::from_str(&self.insights).unwrap_or_default(),
            progress: self.progress,
        }
    }
}
