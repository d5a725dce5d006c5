//! `LearningEvent` audit log: append-only, never updated or deleted in
//! place. Every ingestion, advice issuance, and advice outcome lands here
//! even in shadow/readonly mode, so the gateway's admin endpoints can
//! explain what the learning system did (or would have done).

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use wall_e_learning::{LearningEvent, LearningEventPayload, LearningEventType};
use wall_e_types::UserId;

use crate::error::StorageError;

pub struct EventRepository<'a> {
    pool: &'a Pool<Sqlite>,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a Pool<Sqlite>) -> Self {
        EventRepository { pool }
    }

    pub async fn append(&self, event: &LearningEvent) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO learning_events (timestamp, user_id, event_type, payload)
             VALUES (?, ?, ?, ?)",
        )
        .bind(event.timestamp.to_rfc3339())
        .bind(event.user_id.to_string())
        .bind(event_type_tag(event.event_type))
        .bind(serde_json::to_string(&event.payload).unwrap_or_default())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<LearningEvent>, StorageError> {
        let rows: Vec<Row> = sqlx::query_as(
            "SELECT timestamp, user_id, event_type, payload
             FROM learning_events ORDER BY event_id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().filter_map(Row::into_model).collect())
    }

    pub async fn recent_for_user(&self, user_id: UserId, limit: i64) -> Result<Vec<LearningEvent>, StorageError> {
        let rows: Vec<Row> = sqlx::query_as(
            "SELECT timestamp, user_id, event_type, payload
             FROM learning_events WHERE user_id = ? ORDER BY event_id DESC LIMIT ?",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().filter_map(Row::into_model).collect())
    }
}

fn event_type_tag(event_type: LearningEventType) -> &'static str {
    match event_type {
        LearningEventType::GameIngested => "game_ingested",
        LearningEventType::SignatureUpdated => "signature_updated",
        LearningEventType::AdviceIssued => "advice_issued",
        LearningEventType::AdviceOutcome => "advice_outcome",
    }
}

fn event_type_from_tag(tag: &str) -> Option<LearningEventType> {
    Some(match tag {
        "game_ingested" => LearningEventType::GameIngested,
        "signature_updated" => LearningEventType::SignatureUpdated,
        "advice_issued" => LearningEventType::AdviceIssued,
        "advice_outcome" => LearningEventType::AdviceOutcome,
        _ => return None,
    })
}

#[derive(sqlx::FromRow)]
struct Row {
    timestamp: String,
    user_id: String,
    event_type: String,
    payload: String,
}

impl Row {
    fn into_model(self) -> Option<LearningEvent> {
        Some(LearningEvent {
            timestamp: self.timestamp.parse::<DateTime<Utc>>().ok()?,
            user_id: self.user_id.parse::<UserId>().ok()?,
            event_type: event_type_from_tag(&self.event_type)?,
            payload: serde_json::from_str::<LearningEventPayload>(&self.payload).ok()?,
        })
    }
}
