//! `MistakeSignature` repository: one row per `(user_id, category, title)`,
//! upserted as the ingestion pipeline walks games.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use wall_e_learning::{DecisionContext, MistakeCategory, MistakeSignature};
use wall_e_types::{SignatureId, UserId};

use crate::error::StorageError;

pub struct SignatureRepository<'a> {
    pool: &'a Pool<Sqlite>,
}

impl<'a> SignatureRepository<'a> {
    pub fn new(pool: &'a Pool<Sqlite>) -> Self {
        SignatureRepository { pool }
    }

    pub async fn find(
        &self,
        user_id: UserId,
        category: MistakeCategory,
        title: &str,
    ) -> Result<Option<MistakeSignature>, StorageError> {
        let category_tag = category_tag(category);
        let row: Option<Row> = sqlx::query_as(
            "SELECT signature_id, user_id, category, title, description, pattern_details,
                    occurrence_count, last_occurrence_time, example_fens, related_concepts,
                    confidence_score, mastery_score, typical_decision_contexts
             FROM mistake_signatures
             WHERE user_id = ? AND category = ? AND title = ?",
        )
        .bind(user_id.to_string())
        .bind(category_tag)
        .bind(title)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Row::into_model))
    }

    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<MistakeSignature>, StorageError> {
        let rows: Vec<Row> = sqlx::query_as(
            "SELECT signature_id, user_id, category, title, description, pattern_details,
                    occurrence_count, last_occurrence_time, example_fens, related_concepts,
                    confidence_score, mastery_score, typical_decision_contexts
             FROM mistake_signatures WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Row::into_model).collect())
    }

    /// Insert or fully overwrite a signature row, keyed by its own id. The
    /// caller (ingestion pipeline) is responsible for loading-then-mutating
    /// via `find`/`record_occurrence` before calling this.
    pub async fn upsert(&self, signature: &MistakeSignature) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO mistake_signatures (
                signature_id, user_id, category, title, description, pattern_details,
                occurrence_count, last_occurrence_time, example_fens, related_concepts,
                confidence_score, mastery_score, typical_decision_contexts
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(signature_id) DO UPDATE SET
                occurrence_count = excluded.occurrence_count,
                last_occurrence_time = excluded.last_occurrence_time,
                example_fens = excluded.example_fens,
                related_concepts = excluded.related_concepts,
                confidence_score = excluded.confidence_score,
                mastery_score = excluded.mastery_score,
                typical_decision_contexts = excluded.typical_decision_contexts",
        )
        .bind(signature.signature_id.to_string())
        .bind(signature.user_id.to_string())
        .bind(category_tag(signature.category))
        .bind(&signature.title)
        .bind(&signature.description)
        .bind(serde_json::to_string(&signature.pattern_details).unwrap_or_default())
        .bind(signature.occurrence_count as i64)
        .bind(signature.last_occurrence_time.to_rfc3339())
        .bind(serde_json::to_string(&signature.example_fens).unwrap_or_default())
        .bind(serde_json::to_string(&signature.related_concepts).unwrap_or_default())
        .bind(signature.confidence_score)
        .bind(signature.mastery_score)
        .bind(serde_json::to_string(&signature.typical_decision_contexts).unwrap_or_default())
        .execute(self.pool)
        .await?;
        Ok(())
    }
}

fn category_tag(category: MistakeCategory) -> &'static str {
    match category {
        MistakeCategory::Tactical => "tactical",
        MistakeCategory::Positional => "positional",
        MistakeCategory::Opening => "opening",
        MistakeCategory::Endgame => "endgame",
        MistakeCategory::Psychological => "psychological",
    }
}

fn category_from_tag(tag: &str) -> MistakeCategory {
    match tag {
        "positional" => MistakeCategory::Positional,
        "opening" => MistakeCategory::Opening,
        "endgame" => MistakeCategory::Endgame,
        "psychological" => MistakeCategory::Psychological,
        _ => MistakeCategory::Tactical,
    }
}

#[derive(sqlx::FromRow)]
struct Row {
    signature_id: String,
    user_id: String,
    category: String,
    title: String,
    description: String,
    pattern_details: String,
    occurrence_count: i64,
    last_occurrence_time: String,
    example_fens: String,
    related_concepts: String,
    confidence_score: f64,
    mastery_score: f64,
    typical_decision_contexts: String,
}

impl Row {
    fn into_model(self) -> MistakeSignature {
        MistakeSignature {
            signature_id: self.signature_id.parse::<SignatureId>().unwrap_or_default(),
            user_id: self.user_id.parse::<UserId>().unwrap_or_default(),
            category: category_from_tag(&self.category),
            title: self.title,
            description: self.description,
            pattern_details: serde_json::from_str(&self.pattern_details).unwrap_or(serde_json::Value::Null),
            occurrence_count: self.occurrence_count as u32,
            last_occurrence_time: self
                .last_occurrence_time
                .parse::<DateTime<Utc>>()
                .unwrap_or_else(|_| Utc::now()),
            example_fens: serde_json::from_str(&self.example_fens).unwrap_or_default(),
            related_concepts: serde_json::from_str(&self.related_concepts).unwrap_or_default(),
            confidence_score: self.confidence_score,
            mastery_score: self.mastery_score,
            typical_decision_contexts: serde_json::from_str::<Vec<DecisionContext>>(&self.typical_decision_contexts)
                .unwrap_or_default(),
        }
    }
}
