//! Worker call log: a short-TTL record of edge-worker outcomes, kept only
//! long enough for the admin health endpoints to show recent behavior.
//! Entries older than the TTL are purged rather than retained indefinitely.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Sqlite};
use wall_e_types::{Level, RequestId};

use crate::error::StorageError;

/// Worker call log rows are diagnostic, not an audit trail — discard
/// anything older than this on each purge.
const TTL_HOURS: i64 = 24;

pub struct WorkerCallRepository<'a> {
    pool: &'a Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct WorkerCallRecord {
    pub request_id: RequestId,
    pub created_at: DateTime<Utc>,
    pub level: Level,
    pub outcome: String,
    pub detail: String,
}

impl<'a> WorkerCallRepository<'a> {
    pub fn new(pool: &'a Pool<Sqlite>) -> Self {
        WorkerCallRepository { pool }
    }

    pub async fn record(&self, record: &WorkerCallRecord) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO worker_call_log (request_id, created_at, level, outcome, detail)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(request_id) DO UPDATE SET outcome = excluded.outcome, detail = excluded.detail",
        )
        .bind(record.request_id.to_string())
        .bind(record.created_at.to_rfc3339())
        .bind(record.level.get() as i64)
        .bind(&record.outcome)
        .bind(&record.detail)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<(RequestId, DateTime<Utc>, String, String)>, StorageError> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            "SELECT request_id, created_at, outcome, detail FROM worker_call_log
             ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, created_at, outcome, detail)| {
                Some((
                    id.parse::<RequestId>().ok()?,
                    created_at.parse::<DateTime<Utc>>().ok()?,
                    outcome,
                    detail,
                ))
            })
            .collect())
    }

    /// Delete every row older than the TTL. Cheap enough to call on every
    /// write since the table is small and short-lived by design.
    pub async fn purge_expired(&self) -> Result<u64, StorageError> {
        let cutoff = Utc::now() - Duration::hours(TTL_HOURS);
        let result = sqlx::query("DELETE FROM worker_call_log WHERE created_at < ?")
            .bind(cutoff.to_rfc3339())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
