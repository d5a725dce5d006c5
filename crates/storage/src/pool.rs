//! Connection setup. `DATABASE_URL` set: connect to that SQLite file,
//! creating it if missing. Unset: fall back to a private in-memory
//! database — "degraded mode" — so the gateway can still boot and serve
//! CPU moves (which don't need persistence) when no volume is mounted.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub async fn connect() -> Result<Pool<Sqlite>, sqlx::Error> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            tracing::info!(%url, "connecting to configured database");
            connect_with(&url).await
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, running in degraded in-memory mode");
            connect_with("sqlite::memory:").await
        }
    }
}

async fn connect_with(url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    // `sqlite::memory:` hands out a brand new, empty database per connection,
    // so degraded mode is pinned to a single connection — otherwise a write
    // and the read that follows it could silently land on two different
    // in-memory databases.
    let max_connections = if url == "sqlite::memory:" { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    crate::schema::initialize(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_initializes_schema() {
        let pool = connect_with("sqlite::memory:").await.unwrap();
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM mistake_signatures")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.0, 0);
    }
}
