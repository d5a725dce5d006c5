//! Schema creation. Run once at startup against whatever pool `pool::connect`
//! handed back, whether that's a real file or the in-memory degraded-mode
//! database.

use sqlx::{Pool, Sqlite};

pub async fn initialize(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS mistake_signatures (
            signature_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            category TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            pattern_details TEXT NOT NULL,
            occurrence_count INTEGER NOT NULL DEFAULT 0,
            last_occurrence_time TEXT NOT NULL,
            example_fens TEXT NOT NULL,
            related_concepts TEXT NOT NULL,
            confidence_score REAL NOT NULL DEFAULT 0,
            mastery_score REAL NOT NULL DEFAULT 0,
            typical_decision_contexts TEXT NOT NULL,
            UNIQUE (user_id, category, title)
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS training_games (
            training_game_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            game_id TEXT,
            game_index INTEGER NOT NULL,
            timestamp TEXT NOT NULL,
            pgn TEXT NOT NULL,
            analysis TEXT NOT NULL,
            metrics TEXT NOT NULL
        );",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_training_games_user_index ON training_games (user_id, game_index);")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS learning_metrics (
            user_id TEXT NOT NULL,
            session_start TEXT NOT NULL,
            session_end TEXT NOT NULL,
            game_count INTEGER NOT NULL,
            mistakes_identified INTEGER NOT NULL,
            mistakes_corrected INTEGER NOT NULL,
            total_moves INTEGER NOT NULL,
            insights TEXT NOT NULL,
            progress REAL NOT NULL
        );",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_learning_metrics_user_session ON learning_metrics (user_id, session_start);")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS learning_events (
            event_id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            user_id TEXT NOT NULL,
            event_type TEXT NOT NULL,
            payload TEXT NOT NULL
        );",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_learning_events_user ON learning_events (user_id, timestamp);")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS worker_call_log (
            request_id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            level INTEGER NOT NULL,
            outcome TEXT NOT NULL,
            detail TEXT NOT NULL
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS learner_profiles (
            user_id TEXT PRIMARY KEY,
            games_played INTEGER NOT NULL DEFAULT 0,
            tactical_rating REAL NOT NULL DEFAULT 0,
            positional_rating REAL NOT NULL DEFAULT 0,
            endgame_rating REAL NOT NULL DEFAULT 0,
            opening_rating REAL NOT NULL DEFAULT 0,
            improvement_rate REAL NOT NULL DEFAULT 0,
            strengths TEXT NOT NULL DEFAULT '[]',
            weaknesses TEXT NOT NULL DEFAULT '[]',
            play_style TEXT NOT NULL DEFAULT '',
            milestones TEXT NOT NULL DEFAULT '[]'
        );",
    )
    .execute(pool)
    .await?;

    Ok(())
}
