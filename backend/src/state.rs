use std::sync::{Arc, Mutex};

use sqlx::{Pool, Sqlite};
use wall_e_telemetry::FallbackTracker;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when no `DATABASE_URL` was configured and storage is running
    /// in degraded in-memory mode — learning endpoints still work, just
    /// without cross-restart durability.
    pub db: Pool<Sqlite>,
    pub fallback: Arc<Mutex<FallbackTracker>>,
}

impl AppState {
    pub fn new(config: Config, db: Pool<Sqlite>) -> Self {
        AppState {
            config: Arc::new(config),
            db,
            fallback: Arc::new(Mutex::new(FallbackTracker::default())),
        }
    }
}
