//! Persistence: learner profiles, mistake signatures, training games, the
//! learning event audit log, and the short-TTL worker call log, all backed
//! by SQLite through `sqlx`. Falls back to an in-memory database when no
//! `DATABASE_URL` is configured.

mod error;
mod events;
mod metrics;
mod pool;
mod profiles;
mod schema;
mod signatures;
mod training_games;
mod worker_calls;

pub use error::StorageError;
pub use events::EventRepository;
pub use metrics::MetricRepository;
pub use pool::connect;
pub use profiles::ProfileRepository;
pub use signatures::SignatureRepository;
pub use training_games::TrainingGameRepository;
pub use worker_calls::{WorkerCallRecord, WorkerCallRepository};
