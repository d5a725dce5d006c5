//! `POST /api/wall-e/metrics` and `GET /api/wall-e/metrics`: raw session
//! history, plus two optional derived views (`signals`, `progression`)
//! folded into the same response rather than split across endpoints.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wall_e_learning::{teaching_opportunity_score, CoachingMemory, LearningMetric, ProgressionReport};
use wall_e_storage::{MetricRepository, SignatureRepository, TrainingGameRepository};
use wall_e_types::{ErrorCode, RequestId, UserId};

use crate::error::GatewayError;
use crate::headers::no_store_headers;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendMetricRequest {
    pub user_id: UserId,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub game_count: u32,
    pub mistakes_identified: u32,
    pub mistakes_corrected: u32,
    pub total_moves: u32,
    #[serde(default)]
    pub insights: Vec<String>,
    pub progress: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendMetricResponse {
    pub success: bool,
    pub request_id: RequestId,
}

pub async fn append_metric(
    State(state): State<AppState>,
    Json(request): Json<AppendMetricRequest>,
) -> Result<(HeaderMap, Json<AppendMetricResponse>), GatewayError> {
    let request_id = RequestId::new();
    let metric = LearningMetric {
        user_id: request.user_id,
        session_start: request.session_start,
        session_end: request.session_end,
        game_count: request.game_count,
        mistakes_identified: request.mistakes_identified,
        mistakes_corrected: request.mistakes_corrected,
        total_moves: request.total_moves,
        insights: request.insights,
        progress: request.progress,
    };
    MetricRepository::new(&state.db)
        .insert(&metric)
        .await
        .map_err(|e| db_error(e, request_id))?;

    Ok((no_store_headers(), Json(AppendMetricResponse { success: true, request_id })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadMetricsQuery {
    pub user_id: UserId,
    #[serde(default)]
    pub signals: bool,
    #[serde(default)]
    pub progression: bool,
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalView {
    pub title: String,
    pub opportunity_score: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricView {
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub game_count: u32,
    pub mistakes_identified: u32,
    pub mistakes_corrected: u32,
    pub total_moves: u32,
    pub insights: Vec<String>,
    pub progress: f64,
}

impl From<&LearningMetric> for MetricView {
    fn from(m: &LearningMetric) -> Self {
        MetricView {
            session_start: m.session_start,
            session_end: m.session_end,
            game_count: m.game_count,
            mistakes_identified: m.mistakes_identified,
            mistakes_corrected: m.mistakes_corrected,
            total_moves: m.total_moves,
            insights: m.insights.clone(),
            progress: m.progress,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadMetricsResponse {
    pub success: bool,
    pub history: Vec<MetricView>,
    pub signals: Option<Vec<SignalView>>,
    pub progression: Option<ProgressionReport>,
}

/// `signals=true` ranks every loaded signature by teaching-opportunity
/// score. `progression=true` folds in the aggregate report. `persist=true`
/// additionally records this read as a new session row, so a dashboard
/// polling this endpoint also builds the time series it's graphing.
pub async fn read_metrics(
    State(state): State<AppState>,
    Query(query): Query<ReadMetricsQuery>,
) -> Result<(HeaderMap, Json<ReadMetricsResponse>), GatewayError> {
    let request_id = RequestId::new();
    let now = Utc::now();

    let history = MetricRepository::new(&state.db)
        .list_for_user(query.user_id)
        .await
        .map_err(|e| db_error(e, request_id))?;

    let signatures = if query.signals || query.progression {
        SignatureRepository::new(&state.db)
            .list_for_user(query.user_id)
            .await
            .map_err(|e| db_error(e, request_id))?
    } else {
        Vec::new()
    };

    let signals = if query.signals {
        let mut ranked: Vec<SignalView> = signatures
            .iter()
            .map(|s| SignalView {
                title: s.title.clone(),
                opportunity_score: teaching_opportunity_score(s, now),
            })
            .filter(|s| s.opportunity_score > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.opportunity_score.partial_cmp(&a.opportunity_score).unwrap_or(std::cmp::Ordering::Equal));
        Some(ranked)
    } else {
        None
    };

    let progression = if query.progression {
        let games_played = TrainingGameRepository::new(&state.db)
            .count_for_user(query.user_id)
            .await
            .map_err(|e| db_error(e, request_id))?;
        let recent_games = games_played.min(10);
        wall_e_learning::build_report(&signatures, &CoachingMemory::default(), games_played, recent_games, now)
    } else {
        None
    };

    if query.persist {
        let snapshot = LearningMetric {
            user_id: query.user_id,
            session_start: now,
            session_end: now,
            game_count: history.last().map(|m| m.game_count).unwrap_or(0),
            mistakes_identified: signatures.iter().map(|s| s.occurrence_count).sum(),
            mistakes_corrected: 0,
            total_moves: 0,
            insights: Vec::new(),
            progress: progression.as_ref().map(|r| 1.0 - r.mistake_recurrence_rate.min(1.0)).unwrap_or(0.0),
        };
        MetricRepository::new(&state.db)
            .insert(&snapshot)
            .await
            .map_err(|e| db_error(e, request_id))?;
    }

    Ok((
        no_store_headers(),
        Json(ReadMetricsResponse {
            success: true,
            history: history.iter().map(MetricView::from).collect(),
            signals,
            progression,
        }),
    ))
}

fn db_error(e: wall_e_storage::StorageError, request_id: RequestId) -> GatewayError {
    GatewayError::new(ErrorCode::DatabaseUnavailable, e.to_string(), request_id)
}
