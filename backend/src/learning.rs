//! `POST /api/learning/ingest-game` and `GET /api/learning/progress`: the
//! coach's two entry points into a player's game history.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use wall_e_learning::{apply_key_moment, ingest_game as run_ingestion, FeatureFlags};
use wall_e_rules::Game;
use wall_e_storage::{EventRepository, SignatureRepository, TrainingGameRepository};
use wall_e_types::{GameId, RequestId, TrainingGameId, UserId};

use crate::error::GatewayError;
use crate::headers::no_store_headers;
use crate::state::AppState;
use wall_e_types::ErrorCode;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestGameRequest {
    pub user_id: UserId,
    pub game_id: GameId,
    pub pgn: String,
    #[serde(default)]
    pub player_color: Option<String>,
    #[serde(default)]
    pub chat_context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestGameResponse {
    pub success: bool,
    pub analysis_mode: &'static str,
    pub concepts_updated: Vec<String>,
    pub request_id: RequestId,
}

/// `analysisMode` on a game that had already been recorded for this user —
/// re-ingestion is a no-op, not an error, since the next game re-triggers
/// analysis naturally.
const MODE_ALREADY_INGESTED: &str = "already-ingested";
const MODE_DISABLED: &str = "disabled";
const MODE_SHADOW: &str = "shadow";
const MODE_READONLY: &str = "readonly";
const MODE_ACTIVE: &str = "active";

pub async fn ingest_game(
    State(state): State<AppState>,
    Json(request): Json<IngestGameRequest>,
) -> Result<(HeaderMap, Json<IngestGameResponse>), GatewayError> {
    let request_id = RequestId::new();
    let training_games = TrainingGameRepository::new(&state.db);

    if training_games
        .already_ingested(request.user_id, request.game_id)
        .await
        .map_err(|e| db_error(e, request_id))?
    {
        return Ok((
            no_store_headers(),
            Json(IngestGameResponse {
                success: true,
                analysis_mode: MODE_ALREADY_INGESTED,
                concepts_updated: Vec::new(),
                request_id,
            }),
        ));
    }

    if !state.config.stockfish_game_analysis_enabled {
        return Ok((
            no_store_headers(),
            Json(IngestGameResponse {
                success: true,
                analysis_mode: MODE_DISABLED,
                concepts_updated: Vec::new(),
                request_id,
            }),
        ));
    }

    let game = Game::from_pgn_best_effort(&request.pgn);
    let game_index = training_games
        .count_for_user(request.user_id)
        .await
        .map_err(|e| db_error(e, request_id))?;
    let now = Utc::now();

    let flags = FeatureFlags {
        enabled: true,
        shadow: request.chat_context.as_deref() == Some("shadow"),
        readonly: false,
        is_async: true,
        max_ply: FeatureFlags::default().max_ply,
    };

    let outcome = run_ingestion(
        request.user_id,
        Some(request.game_id),
        TrainingGameId::new(),
        game_index,
        &game,
        flags.clone(),
        now,
    );

    if !flags.readonly && !flags.shadow {
        let signatures = SignatureRepository::new(&state.db);
        for moment in &outcome.key_moments {
            let existing = signatures
                .find(request.user_id, moment.category, &moment.title)
                .await
                .map_err(|e| db_error(e, request_id))?;
            let base = existing.unwrap_or_else(|| {
                wall_e_learning::MistakeSignature::new(
                    wall_e_types::SignatureId::new(),
                    request.user_id,
                    moment.category,
                    moment.title.clone(),
                    moment.description.clone(),
                    moment.pattern_details.clone(),
                    now,
                )
            });
            let updated = apply_key_moment(base, moment, now);
            signatures.upsert(&updated).await.map_err(|e| db_error(e, request_id))?;
        }
    }

    training_games
        .insert(&outcome.training_game)
        .await
        .map_err(|e| db_error(e, request_id))?;
    EventRepository::new(&state.db)
        .append(&outcome.event)
        .await
        .map_err(|e| db_error(e, request_id))?;

    let mode = if flags.shadow {
        MODE_SHADOW
    } else if flags.readonly {
        MODE_READONLY
    } else {
        MODE_ACTIVE
    };

    Ok((
        no_store_headers(),
        Json(IngestGameResponse {
            success: true,
            analysis_mode: mode,
            concepts_updated: outcome.event.payload.concepts_updated,
            request_id,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub success: bool,
    pub user_id: UserId,
    pub games_analyzed: u32,
    pub last_ingested_at: Option<chrono::DateTime<Utc>>,
    pub top_weak_concepts: Vec<String>,
    pub top_strong_concepts: Vec<String>,
    pub recent_key_moments: Vec<String>,
    pub total_concepts: u32,
    pub avg_mastery: f64,
    pub duration_ms: u64,
}

pub async fn progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<(HeaderMap, Json<ProgressResponse>), GatewayError> {
    let request_id = RequestId::new();
    let started = std::time::Instant::now();

    let signatures = SignatureRepository::new(&state.db)
        .list_for_user(query.user_id)
        .await
        .map_err(|e| db_error(e, request_id))?;
    let training_games = TrainingGameRepository::new(&state.db)
        .list_for_user(query.user_id)
        .await
        .map_err(|e| db_error(e, request_id))?;

    let now = Utc::now();
    let mut ranked = signatures.clone();
    ranked.sort_by(|a, b| {
        b.mastery_score
            .partial_cmp(&a.mastery_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let top_strong_concepts: Vec<String> = ranked.iter().rev().take(3).map(|s| s.title.clone()).collect();
    let top_weak_concepts: Vec<String> = ranked.iter().take(3).map(|s| s.title.clone()).collect();

    let avg_mastery = if signatures.is_empty() {
        0.0
    } else {
        signatures
            .iter()
            .map(|s| wall_e_learning::decayed_mastery(s.mastery_score, s.last_occurrence_time, now))
            .sum::<f64>()
            / signatures.len() as f64
    };

    let recent_key_moments: Vec<String> = EventRepository::new(&state.db)
        .recent_for_user(query.user_id, 10)
        .await
        .map_err(|e| db_error(e, request_id))?
        .into_iter()
        .flat_map(|event| event.payload.concepts_updated)
        .collect();

    Ok((
        no_store_headers(),
        Json(ProgressResponse {
            success: true,
            user_id: query.user_id,
            games_analyzed: training_games.len() as u32,
            last_ingested_at: training_games.last().map(|g| g.timestamp),
            top_weak_concepts,
            top_strong_concepts,
            recent_key_moments,
            total_concepts: signatures.len() as u32,
            avg_mastery,
            duration_ms: started.elapsed().as_millis() as u64,
        }),
    ))
}

fn db_error(e: wall_e_storage::StorageError, request_id: RequestId) -> GatewayError {
    GatewayError::new(ErrorCode::DatabaseUnavailable, e.to_string(), request_id)
}
