//! `POST /api/wall-e/mistakes` and `GET /api/wall-e/mistakes`: direct
//! read/write access to a player's mistake signatures, independent of the
//! game-ingestion pipeline that normally produces them.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wall_e_learning::{DecisionContext, MistakeCategory, MistakeSignature};
use wall_e_storage::SignatureRepository;
use wall_e_types::{ErrorCode, RequestId, SignatureId, UserId};

use crate::error::GatewayError;
use crate::headers::no_store_headers;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMistakeRequest {
    pub user_id: UserId,
    pub category: MistakeCategory,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub pattern_details: Value,
    pub fen: String,
    #[serde(default)]
    pub context: Option<DecisionContext>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMistakeResponse {
    pub success: bool,
    pub signature_id: String,
    pub occurrence_count: u32,
    pub confidence_score: f64,
    pub request_id: RequestId,
}

/// Dedup key is `(userId, category, title)`: a second report of the same
/// pattern bumps the existing row's occurrence count rather than creating
/// a sibling signature.
pub async fn upsert_mistake(
    State(state): State<AppState>,
    Json(request): Json<UpsertMistakeRequest>,
) -> Result<(HeaderMap, Json<UpsertMistakeResponse>), GatewayError> {
    let request_id = RequestId::new();
    let now = Utc::now();
    let repo = SignatureRepository::new(&state.db);

    let existing = repo
        .find(request.user_id, request.category, &request.title)
        .await
        .map_err(|e| db_error(e, request_id))?;

    let mut signature = existing.unwrap_or_else(|| {
        MistakeSignature::new(
            SignatureId::new(),
            request.user_id,
            request.category,
            request.title.clone(),
            request.description.clone(),
            request.pattern_details.clone(),
            now,
        )
    });

    let context = request.context.unwrap_or(DecisionContext {
        game_phase: wall_e_learning::GamePhase::Middlegame,
        position_type: wall_e_learning::PositionType::Quiet,
        king_safety: wall_e_learning::KingSafety::Safe,
        material_balance: 0,
    });
    signature.record_occurrence(request.fen, now, context);
    signature.confidence_score = wall_e_learning::update_confidence(signature.confidence_score, signature.occurrence_count);

    repo.upsert(&signature).await.map_err(|e| db_error(e, request_id))?;

    Ok((
        no_store_headers(),
        Json(UpsertMistakeResponse {
            success: true,
            signature_id: signature.signature_id.to_string(),
            occurrence_count: signature.occurrence_count,
            confidence_score: signature.confidence_score,
            request_id,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMistakesQuery {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeView {
    pub signature_id: String,
    pub category: MistakeCategory,
    pub title: String,
    pub description: String,
    pub occurrence_count: u32,
    pub confidence_score: f64,
    pub mastery_score: f64,
    pub example_fens: Vec<String>,
    pub related_concepts: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMistakesResponse {
    pub success: bool,
    pub mistakes: Vec<MistakeView>,
}

pub async fn list_mistakes(
    State(state): State<AppState>,
    Query(query): Query<ListMistakesQuery>,
) -> Result<(HeaderMap, Json<ListMistakesResponse>), GatewayError> {
    let request_id = RequestId::new();
    let mut signatures = SignatureRepository::new(&state.db)
        .list_for_user(query.user_id)
        .await
        .map_err(|e| db_error(e, request_id))?;

    signatures.sort_by(|a, b| b.occurrence_count.cmp(&a.occurrence_count));

    let mistakes = signatures
        .into_iter()
        .map(|s| MistakeView {
            signature_id: s.signature_id.to_string(),
            category: s.category,
            title: s.title,
            description: s.description,
            occurrence_count: s.occurrence_count,
            confidence_score: s.confidence_score,
            mastery_score: s.mastery_score,
            example_fens: s.example_fens,
            related_concepts: s.related_concepts,
        })
        .collect();

    Ok((no_store_headers(), Json(ListMistakesResponse { success: true, mistakes })))
}

fn db_error(e: wall_e_storage::StorageError, request_id: RequestId) -> GatewayError {
    GatewayError::new(ErrorCode::DatabaseUnavailable, e.to_string(), request_id)
}
