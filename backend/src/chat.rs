//! `POST /api/wall-e/chat`: the advice/analysis entry point. Every response
//! goes through the Advice Composer's anti-hallucination gate — it can only
//! cite signatures this handler actually loaded for the requesting user, and
//! either meets the personalization bar or says plainly that it can't.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use wall_e_learning::{compose, insufficient_history, rank_for_response, select_action, AdviceResponse, CoachingAction};
use wall_e_storage::{SignatureRepository, TrainingGameRepository};
use wall_e_types::{RequestId, UserId};

use crate::error::GatewayError;
use crate::headers::no_store_headers;
use crate::state::AppState;

/// Reason surfaced on `historyEvidence` when the learner profile store
/// couldn't be reached — the composer degrades gracefully rather than
/// fabricating references or failing the request.
const REASON_PERSISTENCE_UNAVAILABLE: &str = "persistence_unavailable";

/// Confidence threshold above which a pattern is "confirmed" and eligible
/// to back a personalized reference, per the composer's contract.
const CONFIRMED_CONFIDENCE: f64 = 0.7;
const MIN_GAMES_FOR_PERSONALIZATION: u32 = 2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub previous_focus: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub advice: AdviceResponse,
    pub focus_action: Option<String>,
    pub request_id: RequestId,
}

/// Load this user's games and mistake signatures, rank the confirmed ones
/// by teaching opportunity, and hand the top few to the composer. Never
/// passes the composer anything it didn't itself load for this user.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<(HeaderMap, Json<ChatResponse>), GatewayError> {
    let request_id = RequestId::new();
    let now = Utc::now();

    // The composer degrades gracefully rather than erroring out when the
    // learner profile store is unreachable: it never fabricates references,
    // so an unreadable store is indistinguishable from "no history yet".
    let games_recorded = match TrainingGameRepository::new(&state.db).count_for_user(request.user_id).await {
        Ok(count) => count,
        Err(e) => return Ok(degraded_response(e, request_id)),
    };

    let signatures = match SignatureRepository::new(&state.db).list_for_user(request.user_id).await {
        Ok(signatures) => signatures,
        Err(e) => return Ok(degraded_response(e, request_id)),
    };

    let confirmed: Vec<_> = signatures
        .into_iter()
        .filter(|s| s.confidence_score >= CONFIRMED_CONFIDENCE)
        .collect();

    let focus = if games_recorded >= MIN_GAMES_FOR_PERSONALIZATION {
        rank_for_response(&confirmed, request.previous_focus.as_deref(), now)
    } else {
        Vec::new()
    };

    let focus_action = focus
        .first()
        .map(|signature| {
            let was_recently_mastered = signature.mastery_score >= wall_e_learning::MASTERY_TEACHING_CEILING;
            action_label(select_action(signature, was_recently_mastered))
        });

    let loaded: Vec<_> = focus.into_iter().cloned().collect();
    let advice = compose(&loaded, games_recorded);

    Ok((
        no_store_headers(),
        Json(ChatResponse {
            success: true,
            advice,
            focus_action,
            request_id,
        }),
    ))
}

fn action_label(action: CoachingAction) -> String {
    match action {
        CoachingAction::Introduce => "introduce",
        CoachingAction::Reinforce => "reinforce",
        CoachingAction::Correct => "correct",
        CoachingAction::Celebrate => "celebrate",
        CoachingAction::Escalate => "escalate",
    }
    .to_string()
}

fn degraded_response(e: wall_e_storage::StorageError, request_id: RequestId) -> (HeaderMap, Json<ChatResponse>) {
    tracing::warn!(error = %e, request_id = %request_id, "learner profile store unavailable, degrading to insufficient history");
    (
        no_store_headers(),
        Json(ChatResponse {
            success: true,
            advice: insufficient_history(REASON_PERSISTENCE_UNAVAILABLE),
            focus_action: None,
            request_id,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_label_covers_every_variant() {
        assert_eq!(action_label(CoachingAction::Introduce), "introduce");
        assert_eq!(action_label(CoachingAction::Celebrate), "celebrate");
    }
}
