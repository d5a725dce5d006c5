//! Gateway HTTP integration tests using the `Router::oneshot` pattern.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wall_e_gateway::{router, AppState, Config};

fn test_config() -> Config {
    Config {
        worker_binding: true,
        allow_fallback_main_thread: false,
        internal_auth_token: None,
        database_url: None,
        stockfish_game_analysis_enabled: true,
        canary_percentage: 0,
        admin_password: Some("test-secret".to_string()),
        bind_addr: "127.0.0.1:0".to_string(),
    }
}

async fn test_app() -> axum::Router {
    let db = wall_e_storage::connect().await.expect("in-memory pool");
    router(AppState::new(test_config(), db))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[tokio::test]
async fn chess_move_returns_a_legal_move_for_a_valid_request() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chess-move")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"fen": START_FEN, "difficulty": "normal", "cpuLevel": 2})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["move"].as_str().unwrap().len() >= 4);
    assert_eq!(body["mode"], "service-binding");
}

#[tokio::test]
async fn chess_move_rejects_a_malformed_fen() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chess-move")
                .header("content-type", "application/json")
                .body(Body::from(json!({"fen": "not-a-fen", "difficulty": "normal", "cpuLevel": 1}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errorCode"], "INVALID_FEN");
}

#[tokio::test]
async fn chess_move_rejects_cpu_level_out_of_range() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chess-move")
                .header("content-type", "application/json")
                .body(Body::from(json!({"fen": START_FEN, "difficulty": "normal", "cpuLevel": 9}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chess_move_sets_cache_discipline_headers() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chess-move")
                .header("content-type", "application/json")
                .body(Body::from(json!({"fen": START_FEN, "difficulty": "normal", "cpuLevel": 1}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("cache-control").unwrap(), "no-store, no-cache, must-revalidate");
    assert_eq!(headers.get("pragma").unwrap(), "no-cache");
}

#[tokio::test]
async fn chess_move_refuses_when_no_worker_binding_is_configured() {
    let db = wall_e_storage::connect().await.expect("in-memory pool");
    let mut config = test_config();
    config.worker_binding = false;
    let app = router(AppState::new(config, db));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chess-move")
                .header("content-type", "application/json")
                .body(Body::from(json!({"fen": START_FEN, "difficulty": "normal", "cpuLevel": 3}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["errorCode"], "NO_WORKER_BINDING");
}

#[tokio::test]
async fn mistakes_round_trip_through_upsert_and_list() {
    let app = test_app().await;
    let user_id = uuid::Uuid::new_v4().to_string();

    let upsert = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/wall-e/mistakes")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "userId": user_id,
                        "category": "tactical",
                        "title": "hanging queen",
                        "description": "left the queen en prise",
                        "fen": START_FEN,
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(upsert.status(), StatusCode::OK);

    let list = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/wall-e/mistakes?userId={user_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(list.status(), StatusCode::OK);
    let body = body_json(list).await;
    let mistakes = body["mistakes"].as_array().unwrap();
    assert_eq!(mistakes.len(), 1);
    assert_eq!(mistakes[0]["title"], "hanging queen");
    assert_eq!(mistakes[0]["occurrenceCount"], 1);
}

#[tokio::test]
async fn admin_routes_refuse_requests_without_the_bearer_token() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/admin/worker-health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_accept_the_configured_bearer_token() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/admin/worker-health")
                .header("authorization", "Bearer test-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["dbStatus"], "ok");
}

#[tokio::test]
async fn chat_sets_insufficient_history_for_a_brand_new_user() {
    let app = test_app().await;
    let user_id = uuid::Uuid::new_v4().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/wall-e/chat")
                .header("content-type", "application/json")
                .body(Body::from(json!({"userId": user_id}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["advice"]["historyEvidence"]["insufficientHistory"], true);
    assert!(body["advice"]["historyEvidence"]["personalizedReferenceCount"].as_u64().unwrap() < 2);
}

#[tokio::test]
async fn learning_progress_reports_zero_concepts_for_a_new_user() {
    let app = test_app().await;
    let user_id = uuid::Uuid::new_v4().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/learning/progress?userId={user_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["totalConcepts"], 0);
    assert_eq!(body["gamesAnalyzed"], 0);
}
