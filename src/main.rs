use tokio::net::TcpListener;
use wall_e_gateway::{router, AppState, Config};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    if !config.worker_binding {
        tracing::warn!("WORKER_BINDING not set: every /api/chess-move request will be refused");
    }

    let db = wall_e_storage::connect()
        .await
        .expect("failed to initialize storage");

    let addr = config.bind_addr.clone();
    let state = AppState::new(config, db);
    let app = router(state);

    let listener = TcpListener::bind(&addr).await.expect("failed to bind gateway port");
    tracing::info!(%addr, "wall-e gateway listening");
    axum::serve(listener, app).await.expect("gateway server failed");
}
