use std::sync::Arc;

use gradebook_api::adapter;
use gradebook_api::state::AppState;
use gradebook_core::AppConfig;

#[tokio::main]
async fn main() {
    gradebook_observability::init();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config));

    let app = adapter::build_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
