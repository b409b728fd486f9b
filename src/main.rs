//! SALSA scheduling engine - Axum server
//!
//! Run with: cargo run --bin salsa-engine
//! Then POST to http://localhost:7860/schedules

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};

use salsa_engine::{api, config::EngineSettings, telemetry};

#[tokio::main]
async fn main() {
    telemetry::init();

    let settings = EngineSettings::from_env();
    tracing::info!(
        solver_workers = settings.solver_workers,
        solver_time_limit_seconds = settings.solver_time_limit_seconds,
        "starting salsa-engine"
    );

    let state = Arc::new(api::AppState::new());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], 7860));

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await.unwrap();
}
