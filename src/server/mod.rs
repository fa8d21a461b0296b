//! Ledger server — Axum JSON API mirroring the record store.
//!
//! The handlers stay thin: normalization happens at the door, figures
//! come from the metrics core, and the routes only sequence reads and
//! writes.
//! CORS is open for local single-user use.

pub mod routes;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use routes::AppState;

/// Start the ledger API server.
///
/// This spawns a background task — it doesn't block.
pub fn spawn_server(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);

    tokio::spawn(async move {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        info!(port, "Ledger API starting on http://localhost:{port}");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind ledger API port");

        axum::serve(listener, app)
            .await
            .expect("Ledger API server error");
    });

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/profiles", get(routes::list_profiles))
        .route(
            "/api/profiles/:profile/bets",
            get(routes::list_bets).post(routes::upsert_bet),
        )
        .route("/api/bets/:id", delete(routes::delete_bet))
        .route(
            "/api/profiles/:profile/flows",
            get(routes::list_flows).post(routes::upsert_flow),
        )
        .route("/api/flows/:id", delete(routes::delete_flow))
        .route("/api/profiles/:profile/summary", get(routes::get_summary))
        .route("/api/profiles/:profile/rankings", get(routes::get_rankings))
        .route("/api/import/slip", post(routes::import_slip))
        .route(
            "/api/profiles/:profile/bankroll",
            get(routes::get_bankroll).put(routes::rebase_bankroll),
        )
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
