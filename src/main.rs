mod api;
mod config;
mod core;
mod error;
mod middleware;
mod store;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CONFIG;
use crate::store::STORE;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Load persisted votes
    match STORE.load() {
        Ok(count) => tracing::info!("Loaded {} votes from {}", count, CONFIG.data_file),
        Err(e) => tracing::error!("Failed to load votes: {}", e),
    }

    // The store is write-through, so shutdown only needs to log
    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutting down");
    };

    // CORS
    let cors_layer = if CONFIG.cors == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = CONFIG
            .cors
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Moderation routes (protected when ADMIN_TOKEN is set)
    let moderation_routes = Router::new()
        .route(
            "/players/rename/:old_name/:new_name",
            put(api::moderation::rename_player_handler),
        )
        .route(
            "/players/deactivate/:vote_id",
            delete(api::moderation::deactivate_vote_handler),
        )
        .route("/votes", delete(api::moderation::clear_votes_handler))
        .layer(axum_middleware::from_fn(
            middleware::admin_auth::admin_auth_middleware,
        ));

    let app = Router::new()
        // Voting + reports
        .route("/vote", post(api::handlers::add_vote_handler))
        .route("/leaderboard", get(api::handlers::leaderboard_handler))
        .route("/votes/recent", get(api::handlers::recent_votes_handler))
        .route("/votes/stats", get(api::handlers::vote_stats_handler))
        .route(
            "/votes/stats/chart",
            get(api::handlers::activity_chart_handler),
        )
        .route("/votes/notes", get(api::handlers::notes_handler))
        // Health check
        .route("/ping", get(api::handlers::ping_handler))
        // Moderation
        .merge(moderation_routes)
        // Middleware
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = CONFIG.web_addr.parse().expect("Invalid address");
    tracing::info!("Pongday listening on {}", addr);
    tracing::info!(
        "Moderation API protected: {}",
        !CONFIG.admin_token.is_empty()
    );

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .unwrap();
}
